//! Hynitron CST816S touch panel driver
//! Based on https://github.com/jonlamb-gh/pinetime-rs/blob/master/pinetime-drivers/src/cst816s.rs

use embassy_nrf::{
    gpio::Output,
    gpiote,
    twim::{self, Twim},
};
use embassy_time::Duration;
use embedded_hal::delay::DelayNs;
use rs_handheld_bridge::{RawTouch, RawTouchPoint};

const DEFAULT_READ_TIMEOUT: Duration = Duration::from_millis(5);

/// The controller only tracks one finger, it always reports it with this id
const SINGLE_TOUCH_ID: u32 = 0;

#[derive(Copy, Clone, Eq, PartialEq, Debug, defmt::Format)]
pub enum TouchRotation {
    Rotate0,
    Rotate90,
    Rotate180,
    Rotate270,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, defmt::Format)]
struct Sample {
    x: u16,
    y: u16,
    is_touching: bool,
}

impl Sample {
    fn from_le_bytes(bytes: &[u8; 7]) -> Self {
        let num_touch_points = bytes[2] & 0x0F;
        let x = (bytes[4] as u16) | (((bytes[3] & 0x0F) as u16) << 8);
        let y = (bytes[6] as u16) | (((bytes[5] & 0x0F) as u16) << 8);
        Sample {
            x,
            y,
            is_touching: num_touch_points > 0,
        }
    }
}

/// CST816S driver
pub struct Cst816s<'a, TWIM>
where
    TWIM: twim::Instance,
{
    slave_address: u8,
    twim: Twim<'a, TWIM>,
    reset_pin: Output<'a>,
    int_channel: gpiote::InputChannel<'a>,
    rotation: TouchRotation,
    width: u16,
    height: u16,
    buffer: [u8; 7],
    last_point: RawTouchPoint,
}

impl<'a, TWIM> Cst816s<'a, TWIM>
where
    TWIM: twim::Instance,
{
    pub fn new(
        slave_address: u8,
        twim: Twim<'a, TWIM>,
        reset_pin: Output<'a>,
        int_channel: gpiote::InputChannel<'a>,
        rotation: TouchRotation,
        width: u16,
        height: u16,
    ) -> Self {
        Cst816s {
            slave_address,
            twim,
            reset_pin,
            int_channel,
            rotation,
            width,
            height,
            buffer: [0; 7],
            last_point: RawTouchPoint::released(),
        }
    }

    pub fn init<T: DelayNs>(&mut self, delay: &mut T) -> Result<(), twim::Error> {
        self.reset_pin.set_high();
        delay.delay_ms(50);
        self.reset_pin.set_low();
        delay.delay_ms(5);
        self.reset_pin.set_high();
        delay.delay_ms(50);

        let _ = self.read_register(Register::WakeUp0)?;
        delay.delay_ms(5);
        let _ = self.read_register(Register::WakeUp1)?;
        delay.delay_ms(5);

        // [2] EnConLR - Continuous operation can slide around
        // [1] EnConUD - Slide up and down to enable continuous operation
        // [0] EnDClick - Enable Double-click action
        self.write_register(Register::Motion, 0b00000101)?;

        // [6] EnTouch - When a touch is detected, a periodic pulsed Low.
        // [5] EnChange - Upon detecting a touch state changes, pulsed Low.
        // [4] EnMotion - When the detected gesture is pulsed Low.
        self.write_register(Register::IrqCtl, 0b01110000)?;

        Ok(())
    }

    /// Wait for the interrupt line, then fetch the sample it announced
    pub async fn wait_event(&mut self) -> Result<RawTouchPoint, twim::Error> {
        self.int_channel.wait().await;
        self.update()?;
        Ok(self.last_point)
    }

    fn read_sample(&mut self) -> Result<Sample, twim::Error> {
        let addr = [0];
        self.twim.blocking_write_read_timeout(
            self.slave_address,
            &addr,
            &mut self.buffer,
            DEFAULT_READ_TIMEOUT,
        )?;
        Ok(Sample::from_le_bytes(&self.buffer))
    }

    /// Map controller coordinates onto the display's orientation
    fn rotate(&self, x: u16, y: u16) -> (i16, i16) {
        let max_x = self.width.saturating_sub(1);
        let max_y = self.height.saturating_sub(1);
        let x = x.min(max_x);
        let y = y.min(max_y);
        let (x, y) = match self.rotation {
            TouchRotation::Rotate0 => (x, y),
            TouchRotation::Rotate90 => (max_y - y, x),
            TouchRotation::Rotate180 => (max_x - x, max_y - y),
            TouchRotation::Rotate270 => (y, max_x - x),
        };
        (x as i16, y as i16)
    }

    fn read_register(&mut self, register: Register) -> Result<u8, twim::Error> {
        let tx = [register.addr()];
        let mut rx = [0_u8; 1];
        self.twim.blocking_write_read_timeout(
            self.slave_address,
            &tx,
            &mut rx,
            DEFAULT_READ_TIMEOUT,
        )?;
        Ok(rx[0])
    }

    fn write_register(&mut self, register: Register, value: u8) -> Result<(), twim::Error> {
        let tx = [register.addr(), value];
        self.twim
            .blocking_write_timeout(self.slave_address, &tx, DEFAULT_READ_TIMEOUT)?;
        Ok(())
    }
}

impl<TWIM> RawTouch for Cst816s<'_, TWIM>
where
    TWIM: twim::Instance,
{
    type Error = twim::Error;

    fn update(&mut self) -> Result<(), Self::Error> {
        let sample = self.read_sample()?;
        defmt::trace!("CST816S sample {}", sample);
        self.last_point = if sample.is_touching {
            let (x, y) = self.rotate(sample.x, sample.y);
            RawTouchPoint::new(SINGLE_TOUCH_ID, x, y)
        } else {
            RawTouchPoint::released()
        };
        Ok(())
    }

    fn touch_point_raw(&self) -> RawTouchPoint {
        self.last_point
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
#[repr(u8)]
enum Register {
    WakeUp0 = 0x15,
    WakeUp1 = 0xA7,
    Motion = 0xEC,
    IrqCtl = 0xFA,
}

impl Register {
    fn addr(self) -> u8 {
        self as u8
    }
}
