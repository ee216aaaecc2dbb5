mod cst816s;
pub(crate) mod power;

use embassy_nrf::{gpio::AnyPin, gpiote, peripherals, PeripheralRef};
use gc9a01::prelude::DisplayRotation;
use rs_handheld_bridge::BoardConfig;

pub(crate) use cst816s::{Cst816s, TouchRotation};

pub const DISPLAY_WIDTH: u16 = 240;
pub const DISPLAY_HEIGHT: u16 = 240;
pub const DISPLAY_ROTATION: DisplayRotation = DisplayRotation::Rotate180;

/// CST816S I2C address
pub const CST816S_ADDRESS: u8 = 0x15;

pub const BACKLIGHT_PCT: u8 = 80;

// The display interface sends big-endian words already, no swap needed
pub const BOARD_CONFIG: BoardConfig = BoardConfig::new(DISPLAY_WIDTH, DISPLAY_HEIGHT)
    .with_swap_bytes(false)
    .with_smoke_test(cfg!(feature = "smoke-test"));

pub(crate) struct BacklightControl {
    pub pin: AnyPin,
    pub pwm: PeripheralRef<'static, peripherals::PWM0>,
}

pub(crate) struct DisplayHardwareInterface<'a> {
    pub reset: AnyPin,
    pub blk: BacklightControl,
    pub cs: AnyPin,
    pub dc: AnyPin,
    pub mosi: AnyPin,
    pub clk: AnyPin,
    pub spi: PeripheralRef<'a, peripherals::SPIM4>,
}

pub(crate) struct TouchHardwareInterface<'a> {
    pub address: u8,
    pub level_shifter_enable: AnyPin,
    pub reset: AnyPin,
    pub scl: AnyPin,
    pub sda: AnyPin,
    pub int: gpiote::InputChannel<'a>,
    pub i2c: PeripheralRef<'a, peripherals::SERIAL2>,
}

/// The digitizer is mounted upside down relative to the panel's native orientation
impl From<DisplayRotation> for TouchRotation {
    fn from(value: DisplayRotation) -> Self {
        match value {
            DisplayRotation::Rotate0 => TouchRotation::Rotate180,
            DisplayRotation::Rotate90 => TouchRotation::Rotate270,
            DisplayRotation::Rotate180 => TouchRotation::Rotate0,
            DisplayRotation::Rotate270 => TouchRotation::Rotate90,
        }
    }
}
