//! nPM1300 PMIC: powers the display rail before anything talks to the panel

use defmt::*;
use embassy_nrf::twim::{self, Twim};
use embassy_time::{Duration, Timer};

/// nPM1300
pub const NPM1300_ADDRESS: u8 = 0x6B;
pub const NPM1300_DEFAULT_TIMEOUT: Duration = Duration::from_millis(10);

const ERROR_REGISTER: u16 = 0xE0_00;
const LDSW1_VOUTSEL: u16 = 0x08_0C;
const LDSW1_LDOSEL: u16 = 0x08_08;
const TASK_LDSW1_SET: u16 = 0x08_00;
const LDSW_STATUS: u16 = 0x08_04;

/// V_LDO1 = 3V3
const LDO_3V3: u8 = 23;
const LDO1_ON_MASK: u8 = 0b1_0010;

/// Switch LDO1 (VDD-Display) on and wait until the PMIC reports it up.
/// A board without the PMIC is not an error, the rail is then assumed to be always on.
pub async fn enable_display_rail<TWIM>(i2c: &mut Twim<'_, TWIM>)
where
    TWIM: twim::Instance,
{
    let mut read_buf = [0u8];
    if pm_read_reg(i2c, ERROR_REGISTER, &mut read_buf).is_err() {
        warn!("nPM module not found!");
        return;
    }

    info!("nPM found, turning LDO1 on...");
    pm_write_reg(i2c, LDSW1_VOUTSEL, LDO_3V3).ok();
    pm_write_reg(i2c, LDSW1_LDOSEL, 1).ok(); // LDSW1 as LDO1
    pm_write_reg(i2c, TASK_LDSW1_SET, 1).ok();

    loop {
        match pm_read_reg(i2c, LDSW_STATUS, &mut read_buf) {
            Ok(()) if read_buf[0] & LDO1_ON_MASK == LDO1_ON_MASK => {
                info!("LDO1 is on!");
                break;
            }
            Ok(()) => {
                debug!("Still waiting for LDO1 (status {})...", read_buf[0]);
                Timer::after_millis(2).await; // Backoff a bit
            }
            Err(e) => {
                error!("Communication error while setting LDO1 => {}", e);
                break;
            }
        }
    }
}

fn pm_read_reg<TWIM>(
    i2c: &mut Twim<'_, TWIM>,
    reg: u16,
    buf: &mut [u8; 1],
) -> Result<(), twim::Error>
where
    TWIM: twim::Instance,
{
    i2c.blocking_write_read_timeout(
        NPM1300_ADDRESS,
        &reg.to_be_bytes(),
        buf,
        NPM1300_DEFAULT_TIMEOUT,
    )
}

fn pm_write_reg<TWIM>(i2c: &mut Twim<'_, TWIM>, reg: u16, value: u8) -> Result<(), twim::Error>
where
    TWIM: twim::Instance,
{
    let reg = reg.to_be_bytes();
    let w = [reg[0], reg[1], value];

    i2c.blocking_write_timeout(NPM1300_ADDRESS, &w, NPM1300_DEFAULT_TIMEOUT)
}
