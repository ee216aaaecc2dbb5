//! Compile-time description of the board the bridges run on

use embassy_time::Duration;

use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayConfig {
    pub width: u16,
    pub height: u16,
    /// Swap the two bytes of every RGB565 pixel before handing it to the panel
    pub swap_bytes: bool,
    /// The partial draw buffer holds `width * height / draw_buffer_divisor` pixels
    pub draw_buffer_divisor: usize,
}

impl DisplayConfig {
    /// Zero for a zero divisor, which [`BoardConfig::validate`] rejects
    pub const fn draw_buffer_len(&self) -> usize {
        match (self.width as usize * self.height as usize).checked_div(self.draw_buffer_divisor) {
            Some(len) => len,
            None => 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TouchConfig {
    /// How long a press may go without a fresh sample before the controller is re-polled
    pub missed_release_timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SmokeTestConfig {
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BoardConfig {
    pub display: DisplayConfig,
    pub touch: TouchConfig,
    pub smoke_test: SmokeTestConfig,
}

impl BoardConfig {
    pub const fn new(width: u16, height: u16) -> Self {
        Self {
            display: DisplayConfig {
                width,
                height,
                swap_bytes: false,
                draw_buffer_divisor: 10,
            },
            touch: TouchConfig {
                missed_release_timeout: Duration::from_millis(100),
            },
            smoke_test: SmokeTestConfig { enabled: false },
        }
    }

    pub const fn with_swap_bytes(mut self, swap_bytes: bool) -> Self {
        self.display.swap_bytes = swap_bytes;
        self
    }

    pub const fn with_smoke_test(mut self, enabled: bool) -> Self {
        self.smoke_test.enabled = enabled;
        self
    }

    pub const fn with_draw_buffer_divisor(mut self, divisor: usize) -> Self {
        self.display.draw_buffer_divisor = divisor;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let display = &self.display;
        if display.width == 0 || display.height == 0 {
            return Err(ConfigError::ZeroDimension);
        }
        if display.draw_buffer_divisor == 0 {
            return Err(ConfigError::ZeroBufferDivisor);
        }
        let buffer_len = display.draw_buffer_len();
        if buffer_len < display.width as usize {
            return Err(ConfigError::BufferSmallerThanLine {
                buffer_len,
                width: display.width as usize,
            });
        }
        Ok(())
    }
}
