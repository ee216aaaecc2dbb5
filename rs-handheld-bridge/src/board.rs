//! The raw primitives a board exposes to the bridges.
//!
//! A board driver implements [`RawPanel`] for its display and [`RawTouch`] for its
//! touch digitizer. The bridges never talk to the hardware any other way.

use slint::platform::software_renderer::Rgb565Pixel;

use crate::display_bridge::FlushArea;

/// Touch identifier reported by the board when nothing touches the screen
pub const NO_TOUCH_ID: u32 = 0xFFFF_FFFF;

/// Framebuffer write primitives of a display panel.
///
/// Writes are bracketed by [`RawPanel::start_write`] and [`RawPanel::end_write`];
/// inside a transaction the panel receives an address window followed by exactly
/// as many pixels as the window covers.
pub trait RawPanel {
    type Error: core::fmt::Debug;

    fn start_write(&mut self) -> Result<(), Self::Error>;

    /// Set the panel's write window to `area`, corners inclusive
    fn set_addr_window(&mut self, area: FlushArea) -> Result<(), Self::Error>;

    /// Stream `pixels` into the current window, row-major
    fn push_colors(&mut self, pixels: &[Rgb565Pixel], swap_bytes: bool)
        -> Result<(), Self::Error>;

    fn end_write(&mut self) -> Result<(), Self::Error>;

    /// Panel resolution as (width, height)
    fn size(&self) -> (u16, u16);
}

/// Raw touch sample query of a touch digitizer
pub trait RawTouch {
    type Error: core::fmt::Debug;

    /// Fetch a fresh sample from the controller
    fn update(&mut self) -> Result<(), Self::Error>;

    /// Last sample fetched by [`RawTouch::update`]
    fn touch_point_raw(&self) -> RawTouchPoint;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawTouchPoint {
    pub id: u32,
    pub x: i16,
    pub y: i16,
}

impl RawTouchPoint {
    pub const fn new(id: u32, x: i16, y: i16) -> Self {
        Self { id, x, y }
    }

    pub const fn released() -> Self {
        Self {
            id: NO_TOUCH_ID,
            x: -1,
            y: -1,
        }
    }

    pub const fn is_touching(&self) -> bool {
        self.id != NO_TOUCH_ID
    }
}

impl Default for RawTouchPoint {
    fn default() -> Self {
        Self::released()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sentinel_means_no_contact() {
        assert!(!RawTouchPoint::released().is_touching());
        assert!(!RawTouchPoint::new(NO_TOUCH_ID, 10, 10).is_touching());
        assert!(RawTouchPoint::new(0, 0, 0).is_touching());
        assert_eq!(RawTouchPoint::default(), RawTouchPoint::released());
    }
}
