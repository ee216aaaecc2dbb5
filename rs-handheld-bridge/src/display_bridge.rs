//! This module is responsible for transferring rendered pixels to the panel
//!
//! Slint's line renderer hands out one line at a time. Lines that continue the
//! rectangle currently being collected (same span, next row) are appended to the
//! partial draw buffer; everything else flushes the rectangle first. Each flush is
//! a single window write on the panel.

use core::ops::Range;

use slint::platform::software_renderer::{LineBufferProvider, Rgb565Pixel};

use crate::board::RawPanel;
use crate::error::BridgeError;

/// Redraw rectangle, both corners inclusive
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlushArea {
    pub x1: u16,
    pub y1: u16,
    pub x2: u16,
    pub y2: u16,
}

impl FlushArea {
    pub const fn new(x1: u16, y1: u16, x2: u16, y2: u16) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Area of `width` x `height` pixels starting at (`x`, `y`). Both sizes must be non-zero.
    pub const fn from_origin(x: u16, y: u16, width: u16, height: u16) -> Self {
        Self {
            x1: x,
            y1: y,
            x2: x + width - 1,
            y2: y + height - 1,
        }
    }

    pub const fn width(&self) -> u32 {
        (self.x2 - self.x1) as u32 + 1
    }

    pub const fn height(&self) -> u32 {
        (self.y2 - self.y1) as u32 + 1
    }

    pub const fn pixel_count(&self) -> u32 {
        self.width() * self.height()
    }
}

/// What a frame cost on the wire
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameStats {
    pub areas: u32,
    pub pixels: u32,
}

/// Write `pixels` into `area` as one panel transaction.
///
/// `pixels` must hold exactly `area.pixel_count()` entries. Once the transaction is
/// started it is always ended, and the first error is returned.
pub fn flush_area<P: RawPanel>(
    panel: &mut P,
    area: FlushArea,
    pixels: &[Rgb565Pixel],
    swap_bytes: bool,
) -> Result<(), P::Error> {
    debug_assert_eq!(pixels.len(), area.pixel_count() as usize);
    in_transaction(panel, |panel| {
        panel.set_addr_window(area)?;
        panel.push_colors(pixels, swap_bytes)
    })
}

/// Run `write` between `start_write` and `end_write`, closing the transaction even if `write` fails
pub(crate) fn in_transaction<P: RawPanel>(
    panel: &mut P,
    write: impl FnOnce(&mut P) -> Result<(), P::Error>,
) -> Result<(), P::Error> {
    panel.start_write()?;
    let written = write(panel);
    let ended = panel.end_write();
    written.and(ended)
}

pub struct DisplayBridge<'a, P: RawPanel> {
    panel: &'a mut P,
    buffer: &'a mut [Rgb565Pixel],
    swap_bytes: bool,
    pending: Option<FlushArea>,
    filled: usize,
    stats: FrameStats,
    error: Option<BridgeError<P::Error>>,
}

impl<'a, P: RawPanel> DisplayBridge<'a, P> {
    pub fn new(panel: &'a mut P, buffer: &'a mut [Rgb565Pixel], swap_bytes: bool) -> Self {
        Self {
            panel,
            buffer,
            swap_bytes,
            pending: None,
            filled: 0,
            stats: FrameStats::default(),
            error: None,
        }
    }

    /// Render `range` of `line` into the draw buffer, flushing the collected rectangle first if needed
    pub fn push_line(
        &mut self,
        line: usize,
        range: Range<usize>,
        render_fn: impl FnOnce(&mut [Rgb565Pixel]),
    ) {
        if self.error.is_some() || range.is_empty() {
            return;
        }

        let width = range.len();
        if width > self.buffer.len() {
            error!(
                "Line {} is {} pixels wide, buffer holds {}",
                line,
                width,
                self.buffer.len()
            );
            self.error = Some(BridgeError::LineTooWide {
                width,
                capacity: self.buffer.len(),
            });
            return;
        }

        let x1 = range.start as u16;
        let x2 = (range.end - 1) as u16;
        let y = line as u16;

        if let Some(pending) = self.pending {
            let continues = pending.x1 == x1 && pending.x2 == x2 && pending.y2 + 1 == y;
            if !continues || self.filled + width > self.buffer.len() {
                self.flush_pending();
                if self.error.is_some() {
                    return;
                }
            }
        }

        let start = self.filled;
        render_fn(&mut self.buffer[start..start + width]);
        self.filled += width;

        self.pending = Some(match self.pending {
            Some(pending) => FlushArea { y2: y, ..pending },
            None => FlushArea::new(x1, y, x2, y),
        });
    }

    /// Flush whatever is still buffered and report the frame
    pub fn finish(mut self) -> Result<FrameStats, BridgeError<P::Error>> {
        self.flush_pending();
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.stats),
        }
    }

    fn flush_pending(&mut self) {
        let Some(area) = self.pending.take() else {
            return;
        };
        let pixels = &self.buffer[..self.filled];
        self.filled = 0;

        match flush_area(&mut *self.panel, area, pixels, self.swap_bytes) {
            Ok(()) => self.flush_ready(area),
            Err(e) => {
                error!(
                    "Flush of {}x{} at ({}, {}) failed",
                    area.width(),
                    area.height(),
                    area.x1,
                    area.y1
                );
                self.error = Some(BridgeError::Panel(e));
            }
        }
    }

    fn flush_ready(&mut self, area: FlushArea) {
        trace!("Flushed {}x{} at ({}, {})", area.width(), area.height(), area.x1, area.y1);
        self.stats.areas += 1;
        self.stats.pixels += area.pixel_count();
    }
}

/// Handle passed to Slint's `render_by_line`; the bridge stays usable for [`DisplayBridge::finish`]
pub struct LineSink<'b, 'a, P: RawPanel> {
    bridge: &'b mut DisplayBridge<'a, P>,
}

impl<'a, P: RawPanel> DisplayBridge<'a, P> {
    pub fn lines(&mut self) -> LineSink<'_, 'a, P> {
        LineSink { bridge: self }
    }
}

impl<P: RawPanel> LineBufferProvider for LineSink<'_, '_, P> {
    type TargetPixel = Rgb565Pixel;

    fn process_line(
        &mut self,
        line: usize,
        range: Range<usize>,
        render_fn: impl FnOnce(&mut [Self::TargetPixel]),
    ) {
        self.bridge.push_line(line, range, render_fn);
    }
}
