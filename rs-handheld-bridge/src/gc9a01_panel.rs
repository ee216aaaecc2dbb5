//! [`RawPanel`] for GC9A01 round panels driven through `gc9a01-rs`

use display_interface::DisplayError;
use gc9a01::mode::BasicMode;
use gc9a01::prelude::{DisplayDefinition, WriteOnlyDataCommand};
use gc9a01::Gc9a01;
use slint::platform::software_renderer::Rgb565Pixel;

use crate::board::RawPanel;
use crate::display_bridge::FlushArea;

const CHUNK: usize = 240;

pub struct Gc9a01Panel<DI, D>
where
    DI: WriteOnlyDataCommand,
    D: DisplayDefinition,
{
    display: Gc9a01<DI, D, BasicMode>,
    scratch: [u16; CHUNK],
}

impl<DI, D> Gc9a01Panel<DI, D>
where
    DI: WriteOnlyDataCommand,
    D: DisplayDefinition,
{
    /// Wrap an already reset and initialized display
    pub fn new(display: Gc9a01<DI, D, BasicMode>) -> Self {
        Self {
            display,
            scratch: [0; CHUNK],
        }
    }
}

impl<DI, D> RawPanel for Gc9a01Panel<DI, D>
where
    DI: WriteOnlyDataCommand,
    D: DisplayDefinition,
{
    type Error = DisplayError;

    // Chip select is handled per SPI transfer by the bus device
    fn start_write(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_addr_window(&mut self, area: FlushArea) -> Result<(), Self::Error> {
        // CASET/RASET take inclusive end coordinates, then RAMWR opens the window
        self.display
            .set_draw_area((area.x1, area.y1), (area.x2, area.y2))?;
        self.display.set_write_mode()
    }

    /// Words go out big-endian, so `swap_bytes` stays off unless the wiring says otherwise
    fn push_colors(
        &mut self,
        pixels: &[Rgb565Pixel],
        swap_bytes: bool,
    ) -> Result<(), Self::Error> {
        for chunk in pixels.chunks(CHUNK) {
            let words = &mut self.scratch[..chunk.len()];
            for (word, pixel) in words.iter_mut().zip(chunk) {
                *word = if swap_bytes {
                    pixel.0.swap_bytes()
                } else {
                    pixel.0
                };
            }
            self.display.draw_buffer(words)?;
        }
        Ok(())
    }

    fn end_write(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn size(&self) -> (u16, u16) {
        self.display.dimensions()
    }
}
