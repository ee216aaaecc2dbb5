//! Fixed colour and text sequence drawn straight through the board primitives.
//!
//! Runs before the UI toolkit takes over the panel, to tell a wiring problem apart
//! from a UI problem.

use embedded_graphics::mono_font::{ascii::FONT_6X10, MonoTextStyle};
use embedded_graphics::pixelcolor::raw::{RawData, RawU16};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;
use embedded_graphics::text::{Baseline, Text};
use embedded_hal::delay::DelayNs;
use slint::platform::software_renderer::Rgb565Pixel;

use crate::board::RawPanel;
use crate::display_bridge::{in_transaction, FlushArea};

pub const BROWN: Rgb565 = Rgb565::new(0x13, 0x13, 0x00);
pub const DARK_GREEN: Rgb565 = Rgb565::new(0x00, 0x1F, 0x00);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SmokeStep {
    Fill {
        color: Rgb565,
        hold_ms: u32,
    },
    Text {
        text: &'static str,
        at: Point,
        hold_ms: u32,
    },
}

pub const SMOKE_TEST_STEPS: &[SmokeStep] = &[
    SmokeStep::Fill { color: Rgb565::BLACK, hold_ms: 500 },
    SmokeStep::Fill { color: Rgb565::BLUE, hold_ms: 500 },
    SmokeStep::Fill { color: BROWN, hold_ms: 500 },
    SmokeStep::Fill { color: DARK_GREEN, hold_ms: 500 },
    SmokeStep::Fill { color: Rgb565::WHITE, hold_ms: 500 },
    SmokeStep::Fill { color: Rgb565::BLACK, hold_ms: 0 },
    SmokeStep::Text {
        text: "Testing board basic functions",
        at: Point::new(0, 120),
        hold_ms: 2000,
    },
    SmokeStep::Fill { color: Rgb565::BLACK, hold_ms: 1000 },
    SmokeStep::Text {
        text: "Board working",
        at: Point::new(40, 120),
        hold_ms: 0,
    },
    SmokeStep::Text {
        text: "Loading SETUP",
        at: Point::new(40, 160),
        hold_ms: 3000,
    },
];

/// `embedded-graphics` draw target writing through [`RawPanel`] window transactions
pub struct PanelCanvas<'a, P: RawPanel> {
    panel: &'a mut P,
    swap_bytes: bool,
}

impl<'a, P: RawPanel> PanelCanvas<'a, P> {
    pub fn new(panel: &'a mut P, swap_bytes: bool) -> Self {
        Self { panel, swap_bytes }
    }
}

const CHUNK: usize = 64;

fn to_pixel(color: Rgb565) -> Rgb565Pixel {
    Rgb565Pixel(RawU16::from(color).into_inner())
}

impl<P: RawPanel> OriginDimensions for PanelCanvas<'_, P> {
    fn size(&self) -> Size {
        let (width, height) = self.panel.size();
        Size::new(width as u32, height as u32)
    }
}

impl<P: RawPanel> DrawTarget for PanelCanvas<'_, P> {
    type Color = Rgb565;
    type Error = P::Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let bounds = self.bounding_box();
        for Pixel(point, color) in pixels {
            if !bounds.contains(point) {
                continue;
            }
            let area = FlushArea::from_origin(point.x as u16, point.y as u16, 1, 1);
            crate::display_bridge::flush_area(
                &mut *self.panel,
                area,
                &[to_pixel(color)],
                self.swap_bytes,
            )?;
        }
        Ok(())
    }

    fn fill_solid(&mut self, area: &Rectangle, color: Self::Color) -> Result<(), Self::Error> {
        let area = area.intersection(&self.bounding_box());
        let Some(bottom_right) = area.bottom_right() else {
            return Ok(());
        };

        let window = FlushArea::new(
            area.top_left.x as u16,
            area.top_left.y as u16,
            bottom_right.x as u16,
            bottom_right.y as u16,
        );
        let chunk = [to_pixel(color); CHUNK];
        let mut remaining = window.pixel_count() as usize;
        let swap_bytes = self.swap_bytes;

        in_transaction(&mut *self.panel, |panel| {
            panel.set_addr_window(window)?;
            while remaining > 0 {
                let n = remaining.min(CHUNK);
                panel.push_colors(&chunk[..n], swap_bytes)?;
                remaining -= n;
            }
            Ok(())
        })
    }

    fn clear(&mut self, color: Self::Color) -> Result<(), Self::Error> {
        self.fill_solid(&self.bounding_box(), color)
    }
}

/// Play `steps` on the panel, holding each one for its configured time
pub fn run<P: RawPanel, D: DelayNs>(
    canvas: &mut PanelCanvas<'_, P>,
    delay: &mut D,
    steps: &[SmokeStep],
) -> Result<(), P::Error> {
    let style = MonoTextStyle::new(&FONT_6X10, Rgb565::WHITE);
    info!("Running panel smoke test ({} steps)", steps.len());

    for step in steps {
        let hold_ms = match *step {
            SmokeStep::Fill { color, hold_ms } => {
                canvas.clear(color)?;
                hold_ms
            }
            SmokeStep::Text { text, at, hold_ms } => {
                Text::with_baseline(text, at, style, Baseline::Top).draw(canvas)?;
                hold_ms
            }
        };
        if hold_ms > 0 {
            delay.delay_ms(hold_ms);
        }
    }

    info!("Panel smoke test done");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const W: u16 = 240;
    const H: u16 = 240;

    struct FramebufferPanel {
        pixels: Vec<u16>,
        window: Option<FlushArea>,
        cursor: usize,
        transactions: u32,
    }

    impl FramebufferPanel {
        fn new() -> Self {
            Self {
                pixels: vec![0xAAAA; W as usize * H as usize],
                window: None,
                cursor: 0,
                transactions: 0,
            }
        }

        fn at(&self, x: u16, y: u16) -> u16 {
            self.pixels[y as usize * W as usize + x as usize]
        }
    }

    impl RawPanel for FramebufferPanel {
        type Error = core::convert::Infallible;

        fn start_write(&mut self) -> Result<(), Self::Error> {
            self.transactions += 1;
            Ok(())
        }

        fn set_addr_window(&mut self, area: FlushArea) -> Result<(), Self::Error> {
            assert!(area.x2 < W && area.y2 < H, "window {:?} off panel", area);
            self.window = Some(area);
            self.cursor = 0;
            Ok(())
        }

        fn push_colors(
            &mut self,
            pixels: &[Rgb565Pixel],
            _swap_bytes: bool,
        ) -> Result<(), Self::Error> {
            let area = self.window.expect("push without window");
            for pixel in pixels {
                let x = area.x1 as usize + self.cursor % area.width() as usize;
                let y = area.y1 as usize + self.cursor / area.width() as usize;
                assert!(y <= area.y2 as usize, "pushed past the window");
                self.pixels[y * W as usize + x] = pixel.0;
                self.cursor += 1;
            }
            Ok(())
        }

        fn end_write(&mut self) -> Result<(), Self::Error> {
            self.window = None;
            Ok(())
        }

        fn size(&self) -> (u16, u16) {
            (W, H)
        }
    }

    #[derive(Default)]
    struct RecordingDelay {
        total_ms: u64,
    }

    impl DelayNs for RecordingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ms += ns as u64 / 1_000_000;
        }

        fn delay_ms(&mut self, ms: u32) {
            self.total_ms += ms as u64;
        }
    }

    #[test]
    fn clear_fills_the_whole_panel() {
        let mut panel = FramebufferPanel::new();
        PanelCanvas::new(&mut panel, false)
            .clear(Rgb565::BLUE)
            .unwrap();
        assert!(panel.pixels.iter().all(|&p| p == 0x001F));
        assert_eq!(panel.transactions, 1);
    }

    #[test]
    fn fill_is_clipped_to_the_panel() {
        let mut panel = FramebufferPanel::new();
        let rect = Rectangle::new(Point::new(230, -5), Size::new(20, 10));
        PanelCanvas::new(&mut panel, false)
            .fill_solid(&rect, Rgb565::WHITE)
            .unwrap();

        assert_eq!(panel.at(230, 0), 0xFFFF);
        assert_eq!(panel.at(239, 4), 0xFFFF);
        assert_eq!(panel.at(239, 5), 0xAAAA);
        assert_eq!(panel.at(229, 0), 0xAAAA);
    }

    #[test]
    fn fully_offscreen_fill_writes_nothing() {
        let mut panel = FramebufferPanel::new();
        let rect = Rectangle::new(Point::new(300, 300), Size::new(5, 5));
        PanelCanvas::new(&mut panel, false)
            .fill_solid(&rect, Rgb565::WHITE)
            .unwrap();
        assert_eq!(panel.transactions, 0);
    }

    /// Rejects every push and tracks how many transactions are left open
    #[derive(Default)]
    struct BrokenBusPanel {
        open: i32,
    }

    impl RawPanel for BrokenBusPanel {
        type Error = ();

        fn start_write(&mut self) -> Result<(), Self::Error> {
            self.open += 1;
            Ok(())
        }

        fn set_addr_window(&mut self, _area: FlushArea) -> Result<(), Self::Error> {
            Ok(())
        }

        fn push_colors(&mut self, _pixels: &[Rgb565Pixel], _swap: bool) -> Result<(), Self::Error> {
            Err(())
        }

        fn end_write(&mut self) -> Result<(), Self::Error> {
            self.open -= 1;
            Ok(())
        }

        fn size(&self) -> (u16, u16) {
            (W, H)
        }
    }

    #[test]
    fn failed_fill_closes_its_transaction() {
        let mut panel = BrokenBusPanel::default();
        assert_eq!(PanelCanvas::new(&mut panel, false).clear(Rgb565::RED), Err(()));
        assert_eq!(
            PanelCanvas::new(&mut panel, false)
                .draw_iter([Pixel(Point::new(3, 4), Rgb565::RED)]),
            Err(())
        );
        assert_eq!(panel.open, 0);
    }

    #[test]
    fn named_colors_match_panel_values() {
        assert_eq!(to_pixel(Rgb565::BLACK).0, 0x0000);
        assert_eq!(to_pixel(Rgb565::WHITE).0, 0xFFFF);
        assert_eq!(to_pixel(BROWN).0, 0x9A60);
        assert_eq!(to_pixel(DARK_GREEN).0, 0x03E0);
    }

    #[test]
    fn full_sequence_ends_on_loading_screen() {
        let mut panel = FramebufferPanel::new();
        let mut delay = RecordingDelay::default();
        run(
            &mut PanelCanvas::new(&mut panel, false),
            &mut delay,
            SMOKE_TEST_STEPS,
        )
        .unwrap();

        assert_eq!(delay.total_ms, 5 * 500 + 2000 + 1000 + 3000);
        // Background is black, the last two lines left some white glyph pixels behind
        assert_eq!(panel.at(0, 0), 0x0000);
        let white_in = |y0: u16| {
            (y0..y0 + 10).any(|y| (40..130).any(|x| panel.at(x, y) == 0xFFFF))
        };
        assert!(white_in(120));
        assert!(white_in(160));
        // The first message was cleared away
        assert!((0..40).all(|x| (120..130).all(|y| panel.at(x, y) == 0x0000)));
    }
}
