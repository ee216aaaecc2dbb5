use defmt::{Format, Formatter};
use slint::platform::WindowEvent;

pub(super) struct PrintableWindowEvent<'a>(pub(super) &'a WindowEvent);

impl Format for PrintableWindowEvent<'_> {
    fn format(&self, fmt: Formatter) {
        match &self.0 {
            WindowEvent::PointerPressed { position, .. } => {
                defmt::write!(fmt, "PointerPressed x={}, y={}", position.x, position.y)
            }
            WindowEvent::PointerReleased { position, .. } => {
                defmt::write!(fmt, "PointerReleased x={}, y={}", position.x, position.y)
            }
            WindowEvent::PointerMoved { position, .. } => {
                defmt::write!(fmt, "PointerMoved x={}, y={}", position.x, position.y)
            }
            _ => defmt::write!(fmt, "non-pointer window event"),
        }
    }
}
