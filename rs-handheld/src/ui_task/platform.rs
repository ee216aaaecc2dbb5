use alloc::rc::Rc;

use embassy_time::Instant;
use slint::platform::software_renderer::MinimalSoftwareWindow;
use slint::platform::{Platform, WindowAdapter};

pub(super) struct HandheldPlatform {
    pub(super) window: Rc<MinimalSoftwareWindow>,
}

impl Platform for HandheldPlatform {
    fn create_window_adapter(&self) -> Result<Rc<dyn WindowAdapter>, slint::PlatformError> {
        // Since on MCUs, there can be only one window, just return a clone of self.window.
        // We'll also use the same window in the event loop.
        Ok(self.window.clone())
    }

    fn duration_since_start(&self) -> core::time::Duration {
        Instant::now()
            .duration_since(Instant::from_micros(0))
            .into()
    }

    #[cfg(feature = "ui-log")]
    fn debug_log(&self, arguments: core::fmt::Arguments) {
        defmt::warn!("[slint] {}", defmt::Display2Format(&arguments));
    }
}
