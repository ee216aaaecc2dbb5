use core::fmt;

/// Errors raised while pushing a frame to the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BridgeError<E> {
    /// The board rejected a write
    Panel(E),
    /// The renderer handed out a line longer than the draw buffer
    LineTooWide { width: usize, capacity: usize },
}

impl<E: fmt::Debug> fmt::Display for BridgeError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BridgeError::Panel(e) => write!(f, "panel write failed: {:?}", e),
            BridgeError::LineTooWide { width, capacity } => write!(
                f,
                "line of {} pixels does not fit a draw buffer of {}",
                width, capacity
            ),
        }
    }
}

/// Board configuration rejected by [`crate::config::BoardConfig::validate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    ZeroDimension,
    ZeroBufferDivisor,
    /// The partial draw buffer would be shorter than one display line
    BufferSmallerThanLine { buffer_len: usize, width: usize },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ZeroDimension => write!(f, "display width and height must be non-zero"),
            ConfigError::ZeroBufferDivisor => write!(f, "draw buffer divisor must be non-zero"),
            ConfigError::BufferSmallerThanLine { buffer_len, width } => write!(
                f,
                "draw buffer of {} pixels cannot hold a {} pixel line",
                buffer_len, width
            ),
        }
    }
}
