//! Glue between a handheld's panel/touch drivers and the Slint software renderer.
//!
//! - [`board`]: the raw primitives a board has to provide
//! - [`display_bridge`]: turns rendered lines into panel window writes
//! - [`input_bridge`]: turns raw touch samples into pointer events
//! - `gc9a01_panel`: the Board Interface for GC9A01 panels (feature `gc9a01`)
//! - [`smoke_test`]: a fixed colour/text sequence to check the panel before the UI starts

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod board;
pub mod config;
pub mod display_bridge;
pub mod error;
#[cfg(feature = "gc9a01")]
pub mod gc9a01_panel;
pub mod input_bridge;
pub mod smoke_test;

pub use board::{RawPanel, RawTouch, RawTouchPoint, NO_TOUCH_ID};
pub use config::BoardConfig;
pub use display_bridge::{DisplayBridge, FlushArea, FrameStats, LineSink};
pub use error::{BridgeError, ConfigError};
pub use input_bridge::{InputBridge, PointerReading, PointerState};
#[cfg(feature = "gc9a01")]
pub use gc9a01_panel::Gc9a01Panel;
