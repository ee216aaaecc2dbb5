//! This module is responsible for transferring touch samples to the UI framework
//!
//! The board reports one raw point per query, with [`NO_TOUCH_ID`](crate::board::NO_TOUCH_ID)
//! standing for "no finger". The bridge folds that into a pressed/released pointer and
//! only emits a Slint event when the pointer actually changes.

use embassy_time::{Duration, Instant};
use slint::platform::{PointerEventButton, WindowEvent};

use crate::board::{RawTouch, RawTouchPoint};
use crate::config::TouchConfig;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PointerState {
    Pressed,
    Released,
}

/// Two-state pointer sample. On release the point is the last one seen while pressed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PointerReading {
    pub state: PointerState,
    pub x: i16,
    pub y: i16,
}

pub struct InputBridge {
    last_point: (i16, i16),
    pressed: bool,
    last_sample_at: Option<Instant>,
    missed_release_timeout: Duration,
}

impl InputBridge {
    pub fn new(config: &TouchConfig) -> Self {
        Self {
            last_point: (0, 0),
            pressed: false,
            last_sample_at: None,
            missed_release_timeout: config.missed_release_timeout,
        }
    }

    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    /// Map a raw sample onto the pointer model, remembering the point while pressed
    pub fn read(&mut self, sample: RawTouchPoint) -> PointerReading {
        let state = if sample.is_touching() {
            self.last_point = (sample.x, sample.y);
            PointerState::Pressed
        } else {
            PointerState::Released
        };
        PointerReading {
            state,
            x: self.last_point.0,
            y: self.last_point.1,
        }
    }

    /// Feed a fresh sample; returns the event to dispatch to the window, if any
    pub fn handle_sample(
        &mut self,
        sample: RawTouchPoint,
        now: Instant,
        scale_factor: f32,
    ) -> Option<WindowEvent> {
        trace!("Touch sample {}", sample);
        let previous_point = self.last_point;
        let reading = self.read(sample);
        let position = slint::PhysicalPosition::new(reading.x as i32, reading.y as i32)
            .to_logical(scale_factor);

        match (self.pressed, reading.state) {
            (false, PointerState::Pressed) => {
                self.pressed = true;
                self.last_sample_at = Some(now);
                Some(WindowEvent::PointerPressed {
                    position,
                    button: PointerEventButton::Left,
                })
            }
            (true, PointerState::Pressed) => {
                self.last_sample_at = Some(now);
                // Analyze touch input only in case of a change
                if previous_point != self.last_point {
                    Some(WindowEvent::PointerMoved { position })
                } else {
                    None
                }
            }
            (true, PointerState::Released) => {
                self.pressed = false;
                self.last_sample_at = None;
                Some(WindowEvent::PointerReleased {
                    position,
                    button: PointerEventButton::Left,
                })
            }
            (false, PointerState::Released) => None,
        }
    }

    /// Re-poll the controller when a press has gone quiet for too long.
    ///
    /// Touch controllers signal changes through an interrupt line and, depending on
    /// the UI load, the edge announcing the release can get lost. A press that was
    /// never released leaves the UI stuck, so this must be called after every pass
    /// of the UI loop.
    pub fn check_missed_release<T: RawTouch>(
        &mut self,
        touch: &mut T,
        now: Instant,
        scale_factor: f32,
    ) -> Result<Option<WindowEvent>, T::Error> {
        let Some(last_sample_at) = self.last_sample_at else {
            return Ok(None);
        };
        let quiet_for = now
            .checked_duration_since(last_sample_at)
            .unwrap_or(Duration::from_secs(0));
        if quiet_for <= self.missed_release_timeout {
            return Ok(None);
        }

        touch.update()?;
        let event = self.handle_sample(touch.touch_point_raw(), now, scale_factor);
        match event {
            Some(WindowEvent::PointerReleased { .. }) => {
                warn!("It appears we did really miss the release event")
            }
            _ => debug!("No release was missed after all..."),
        }
        Ok(event)
    }
}
