//! Input state tracking
//!
//! Pointer, touch and keyboard events from the host all collapse into one
//! [`InputIntent`]: two flags saying whether the accelerator and the brake are
//! held. Any release from any channel clears both flags.

pub mod keymap;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// On/off pedal a press event refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    Accelerate,
    Brake,
}

/// Raw host input, independent of how it reached us
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    PointerDown(Control),
    PointerUp,
    /// Pointer left a pressed control
    PointerLeave,
    TouchStart(Control),
    TouchEnd,
    KeyDown(String),
    KeyUp(String),
}

/// Pedal intents read by the tick engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputIntent {
    pub is_accelerating: bool,
    pub is_braking: bool,
}

impl InputIntent {
    /// Neither pedal held
    pub fn is_idle(&self) -> bool {
        !self.is_accelerating && !self.is_braking
    }
}

/// What the caller has to do after an event was applied
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputOutcome {
    /// The intent flags changed
    pub changed: bool,
    /// The vehicle should be flagged as moving right away
    pub engage_motion: bool,
    /// The host must cancel the key's default action
    pub suppress_default: bool,
}

/// Press/release state machine producing an [`InputIntent`]
#[derive(Debug, Default)]
pub struct InputTracker {
    intent: InputIntent,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intent(&self) -> InputIntent {
        self.intent
    }

    /// Returns true if the accelerator was not already held. The caller marks
    /// the vehicle as moving in that case.
    pub fn accelerate_press(&mut self) -> bool {
        if self.intent.is_accelerating {
            return false;
        }
        self.intent.is_accelerating = true;
        true
    }

    /// Returns true if the brake was not already held
    pub fn brake_press(&mut self) -> bool {
        if self.intent.is_braking {
            return false;
        }
        self.intent.is_braking = true;
        true
    }

    /// Clears both pedals, whichever control was let go
    pub fn release(&mut self) -> bool {
        let changed = !self.intent.is_idle();
        self.intent = InputIntent::default();
        changed
    }

    fn press(&mut self, control: Control) -> InputOutcome {
        match control {
            Control::Accelerate => {
                let changed = self.accelerate_press();
                InputOutcome {
                    changed,
                    engage_motion: changed,
                    suppress_default: false,
                }
            }
            Control::Brake => InputOutcome {
                changed: self.brake_press(),
                ..Default::default()
            },
        }
    }

    fn released(&mut self) -> InputOutcome {
        InputOutcome {
            changed: self.release(),
            ..Default::default()
        }
    }

    /// Apply one host event
    pub fn apply(&mut self, event: &InputEvent) -> InputOutcome {
        let outcome = match event {
            InputEvent::PointerDown(control) | InputEvent::TouchStart(control) => {
                self.press(*control)
            }
            InputEvent::PointerUp | InputEvent::PointerLeave | InputEvent::TouchEnd => {
                self.released()
            }
            InputEvent::KeyDown(key) => match keymap::control_for_key(key) {
                Some(control) => InputOutcome {
                    suppress_default: true,
                    ..self.press(control)
                },
                None => InputOutcome::default(),
            },
            InputEvent::KeyUp(key) => {
                if keymap::is_bound(key) {
                    InputOutcome {
                        suppress_default: true,
                        ..self.released()
                    }
                } else {
                    InputOutcome::default()
                }
            }
        };

        if outcome.changed {
            debug!(
                event = ?event,
                accelerating = self.intent.is_accelerating,
                braking = self.intent.is_braking,
                "Input intent changed"
            );
        }

        outcome
    }
}
