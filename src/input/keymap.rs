//! Keyboard binding for the two pedals

use super::Control;

/// Keys bound to the accelerator
pub const ACCELERATE_KEYS: [&str; 2] = ["ArrowUp", "w"];
/// Keys bound to the brake
pub const BRAKE_KEYS: [&str; 2] = ["ArrowDown", "s"];

/// Resolve a host key name to a pedal. Names are matched exactly as reported.
pub fn control_for_key(key: &str) -> Option<Control> {
    if ACCELERATE_KEYS.contains(&key) {
        Some(Control::Accelerate)
    } else if BRAKE_KEYS.contains(&key) {
        Some(Control::Brake)
    } else {
        None
    }
}

/// Whether the host must cancel the key's default action (page scrolling)
pub fn is_bound(key: &str) -> bool {
    control_for_key(key).is_some()
}
