//! Drivetrain rules: speed, RPM and gear updates for a single tick

use crate::catalog::VehicleProfile;
use crate::input::InputIntent;

/// Speed gained per tick per acceleration rating point
pub const ACCELERATION_FACTOR: f64 = 0.5;
/// Speed lost per tick while braking
pub const BRAKE_DECEL: f64 = 8.0;
/// Speed lost per tick with no pedal held
pub const COAST_DECEL: f64 = 2.0;

pub const MAX_RPM: f64 = 8000.0;
pub const RPM_RISE: f64 = 200.0;
pub const RPM_BRAKE_DROP: f64 = 400.0;
pub const RPM_COAST_DROP: f64 = 150.0;
/// RPM floor while the brake is held
pub const BRAKE_RPM_FLOOR: f64 = 1000.0;
/// RPM floor while rolling with no pedal held
pub const IDLE_RPM_FLOOR: f64 = 1500.0;

pub const MIN_GEAR: u8 = 1;
pub const TOP_GEAR: u8 = 6;
/// Upper speed bound (inclusive) of gears 1 through 5; anything above is top gear
pub const GEAR_BANDS: [f64; 5] = [60.0, 120.0, 180.0, 240.0, 300.0];

/// Stateless drivetrain rules
pub struct DrivePhysics;

impl DrivePhysics {
    /// Next speed from the current one. Only the pedal branches clamp, so a
    /// speed above a newly selected car's top speed bleeds off over ticks.
    pub fn next_speed(speed: f64, intent: InputIntent, vehicle: &VehicleProfile) -> f64 {
        if intent.is_accelerating && speed < vehicle.max_speed {
            let gain = vehicle.acceleration_rating * ACCELERATION_FACTOR;
            (speed + gain).min(vehicle.max_speed)
        } else if intent.is_braking && speed > 0.0 {
            (speed - BRAKE_DECEL).max(0.0)
        } else if intent.is_idle() && speed > 0.0 {
            (speed - COAST_DECEL).max(0.0)
        } else {
            speed
        }
    }

    /// Next RPM. `was_moving` is the moving flag from before this tick.
    pub fn next_rpm(rpm: f64, intent: InputIntent, was_moving: bool) -> f64 {
        if intent.is_accelerating {
            (rpm + RPM_RISE).min(MAX_RPM)
        } else if intent.is_braking {
            (rpm - RPM_BRAKE_DROP).max(BRAKE_RPM_FLOOR)
        } else {
            let floor = if was_moving { IDLE_RPM_FLOOR } else { 0.0 };
            (rpm - RPM_COAST_DROP).max(floor)
        }
    }

    /// Gear for a speed. Vehicle independent.
    pub fn gear_for_speed(speed: f64) -> u8 {
        let mut gear = MIN_GEAR;
        for upper in GEAR_BANDS {
            if speed <= upper {
                return gear;
            }
            gear += 1;
        }
        TOP_GEAR
    }
}
