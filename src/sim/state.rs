//! Simulation state and the per-tick step

use std::sync::Arc;

use crate::catalog::VehicleProfile;
use crate::input::InputIntent;

use super::physics::{DrivePhysics, MIN_GEAR};

/// Dashboard state of the selected car (authoritative)
#[derive(Debug, Clone)]
pub struct SimulationState {
    /// km/h
    pub speed: f64,
    pub rpm: f64,
    /// Always derived from `speed`
    pub gear: u8,
    pub is_moving: bool,
    pub vehicle: Arc<VehicleProfile>,
}

impl SimulationState {
    /// Parked: zero speed and RPM, first gear
    pub fn new(vehicle: Arc<VehicleProfile>) -> Self {
        Self {
            speed: 0.0,
            rpm: 0.0,
            gear: MIN_GEAR,
            is_moving: false,
            vehicle,
        }
    }

    /// Advance one tick. Speed first, then the moving flag and gear from the
    /// new speed, then RPM against the moving flag from before the tick.
    pub fn step(&mut self, intent: InputIntent) {
        let was_moving = self.is_moving;

        self.speed = DrivePhysics::next_speed(self.speed, intent, &self.vehicle);

        if self.speed == 0.0 {
            self.is_moving = false;
            self.gear = MIN_GEAR;
        } else {
            self.is_moving = true;
            self.gear = DrivePhysics::gear_for_speed(self.speed);
        }

        self.rpm = DrivePhysics::next_rpm(self.rpm, intent, was_moving);
    }

    /// Swap the car. Speed and RPM carry over; the next step re-evaluates
    /// them against the new profile.
    pub fn select_vehicle(&mut self, vehicle: Arc<VehicleProfile>) {
        self.vehicle = vehicle;
    }

    /// Flag the car as moving ahead of any speed change
    pub fn engage(&mut self) {
        self.is_moving = true;
    }
}
