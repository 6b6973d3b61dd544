//! Read-only dashboard snapshots for the renderer

use serde::{Deserialize, Serialize};

use super::physics::MAX_RPM;
use super::state::SimulationState;

/// Copy of the dashboard after a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub tick: u64,
    pub speed: f64,
    pub rpm: f64,
    pub gear: u8,
    pub is_moving: bool,
    pub vehicle_id: u32,
    /// Speedometer fill, speed over the selected car's top speed
    pub speed_ratio: f64,
    /// Tachometer fill
    pub rpm_ratio: f64,
}

impl DashboardSnapshot {
    pub fn capture(tick: u64, state: &SimulationState) -> Self {
        Self {
            tick,
            speed: state.speed,
            rpm: state.rpm,
            gear: state.gear,
            is_moving: state.is_moving,
            vehicle_id: state.vehicle.id,
            speed_ratio: (state.speed / state.vehicle.max_speed).clamp(0.0, 1.0),
            rpm_ratio: (state.rpm / MAX_RPM).clamp(0.0, 1.0),
        }
    }

    /// Speed as the gauge prints it
    pub fn display_speed(&self) -> i64 {
        self.speed.round() as i64
    }

    /// RPM as the gauge prints it
    pub fn display_rpm(&self) -> i64 {
        self.rpm.round() as i64
    }
}

/// Decides which ticks publish a snapshot
pub struct SnapshotBuilder {
    /// Ticks since the last published snapshot
    ticks_since_snapshot: u32,
    /// Publish every N ticks
    snapshot_interval: u32,
}

impl SnapshotBuilder {
    pub fn new(snapshot_interval: u32) -> Self {
        Self {
            ticks_since_snapshot: 0,
            snapshot_interval: snapshot_interval.max(1),
        }
    }

    /// Check if it's time to send a snapshot
    pub fn should_send(&mut self) -> bool {
        self.ticks_since_snapshot += 1;
        if self.ticks_since_snapshot >= self.snapshot_interval {
            self.ticks_since_snapshot = 0;
            true
        } else {
            false
        }
    }

    /// Publish on the next tick regardless of cadence (vehicle switch etc.)
    pub fn force_next(&mut self) {
        self.ticks_since_snapshot = self.snapshot_interval;
    }
}
