//! Driving simulation modules

pub mod controller;
pub mod physics;
pub mod snapshot;
pub mod state;

pub use controller::{SimulationController, SimulationSettings, TickerHandle};
pub use snapshot::DashboardSnapshot;
pub use state::SimulationState;

/// Simulation lifecycle errors
#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("Simulation ticker is already running")]
    AlreadyRunning,
}
