//! Garage Sim - car selection and dashboard driving simulator
//!
//! The core is a fixed-rate tick engine that turns two pedal intents into
//! speed, RPM and gear for the selected car, plus the input tracker that
//! folds pointer, touch and keyboard events into those intents. Rendering
//! lives in the host; [`host`] speaks to it over JSON lines.

pub mod app;
pub mod catalog;
pub mod config;
pub mod host;
pub mod input;
pub mod sim;
pub mod util;

pub use catalog::{Catalog, CatalogError, VehicleProfile};
pub use input::{Control, InputEvent, InputIntent, InputTracker};
pub use sim::{DashboardSnapshot, SimulationController, SimulationSettings, SimulationState};
