//! Application state built once at startup

use std::sync::Arc;

use crate::catalog::{Catalog, CatalogError};
use crate::config::Config;
use crate::host::HostBridge;
use crate::sim::SimulationController;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub catalog: Arc<Catalog>,
    pub controller: SimulationController,
}

impl AppState {
    /// Load the catalog and build a parked simulation
    pub fn new(config: Config) -> Result<Self, CatalogError> {
        let config = Arc::new(config);

        // Initialize catalog
        let catalog = match &config.catalog_path {
            Some(path) => Catalog::load(path)?,
            None => Catalog::builtin(),
        };
        let catalog = Arc::new(catalog);

        // Initial selection
        let vehicle = match config.initial_vehicle_id {
            Some(id) => catalog.get(id)?,
            None => catalog.first(),
        };

        let controller =
            SimulationController::with_vehicle(catalog.clone(), vehicle, config.simulation_settings());

        Ok(Self {
            config,
            catalog,
            controller,
        })
    }

    pub fn host_bridge(&self) -> HostBridge {
        HostBridge::new(self.controller.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_by_default() {
        let app = AppState::new(Config::default()).unwrap();
        assert_eq!(app.catalog.len(), 3);
        assert_eq!(app.controller.selected_vehicle().id, 1);
    }

    #[test]
    fn honours_initial_vehicle() {
        let config = Config {
            initial_vehicle_id: Some(2),
            ..Config::default()
        };
        let app = AppState::new(config).unwrap();
        assert_eq!(app.controller.selected_vehicle().id, 2);
    }

    #[test]
    fn unknown_initial_vehicle_fails_startup() {
        let config = Config {
            initial_vehicle_id: Some(77),
            ..Config::default()
        };
        assert!(matches!(
            AppState::new(config),
            Err(CatalogError::UnknownVehicle(77))
        ));
    }

    #[test]
    fn invalid_catalog_file_fails_startup() {
        let path = std::env::temp_dir().join(format!("garage-bad-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"[{"id":1,"displayName":"Brick","brandName":"Acme","imageRef":"",
                "maxSpeed":0,"accelerationRating":1,"handlingRating":1,"powerLabel":"1 HP"}]"#,
        )
        .unwrap();

        let config = Config {
            catalog_path: Some(path.clone()),
            ..Config::default()
        };
        let result = AppState::new(config);
        let _ = std::fs::remove_file(&path);

        assert!(matches!(result, Err(CatalogError::InvalidMaxSpeed { id: 1, .. })));
    }
}
