//! Vehicle catalog - the fixed, ordered set of selectable cars

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

/// Upper bound for acceleration and handling ratings
pub const MAX_RATING: f64 = 10.0;

/// Immutable description of a selectable vehicle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleProfile {
    pub id: u32,
    pub display_name: String,
    pub brand_name: String,
    /// Image URL or asset path, only used by the renderer
    pub image_ref: String,
    /// Top speed in km/h
    pub max_speed: f64,
    /// 0-10 scale
    pub acceleration_rating: f64,
    /// 0-10 scale
    pub handling_rating: f64,
    pub power_label: String,
}

/// Catalog load and lookup errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read catalog file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Catalog contains no vehicles")]
    Empty,

    #[error("Duplicate vehicle id {0}")]
    DuplicateId(u32),

    #[error("Vehicle {id} has invalid max speed {max_speed}")]
    InvalidMaxSpeed { id: u32, max_speed: f64 },

    #[error("Vehicle {id} has {field} {value} outside 0..=10")]
    RatingOutOfRange {
        id: u32,
        field: &'static str,
        value: f64,
    },

    #[error("Unknown vehicle id {0}")]
    UnknownVehicle(u32),
}

/// Validated, ordered vehicle catalog. Never empty, never mutated after load.
#[derive(Debug, Clone)]
pub struct Catalog {
    vehicles: Vec<Arc<VehicleProfile>>,
}

impl Catalog {
    /// Build a catalog from profiles, rejecting misconfigured entries
    pub fn new(profiles: Vec<VehicleProfile>) -> Result<Self, CatalogError> {
        if profiles.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut seen = Vec::with_capacity(profiles.len());
        for profile in &profiles {
            if seen.contains(&profile.id) {
                return Err(CatalogError::DuplicateId(profile.id));
            }
            seen.push(profile.id);
            validate_profile(profile)?;
        }

        Ok(Self {
            vehicles: profiles.into_iter().map(Arc::new).collect(),
        })
    }

    /// The compiled-in garage
    pub fn builtin() -> Self {
        Self {
            vehicles: builtin_profiles().into_iter().map(Arc::new).collect(),
        }
    }

    /// Parse a JSON array of profiles
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let profiles: Vec<VehicleProfile> = serde_json::from_str(json)?;
        Self::new(profiles)
    }

    /// Load a JSON catalog file
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::from_json_str(&json)?;
        info!(path = %path.display(), vehicles = catalog.len(), "Loaded vehicle catalog");
        Ok(catalog)
    }

    /// Default selection at startup
    pub fn first(&self) -> Arc<VehicleProfile> {
        // Non-empty is checked on construction
        self.vehicles[0].clone()
    }

    pub fn get(&self, id: u32) -> Result<Arc<VehicleProfile>, CatalogError> {
        self.vehicles
            .iter()
            .find(|v| v.id == id)
            .cloned()
            .ok_or(CatalogError::UnknownVehicle(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<VehicleProfile>> {
        self.vehicles.iter()
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }
}

fn validate_profile(profile: &VehicleProfile) -> Result<(), CatalogError> {
    if !profile.max_speed.is_finite() || profile.max_speed <= 0.0 {
        return Err(CatalogError::InvalidMaxSpeed {
            id: profile.id,
            max_speed: profile.max_speed,
        });
    }

    for (field, value) in [
        ("acceleration rating", profile.acceleration_rating),
        ("handling rating", profile.handling_rating),
    ] {
        if !(0.0..=MAX_RATING).contains(&value) {
            return Err(CatalogError::RatingOutOfRange {
                id: profile.id,
                field,
                value,
            });
        }
    }

    Ok(())
}

fn builtin_profiles() -> Vec<VehicleProfile> {
    vec![
        VehicleProfile {
            id: 1,
            display_name: "Aventador SVJ".to_string(),
            brand_name: "Lamborghini".to_string(),
            image_ref: "https://images.unsplash.com/photo-1544636331-e26879cd4d9b?w=800&q=95"
                .to_string(),
            max_speed: 350.0,
            acceleration_rating: 9.8,
            handling_rating: 9.5,
            power_label: "770 HP".to_string(),
        },
        VehicleProfile {
            id: 2,
            display_name: "911 GT3 RS".to_string(),
            brand_name: "Porsche".to_string(),
            image_ref: "https://images.unsplash.com/photo-1503376780353-7e6692767b70?w=800&q=95"
                .to_string(),
            max_speed: 320.0,
            acceleration_rating: 9.2,
            handling_rating: 10.0,
            power_label: "520 HP".to_string(),
        },
        VehicleProfile {
            id: 3,
            display_name: "SF90 Stradale".to_string(),
            brand_name: "Ferrari".to_string(),
            image_ref: "https://images.unsplash.com/photo-1583121274602-3e2820c69888?w=800&q=95"
                .to_string(),
            max_speed: 340.0,
            acceleration_rating: 10.0,
            handling_rating: 9.3,
            power_label: "1000 HP".to_string(),
        },
    ]
}
