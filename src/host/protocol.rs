//! Host protocol message definitions
//! These are the line-delimited JSON types exchanged with the UI host

use serde::{Deserialize, Serialize};

use crate::catalog::VehicleProfile;
use crate::input::{Control, InputEvent};
use crate::sim::DashboardSnapshot;

/// Messages sent from the host UI to the simulator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    /// Mouse button pressed on a pedal control
    PointerDown { control: Control },
    PointerUp,
    /// Pointer left a pedal control
    PointerLeave,
    TouchStart { control: Control },
    TouchEnd,
    /// Key name as reported by the host, e.g. "ArrowUp" or "w"
    KeyDown { key: String },
    KeyUp { key: String },
    /// Pick a car from the catalog
    SelectVehicle { vehicle_id: u32 },
    /// Ask for the catalog to be sent again
    RequestCatalog,
}

impl HostEvent {
    /// Pedal input carried by this event, if any
    pub fn into_input(self) -> Option<InputEvent> {
        match self {
            Self::PointerDown { control } => Some(InputEvent::PointerDown(control)),
            Self::PointerUp => Some(InputEvent::PointerUp),
            Self::PointerLeave => Some(InputEvent::PointerLeave),
            Self::TouchStart { control } => Some(InputEvent::TouchStart(control)),
            Self::TouchEnd => Some(InputEvent::TouchEnd),
            Self::KeyDown { key } => Some(InputEvent::KeyDown(key)),
            Self::KeyUp { key } => Some(InputEvent::KeyUp(key)),
            Self::SelectVehicle { .. } | Self::RequestCatalog => None,
        }
    }
}

/// Messages sent from the simulator to the host renderer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DashboardMsg {
    /// Full catalog, sent on start and on request
    Catalog {
        vehicles: Vec<VehicleProfile>,
        selected_id: u32,
        server_time: u64,
    },

    /// Dashboard state after a tick
    Snapshot(DashboardSnapshot),

    /// A bound key was handled; the host cancels its default action
    KeyHandled { key: String, suppress_default: bool },

    /// Selection changed
    VehicleSelected { vehicle_id: u32 },

    /// Error message
    Error { code: String, message: String },
}

impl DashboardMsg {
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self::Error {
            code: code.to_string(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_host_events() {
        let event: HostEvent =
            serde_json::from_str(r#"{"type":"pointer_down","control":"accelerate"}"#).unwrap();
        assert_eq!(
            event,
            HostEvent::PointerDown {
                control: Control::Accelerate
            }
        );

        let event: HostEvent = serde_json::from_str(r#"{"type":"key_up","key":"s"}"#).unwrap();
        assert_eq!(event.into_input(), Some(InputEvent::KeyUp("s".to_string())));

        let event: HostEvent =
            serde_json::from_str(r#"{"type":"select_vehicle","vehicle_id":2}"#).unwrap();
        assert_eq!(event.into_input(), None);
    }

    #[test]
    fn rejects_unknown_control() {
        let result = serde_json::from_str::<HostEvent>(r#"{"type":"touch_start","control":"horn"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn snapshot_message_is_flat() {
        let msg = DashboardMsg::Snapshot(DashboardSnapshot {
            tick: 3,
            speed: 14.7,
            rpm: 600.0,
            gear: 1,
            is_moving: true,
            vehicle_id: 1,
            speed_ratio: 0.042,
            rpm_ratio: 0.075,
        });
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "snapshot");
        assert_eq!(value["tick"], 3);
        assert_eq!(value["gear"], 1);
        assert_eq!(value["is_moving"], true);
    }

    #[test]
    fn error_helper() {
        let value = serde_json::to_value(DashboardMsg::error("bad_event", "nope")).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["code"], "bad_event");
        assert_eq!(value["message"], "nope");
    }
}
