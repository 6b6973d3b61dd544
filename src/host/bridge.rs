//! Host bridge: line-delimited JSON in, dashboard stream out

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::sim::SimulationController;
use crate::util::time::unix_millis;

use super::protocol::{DashboardMsg, HostEvent};

/// Connects a host UI stream to a simulation controller
pub struct HostBridge {
    controller: SimulationController,
}

impl HostBridge {
    pub fn new(controller: SimulationController) -> Self {
        Self { controller }
    }

    pub fn catalog_msg(&self) -> DashboardMsg {
        DashboardMsg::Catalog {
            vehicles: self
                .controller
                .catalog()
                .iter()
                .map(|v| v.as_ref().clone())
                .collect(),
            selected_id: self.controller.selected_vehicle().id,
            server_time: unix_millis(),
        }
    }

    /// Parse and apply one line from the host
    pub fn handle_line(&self, line: &str) -> Vec<DashboardMsg> {
        let line = line.trim();
        if line.is_empty() {
            return Vec::new();
        }

        match serde_json::from_str::<HostEvent>(line) {
            Ok(event) => self.handle_event(event),
            Err(e) => {
                warn!(session_id = %self.controller.session_id(), error = %e, "Failed to parse host event");
                vec![DashboardMsg::error("bad_event", e.to_string())]
            }
        }
    }

    /// Apply one host event and return the replies for the host
    pub fn handle_event(&self, event: HostEvent) -> Vec<DashboardMsg> {
        match event {
            HostEvent::SelectVehicle { vehicle_id } => {
                match self.controller.select_vehicle_by_id(vehicle_id) {
                    Ok(vehicle) => vec![DashboardMsg::VehicleSelected {
                        vehicle_id: vehicle.id,
                    }],
                    Err(e) => {
                        warn!(session_id = %self.controller.session_id(), vehicle_id, "Rejected vehicle selection");
                        vec![DashboardMsg::error("unknown_vehicle", e.to_string())]
                    }
                }
            }
            HostEvent::RequestCatalog => vec![self.catalog_msg()],
            other => {
                let key = match &other {
                    HostEvent::KeyDown { key } | HostEvent::KeyUp { key } => Some(key.clone()),
                    _ => None,
                };

                let Some(input) = other.into_input() else {
                    return Vec::new();
                };

                let outcome = self.controller.handle_input(&input);
                debug!(input = ?input, changed = outcome.changed, "Host input applied");

                match key {
                    Some(key) if outcome.suppress_default => vec![DashboardMsg::KeyHandled {
                        key,
                        suppress_default: true,
                    }],
                    _ => Vec::new(),
                }
            }
        }
    }

    /// Pump host events into the controller and published snapshots back to
    /// the host until the input stream ends
    pub async fn run<R, W>(&self, reader: R, mut writer: W) -> std::io::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let session_id = self.controller.session_id();
        let mut lines = reader.lines();
        let mut snapshot_rx = self.controller.subscribe();

        write_msg(&mut writer, &self.catalog_msg()).await?;

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    match line? {
                        Some(line) => {
                            for reply in self.handle_line(&line) {
                                write_msg(&mut writer, &reply).await?;
                            }
                        }
                        None => {
                            info!(session_id = %session_id, "Host input closed");
                            break;
                        }
                    }
                }
                snapshot = snapshot_rx.recv() => {
                    match snapshot {
                        Ok(snapshot) => {
                            write_msg(&mut writer, &DashboardMsg::Snapshot(snapshot)).await?;
                        }
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            warn!(session_id = %session_id, lagged_count = n, "Host lagged, skipping {} snapshots", n);
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            debug!(session_id = %session_id, "Snapshot channel closed");
                            break;
                        }
                    }
                }
            }
        }

        writer.flush().await
    }
}

/// Write one message as a JSON line
async fn write_msg<W, T>(writer: &mut W, msg: &T) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let mut json = serde_json::to_vec(msg)?;
    json.push(b'\n');
    writer.write_all(&json).await?;
    writer.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use crate::catalog::Catalog;
    use crate::sim::SimulationSettings;

    fn bridge() -> HostBridge {
        HostBridge::new(SimulationController::new(
            Arc::new(Catalog::builtin()),
            SimulationSettings::default(),
        ))
    }

    fn parse_output(out: &[u8]) -> Vec<serde_json::Value> {
        String::from_utf8_lossy(out)
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[test]
    fn bound_key_reports_suppression() {
        let bridge = bridge();
        let replies = bridge.handle_line(r#"{"type":"key_down","key":"ArrowUp"}"#);
        assert_eq!(
            replies,
            vec![DashboardMsg::KeyHandled {
                key: "ArrowUp".to_string(),
                suppress_default: true
            }]
        );
        assert!(bridge.controller.intent().is_accelerating);
        assert!(bridge.controller.snapshot().is_moving);
    }

    #[test]
    fn unbound_key_and_pointer_events_reply_nothing() {
        let bridge = bridge();
        assert!(bridge.handle_line(r#"{"type":"key_down","key":"x"}"#).is_empty());
        assert!(bridge
            .handle_line(r#"{"type":"pointer_down","control":"brake"}"#)
            .is_empty());
        assert!(bridge.controller.intent().is_braking);
        assert!(bridge.handle_line(r#"{"type":"pointer_leave"}"#).is_empty());
        assert!(bridge.controller.intent().is_idle());
    }

    #[test]
    fn malformed_lines_are_reported() {
        let bridge = bridge();
        let replies = bridge.handle_line("not json");
        assert!(matches!(&replies[..], [DashboardMsg::Error { code, .. }] if code == "bad_event"));
        assert!(bridge.handle_line("   ").is_empty());
    }

    #[test]
    fn vehicle_selection_replies() {
        let bridge = bridge();
        assert_eq!(
            bridge.handle_line(r#"{"type":"select_vehicle","vehicle_id":3}"#),
            vec![DashboardMsg::VehicleSelected { vehicle_id: 3 }]
        );

        let replies = bridge.handle_line(r#"{"type":"select_vehicle","vehicle_id":9}"#);
        assert!(matches!(&replies[..], [DashboardMsg::Error { code, .. }] if code == "unknown_vehicle"));
        assert_eq!(bridge.controller.selected_vehicle().id, 3);
    }

    #[test]
    fn catalog_lists_every_vehicle() {
        let bridge = bridge();
        match bridge.catalog_msg() {
            DashboardMsg::Catalog {
                vehicles,
                selected_id,
                ..
            } => {
                assert_eq!(vehicles.len(), 3);
                assert_eq!(selected_id, 1);
            }
            other => panic!("unexpected message {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn streams_snapshots_while_key_held() {
        let bridge = bridge();
        let ticker = bridge.controller.start().unwrap();

        let input = tokio_test::io::Builder::new()
            .read(b"{\"type\":\"key_down\",\"key\":\"w\"}\n")
            .wait(Duration::from_millis(250))
            .read(b"{\"type\":\"key_up\",\"key\":\"w\"}\n")
            .build();
        let mut out = Vec::new();

        bridge
            .run(tokio::io::BufReader::new(input), &mut out)
            .await
            .unwrap();
        ticker.stop().await;

        let msgs = parse_output(&out);
        assert_eq!(msgs[0]["type"], "catalog");
        assert_eq!(msgs[1]["type"], "key_handled");
        assert_eq!(msgs[1]["key"], "w");

        let snapshots: Vec<&serde_json::Value> =
            msgs.iter().filter(|m| m["type"] == "snapshot").collect();
        assert_eq!(snapshots.len(), 2);
        assert_eq!(snapshots[0]["tick"], 1);
        assert_eq!(snapshots[0]["rpm"], 200.0);
        assert_eq!(snapshots[1]["tick"], 2);
        assert_eq!(snapshots[1]["rpm"], 400.0);

        assert_eq!(msgs.last().unwrap()["type"], "key_handled");
        assert!(bridge.controller.intent().is_idle());
    }
}
