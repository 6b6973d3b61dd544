//! Simulation controller and the fixed-rate tick loop

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{info, trace, warn};
use uuid::Uuid;

use crate::catalog::{Catalog, CatalogError, VehicleProfile};
use crate::input::{InputEvent, InputIntent, InputOutcome, InputTracker};
use crate::util::time::{Timer, TICK_INTERVAL};

use super::snapshot::{DashboardSnapshot, SnapshotBuilder};
use super::state::SimulationState;
use super::SimulationError;

/// Tick loop tuning
#[derive(Debug, Clone, Copy)]
pub struct SimulationSettings {
    pub tick_interval: Duration,
    /// Publish a snapshot every N ticks
    pub snapshot_every: u32,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            tick_interval: TICK_INTERVAL,
            snapshot_every: 1,
        }
    }
}

/// Everything a tick reads or writes, behind one lock
struct Cockpit {
    state: SimulationState,
    tracker: InputTracker,
    tick: u64,
    snapshots: SnapshotBuilder,
}

/// Owns the simulation state and the input tracker.
///
/// Input handlers mutate the intent immediately; the ticker reads whatever
/// is current at the start of each tick. Cloning yields another handle to the
/// same simulation.
#[derive(Clone)]
pub struct SimulationController {
    session_id: Uuid,
    catalog: Arc<Catalog>,
    cockpit: Arc<Mutex<Cockpit>>,
    snapshot_tx: broadcast::Sender<DashboardSnapshot>,
    settings: SimulationSettings,
    running: Arc<AtomicBool>,
}

impl SimulationController {
    /// Parked simulation with the catalog's first car selected
    pub fn new(catalog: Arc<Catalog>, settings: SimulationSettings) -> Self {
        let vehicle = catalog.first();
        Self::with_vehicle(catalog, vehicle, settings)
    }

    pub fn with_vehicle(
        catalog: Arc<Catalog>,
        vehicle: Arc<VehicleProfile>,
        settings: SimulationSettings,
    ) -> Self {
        let (snapshot_tx, _) = broadcast::channel(64);

        let cockpit = Cockpit {
            state: SimulationState::new(vehicle),
            tracker: InputTracker::new(),
            tick: 0,
            snapshots: SnapshotBuilder::new(settings.snapshot_every),
        };

        Self {
            session_id: Uuid::new_v4(),
            catalog,
            cockpit: Arc::new(Mutex::new(cockpit)),
            snapshot_tx,
            settings,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn settings(&self) -> SimulationSettings {
        self.settings
    }

    /// Subscribe to published snapshots
    pub fn subscribe(&self) -> broadcast::Receiver<DashboardSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn intent(&self) -> InputIntent {
        self.cockpit.lock().tracker.intent()
    }

    pub fn selected_vehicle(&self) -> Arc<VehicleProfile> {
        self.cockpit.lock().state.vehicle.clone()
    }

    /// Current dashboard without advancing
    pub fn snapshot(&self) -> DashboardSnapshot {
        let cockpit = self.cockpit.lock();
        DashboardSnapshot::capture(cockpit.tick, &cockpit.state)
    }

    /// Apply a host input event
    pub fn handle_input(&self, event: &InputEvent) -> InputOutcome {
        let mut cockpit = self.cockpit.lock();
        let outcome = cockpit.tracker.apply(event);
        if outcome.engage_motion {
            cockpit.state.engage();
        }
        outcome
    }

    /// Hold the accelerator. Flags the car as moving straight away.
    pub fn on_accelerate_press(&self) {
        let mut cockpit = self.cockpit.lock();
        if cockpit.tracker.accelerate_press() {
            cockpit.state.engage();
        }
    }

    pub fn on_brake_press(&self) {
        self.cockpit.lock().tracker.brake_press();
    }

    /// Let go of both pedals
    pub fn on_release(&self) {
        self.cockpit.lock().tracker.release();
    }

    /// Switch cars. Speed, RPM, gear and pedals are left as they are.
    pub fn select_vehicle(&self, vehicle: Arc<VehicleProfile>) {
        let mut cockpit = self.cockpit.lock();
        info!(
            session_id = %self.session_id,
            from = cockpit.state.vehicle.id,
            to = vehicle.id,
            speed = cockpit.state.speed,
            "Vehicle selected"
        );
        cockpit.state.select_vehicle(vehicle);
        cockpit.snapshots.force_next();
    }

    pub fn select_vehicle_by_id(&self, id: u32) -> Result<Arc<VehicleProfile>, CatalogError> {
        let vehicle = self.catalog.get(id)?;
        self.select_vehicle(vehicle.clone());
        Ok(vehicle)
    }

    /// Run one tick and publish a snapshot if the cadence says so
    pub fn tick(&self) -> DashboardSnapshot {
        let (snapshot, publish) = {
            let mut cockpit = self.cockpit.lock();
            let intent = cockpit.tracker.intent();
            cockpit.state.step(intent);
            cockpit.tick += 1;

            trace!(
                tick = cockpit.tick,
                speed = cockpit.state.speed,
                rpm = cockpit.state.rpm,
                gear = cockpit.state.gear,
                "Tick"
            );

            let publish = cockpit.snapshots.should_send();
            (DashboardSnapshot::capture(cockpit.tick, &cockpit.state), publish)
        };

        if publish {
            // No subscribers is fine
            let _ = self.snapshot_tx.send(snapshot.clone());
        }

        snapshot
    }

    /// Start the periodic ticker. Only one may run at a time; it stops when
    /// the returned handle is stopped or dropped.
    pub fn start(&self) -> Result<TickerHandle, SimulationError> {
        if self.running.swap(true, Ordering::AcqRel) {
            return Err(SimulationError::AlreadyRunning);
        }

        let controller = self.clone();
        let task = tokio::spawn(async move { controller.run().await });

        Ok(TickerHandle {
            session_id: self.session_id,
            task: Some(task),
            running: self.running.clone(),
        })
    }

    async fn run(self) {
        let period = self.settings.tick_interval;
        info!(
            session_id = %self.session_id,
            tick_ms = period.as_millis() as u64,
            vehicle_id = self.selected_vehicle().id,
            "Simulation started"
        );

        // First tick one period from now, not immediately
        let mut tick_interval = interval_at(Instant::now() + period, period);
        tick_interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tick_interval.tick().await;

            let timer = Timer::new();
            self.tick();

            let elapsed = timer.elapsed();
            if elapsed > period {
                warn!(
                    session_id = %self.session_id,
                    elapsed_micros = elapsed.as_micros() as u64,
                    "Tick overran its period"
                );
            }
        }
    }
}

/// Scoped ownership of the running ticker
pub struct TickerHandle {
    session_id: Uuid,
    task: Option<JoinHandle<()>>,
    running: Arc<AtomicBool>,
}

impl TickerHandle {
    /// Stop ticking and wait for the task to wind down
    pub async fn stop(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
        self.release();
    }

    fn release(&mut self) {
        if self.running.swap(false, Ordering::AcqRel) {
            info!(session_id = %self.session_id, "Simulation stopped");
        }
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Control;

    fn controller() -> SimulationController {
        SimulationController::new(Arc::new(Catalog::builtin()), SimulationSettings::default())
    }

    #[test]
    fn accelerate_press_marks_moving_before_tick() {
        let sim = controller();
        sim.on_accelerate_press();
        let snap = sim.snapshot();
        assert!(snap.is_moving);
        assert_eq!(snap.speed, 0.0);
        assert_eq!(snap.tick, 0);
    }

    #[test]
    fn handle_input_routes_engage_motion() {
        let sim = controller();
        sim.handle_input(&InputEvent::TouchStart(Control::Brake));
        assert!(!sim.snapshot().is_moving);

        sim.handle_input(&InputEvent::KeyDown("w".to_string()));
        assert!(sim.snapshot().is_moving);
        assert!(sim.intent().is_accelerating);
        assert!(sim.intent().is_braking);
    }

    #[test]
    fn manual_ticks_advance_state() {
        let sim = controller();
        sim.on_accelerate_press();
        let first = sim.tick();
        assert_eq!(first.tick, 1);
        assert_eq!(first.rpm, 200.0);

        sim.on_release();
        let second = sim.tick();
        assert_eq!(second.tick, 2);
        assert!(second.speed < first.speed);
    }

    #[test]
    fn unknown_vehicle_leaves_selection_untouched() {
        let sim = controller();
        assert!(sim.select_vehicle_by_id(42).is_err());
        assert_eq!(sim.selected_vehicle().id, 1);

        let car = sim.select_vehicle_by_id(3).unwrap();
        assert_eq!(car.id, 3);
        assert_eq!(sim.selected_vehicle().id, 3);
    }

    #[test]
    fn snapshots_follow_cadence() {
        let sim = SimulationController::new(
            Arc::new(Catalog::builtin()),
            SimulationSettings {
                snapshot_every: 2,
                ..Default::default()
            },
        );
        let mut rx = sim.subscribe();

        sim.tick();
        assert!(rx.try_recv().is_err());
        sim.tick();
        assert_eq!(rx.try_recv().unwrap().tick, 2);

        // Switching cars publishes on the next tick
        sim.select_vehicle_by_id(2).unwrap();
        let snap = sim.tick();
        assert_eq!(rx.try_recv().unwrap(), snap);
        assert_eq!(snap.vehicle_id, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn ticker_runs_at_fixed_rate() {
        let sim = controller();
        let mut rx = sim.subscribe();
        let handle = sim.start().unwrap();

        sim.on_accelerate_press();
        let start = Instant::now();
        let first = rx.recv().await.unwrap();
        assert_eq!(first.tick, 1);
        assert!((first.speed - 4.9).abs() < 1e-9);
        assert!(start.elapsed() >= TICK_INTERVAL);
        assert!(start.elapsed() < TICK_INTERVAL * 2);

        let second = rx.recv().await.unwrap();
        assert_eq!(second.tick, 2);
        assert!(start.elapsed() >= TICK_INTERVAL * 2);

        handle.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn only_one_ticker_at_a_time() {
        let sim = controller();
        let handle = sim.start().unwrap();
        assert!(matches!(sim.start(), Err(SimulationError::AlreadyRunning)));

        drop(handle);
        let again = sim.start().unwrap();
        again.stop().await;
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_handle_stops_ticks() {
        let sim = controller();
        let mut rx = sim.subscribe();
        let handle = sim.start().unwrap();

        rx.recv().await.unwrap();
        drop(handle);
        let ticks = sim.snapshot().tick;

        tokio::time::sleep(TICK_INTERVAL * 10).await;
        assert_eq!(sim.snapshot().tick, ticks);
    }
}
