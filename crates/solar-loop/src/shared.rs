//! Simulation shared between the logic and render threads
//!
//! The logic side locks the simulation for a whole tick, then publishes a
//! fresh [`Frame`]. The render side only ever clones the latest published
//! `Arc<Frame>` under a short read lock, so it never waits on a tick and
//! never sees an entity mid-update.

use crate::error::CallbackResult;
use crate::game_loop::{GameLoop, SystemHandle};
use parking_lot::{Mutex, RwLock};
use solar_sim::{Frame, Simulation, TickReport};
use std::sync::Arc;
use tracing::warn;

/// A simulation plus its double-buffered render frame
#[derive(Clone)]
pub struct SharedSimulation {
    sim: Arc<Mutex<Simulation>>,
    frame: Arc<RwLock<Arc<Frame>>>,
}

impl SharedSimulation {
    /// Wrap a simulation and publish its current state
    pub fn new(sim: Simulation) -> Self {
        let frame = Arc::new(sim.snapshot());
        Self {
            sim: Arc::new(Mutex::new(sim)),
            frame: Arc::new(RwLock::new(frame)),
        }
    }

    /// Run one tick and publish the resulting frame
    pub fn tick(&self, dt: f64) -> TickReport {
        let (report, frame) = {
            let mut sim = self.sim.lock();
            let report = sim.update(dt);
            (report, Arc::new(sim.snapshot()))
        };
        *self.frame.write() = frame;
        report
    }

    /// The latest published frame
    pub fn frame(&self) -> Arc<Frame> {
        Arc::clone(&self.frame.read())
    }

    /// Mutate the simulation outside a tick, then republish
    pub fn with<R>(&self, f: impl FnOnce(&mut Simulation) -> R) -> R {
        let (result, frame) = {
            let mut sim = self.sim.lock();
            let result = f(&mut sim);
            (result, Arc::new(sim.snapshot()))
        };
        *self.frame.write() = frame;
        result
    }

    /// Register the simulation tick as an update system
    pub fn attach(&self, game_loop: &GameLoop) -> SystemHandle {
        let shared = self.clone();
        game_loop.add_update_system("simulation", move |dt| -> CallbackResult {
            let report = shared.tick(dt);
            if !report.is_clean() {
                warn!(
                    tick = report.tick,
                    warnings = report.warnings.len(),
                    "tick finished with warnings"
                );
            }
            Ok(())
        })
    }
}

impl std::fmt::Debug for SharedSimulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let frame = self.frame();
        f.debug_struct("SharedSimulation")
            .field("tick", &frame.tick)
            .field("entities", &frame.len())
            .finish_non_exhaustive()
    }
}
