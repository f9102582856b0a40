//! Threaded game loop
//!
//! Two threads share one timeline:
//! - the logic thread turns wall time into fixed ticks through a
//!   [`FixedStep`] and runs the update callbacks with `dt = 1/tps`
//! - the render thread runs the render callbacks at the frame rate with
//!   the real frame delta, and keeps running while paused
//!
//! All update callbacks run under one mutex, so [`GameLoop::step`] on the
//! caller's thread and the logic thread never overlap a tick. Callbacks
//! must not register or remove systems on the same loop; that would wait
//! on the mutex they are running under.

use crate::config::LoopConfig;
use crate::error::{CallbackResult, Error, Result};
use crate::fixed_step::FixedStep;
use crate::stats::{LoopStats, RateMeter};
use parking_lot::Mutex;
use solar_core::{LoopState, SimClock, Speed};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle, ThreadId};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Sleep between loop iterations
const IDLE_SLEEP: Duration = Duration::from_millis(1);

type Callback = Box<dyn FnMut(f64) -> CallbackResult + Send>;

/// Identifies a registered callback for removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SystemHandle(u64);

struct System {
    handle: SystemHandle,
    name: String,
    callback: Callback,
}

impl System {
    /// Run the callback, containing errors and panics
    fn call(&mut self, dt: f64, cadence: &'static str) {
        match panic::catch_unwind(AssertUnwindSafe(|| (self.callback)(dt))) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                error!(system = %self.name, cadence, error = %err, "system returned an error");
            }
            Err(_) => {
                error!(system = %self.name, cadence, "system panicked");
            }
        }
    }
}

#[derive(Debug)]
struct Status {
    state: LoopState,
    speed: Speed,
    clock: SimClock,
    /// Real time accumulated by earlier runs
    real_time: f64,
    started_at: Option<Instant>,
}

impl Status {
    fn real_time(&self) -> f64 {
        self.real_time + self.started_at.map_or(0.0, |t| t.elapsed().as_secs_f64())
    }
}

struct Shared {
    config: LoopConfig,
    status: Mutex<Status>,
    update_systems: Mutex<Vec<System>>,
    render_systems: Mutex<Vec<System>>,
    update_count: AtomicUsize,
    render_count: AtomicUsize,
    next_handle: AtomicU64,
    tps: Mutex<RateMeter>,
    fps: Mutex<RateMeter>,
    last_tick_at: Mutex<Option<Instant>>,
}

impl Shared {
    fn state(&self) -> LoopState {
        self.status.lock().state
    }

    fn speed(&self) -> Speed {
        self.status.lock().speed
    }

    /// Run every update callback once and advance the clock
    fn run_tick(&self) {
        let dt = self.config.tick_interval();
        {
            let mut systems = self.update_systems.lock();
            for system in systems.iter_mut() {
                system.call(dt, "update");
            }
            self.status.lock().clock.advance(dt);
        }

        let now = Instant::now();
        let mut last = self.last_tick_at.lock();
        if let Some(previous) = last.replace(now) {
            self.tps.lock().record((now - previous).as_secs_f64());
        }
    }

    fn run_frame(&self, dt: f64) {
        let mut systems = self.render_systems.lock();
        for system in systems.iter_mut() {
            system.call(dt, "render");
        }
    }

    fn logic_thread(self: Arc<Self>) {
        let mut fixed = FixedStep::new(&self.config);
        let mut last = Instant::now();
        debug!("logic thread started");

        loop {
            let state = self.state();
            if state == LoopState::Stopped {
                break;
            }
            let now = Instant::now();
            let elapsed = (now - last).as_secs_f64();
            last = now;

            if state == LoopState::Running {
                let ticks = fixed.advance(elapsed, self.speed());
                for _ in 0..ticks {
                    // Pause or stop may land between ticks
                    if self.state() != LoopState::Running {
                        fixed.reset();
                        break;
                    }
                    self.run_tick();
                }
            } else {
                fixed.reset();
            }
            thread::sleep(IDLE_SLEEP);
        }
        debug!(dropped_ticks = fixed.dropped(), "logic thread finished");
    }

    fn render_thread(self: Arc<Self>) {
        let interval = self.config.frame_interval();
        let mut last = Instant::now();
        debug!("render thread started");

        while self.state() != LoopState::Stopped {
            let now = Instant::now();
            let elapsed = (now - last).as_secs_f64();
            if elapsed >= interval {
                self.run_frame(elapsed);
                self.fps.lock().record(elapsed);
                last = now;
            }
            thread::sleep(IDLE_SLEEP);
        }
        debug!("render thread finished");
    }
}

/// Join handles, owned jointly by every [`GameLoop`] clone
///
/// Dropping the last clone stops the loop.
struct Threads {
    shared: Arc<Shared>,
    handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Threads {
    fn is_loop_thread(&self, id: ThreadId) -> bool {
        self.handles.lock().iter().any(|h| h.thread().id() == id)
    }

    fn join_all(&self) {
        let handles: Vec<JoinHandle<()>> = self.handles.lock().drain(..).collect();
        for handle in handles {
            let name = handle.thread().name().unwrap_or("loop").to_string();
            if handle.join().is_err() {
                error!(thread = %name, "loop thread panicked");
            }
        }
    }
}

impl Drop for Threads {
    fn drop(&mut self) {
        self.shared.status.lock().state = LoopState::Stopped;
        if !self.is_loop_thread(thread::current().id()) {
            self.join_all();
        }
    }
}

/// Fixed-rate logic loop with an independent render cadence
///
/// Cheap to clone; clones control the same loop, so a callback can hold
/// one to pause or stop the loop it runs in.
///
/// # Example
///
/// ```no_run
/// use solar_loop::{GameLoop, LoopConfig};
///
/// let game_loop = GameLoop::new(LoopConfig::default());
/// game_loop.add_update_system("physics", |dt| {
///     assert_eq!(dt, 0.05);
///     Ok(())
/// });
/// game_loop.start()?;
/// game_loop.pause();
/// game_loop.step();
/// game_loop.stop();
/// # Ok::<(), solar_loop::Error>(())
/// ```
#[derive(Clone)]
pub struct GameLoop {
    shared: Arc<Shared>,
    threads: Arc<Threads>,
}

impl GameLoop {
    /// Create a stopped loop
    pub fn new(config: LoopConfig) -> Self {
        let config = config.sanitized();
        let window = config.stats_window;
        let shared = Arc::new(Shared {
            config,
            status: Mutex::new(Status {
                state: LoopState::Stopped,
                speed: Speed::NORMAL,
                clock: SimClock::new(),
                real_time: 0.0,
                started_at: None,
            }),
            update_systems: Mutex::new(Vec::new()),
            render_systems: Mutex::new(Vec::new()),
            update_count: AtomicUsize::new(0),
            render_count: AtomicUsize::new(0),
            next_handle: AtomicU64::new(1),
            tps: Mutex::new(RateMeter::new(window)),
            fps: Mutex::new(RateMeter::new(window)),
            last_tick_at: Mutex::new(None),
        });
        let threads = Arc::new(Threads {
            shared: Arc::clone(&shared),
            handles: Mutex::new(Vec::new()),
        });
        Self { shared, threads }
    }

    pub fn config(&self) -> &LoopConfig {
        &self.shared.config
    }

    pub fn state(&self) -> LoopState {
        self.shared.state()
    }

    /// Current tick and game time
    pub fn clock(&self) -> SimClock {
        self.shared.status.lock().clock
    }

    /// Stopped -> Running, spawning the logic and render threads
    pub fn start(&self) -> Result<()> {
        {
            let mut status = self.shared.status.lock();
            if status.state != LoopState::Stopped {
                warn!(state = ?status.state, "start ignored, loop is not stopped");
                return Ok(());
            }
            status.state = LoopState::Running;
            status.started_at = Some(Instant::now());
        }
        // Threads left over from a stop issued inside a callback
        self.threads.join_all();
        *self.shared.last_tick_at.lock() = None;
        self.shared.tps.lock().clear();
        self.shared.fps.lock().clear();

        // Held while spawning so a loop thread can always recognise itself
        let mut handles = self.threads.handles.lock();
        for (name, run) in [
            ("logic", Shared::logic_thread as fn(Arc<Shared>)),
            ("render", Shared::render_thread as fn(Arc<Shared>)),
        ] {
            let shared = Arc::clone(&self.shared);
            let spawned = thread::Builder::new()
                .name(format!("solar-{}", name))
                .spawn(move || run(shared));
            match spawned {
                Ok(handle) => handles.push(handle),
                Err(source) => {
                    let mut status = self.shared.status.lock();
                    status.state = LoopState::Stopped;
                    status.started_at = None;
                    drop(status);
                    for handle in handles.drain(..) {
                        let _ = handle.join();
                    }
                    return Err(Error::Spawn { name, source });
                }
            }
        }
        drop(handles);

        let config = &self.shared.config;
        info!(tps = config.target_tps, fps = config.target_fps, "game loop started");
        Ok(())
    }

    /// Any state -> Stopped, joining both threads
    ///
    /// Idempotent. Once it returns no callback is running or will run.
    /// From inside a loop callback it only signals the threads.
    pub fn stop(&self) {
        {
            let mut status = self.shared.status.lock();
            if status.state != LoopState::Stopped {
                if let Some(started) = status.started_at.take() {
                    status.real_time += started.elapsed().as_secs_f64();
                }
                status.state = LoopState::Stopped;
            }
        }
        if self.threads.is_loop_thread(thread::current().id()) {
            warn!("stop called from a loop thread, not joining");
            return;
        }
        self.threads.join_all();
        info!(tick = self.clock().tick, "game loop stopped");
    }

    /// Running -> Paused
    pub fn pause(&self) {
        let mut status = self.shared.status.lock();
        if status.state != LoopState::Running {
            warn!(state = ?status.state, "pause ignored, loop is not running");
            return;
        }
        status.state = LoopState::Paused;
        debug!(tick = status.clock.tick, "game loop paused");
    }

    /// Paused -> Running
    pub fn resume(&self) {
        let mut status = self.shared.status.lock();
        if status.state != LoopState::Paused {
            warn!(state = ?status.state, "resume ignored, loop is not paused");
            return;
        }
        status.state = LoopState::Running;
        debug!(tick = status.clock.tick, "game loop resumed");
    }

    /// Set the time multiplier, clamped into `[0.1, 10]`
    pub fn set_speed(&self, multiplier: f64) {
        let speed = Speed::new(multiplier);
        self.shared.status.lock().speed = speed;
        debug!(%speed, "game speed set");
    }

    pub fn speed(&self) -> Speed {
        self.shared.speed()
    }

    /// Run exactly one tick on this thread
    ///
    /// Only while paused; otherwise a warned no-op.
    pub fn step(&self) {
        let state = self.state();
        if state != LoopState::Paused {
            warn!(state = ?state, "step ignored, loop is not paused");
            return;
        }
        self.shared.run_tick();
    }

    /// Register a callback run every logic tick with `dt = 1/tps`
    pub fn add_update_system<F>(&self, name: impl Into<String>, callback: F) -> SystemHandle
    where
        F: FnMut(f64) -> CallbackResult + Send + 'static,
    {
        let system = self.system(name.into(), Box::new(callback));
        let handle = system.handle;
        self.shared.update_systems.lock().push(system);
        self.shared.update_count.fetch_add(1, Ordering::Relaxed);
        handle
    }

    /// Register a callback run every render frame with the real frame delta
    pub fn add_render_system<F>(&self, name: impl Into<String>, callback: F) -> SystemHandle
    where
        F: FnMut(f64) -> CallbackResult + Send + 'static,
    {
        let system = self.system(name.into(), Box::new(callback));
        let handle = system.handle;
        self.shared.render_systems.lock().push(system);
        self.shared.render_count.fetch_add(1, Ordering::Relaxed);
        handle
    }

    /// Remove an update callback; false if the handle is unknown
    pub fn remove_update_system(&self, handle: SystemHandle) -> bool {
        remove(&self.shared.update_systems, &self.shared.update_count, handle)
    }

    /// Remove a render callback; false if the handle is unknown
    pub fn remove_render_system(&self, handle: SystemHandle) -> bool {
        remove(&self.shared.render_systems, &self.shared.render_count, handle)
    }

    fn system(&self, name: String, callback: Callback) -> System {
        let handle = SystemHandle(self.shared.next_handle.fetch_add(1, Ordering::Relaxed));
        debug!(system = %name, ?handle, "system registered");
        System {
            handle,
            name,
            callback,
        }
    }

    /// Current timing statistics
    pub fn stats(&self) -> LoopStats {
        let (state, speed, clock, real_time) = {
            let status = self.shared.status.lock();
            (status.state, status.speed, status.clock, status.real_time())
        };
        let config = &self.shared.config;
        LoopStats {
            tick: clock.tick,
            game_time: clock.game_time,
            real_time,
            time_ratio: if real_time > 0.0 {
                clock.game_time / real_time
            } else {
                0.0
            },
            running: state.is_active(),
            paused: state.is_paused(),
            speed: speed.multiplier(),
            target_tps: config.target_tps,
            actual_tps: self.shared.tps.lock().rate(),
            target_fps: config.target_fps,
            actual_fps: self.shared.fps.lock().rate(),
            update_systems: self.shared.update_count.load(Ordering::Relaxed),
            render_systems: self.shared.render_count.load(Ordering::Relaxed),
        }
    }
}

impl std::fmt::Debug for GameLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameLoop")
            .field("config", &self.shared.config)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

fn remove(systems: &Mutex<Vec<System>>, count: &AtomicUsize, handle: SystemHandle) -> bool {
    let mut systems = systems.lock();
    let before = systems.len();
    systems.retain(|s| s.handle != handle);
    let removed = systems.len() != before;
    if removed {
        count.fetch_sub(1, Ordering::Relaxed);
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    fn counter(game_loop: &GameLoop, name: &str) -> (SystemHandle, Arc<AtomicU32>) {
        let count = Arc::new(AtomicU32::new(0));
        let inner = Arc::clone(&count);
        let handle = game_loop.add_update_system(name, move |_| {
            inner.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        (handle, count)
    }

    fn fast() -> LoopConfig {
        LoopConfig::new(100, 100)
    }

    #[test]
    fn test_misuse_is_a_no_op() {
        let game_loop = GameLoop::new(fast());
        let (_, ticks) = counter(&game_loop, "count");

        game_loop.pause();
        game_loop.resume();
        game_loop.step();
        game_loop.stop();
        assert_eq!(game_loop.state(), LoopState::Stopped);
        assert_eq!(ticks.load(Ordering::SeqCst), 0);

        game_loop.start().unwrap();
        game_loop.start().unwrap();
        game_loop.resume();
        assert_eq!(game_loop.state(), LoopState::Running);
        game_loop.stop();
        game_loop.stop();
        assert_eq!(game_loop.state(), LoopState::Stopped);
    }

    #[test]
    fn test_step_while_running_is_ignored() {
        // One tick per second at 0.1x: the logic thread stays idle for the test
        let game_loop = GameLoop::new(LoopConfig::new(1, 60));
        let (_, ticks) = counter(&game_loop, "count");
        game_loop.set_speed(0.1);
        game_loop.start().unwrap();

        game_loop.step();
        game_loop.step();
        assert_eq!(game_loop.state(), LoopState::Running);
        assert_eq!(game_loop.clock().tick, 0);
        assert_eq!(ticks.load(Ordering::SeqCst), 0);
        game_loop.stop();
    }

    #[test]
    fn test_step_runs_one_tick_while_paused() {
        let game_loop = GameLoop::new(fast());
        let (_, ticks) = counter(&game_loop, "count");
        game_loop.start().unwrap();
        game_loop.pause();
        thread::sleep(Duration::from_millis(20));

        let before = ticks.load(Ordering::SeqCst);
        let tick_before = game_loop.clock().tick;
        game_loop.step();
        assert_eq!(ticks.load(Ordering::SeqCst), before + 1);
        assert_eq!(game_loop.clock().tick, tick_before + 1);
        assert_eq!(game_loop.state(), LoopState::Paused);

        game_loop.stop();
    }

    #[test]
    fn test_pause_holds_updates_not_renders() {
        let game_loop = GameLoop::new(fast());
        let (_, ticks) = counter(&game_loop, "count");
        let frames = Arc::new(AtomicU32::new(0));
        let inner = Arc::clone(&frames);
        game_loop.add_render_system("frames", move |_| {
            inner.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        game_loop.start().unwrap();
        thread::sleep(Duration::from_millis(50));
        game_loop.pause();
        thread::sleep(Duration::from_millis(20));

        let paused_ticks = ticks.load(Ordering::SeqCst);
        let paused_frames = frames.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(100));
        assert_eq!(ticks.load(Ordering::SeqCst), paused_ticks);
        assert!(frames.load(Ordering::SeqCst) > paused_frames);

        game_loop.resume();
        thread::sleep(Duration::from_millis(100));
        game_loop.stop();
        assert!(ticks.load(Ordering::SeqCst) > paused_ticks);
    }

    #[test]
    fn test_failing_systems_do_not_stop_the_loop() {
        let game_loop = GameLoop::new(fast());
        game_loop.add_update_system("fails", |_| Err("out of fuel".into()));
        game_loop.add_update_system("panics", |_| panic!("reactor breach"));
        let (_, ticks) = counter(&game_loop, "count");

        game_loop.start().unwrap();
        game_loop.pause();
        let before = ticks.load(Ordering::SeqCst);
        game_loop.step();
        game_loop.step();
        assert_eq!(ticks.load(Ordering::SeqCst), before + 2);
        game_loop.stop();
    }

    #[test]
    fn test_no_callbacks_after_stop() {
        let game_loop = GameLoop::new(fast());
        let (_, ticks) = counter(&game_loop, "count");
        game_loop.start().unwrap();
        thread::sleep(Duration::from_millis(50));
        game_loop.stop();

        let after = ticks.load(Ordering::SeqCst);
        thread::sleep(Duration::from_millis(50));
        assert_eq!(ticks.load(Ordering::SeqCst), after);
    }

    #[test]
    fn test_stop_from_inside_callback() {
        let game_loop = GameLoop::new(fast());
        let control = game_loop.clone();
        game_loop.add_update_system("stopper", move |_| {
            control.stop();
            Ok(())
        });
        game_loop.start().unwrap();

        let deadline = Instant::now() + Duration::from_secs(2);
        while game_loop.state() != LoopState::Stopped && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(game_loop.state(), LoopState::Stopped);
        game_loop.stop();
    }

    #[test]
    fn test_remove_system() {
        let game_loop = GameLoop::new(fast());
        let (handle, ticks) = counter(&game_loop, "count");
        assert_eq!(game_loop.stats().update_systems, 1);
        assert!(game_loop.remove_update_system(handle));
        assert!(!game_loop.remove_update_system(handle));
        assert!(!game_loop.remove_render_system(handle));
        assert_eq!(game_loop.stats().update_systems, 0);

        game_loop.start().unwrap();
        game_loop.pause();
        game_loop.step();
        game_loop.stop();
        assert_eq!(ticks.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_speed_is_clamped() {
        let game_loop = GameLoop::new(fast());
        game_loop.set_speed(50.0);
        assert_eq!(game_loop.stats().speed, 10.0);
        game_loop.set_speed(0.0);
        assert_eq!(game_loop.stats().speed, 0.1);
        game_loop.set_speed(f64::NAN);
        assert_eq!(game_loop.stats().speed, 1.0);
        game_loop.set_speed(f64::INFINITY);
        assert_eq!(game_loop.stats().speed, 10.0);
        game_loop.set_speed(f64::NEG_INFINITY);
        assert_eq!(game_loop.stats().speed, 0.1);
    }

    #[test]
    fn test_update_dt_is_fixed() {
        let game_loop = GameLoop::new(LoopConfig::new(20, 60));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let inner = Arc::clone(&seen);
        game_loop.add_update_system("dt", move |dt| {
            inner.lock().push(dt);
            Ok(())
        });
        game_loop.set_speed(4.0);
        game_loop.start().unwrap();
        thread::sleep(Duration::from_millis(100));
        game_loop.stop();

        let seen = seen.lock();
        assert!(!seen.is_empty());
        assert!(seen.iter().all(|&dt| dt == 0.05));
        let stats = game_loop.stats();
        assert!(!stats.running);
        assert!(stats.real_time > 0.0);
    }
}
