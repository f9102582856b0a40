//! Headless Sector Example
//!
//! Runs a small sector on the threaded game loop with no renderer attached.
//! A render system stands in for the renderer and logs what it would draw.
//!
//! Usage: `headless [behaviors.json|behaviors.ron] [seconds]`
//!
//! Set `RUST_LOG=debug` to see behavior changes and tick summaries.

use solar_core::{GameRng, Vec2};
use solar_loop::{GameLoop, LoopConfig, SharedSimulation};
use solar_script::{BehaviorRegistry, Loader, Section};
use solar_sim::{SimConfig, Simulation, TypeAssignments};
use std::error::Error;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const SEED: u64 = 42;

fn load_registry(path: Option<&str>) -> Result<BehaviorRegistry, Box<dyn Error>> {
    let Some(path) = path else {
        info!("using built-in behaviors");
        return Ok(BehaviorRegistry::with_defaults());
    };

    let mut loader = Loader::with_registry(BehaviorRegistry::with_defaults());
    loader.load_file(path, Section::Ai)?;
    let (registry, report) = loader.finish();
    for rejected in &report.rejected {
        warn!(section = %rejected.section, index = rejected.index, error = %rejected.error, "definition skipped");
    }
    info!(path, loaded = report.loaded.len(), "behaviors loaded");
    Ok(registry)
}

fn spawn_sector(sim: &mut Simulation) {
    let mut rng = GameRng::new(SEED);
    let mut scatter = |radius: f64| {
        let angle = rng.angle();
        let distance = rng.range_f64(radius * 0.5, radius);
        Vec2::new(angle.cos(), angle.sin()) * distance
    };

    let store = sim.store_mut();
    store.create("star", Vec2::ZERO).set("name", "Sol");
    store.create("planet", Vec2::new(150.0, 0.0)).set("name", "Terra");
    store
        .create("space_station", Vec2::new(200.0, 200.0))
        .set("faction", "federation");

    let fleets = [
        ("fighter", "pirates", 4, 300.0),
        ("cargo_ship", "guild", 3, 200.0),
        ("mining_ship", "guild", 2, 250.0),
    ];
    for (kind, faction, count, radius) in fleets {
        for i in 0..count {
            let ship = store.create(kind, scatter(radius));
            ship.set("name", format!("{} {}", kind, i + 1));
            ship.set("faction", faction);
        }
    }
    for _ in 0..6 {
        let position = scatter(350.0);
        store.create("asteroid", position);
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (path, seconds) = match args.as_slice() {
        [] => (None, 3.0),
        [only] => match only.parse::<f64>() {
            Ok(seconds) => (None, seconds),
            Err(_) => (Some(only.as_str()), 3.0),
        },
        [path, seconds, ..] => (Some(path.as_str()), seconds.parse::<f64>()?),
    };

    let registry = Arc::new(load_registry(path)?);
    let mut sim = Simulation::new(registry, SimConfig::with_seed(SEED));
    spawn_sector(&mut sim);
    let assigned = sim.assign_by_type(&TypeAssignments::standard());
    info!(entities = sim.store().len(), assigned, "sector ready");

    let shared = SharedSimulation::new(sim);
    let game_loop = GameLoop::new(LoopConfig::default());
    shared.attach(&game_loop);

    let frames = shared.clone();
    let mut since_log = 0.0;
    game_loop.add_render_system("log_frame", move |dt| {
        since_log += dt;
        if since_log >= 1.0 {
            since_log = 0.0;
            let frame = frames.frame();
            for entity in frame.entities.iter().filter(|e| e.kind().as_str() == "fighter") {
                let p = entity.position();
                info!(tick = frame.tick, ship = %entity.name(), x = p.x, y = p.y, "frame");
            }
        }
        Ok(())
    });

    game_loop.start()?;
    let seconds = if seconds.is_finite() {
        seconds.clamp(0.0, 3600.0)
    } else {
        3.0
    };
    let half = Duration::from_secs_f64(seconds / 2.0);
    thread::sleep(half);

    game_loop.set_speed(2.0);
    info!("speed 2x");
    thread::sleep(half);

    game_loop.pause();
    game_loop.step();
    game_loop.stop();

    info!("{}", game_loop.stats());
    Ok(())
}
