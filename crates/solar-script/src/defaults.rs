//! Built-in behavior catalogue
//!
//! Ships with the engine so a sector can run without any behavior files.
//! Also written out by [`default_config_json`] as a starting point for
//! custom configurations.

use crate::error::Result;
use crate::registry::BehaviorRegistry;
use crate::schema::{AiBehaviorDef, AiKind, MovementBehaviorDef, MovementKind};
use solar_core::Vec2;

fn square(min: f64, max: f64) -> Vec<Vec2> {
    vec![
        Vec2::new(min, min),
        Vec2::new(max, min),
        Vec2::new(max, max),
        Vec2::new(min, max),
    ]
}

/// Default movement behaviors
pub fn movement_behaviors() -> Vec<MovementBehaviorDef> {
    vec![
        MovementBehaviorDef::new("slow_linear", MovementKind::Linear { max_speed: 30.0 }),
        MovementBehaviorDef::new("fast_linear", MovementKind::Linear { max_speed: 100.0 }),
        MovementBehaviorDef::new(
            "planet_orbit",
            MovementKind::Circular {
                center: Vec2::ZERO,
                radius: 150.0,
                angular_speed: 0.5,
            },
        ),
        MovementBehaviorDef::new(
            "moon_orbit",
            MovementKind::Orbit {
                target_type: Some("planet".to_string()),
                radius: 40.0,
                angular_speed: 1.0,
                fallback_center: Vec2::ZERO,
            },
        ),
        MovementBehaviorDef::new(
            "patrol_route",
            MovementKind::Patrol {
                waypoints: square(100.0, 200.0),
                speed: 40.0,
                arrival_tolerance: 10.0,
            },
        ),
        MovementBehaviorDef::new(
            "fast_patrol",
            MovementKind::Patrol {
                waypoints: square(-300.0, 300.0),
                speed: 60.0,
                arrival_tolerance: 10.0,
            },
        ),
        MovementBehaviorDef::new(
            "slow_patrol",
            MovementKind::Patrol {
                waypoints: square(-100.0, 100.0),
                speed: 20.0,
                arrival_tolerance: 5.0,
            },
        ),
        MovementBehaviorDef::new(
            "random_wander",
            MovementKind::Wander {
                speed: 25.0,
                direction_change_interval: 3.0,
                max_direction_change: 1.57,
            },
        ),
        MovementBehaviorDef::new(
            "exploration",
            MovementKind::Wander {
                speed: 30.0,
                direction_change_interval: 4.0,
                max_direction_change: 1.0,
            },
        ),
        MovementBehaviorDef::new(
            "seek_target",
            MovementKind::Seek {
                speed: 50.0,
                max_force: 150.0,
                arrival_tolerance: 1.0,
            },
        ),
        MovementBehaviorDef::new(
            "cargo_route",
            MovementKind::Seek {
                speed: 30.0,
                max_force: 60.0,
                arrival_tolerance: 5.0,
            },
        ),
    ]
}

/// Default AI behaviors, in declaration order
pub fn ai_behaviors() -> Vec<AiBehaviorDef> {
    vec![
        AiBehaviorDef::new(
            "default_idle",
            0,
            AiKind::Idle {
                energy_recovery_rate: 15.0,
                alertness_decay: 0.1,
            },
        ),
        AiBehaviorDef::new(
            "security_patrol",
            10,
            AiKind::Patrol {
                waypoints: square(0.0, 100.0),
                arrival_tolerance: 15.0,
            },
        )
        .for_types(&["fighter"])
        .with_energy_cost(3.0),
        AiBehaviorDef::new(
            "pirate_hunt",
            20,
            AiKind::Hunt {
                detection_range: 120.0,
                target_types: vec!["cargo_ship".into(), "mining_ship".into()],
                memory_duration: 15.0,
            },
        )
        .for_types(&["fighter"])
        .with_energy_cost(6.0),
        AiBehaviorDef::new(
            "resource_hunter",
            12,
            AiKind::Hunt {
                detection_range: 200.0,
                target_types: vec!["asteroid".into()],
                memory_duration: 20.0,
            },
        )
        .for_types(&["mining_ship"])
        .with_energy_cost(2.0),
        AiBehaviorDef::new(
            "merchant_flee",
            30,
            AiKind::Flee {
                detection_range: 100.0,
                threat_types: vec!["fighter".into()],
                flee_range: 250.0,
            },
        )
        .for_types(&["cargo_ship", "mining_ship"])
        .with_energy_cost(10.0),
        AiBehaviorDef::new(
            "station_guard",
            15,
            AiKind::Guard {
                guard_position: Vec2::ZERO,
                guard_radius: 80.0,
                alert_range: 150.0,
                threat_types: vec!["fighter".into()],
                memory_duration: 10.0,
            },
        )
        .for_types(&["space_station"])
        .with_energy_cost(4.0),
        AiBehaviorDef::new(
            "trade_run",
            8,
            AiKind::Trade {
                trade_routes: vec![
                    vec![
                        Vec2::new(200.0, 200.0),
                        Vec2::new(400.0, 200.0),
                        Vec2::new(400.0, 400.0),
                    ],
                    vec![Vec2::new(100.0, 300.0), Vec2::new(300.0, 300.0)],
                ],
                arrival_tolerance: 20.0,
                wait_time: 3.0,
            },
        )
        .for_types(&["cargo_ship"])
        .with_energy_cost(2.0),
    ]
}

/// Registry holding the default catalogue
pub(crate) fn registry() -> BehaviorRegistry {
    let mut registry = BehaviorRegistry::new();
    // Catalogue names are unique, so registration cannot fail
    for def in movement_behaviors() {
        let _ = registry.register_movement(def);
    }
    for def in ai_behaviors() {
        let _ = registry.register_ai(def);
    }
    registry
}

/// The default catalogue as a combined JSON behavior file
pub fn default_config_json() -> Result<String> {
    registry().to_json()
}
