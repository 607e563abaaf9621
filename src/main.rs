//! Tightline demo entry point
//!
//! Runs a scripted fishing session against an in-memory pond and logs what
//! happens. Usage: `tightline [settings.json] [seed]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Tightline (native) starting...");

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => match tightline::Settings::load(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("{}", e);
                std::process::exit(1);
            }
        },
        None => tightline::Settings::default(),
    };
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(7);

    if let Err(e) = demo::run(settings, seed) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Hosts embed the library directly; there is no web demo
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use glam::Vec2;

    use tightline::consts::{MAX_SUBSTEPS, SIM_DT};
    use tightline::sim::{
        BaitItem, BaitTier, Category, Env, FishingEvent, FishingState, LootEntry, LootKind,
        LootTier, Rod, RodRegistry, RngSeed, TickInput, WeightRange, equip_bait, tick,
    };
    use tightline::world::{BodyStore, ColliderDef, SceneDef, Shape, StaticWorld};
    use tightline::{ConfigError, Settings, ViewMode};

    /// Host frame length; deliberately not a multiple of the sim step
    const FRAME_DT: f32 = 1.0 / 45.0;
    const MAX_SECONDS: f32 = 60.0;
    const CAST_HOLD: f32 = 1.5;
    const REEL_START: f32 = 4.0;

    fn fish(id: &str, tier: LootTier, rarity: f32, min: f32, max: f32) -> LootEntry {
        LootEntry {
            id: id.to_string(),
            kind: LootKind::Fish,
            tier,
            rarity,
            weight_range: WeightRange { min, max },
            item_id: Some(format!("{id}_item")),
        }
    }

    fn pond_scene() -> SceneDef {
        let loot = vec![
            fish("perch", LootTier::Common, 60.0, 0.2, 1.5),
            fish("carp", LootTier::Uncommon, 25.0, 1.0, 6.0),
            fish("pike", LootTier::Rare, 10.0, 2.0, 9.0),
            LootEntry {
                id: "old_boot".to_string(),
                kind: LootKind::Item,
                tier: LootTier::Common,
                rarity: 5.0,
                weight_range: WeightRange { min: 0.5, max: 0.5 },
                item_id: Some("old_boot".to_string()),
            },
        ];

        SceneDef {
            colliders: vec![
                ColliderDef::new(
                    "bank",
                    Category::Ground,
                    Shape::Rect {
                        min: Vec2::new(-20.0, -8.0),
                        max: Vec2::new(0.0, 0.0),
                    },
                ),
                ColliderDef::new(
                    "pond",
                    Category::Liquid,
                    Shape::Rect {
                        min: Vec2::new(0.0, -6.0),
                        max: Vec2::new(30.0, -0.5),
                    },
                )
                .with_loot(loot),
                ColliderDef::new(
                    "bed",
                    Category::Ground,
                    Shape::Rect {
                        min: Vec2::new(0.0, -8.0),
                        max: Vec2::new(30.0, -6.0),
                    },
                ),
                ColliderDef::new(
                    "rock",
                    Category::Obstacle,
                    Shape::Circle {
                        center: Vec2::new(12.0, -3.0),
                        radius: 1.0,
                    },
                ),
            ],
        }
    }

    /// Hold the cast, wait for a bite, then reel in pulses
    fn scripted_input(t: f32) -> TickInput {
        TickInput {
            cast: t < CAST_HOLD,
            attract: t > REEL_START && (t - REEL_START) % 2.0 < 1.5,
        }
    }

    pub fn run(settings: Settings, seed: u64) -> Result<(), ConfigError> {
        let world = StaticWorld::from_scene(pond_scene())?;
        let mut bodies = match settings.view_mode {
            ViewMode::SideView => BodyStore::new(),
            ViewMode::TopDown => BodyStore::top_down(2.0),
        };
        let mut rng = RngSeed::new(seed).to_rng();
        let mut registry = RodRegistry::new();

        let rod = Rod::new(1, Vec2::new(-1.0, 1.0), Vec2::new(-0.5, 2.0));
        let mut state = FishingState::new(settings, rod, &mut registry)?;
        equip_bait(
            &mut state,
            BaitItem {
                tier: BaitTier::Uncommon,
                name: "Worm".to_string(),
                description: "Wriggly".to_string(),
                item_id: "worm".to_string(),
            },
            &mut bodies,
        );
        log::info!("Simulation seeded with {}", seed);

        let mut accumulator = 0.0_f32;
        let mut elapsed = 0.0_f32;
        let mut outcome = None;

        while elapsed < MAX_SECONDS && outcome.is_none() {
            accumulator += FRAME_DT;

            let mut substeps = 0;
            while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = scripted_input(elapsed);
                let mut env = Env::new(&world, &mut bodies, &mut rng);
                tick(&mut state, &input, SIM_DT, &mut env);
                bodies.integrate(SIM_DT, &world);

                accumulator -= SIM_DT;
                elapsed += SIM_DT;
                substeps += 1;

                for event in state.drain_events() {
                    log::info!("[{:6.2}s] {:?}", elapsed, event);
                    if matches!(
                        event,
                        FishingEvent::CatchSucceeded { .. }
                            | FishingEvent::CatchFailed
                            | FishingEvent::FloatRetrieved
                    ) {
                        outcome = Some(event);
                    }
                }
            }
        }

        match outcome {
            Some(FishingEvent::CatchSucceeded {
                loot_id, weight, ..
            }) => println!("Caught {} weighing {:.2} after {:.1}s", loot_id, weight, elapsed),
            Some(FishingEvent::CatchFailed) if state.line.is_broken => {
                println!("The line snapped after {:.1}s", elapsed)
            }
            Some(_) => println!("Came back empty after {:.1}s", elapsed),
            None => println!("Nothing happened in {:.0}s", MAX_SECONDS),
        }
        Ok(())
    }
}
