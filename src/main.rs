//! Bernard - headless native driver
//!
//! Runs one scenario against a synthetic, slightly jittery display clock and
//! reports what happened. Usage: `bernard [settings.json]`

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use bernard::render::{self, AssetRegistry};
    use bernard::sim::{
        AsteroidShower, BernardRun, FixedTimestepScheduler, GameEvent, MoveIntent, RunConfig,
        ShowerConfig, StepPolicy,
    };
    use bernard::{HighScores, ScenarioKind, Settings};
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    /// How often (in frames) the scripted player picks a new move
    const INTENT_INTERVAL: u32 = 15;

    /// Feed `settings.frames` jittered frame times into the scheduler.
    ///
    /// `on_frame` sees the scheduler after every frame; it returns false to stop early.
    fn drive<P, F>(scheduler: &mut FixedTimestepScheduler<P>, settings: &Settings, mut on_frame: F)
    where
        P: StepPolicy,
        F: FnMut(u32, &mut FixedTimestepScheduler<P>) -> bool,
    {
        let mut clock_rng = Pcg32::seed_from_u64(settings.seed.wrapping_add(1));
        let nominal = settings.frame_time();
        let jitter = settings.frame_jitter.clamp(0.0, 1.0);

        scheduler.set_time_scale(settings.time_scale);
        scheduler.start();

        for frame in 0..settings.frames {
            let wobble = (clock_rng.random::<f32>() - 0.5) * 2.0 * jitter;
            scheduler.tick(nominal * (1.0 + wobble));

            let drawn = render::extract_instances(scheduler.bodies());
            log::trace!(
                "frame {}: {} steps, {} batches",
                frame,
                scheduler.steps_taken(),
                drawn.len()
            );

            if !on_frame(frame, scheduler) || !scheduler.is_running() {
                break;
            }
        }
    }

    fn run_game(settings: &Settings, config: RunConfig) {
        let assets = AssetRegistry::asteroids();
        let policy = BernardRun::new(config, Pcg32::seed_from_u64(settings.seed))
            .with_assets(assets.shape_handles(), bernard::sim::MaterialHandle(0));
        let mut scheduler = FixedTimestepScheduler::new(policy, settings.effective_fixed_step());
        let mut input_rng = Pcg32::seed_from_u64(settings.seed.wrapping_add(2));

        drive(&mut scheduler, settings, |frame, s| {
            if frame % INTENT_INTERVAL == 0 {
                let intent = match input_rng.random_range(0..3) {
                    0 => MoveIntent::Left,
                    1 => MoveIntent::Right,
                    _ => MoveIntent::None,
                };
                s.policy_mut().set_intent(intent);
            }

            let events = s.policy_mut().drain_events();
            for event in events {
                let player = s.policy().player();
                match event {
                    GameEvent::PlayerHit => log::info!(
                        "Hit at {:.2}s, {} lives left",
                        player.score(),
                        player.lives_remaining()
                    ),
                    GameEvent::PlayerRespawned => log::info!("Bernard fell and respawned"),
                    GameEvent::GameOver => log::info!("Game over"),
                }
            }

            let transform = render::player_transform(s.policy().player().position());
            log::trace!("player drawn at {:?}", transform.w_axis);
            true
        });

        let player = scheduler.policy().player();
        let score = player.score();
        log::info!(
            "Survived {:.2}s over {} steps with {} lives left",
            score,
            scheduler.steps_taken(),
            player.lives_remaining()
        );

        if let Some(path) = &settings.highscores_path {
            let mut scores = HighScores::load(path);
            match scores.add_score(score, scheduler.steps_taken(), settings.seed) {
                Some(rank) => {
                    log::info!("New best time, rank {}", rank);
                    scores.save(path);
                }
                None => log::info!("Not a best time"),
            }
        }
    }

    fn run_shower(settings: &Settings) {
        let assets = AssetRegistry::asteroids();
        let policy = AsteroidShower::new(ShowerConfig::default(), Pcg32::seed_from_u64(settings.seed))
            .with_assets(assets.shape_handles(), bernard::sim::MaterialHandle(0));
        let mut scheduler = FixedTimestepScheduler::new(policy, settings.effective_fixed_step());

        drive(&mut scheduler, settings, |_, _| true);

        let stats = scheduler.policy().stats;
        log::info!(
            "Shower: {} steps, {} spawned, {} despawned, {} platform bounces, {} floor bounces",
            scheduler.steps_taken(),
            stats.spawned,
            stats.despawned,
            stats.platform_bounces,
            stats.floor_bounces
        );
    }

    pub fn main() {
        env_logger::init();

        let settings = match std::env::args().nth(1) {
            Some(path) => Settings::load_from(path),
            None => Settings::default(),
        };
        log::info!(
            "Bernard starting: scenario {}, seed {}, {} frames",
            settings.scenario.as_str(),
            settings.seed,
            settings.frames
        );

        match settings.scenario {
            ScenarioKind::Run => run_game(&settings, RunConfig::default()),
            ScenarioKind::SpringTestbed => run_game(&settings, RunConfig::spring_testbed()),
            ScenarioKind::Shower => run_shower(&settings),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    native::main();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The wasm build is used as a library only
}
