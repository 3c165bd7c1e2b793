//! Concrete step policies
//!
//! - `AsteroidShower`: asteroids rain onto a single platform and bounce
//! - `BernardRun`: the game proper; Bernard hops platforms and dodges asteroids
//!
//! Both own their random source so a seeded generator reproduces a run.

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::body::{MaterialHandle, RigidBody, ShapeHandle};
use super::collision::{
    HitOutcome, HitResponse, LateralProbe, PlatformBounce, body_hits_player, floor_bounce,
    lateral_platform_contact, resolve_body_platform, resolve_player_hit, should_despawn,
};
use super::contact::{ContactProbe, Platform, compute_net_force, compute_platform_force};
use super::particle::{MoveIntent, Player};
use super::scheduler::StepPolicy;
use super::spawn::{SpawnRanges, Spawner};
use crate::consts::*;

/// Notifications for the UI, drained after each frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// An asteroid struck the player
    PlayerHit,
    /// The player fell off the world and was put back at the start
    PlayerRespawned,
    /// The last life was lost
    GameOver,
}

/// Point bodies are measured from for despawning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DespawnAnchor {
    #[default]
    Origin,
    Player,
}

// --- Asteroid shower ---

/// Asteroid shower configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowerConfig {
    pub gravity: Vec3,
    pub platform: Platform,
    pub bounce: PlatformBounce,
    pub floor_y: f32,
    pub population: usize,
    pub spawn: SpawnRanges,
    pub despawn_radius: f32,
}

impl Default for ShowerConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            platform: Platform::new(Vec3::new(0.0, 5.0, 0.0), 0.0, 0.0, 7.5, 5.0),
            bounce: PlatformBounce::default(),
            floor_y: SHOWER_FLOOR_Y,
            population: 3,
            spawn: SpawnRanges::shower(),
            despawn_radius: SHOWER_DESPAWN_RADIUS,
        }
    }
}

/// Running totals for a shower
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShowerStats {
    pub platform_bounces: u64,
    pub floor_bounces: u64,
    pub despawned: u64,
    pub spawned: u64,
}

/// Asteroids falling onto one platform
#[derive(Debug)]
pub struct AsteroidShower<R: Rng> {
    pub config: ShowerConfig,
    pub stats: ShowerStats,
    spawner: Spawner,
    rng: R,
}

impl<R: Rng> AsteroidShower<R> {
    pub fn new(config: ShowerConfig, rng: R) -> Self {
        let spawner = Spawner::new(config.population, config.spawn.clone());
        Self {
            config,
            stats: ShowerStats::default(),
            spawner,
            rng,
        }
    }

    /// Shapes and material given to spawned asteroids
    pub fn with_assets(mut self, shapes: Vec<ShapeHandle>, material: MaterialHandle) -> Self {
        self.spawner.shapes = shapes;
        self.spawner.material = material;
        self
    }
}

impl<R: Rng> StepPolicy for AsteroidShower<R> {
    fn compute_step(&mut self, dt: f32, bodies: &mut Vec<RigidBody>) {
        let config = &self.config;

        for body in bodies.iter_mut() {
            body.linear_velocity += config.gravity * dt;

            if floor_bounce(body, config.floor_y, config.bounce.restitution) {
                self.stats.floor_bounces += 1;
            }
            if resolve_body_platform(body, &config.platform, &config.bounce) {
                self.stats.platform_bounces += 1;
            }
        }

        let before = bodies.len();
        bodies.retain(|b| !should_despawn(b.center, Vec3::ZERO, config.despawn_radius));
        let removed = before - bodies.len();
        if removed > 0 {
            log::debug!("Despawned {} asteroids", removed);
            self.stats.despawned += removed as u64;
        }

        self.stats.spawned += self.spawner.replenish(bodies, Vec3::ZERO, &mut self.rng) as u64;
    }
}

// --- Bernard's run ---

/// Player game configuration (level layout and tuning)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub gravity: Vec3,
    pub player_mass: f32,
    pub player_start: Vec3,
    pub player_velocity: Vec3,
    /// Tried in order for contact; the first hit wins
    pub platforms: Vec<Platform>,
    pub contact_probe: ContactProbe,
    pub lateral_probe: LateralProbe,
    pub population: usize,
    pub spawn: SpawnRanges,
    /// Asteroid-vs-platform response, if asteroids should land on platforms
    pub platform_bounce: Option<PlatformBounce>,
    pub hit: HitResponse,
    pub despawn_anchor: DespawnAnchor,
    pub despawn_radius: f32,
}

impl Default for RunConfig {
    fn default() -> Self {
        let pad = |x: f32, y: f32, half: f32| Platform::new(Vec3::new(x, y, 2.0), 15000.0, 20.0, half, half);
        Self {
            gravity: GRAVITY,
            player_mass: 1.0,
            player_start: Vec3::new(-3.0, 4.0, 2.0),
            player_velocity: Vec3::ZERO,
            platforms: vec![
                pad(-3.0, 1.0, 3.0),
                pad(6.0, 5.0, 2.0),
                pad(13.0, 4.0, 2.0),
                pad(-10.0, 12.0, 2.0),
                pad(-20.0, 8.0, 2.0),
                pad(-32.0, 4.0, 3.0),
                pad(2.0, 42.0, 2.0),
            ],
            contact_probe: ContactProbe::default(),
            lateral_probe: LateralProbe::default(),
            population: 3,
            spawn: SpawnRanges::run(),
            platform_bounce: Some(PlatformBounce {
                policy: super::collision::BouncePolicy::InvertOnly,
                ..Default::default()
            }),
            hit: HitResponse::default(),
            despawn_anchor: DespawnAnchor::Player,
            despawn_radius: RUN_DESPAWN_RADIUS,
        }
    }
}

impl RunConfig {
    /// Spring testbed: the player bouncing on two stiff pads, no asteroids
    pub fn spring_testbed() -> Self {
        Self {
            player_start: Vec3::new(2.0, 4.0, 2.0),
            player_velocity: Vec3::new(1.0, 0.0, 1.0),
            platforms: vec![
                Platform::new(Vec3::new(2.5, 1.0, 2.5), 12500.0, 10.0, 1.0, 1.0),
                Platform::new(Vec3::new(5.0, 2.0, 5.0), 12500.0, 10.0, 1.0, 1.0),
            ],
            contact_probe: ContactProbe::point(),
            population: 0,
            platform_bounce: None,
            ..Default::default()
        }
    }
}

/// The player game
#[derive(Debug)]
pub struct BernardRun<R: Rng> {
    pub config: RunConfig,
    player: Player,
    spawner: Spawner,
    rng: R,
    intent: MoveIntent,
    events: Vec<GameEvent>,
    game_over: bool,
}

impl<R: Rng> BernardRun<R> {
    pub fn new(config: RunConfig, rng: R) -> Self {
        let player = Player::new(config.player_mass, config.player_start, config.player_velocity);
        let spawner = Spawner::new(config.population, config.spawn.clone());
        Self {
            config,
            player,
            spawner,
            rng,
            intent: MoveIntent::None,
            events: Vec::new(),
            game_over: false,
        }
    }

    /// Shapes and material given to spawned asteroids
    pub fn with_assets(mut self, shapes: Vec<ShapeHandle>, material: MaterialHandle) -> Self {
        self.spawner.shapes = shapes;
        self.spawner.material = material;
        self
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Player {
        &mut self.player
    }

    pub fn platforms(&self) -> &[Platform] {
        &self.config.platforms
    }

    /// Request a sideways move on the next fixed step
    pub fn set_intent(&mut self, intent: MoveIntent) {
        self.intent = intent;
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// Take the events raised since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    fn despawn_anchor(&self) -> Vec3 {
        match self.config.despawn_anchor {
            DespawnAnchor::Origin => Vec3::ZERO,
            DespawnAnchor::Player => self.player.position(),
        }
    }

    /// Lateral blocking, then forces and integration of the player
    fn step_player(&mut self, dt: f32) {
        let config = &self.config;
        let intent = std::mem::take(&mut self.intent);
        let contact = lateral_platform_contact(self.player.position(), &config.platforms, &config.lateral_probe);
        match contact {
            Some(side) if side.blocks(intent) => {}
            _ => self.player.nudge(intent),
        }

        let body = &mut self.player.body;
        let platform_force =
            compute_platform_force(&config.platforms, &config.contact_probe, body.position, body.velocity);
        body.applied_force = compute_net_force(config.gravity, body.mass, platform_force);
        if body.integrate(dt) {
            log::debug!("Player fell off the world, respawning");
            self.events.push(GameEvent::PlayerRespawned);
        }

        self.player.score += dt;
    }
}

impl<R: Rng> StepPolicy for BernardRun<R> {
    fn compute_step(&mut self, dt: f32, bodies: &mut Vec<RigidBody>) {
        if self.game_over {
            return;
        }

        self.step_player(dt);

        let config = &self.config;
        for body in bodies.iter_mut() {
            body.linear_velocity += config.gravity * dt;

            if let Some(bounce) = &config.platform_bounce {
                for platform in &config.platforms {
                    if resolve_body_platform(body, platform, bounce) {
                        break;
                    }
                }
            }

            if !body_hits_player(body.center, self.player.position(), config.hit.leeway) {
                continue;
            }
            self.events.push(GameEvent::PlayerHit);
            match resolve_player_hit(body, &mut self.player, &config.hit) {
                HitOutcome::Struck { lives_remaining } => {
                    log::debug!("Player hit, {} lives remaining", lives_remaining);
                }
                HitOutcome::Fatal => {
                    log::info!("Game over after {:.2}s", self.player.score);
                    self.events.push(GameEvent::GameOver);
                    self.game_over = true;
                    return;
                }
            }
        }

        let anchor = self.despawn_anchor();
        let radius = self.config.despawn_radius;
        let before = bodies.len();
        bodies.retain(|b| !should_despawn(b.center, anchor, radius));
        if bodies.len() < before {
            log::debug!("Despawned {} asteroids", before - bodies.len());
        }

        let spawn_anchor = self.player.position() * Vec3::new(1.0, 1.0, 0.0);
        self.spawner.replenish(bodies, spawn_anchor, &mut self.rng);
    }

    fn wants_halt(&self) -> bool {
        self.game_over
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Mat4;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn rock(center: Vec3, velocity: Vec3) -> RigidBody {
        RigidBody::new(ShapeHandle(0), MaterialHandle(0), Vec3::ONE).emplaced(
            Mat4::from_translation(center),
            velocity,
            0.0,
            Vec3::Y,
        )
    }

    fn quiet_run(config: RunConfig) -> BernardRun<Pcg32> {
        BernardRun::new(RunConfig { population: 0, ..config }, Pcg32::seed_from_u64(1))
    }

    #[test]
    fn test_shower_replenishes_after_despawn() {
        let mut shower = AsteroidShower::new(ShowerConfig::default(), Pcg32::seed_from_u64(3));
        let mut bodies = vec![rock(Vec3::new(0.0, 60.0, 0.0), Vec3::ZERO)];
        shower.compute_step(0.05, &mut bodies);
        assert_eq!(shower.stats.despawned, 1);
        assert_eq!(bodies.len(), 3);
        assert!(bodies.iter().all(|b| b.center.length() <= 50.0));
    }

    #[test]
    fn test_shower_bounces_on_platform() {
        let config = ShowerConfig {
            population: 1,
            ..Default::default()
        };
        let mut shower = AsteroidShower::new(config, Pcg32::seed_from_u64(3));
        let mut bodies = vec![rock(Vec3::new(0.0, 5.9, 0.0), Vec3::new(0.0, -2.0, 0.0))];
        shower.compute_step(0.05, &mut bodies);
        assert_eq!(shower.stats.platform_bounces, 1);
        assert!(bodies[0].linear_velocity.y > 0.0);
        assert!((bodies[0].center.y - 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_player_bounces_on_platform() {
        let mut run = quiet_run(RunConfig::default());
        let mut bodies = Vec::new();
        let mut bounced = false;
        for _ in 0..300 {
            run.compute_step(RUN_DT, &mut bodies);
            bounced |= run.player().body.velocity.y > 0.0;
        }
        // The stiff spring throws the player back up rather than letting it sink through
        assert!(bounced);
        assert!(!run.drain_events().contains(&GameEvent::PlayerRespawned));
        assert!((run.player().score() - 5.0).abs() < 1e-2);
    }

    #[test]
    fn test_intent_is_one_shot() {
        let mut run = quiet_run(RunConfig::default());
        let x0 = run.player().position().x;
        run.set_intent(MoveIntent::Right);
        run.compute_step(RUN_DT, &mut Vec::new());
        run.compute_step(RUN_DT, &mut Vec::new());
        assert!((run.player().position().x - (x0 + NUDGE_STEP)).abs() < 1e-5);
    }

    #[test]
    fn test_lateral_contact_blocks_intent() {
        let config = RunConfig {
            platforms: vec![Platform::new(Vec3::new(0.0, 1.0, 2.0), 0.0, 0.0, 2.0, 2.0)],
            gravity: Vec3::ZERO,
            player_start: Vec3::new(3.5, 2.25, 2.0),
            ..Default::default()
        };
        let mut run = quiet_run(config);
        run.set_intent(MoveIntent::Left);
        run.compute_step(RUN_DT, &mut Vec::new());
        assert_eq!(run.player().position().x, 3.5);

        run.set_intent(MoveIntent::Right);
        run.compute_step(RUN_DT, &mut Vec::new());
        assert_eq!(run.player().position().x, 3.5 + NUDGE_STEP);
    }

    #[test]
    fn test_hit_raises_event_and_costs_life() {
        let config = RunConfig {
            gravity: Vec3::ZERO,
            platforms: Vec::new(),
            player_start: Vec3::new(0.0, 10.0, 2.0),
            ..Default::default()
        };
        let mut run = quiet_run(config);
        let mut bodies = vec![rock(Vec3::new(0.5, 11.0, 2.0), Vec3::new(0.0, -3.0, 0.0))];
        run.compute_step(RUN_DT, &mut bodies);

        assert_eq!(run.drain_events(), vec![GameEvent::PlayerHit]);
        assert_eq!(run.player().lives_remaining(), START_LIVES - 1);
        assert!(run.drain_events().is_empty());
    }

    #[test]
    fn test_last_life_ends_game() {
        let config = RunConfig {
            gravity: Vec3::ZERO,
            platforms: Vec::new(),
            player_start: Vec3::new(0.0, 10.0, 2.0),
            ..Default::default()
        };
        let mut run = quiet_run(config);
        run.player_mut().lives = 1;
        let mut bodies = vec![rock(Vec3::new(0.5, 11.0, 2.0), Vec3::ZERO)];
        run.compute_step(RUN_DT, &mut bodies);

        assert!(run.is_game_over());
        assert!(run.wants_halt());
        assert_eq!(run.drain_events(), vec![GameEvent::PlayerHit, GameEvent::GameOver]);

        // Further steps change nothing
        let score = run.player().score();
        run.compute_step(RUN_DT, &mut bodies);
        assert_eq!(run.player().score(), score);
    }

    #[test]
    fn test_fall_respawns_player() {
        let config = RunConfig {
            platforms: Vec::new(),
            player_start: Vec3::new(0.0, -9.9, 2.0),
            ..Default::default()
        };
        let mut run = quiet_run(config);
        for _ in 0..10 {
            run.compute_step(RUN_DT, &mut Vec::new());
        }
        assert!(run.drain_events().contains(&GameEvent::PlayerRespawned));
    }

    #[test]
    fn test_run_despawns_relative_to_player() {
        let mut run = BernardRun::new(RunConfig::default(), Pcg32::seed_from_u64(11));
        let far = run.player().position() + Vec3::new(45.0, 0.0, 0.0);
        let mut bodies = vec![rock(far, Vec3::ZERO)];
        run.compute_step(RUN_DT, &mut bodies);
        assert_eq!(bodies.len(), 3);
        let player = run.player().position();
        assert!(bodies.iter().all(|b| b.center.distance(player) <= 40.0));
    }
}
