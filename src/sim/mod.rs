//! Deterministic simulation module
//!
//! All gameplay physics lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Injected, seedable RNG only
//! - Stable iteration order (bodies in insertion order, platforms in list order)
//! - No rendering or platform dependencies

pub mod body;
pub mod collision;
pub mod contact;
pub mod particle;
pub mod scenario;
pub mod scheduler;
pub mod spawn;

pub use body::{Collider, MaterialHandle, Pose, RigidBody, ShapeHandle, Volume};
pub use collision::{
    BouncePolicy, HitOutcome, HitResponse, LateralContact, LateralProbe, PlatformBounce,
    body_hits_player, body_overlaps_platform, damped_reflection, floor_bounce,
    lateral_platform_contact, resolve_body_platform, resolve_player_hit, should_despawn,
};
pub use contact::{ContactProbe, PLATFORM_NORMAL, Platform, compute_net_force, compute_platform_force};
pub use particle::{MoveIntent, Particle, Player};
pub use scenario::{
    AsteroidShower, BernardRun, DespawnAnchor, GameEvent, RunConfig, ShowerConfig, ShowerStats,
};
pub use scheduler::{FixedTimestepScheduler, RunMode, SimulationClock, StepPolicy};
pub use spawn::{SpawnRanges, Spawner};
