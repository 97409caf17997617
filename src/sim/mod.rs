//! Simulation module
//!
//! All gameplay logic lives here. The simulation is deterministic for a
//! given seed and frame sequence:
//! - One seeded `Pcg32` drives every random roll
//! - Collections are iterated in insertion order and rebuilt with `retain`
//! - No rendering or platform dependencies; `snapshot` is a pure read

pub mod attack;
pub mod boss;
pub mod collision;
pub mod effects;
pub mod enemy;
pub mod entity;
pub mod input;
pub mod pickup;
pub mod player;
pub mod projectile;
pub mod snapshot;
pub mod spawner;
pub mod state;
pub mod status;
pub mod tick;

pub use attack::{AttackCycle, CyclePhase};
pub use boss::{Boss, BossPhase};
pub use collision::{Aabb, CollisionResult};
pub use effects::Effects;
pub use enemy::{Enemy, EnemyCommand, EnemyKind, SmartCtx};
pub use entity::{Body, Color, palette};
pub use input::{InputState, Joystick};
pub use pickup::{ExperienceCrystal, HealthPickup, Structure, StructureKind};
pub use player::{Drone, Player};
pub use projectile::{Bullet, EnemyBullet};
pub use snapshot::RenderFrame;
pub use state::{Camera, GameEvent, GamePhase, GameState};
pub use status::StatusEffects;
pub use tick::tick;
