//! Survival game core
//!
//! Sessions, difficulty, spawning, collisions and scoring. A session only
//! changes through `tick` with an explicit delta and draws randomness from
//! its own seeded generator, so a seed plus an input sequence replays
//! exactly. The outside world is reached through the seams the state
//! machine is given: input and rendering via `platform`, saved scores via
//! a `LeaderboardStore`.

pub mod clock;
pub mod collision;
pub mod difficulty;
pub mod events;
pub mod machine;
pub mod spawn;
pub mod state;
pub mod tick;
pub mod world;

pub use clock::Clock;
pub use collision::Aabb;
pub use difficulty::{DifficultyStrategy, NightmareCurve, ProjectileParams};
pub use events::{
    EventBus, EventKind, GameEvent, ScoreKeeper, StatsTracker, Subscriber, SubscriberId,
};
pub use machine::{
    FrameView, GameStateMachine, ProjectileView, SessionSnapshot, TelegraphView, TickSummary,
};
pub use spawn::{SpawnOrder, SpawnScheduler, TrajectoryPolicy};
pub use state::{Mode, Phase, Player, Projectile, Session, SizeClass, Telegraph};
pub use tick::{TickInput, TickOutcome, tick};
pub use world::{CollisionEvent, EntityWorld};
