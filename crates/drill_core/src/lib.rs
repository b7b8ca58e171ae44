//! # drill_core - Futsal Drill Session Engine
//!
//! State engine behind an interactive futsal training board.
//!
//! ## Features
//! - Read-only drill catalog with level filtering (compiled-in JSON)
//! - Fixed-period session clock stepping the ball along a drill's path and
//!   counting completed laps ("passes")
//! - Playback state projecting the step onto balls, players and obstacles
//! - Difficulty dice and team randomizer
//! - Named workshops persisted to host key-value storage, with unsaved-change
//!   tracking in the session

pub mod catalog;
pub mod clock;
pub mod config;
pub mod difficulty;
pub mod error;
pub mod playback;
pub mod session;
pub mod teams;
pub mod workshop;

pub use catalog::{
    Cue, Drill, DrillCatalog, LevelFilter, Obstacle, ObstacleKind, Player, PlayerNumber, Point,
    Positions,
};
pub use clock::{ClockState, SessionClock, Tick, WallClock, TICK_PERIOD, TICK_PERIOD_MS};
pub use config::SessionConfig;
pub use difficulty::{Difficulty, DifficultyCatalog};
pub use error::{DrillError, Result};
pub use playback::PlaybackState;
pub use session::{DisplayOptions, Session, SessionError, SessionStatus};
pub use teams::Teams;
pub use workshop::{
    FileStore, KeyValueStore, MemoryStore, NewWorkshop, StorageError, StoreError, Workshop,
    WorkshopStore, DEFAULT_STORAGE_KEY,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
