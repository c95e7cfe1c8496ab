// hunt_tracker_core/server/src/lib.rs

pub mod concurrent;
pub mod core;
pub mod platform;
pub mod roster;
pub mod systems;
pub mod tracker;

pub use crate::core::config::TrackerConfig;
pub use crate::core::error::{TrackerError, TrackerResult};
pub use crate::tracker::runtime::TrackerRuntime;
pub use crate::tracker::ModeTracker;
