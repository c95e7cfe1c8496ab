// hunt_tracker_core/server/src/concurrent/mod.rs
pub mod anchor_cache;
