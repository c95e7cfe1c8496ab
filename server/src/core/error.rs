// hunt_tracker_core/server/src/core/error.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Unknown faction: {0}")]
    UnknownFaction(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type TrackerResult<T> = Result<T, TrackerError>;
