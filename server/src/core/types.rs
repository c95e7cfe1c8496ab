// hunt_tracker_core/server/src/core/types.rs
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Deserialize;
use uuid::Uuid;

pub type ParticipantId = Uuid;
pub type FactionId = Arc<str>;

// --- Basic Geometric Types ---
#[derive(Clone, Debug, Copy, PartialEq)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Vec3 { x, y, z }
    }

    pub fn zero() -> Self {
        Vec3 { x: 0.0, y: 0.0, z: 0.0 }
    }

    pub fn distance_squared(&self, other: &Vec3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
pub enum DimensionKind {
    Overworld,
    Nether,
    TheEnd,
}

impl DimensionKind {
    /// Inclusive vertical bounds a scan may sample in this dimension.
    pub fn build_limits(&self) -> (i32, i32) {
        match self {
            DimensionKind::Overworld => (-64, 320),
            DimensionKind::Nether => (0, 128),
            DimensionKind::TheEnd => (0, 256),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Location {
    pub pos: Vec3,
    pub dimension: DimensionKind,
}

impl Location {
    pub fn new(pos: Vec3, dimension: DimensionKind) -> Self {
        Location { pos, dimension }
    }
}

// --- Beacon State ---
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeStatus {
    Charging,
    Charged,
}

impl Default for ChargeStatus {
    fn default() -> Self {
        ChargeStatus::Charging
    }
}

#[derive(Clone, Debug)]
pub struct BeaconState {
    pub charge_status: ChargeStatus,
    pub last_charged_at: Option<Instant>,
    pub last_displayed_target: Option<Vec3>,
}

impl BeaconState {
    pub fn new() -> Self {
        BeaconState {
            charge_status: ChargeStatus::Charging,
            last_charged_at: None,
            last_displayed_target: None,
        }
    }
}

impl Default for BeaconState {
    fn default() -> Self {
        Self::new()
    }
}

// --- Presentation-Facing Enums ---
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusKind {
    Blindness,
    DamageImmunity,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BeaconLabel {
    Charged,
    Cooldown { seconds_remaining: u64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealEffect {
    /// Opposing members light up for everyone nearby.
    Glow { duration: Duration },
    /// Cross-dimension flourish flavored by where the opposition mostly is.
    DimensionRift(DimensionKind),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKey {
    BeaconCharged,
    RevealFired,
    Revealed,
    RestrictionCountdown,
    RestrictionOver,
    TrackingFaction,
}
