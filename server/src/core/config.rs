// hunt_tracker_core/server/src/core/config.rs
use std::time::Duration;

use serde::Deserialize;

use super::constants;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChargeConfig {
    pub first_charge_delay: Duration,
    pub charge_interval: Duration,
}

impl Default for ChargeConfig {
    fn default() -> Self {
        ChargeConfig {
            first_charge_delay: constants::FIRST_CHARGE_DELAY,
            charge_interval: constants::CHARGE_INTERVAL,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnchorScanConfig {
    pub step: i32,
    pub radius: i32,
    pub ttl: Duration,
    pub movement_threshold: f64,
}

impl AnchorScanConfig {
    pub fn movement_threshold_sq(&self) -> f64 {
        self.movement_threshold * self.movement_threshold
    }
}

impl Default for AnchorScanConfig {
    fn default() -> Self {
        AnchorScanConfig {
            step: constants::ANCHOR_SCAN_STEP,
            radius: constants::ANCHOR_SCAN_RADIUS,
            ttl: constants::ANCHOR_SCAN_TTL,
            movement_threshold: constants::ANCHOR_SCAN_MOVE_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub charge: ChargeConfig,
    pub scan: AnchorScanConfig,
    pub restriction_window: Duration,
    pub reveal_notify_radius: f64,
    pub reveal_glow_duration: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig {
            charge: ChargeConfig::default(),
            scan: AnchorScanConfig::default(),
            restriction_window: constants::RESTRICTION_WINDOW,
            reveal_notify_radius: constants::REVEAL_NOTIFY_RADIUS,
            reveal_glow_duration: constants::REVEAL_GLOW_DURATION,
        }
    }
}
