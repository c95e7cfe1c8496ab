// hunt_tracker_core/server/src/core/constants.rs
use std::time::Duration;

// Tick cadence
pub const TRACK_TICK_INTERVAL: Duration = Duration::from_secs(1);
pub const RESTRICTION_TICK_INTERVAL: Duration = Duration::from_millis(500);
pub const SLOW_TICK_LOG_MS: u64 = 250; // warn if a tracker tick exceeds this

// Charge economy
pub const FIRST_CHARGE_DELAY: Duration = Duration::from_secs(240);
pub const CHARGE_INTERVAL: Duration = Duration::from_secs(120);

// Restricted phase
pub const RESTRICTION_WINDOW: Duration = Duration::from_secs(120);
pub const STATUS_REFRESH_DURATION: Duration = Duration::from_secs(3); // reapplied every restriction tick

// Anchor scan
pub const ANCHOR_SCAN_STEP: i32 = 4;
pub const ANCHOR_SCAN_RADIUS: i32 = 128;
pub const ANCHOR_SCAN_TTL: Duration = Duration::from_secs(10);
pub const ANCHOR_SCAN_MOVE_THRESHOLD: f64 = 24.0;

// Reveal
pub const REVEAL_NOTIFY_RADIUS: f64 = 64.0;
pub const REVEAL_GLOW_DURATION: Duration = Duration::from_secs(15);

// Factions
pub const MAX_RACE_FACTIONS: usize = 10;

// Durable store flag keys
pub const FLAG_HUNT_ENABLED: &str = "hunt_enabled";
pub const FLAG_MANHUNT_ENABLED: &str = "manhunt_enabled";
pub const FLAG_TEAM_RACE_ENABLED: &str = "team_race_enabled";
