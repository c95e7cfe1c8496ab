// hunt_tracker_core/server/src/systems/charge.rs
//
// Per-participant beacon charge state machine. Timing precision is the
// once-per-second evaluation cadence, not the underlying timers.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::debug;

use crate::core::config::ChargeConfig;
use crate::core::types::{BeaconState, ChargeStatus, ParticipantId, Vec3};

pub struct ChargeEconomy {
    beacons: DashMap<ParticipantId, BeaconState>,
    config: ChargeConfig,
}

impl ChargeEconomy {
    pub fn new(config: ChargeConfig) -> Self {
        ChargeEconomy {
            beacons: DashMap::new(),
            config,
        }
    }

    /// Creates the beacon state on first contact; later calls are no-ops.
    pub fn issue(&self, participant: ParticipantId) {
        self.beacons.entry(participant).or_insert_with(BeaconState::new);
    }

    pub fn status(&self, participant: &ParticipantId) -> Option<ChargeStatus> {
        self.beacons.get(participant).map(|entry| entry.charge_status)
    }

    /// Advances the state machine one step. Returns true exactly when the
    /// `Charging -> Charged` transition fires, so the caller can announce it
    /// once.
    pub fn tick(&self, participant: ParticipantId, match_start: Instant, now: Instant) -> bool {
        let mut entry = self.beacons.entry(participant).or_insert_with(BeaconState::new);
        if entry.charge_status == ChargeStatus::Charged {
            return false;
        }
        let ready = match entry.last_charged_at {
            None => now.duration_since(match_start) >= self.config.first_charge_delay,
            Some(last) => now.duration_since(last) >= self.config.charge_interval,
        };
        if ready {
            entry.charge_status = ChargeStatus::Charged;
            debug!("beacon charged for {}", participant);
        }
        ready
    }

    /// Consumes a charge. The check and the mutation happen under one entry
    /// guard, so concurrent attempts for the same participant cannot both
    /// succeed. An uncharged beacon fails without mutating anything.
    pub fn use_charge(&self, participant: &ParticipantId, now: Instant) -> bool {
        match self.beacons.get_mut(participant) {
            Some(mut entry) if entry.charge_status == ChargeStatus::Charged => {
                entry.charge_status = ChargeStatus::Charging;
                entry.last_charged_at = Some(now);
                true
            }
            _ => false,
        }
    }

    /// Pure read of the remaining cooldown for display purposes.
    pub fn cooldown_remaining(
        &self,
        participant: &ParticipantId,
        match_start: Instant,
        now: Instant,
    ) -> Duration {
        let entry = match self.beacons.get(participant) {
            Some(entry) => entry,
            None => return Duration::ZERO,
        };
        match (entry.charge_status, entry.last_charged_at) {
            (ChargeStatus::Charged, _) => Duration::ZERO,
            (ChargeStatus::Charging, Some(last)) => self
                .config
                .charge_interval
                .saturating_sub(now.duration_since(last)),
            (ChargeStatus::Charging, None) => self
                .config
                .first_charge_delay
                .saturating_sub(now.duration_since(match_start)),
        }
    }

    pub fn last_displayed_target(&self, participant: &ParticipantId) -> Option<Vec3> {
        self.beacons
            .get(participant)
            .and_then(|entry| entry.last_displayed_target)
    }

    pub fn record_displayed_target(&self, participant: ParticipantId, target: Vec3) {
        if let Some(mut entry) = self.beacons.get_mut(&participant) {
            entry.last_displayed_target = Some(target);
        }
    }

    pub fn clear(&self) {
        self.beacons.clear();
    }

    pub fn beacon_count(&self) -> usize {
        self.beacons.len()
    }
}
