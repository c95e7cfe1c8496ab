// hunt_tracker_core/server/src/systems/restriction.rs
//
// Time-windowed lockdown of one faction at match start. Effects are
// re-applied with a short duration every tick instead of being set once, so
// they survive external effect clearing and reconnects.

use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tracing::{debug, info};

use crate::core::constants::STATUS_REFRESH_DURATION;
use crate::core::types::{MessageKey, ParticipantId, StatusKind};
use crate::platform::{ParticipantLocator, Presentation};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RestrictionPhase {
    Inactive,
    Restricted,
    Released,
}

struct RestrictionState {
    started_at: Option<Instant>,
    release_done: bool,
}

pub struct RestrictionController {
    window: Duration,
    status_refresh: Duration,
    state: RwLock<RestrictionState>,
}

impl RestrictionController {
    pub fn new(window: Duration) -> Self {
        RestrictionController {
            window,
            status_refresh: STATUS_REFRESH_DURATION,
            state: RwLock::new(RestrictionState {
                started_at: None,
                release_done: false,
            }),
        }
    }

    pub fn start(&self, now: Instant) {
        let mut state = self.state.write();
        state.started_at = Some(now);
        state.release_done = false;
        info!("restricted phase armed for {:?}", self.window);
    }

    pub fn stop(&self) {
        let mut state = self.state.write();
        state.started_at = None;
        state.release_done = false;
    }

    pub fn phase(&self, now: Instant) -> RestrictionPhase {
        match self.state.read().started_at {
            None => RestrictionPhase::Inactive,
            Some(started) if now.duration_since(started) < self.window => {
                RestrictionPhase::Restricted
            }
            Some(_) => RestrictionPhase::Released,
        }
    }

    pub fn is_restricted(&self, now: Instant) -> bool {
        self.phase(now) == RestrictionPhase::Restricted
    }

    pub fn seconds_remaining(&self, now: Instant) -> u64 {
        match self.state.read().started_at {
            Some(started) => self
                .window
                .saturating_sub(now.duration_since(started))
                .as_secs(),
            None => 0,
        }
    }

    /// Called on the half-second cadence for every member of the restricted
    /// faction. Refreshes the statuses while restricted; removes them exactly
    /// once on release.
    pub fn tick(
        &self,
        members: &[ParticipantId],
        locator: &dyn ParticipantLocator,
        presentation: &dyn Presentation,
        now: Instant,
    ) {
        match self.phase(now) {
            RestrictionPhase::Inactive => {}
            RestrictionPhase::Restricted => {
                for member in members {
                    if !locator.is_online(member) {
                        continue;
                    }
                    presentation.apply_status(member, StatusKind::Blindness, self.status_refresh);
                    presentation.apply_status(
                        member,
                        StatusKind::DamageImmunity,
                        self.status_refresh,
                    );
                }
            }
            RestrictionPhase::Released => {
                {
                    let mut state = self.state.write();
                    if state.release_done {
                        return;
                    }
                    state.release_done = true;
                }
                for member in members {
                    presentation.remove_status(member, StatusKind::Blindness);
                    presentation.remove_status(member, StatusKind::DamageImmunity);
                    presentation.notify(member, MessageKey::RestrictionOver, &[]);
                }
                info!("restricted phase over for {} members", members.len());
            }
        }
    }

    /// Reconnect reconciliation: re-applies statuses with the live countdown
    /// while the window is open, and clears immunity after it has closed in
    /// case the member was offline at release.
    pub fn on_rejoin(
        &self,
        participant: &ParticipantId,
        presentation: &dyn Presentation,
        now: Instant,
    ) {
        match self.phase(now) {
            RestrictionPhase::Inactive => {}
            RestrictionPhase::Restricted => {
                presentation.apply_status(participant, StatusKind::Blindness, self.status_refresh);
                presentation.apply_status(
                    participant,
                    StatusKind::DamageImmunity,
                    self.status_refresh,
                );
                let remaining = self.seconds_remaining(now);
                presentation.notify(
                    participant,
                    MessageKey::RestrictionCountdown,
                    &[remaining.to_string()],
                );
                debug!("{} rejoined with {}s of restriction left", participant, remaining);
            }
            RestrictionPhase::Released => {
                presentation.remove_status(participant, StatusKind::DamageImmunity);
            }
        }
    }
}
