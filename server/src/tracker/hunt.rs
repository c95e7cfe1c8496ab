// hunt_tracker_core/server/src/tracker/hunt.rs
//
// Asymmetric hunt: the hunter side carries beacons pointed at the runner
// side, and sits out the restricted phase at match start. Runners carry
// nothing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::core::config::TrackerConfig;
use crate::core::constants::FLAG_HUNT_ENABLED;
use crate::core::error::TrackerResult;
use crate::core::types::{BeaconLabel, ParticipantId};
use crate::platform::{AssignmentStore, ParticipantLocator, Presentation, WorldReader};
use crate::roster::{Faction, FactionColor, RosterStore, HUNTER_SIDE, RUNNER_SIDE};
use crate::systems::restriction::RestrictionController;

use super::{fire_reveal, update_member_beacon, ModeTracker, TrackContext};

pub struct HuntTracker {
    roster: Arc<RosterStore>,
    locator: Arc<dyn ParticipantLocator>,
    world: Arc<dyn WorldReader>,
    presentation: Arc<dyn Presentation>,
    store: Arc<dyn AssignmentStore>,
    config: TrackerConfig,
    ctx: TrackContext,
    restriction: RestrictionController,
    active: AtomicBool,
}

impl HuntTracker {
    pub fn new(
        roster: Arc<RosterStore>,
        locator: Arc<dyn ParticipantLocator>,
        world: Arc<dyn WorldReader>,
        presentation: Arc<dyn Presentation>,
        store: Arc<dyn AssignmentStore>,
        config: TrackerConfig,
    ) -> Self {
        roster.define_faction(Faction::new("hunters", "Hunter-side", FactionColor::Red));
        roster.define_faction(Faction::new("runners", "Runner-side", FactionColor::Blue));
        let restriction = RestrictionController::new(config.restriction_window);
        let ctx = TrackContext::new(&config);
        HuntTracker {
            roster,
            locator,
            world,
            presentation,
            store,
            config,
            ctx,
            restriction,
            active: AtomicBool::new(false),
        }
    }

    pub fn is_restricted(&self, now: Instant) -> bool {
        self.restriction.is_restricted(now)
    }

    pub fn restricted_seconds_remaining(&self, now: Instant) -> u64 {
        self.restriction.seconds_remaining(now)
    }

    fn is_hunter(&self, participant: &ParticipantId) -> bool {
        self.roster
            .faction_of(participant)
            .map_or(false, |f| f == *HUNTER_SIDE)
    }
}

impl ModeTracker for HuntTracker {
    fn start(&self, now: Instant) -> TrackerResult<bool> {
        if !self.store.flag(FLAG_HUNT_ENABLED).unwrap_or(false) {
            debug!("hunt flag unset, start ignored");
            return Ok(false);
        }
        if self.active.swap(true, Ordering::SeqCst) {
            return Ok(true);
        }
        self.roster
            .purge_offline_nonpersistent(&HUNTER_SIDE, self.locator.as_ref());
        self.roster
            .purge_offline_nonpersistent(&RUNNER_SIDE, self.locator.as_ref());
        self.ctx.begin(now);
        self.restriction.start(now);
        info!("hunt mode started");
        Ok(true)
    }

    fn stop(&self) {
        if !self.active.swap(false, Ordering::SeqCst) {
            return;
        }
        self.restriction.stop();
        self.ctx.reset();
        info!("hunt mode stopped");
    }

    fn tick(&self, now: Instant) {
        if !self.active.load(Ordering::SeqCst) {
            return;
        }
        let hunters = self.roster.members_sorted(&HUNTER_SIDE);
        let runners = self.roster.members_sorted(&RUNNER_SIDE);
        for hunter in &hunters {
            update_member_beacon(
                &self.ctx,
                *hunter,
                &runners,
                self.locator.as_ref(),
                self.world.as_ref(),
                self.presentation.as_ref(),
                now,
            );
        }
    }

    fn restriction_tick(&self, now: Instant) {
        if !self.active.load(Ordering::SeqCst) {
            return;
        }
        let hunters = self.roster.members_sorted(&HUNTER_SIDE);
        self.restriction.tick(
            &hunters,
            self.locator.as_ref(),
            self.presentation.as_ref(),
            now,
        );
    }

    fn use_charge(&self, participant: &ParticipantId, now: Instant) -> bool {
        if !self.active.load(Ordering::SeqCst) || !self.is_hunter(participant) {
            return false;
        }
        let user_loc = match self.locator.location(participant) {
            Some(loc) => loc,
            None => return false,
        };
        if !self.ctx.charges.use_charge(participant, now) {
            return false;
        }
        let runners = self.roster.members_sorted(&RUNNER_SIDE);
        fire_reveal(
            participant,
            user_loc,
            &runners,
            self.locator.as_ref(),
            self.presentation.as_ref(),
            &self.config,
        );
        self.presentation.set_beacon_display(
            participant,
            BeaconLabel::Cooldown {
                seconds_remaining: self.config.charge.charge_interval.as_secs(),
            },
        );
        true
    }

    fn on_participant_join(&self, participant: ParticipantId, now: Instant) {
        if !self.active.load(Ordering::SeqCst) {
            return;
        }
        self.roster.load_persisted(&[participant]);
        if self.is_hunter(&participant) {
            self.ctx.charges.issue(participant);
            self.restriction
                .on_rejoin(&participant, self.presentation.as_ref(), now);
        }
    }
}
