// hunt_tracker_core/server/src/tracker/manhunt.rs
//
// Symmetric manhunt: both sides carry beacons pointed at each other. The
// hunter side still takes the restricted phase so runners get a head start.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::core::config::TrackerConfig;
use crate::core::constants::FLAG_MANHUNT_ENABLED;
use crate::core::error::TrackerResult;
use crate::core::types::{BeaconLabel, FactionId, ParticipantId};
use crate::platform::{AssignmentStore, ParticipantLocator, Presentation, WorldReader};
use crate::roster::{Faction, FactionColor, RosterStore, HUNTER_SIDE, RUNNER_SIDE};
use crate::systems::restriction::RestrictionController;

use super::{fire_reveal, update_member_beacon, ModeTracker, TrackContext};

pub struct ManhuntTracker {
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

impl ManhuntTracker {
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
        ManhuntTracker {
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

    /// The faction a member's beacon opposes, in a fixed-role pairing.
    fn opposing_of(&self, participant: &ParticipantId) -> Option<FactionId> {
        let own = self.roster.faction_of(participant)?;
        if own == *HUNTER_SIDE {
            Some(RUNNER_SIDE.clone())
        } else if own == *RUNNER_SIDE {
            Some(HUNTER_SIDE.clone())
        } else {
            None
        }
    }
}

impl ModeTracker for ManhuntTracker {
    fn start(&self, now: Instant) -> TrackerResult<bool> {
        if !self.store.flag(FLAG_MANHUNT_ENABLED).unwrap_or(false) {
            debug!("manhunt flag unset, start ignored");
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
        info!("manhunt mode started");
        Ok(true)
    }

    fn stop(&self) {
        if !self.active.swap(false, Ordering::SeqCst) {
            return;
        }
        self.restriction.stop();
        self.ctx.reset();
        info!("manhunt mode stopped");
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
        for runner in &runners {
            update_member_beacon(
                &self.ctx,
                *runner,
                &hunters,
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
        if !self.active.load(Ordering::SeqCst) {
            return false;
        }
        let opposing_faction = match self.opposing_of(participant) {
            Some(faction) => faction,
            None => return false,
        };
        let user_loc = match self.locator.location(participant) {
            Some(loc) => loc,
            None => return false,
        };
        if !self.ctx.charges.use_charge(participant, now) {
            return false;
        }
        let opposing = self.roster.members_sorted(&opposing_faction);
        fire_reveal(
            participant,
            user_loc,
            &opposing,
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
        let Some(own) = self.roster.faction_of(&participant) else {
            return;
        };
        if own == *HUNTER_SIDE || own == *RUNNER_SIDE {
            self.ctx.charges.issue(participant);
        }
        if own == *HUNTER_SIDE {
            self.restriction
                .on_rejoin(&participant, self.presentation.as_ref(), now);
        }
    }
}
