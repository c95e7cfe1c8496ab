// hunt_tracker_core/server/src/tracker/team_race.rs
//
// N-way race: every faction hunts every other. Each member tracks one chosen
// enemy faction (nearest by default, cycled on demand) until the shared
// objective is reached, after which all beacons converge on it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwapOption;
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::core::config::TrackerConfig;
use crate::core::constants::{FLAG_TEAM_RACE_ENABLED, MAX_RACE_FACTIONS};
use crate::core::error::TrackerResult;
use crate::core::types::{
    BeaconLabel, DimensionKind, FactionId, Location, MessageKey, ParticipantId, Vec3,
};
use crate::platform::{AssignmentStore, ParticipantLocator, Presentation, WorldReader};
use crate::roster::{RosterStore, OBSERVERS};

use super::{advance_charge, fire_reveal, push_target, ModeTracker, TrackContext};

pub struct TeamRaceTracker {
    roster: Arc<RosterStore>,
    locator: Arc<dyn ParticipantLocator>,
    world: Arc<dyn WorldReader>,
    presentation: Arc<dyn Presentation>,
    store: Arc<dyn AssignmentStore>,
    config: TrackerConfig,
    ctx: TrackContext,
    choices: DashMap<ParticipantId, FactionId>,
    objective: ArcSwapOption<Vec3>,
    objective_set: AtomicBool,
    relic_holder: RwLock<Option<ParticipantId>>,
    active: AtomicBool,
}

impl TeamRaceTracker {
    pub fn new(
        roster: Arc<RosterStore>,
        locator: Arc<dyn ParticipantLocator>,
        world: Arc<dyn WorldReader>,
        presentation: Arc<dyn Presentation>,
        store: Arc<dyn AssignmentStore>,
        config: TrackerConfig,
    ) -> Self {
        let ctx = TrackContext::new(&config);
        TeamRaceTracker {
            roster,
            locator,
            world,
            presentation,
            store,
            config,
            ctx,
            choices: DashMap::new(),
            objective: ArcSwapOption::from(None),
            objective_set: AtomicBool::new(false),
            relic_holder: RwLock::new(None),
            active: AtomicBool::new(false),
        }
    }

    /// Fixes the match-wide objective position. First write wins; later calls
    /// are ignored and report false.
    pub fn set_shared_objective(&self, pos: Vec3) -> bool {
        if self.objective_set.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.objective.store(Some(Arc::new(pos)));
        info!("shared objective fixed at ({}, {}, {})", pos.x, pos.y, pos.z);
        true
    }

    pub fn shared_objective(&self) -> Option<Vec3> {
        self.objective.load_full().map(|pos| *pos)
    }

    pub fn set_relic_holder(&self, holder: Option<ParticipantId>) {
        *self.relic_holder.write() = holder;
    }

    pub fn relic_holder(&self) -> Option<ParticipantId> {
        *self.relic_holder.read()
    }

    /// Advances the member's tracked faction round-robin through the other
    /// active factions, in definition order.
    pub fn cycle_preference(&self, participant: &ParticipantId) -> Option<FactionId> {
        if !self.active.load(Ordering::SeqCst) {
            return None;
        }
        let own = self.roster.faction_of(participant)?;
        let order = self.active_enemy_factions(&own);
        if order.is_empty() {
            self.choices.remove(participant);
            return None;
        }
        let current = self.choices.get(participant).map(|entry| entry.value().clone());
        let next = match current.and_then(|c| order.iter().position(|f| *f == c)) {
            Some(idx) => order[(idx + 1) % order.len()].clone(),
            None => order[0].clone(),
        };
        self.choices.insert(*participant, next.clone());
        let label = self
            .roster
            .faction(&next)
            .map(|f| f.display_name)
            .unwrap_or_else(|| next.to_string());
        self.presentation
            .notify(participant, MessageKey::TrackingFaction, &[label]);
        Some(next)
    }

    fn race_faction_ids(&self) -> Vec<FactionId> {
        self.roster
            .faction_ids()
            .into_iter()
            .filter(|f| *f != *OBSERVERS)
            .collect()
    }

    fn active_enemy_factions(&self, own: &FactionId) -> Vec<FactionId> {
        self.race_faction_ids()
            .into_iter()
            .filter(|f| f != own && !self.roster.members_of(f).is_empty())
            .collect()
    }

    /// Current tracked faction for a member, recomputing the default when
    /// nothing is chosen or the chosen roster has emptied.
    fn tracked_faction_for(&self, member: ParticipantId, own: &FactionId, origin: Location) -> Option<FactionId> {
        let mut current = self.choices.get(&member).map(|entry| entry.value().clone());
        if let Some(chosen) = &current {
            if self.roster.members_of(chosen).is_empty() {
                current = None;
            }
        }
        if current.is_none() {
            current = self.default_choice(own, origin);
            if let Some(chosen) = &current {
                self.choices.insert(member, chosen.clone());
            }
        }
        current
    }

    /// Default choice: the faction holding the nearest located enemy in the
    /// member's dimension, else the first non-empty enemy faction.
    fn default_choice(&self, own: &FactionId, origin: Location) -> Option<FactionId> {
        let enemies = self.active_enemy_factions(own);
        let mut best: Option<(f64, FactionId)> = None;
        for faction in &enemies {
            for other in self.roster.members_sorted(faction) {
                if !self.locator.is_online(&other) {
                    continue;
                }
                let loc = match self.locator.location(&other) {
                    Some(loc) => loc,
                    None => continue,
                };
                if loc.dimension != origin.dimension {
                    continue;
                }
                let dist_sq = origin.pos.distance_squared(&loc.pos);
                if best.as_ref().map_or(true, |(b, _)| dist_sq < *b) {
                    best = Some((dist_sq, faction.clone()));
                }
            }
        }
        best.map(|(_, f)| f).or_else(|| enemies.first().cloned())
    }

    fn update_racer(
        &self,
        member: ParticipantId,
        own: &FactionId,
        objective: Option<Vec3>,
        holder: Option<ParticipantId>,
        holder_loc: Option<Location>,
        now: Instant,
    ) {
        let match_start = match self.ctx.started_at() {
            Some(start) => start,
            None => return,
        };
        let origin = match self.locator.location(&member) {
            Some(loc) => loc,
            None => return,
        };
        self.ctx.charges.issue(member);

        if let Some(fixed) = objective {
            let target = if Some(member) == holder {
                // The holder does not track itself.
                fixed
            } else {
                match holder_loc {
                    Some(h_loc) if h_loc.dimension == DimensionKind::TheEnd => h_loc.pos,
                    _ => fixed,
                }
            };
            push_target(&self.ctx, member, target, self.presentation.as_ref());
        } else {
            let opposing = match self.tracked_faction_for(member, own, origin) {
                Some(faction) => self.roster.members_sorted(&faction),
                None => Vec::new(),
            };
            if let Some(target) = self.ctx.resolver.resolve(
                member,
                origin,
                &opposing,
                self.locator.as_ref(),
                self.world.as_ref(),
                now,
            ) {
                push_target(&self.ctx, member, target, self.presentation.as_ref());
            }
        }

        advance_charge(&self.ctx, member, match_start, now, self.presentation.as_ref());
    }
}

impl ModeTracker for TeamRaceTracker {
    fn start(&self, now: Instant) -> TrackerResult<bool> {
        if !self.store.flag(FLAG_TEAM_RACE_ENABLED).unwrap_or(false) {
            debug!("team race flag unset, start ignored");
            return Ok(false);
        }
        if self.active.swap(true, Ordering::SeqCst) {
            return Ok(true);
        }
        let race = self.race_faction_ids();
        if race.len() > MAX_RACE_FACTIONS {
            warn!("{} race factions defined, expected at most {}", race.len(), MAX_RACE_FACTIONS);
        }
        for faction in &race {
            self.roster
                .purge_offline_nonpersistent(faction, self.locator.as_ref());
        }
        self.ctx.begin(now);
        info!("team race started with {} factions", race.len());
        Ok(true)
    }

    fn stop(&self) {
        if !self.active.swap(false, Ordering::SeqCst) {
            return;
        }
        self.ctx.reset();
        self.choices.clear();
        self.objective.store(None);
        self.objective_set.store(false, Ordering::SeqCst);
        *self.relic_holder.write() = None;
        info!("team race stopped");
    }

    fn tick(&self, now: Instant) {
        if !self.active.load(Ordering::SeqCst) {
            return;
        }
        let objective = self.shared_objective();
        let holder = self.relic_holder();
        let holder_loc = holder.and_then(|h| self.locator.location(&h));
        for faction in self.race_faction_ids() {
            for member in self.roster.members_sorted(&faction) {
                self.update_racer(member, &faction, objective, holder, holder_loc, now);
            }
        }
    }

    fn use_charge(&self, participant: &ParticipantId, now: Instant) -> bool {
        if !self.active.load(Ordering::SeqCst) {
            return false;
        }
        let own = match self.roster.faction_of(participant) {
            Some(f) if f != *OBSERVERS => f,
            _ => return false,
        };
        let user_loc = match self.locator.location(participant) {
            Some(loc) => loc,
            None => return false,
        };
        if !self.ctx.charges.use_charge(participant, now) {
            return false;
        }
        let opposing = match self.tracked_faction_for(*participant, &own, user_loc) {
            Some(faction) => self.roster.members_sorted(&faction),
            None => Vec::new(),
        };
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

    fn on_participant_join(&self, participant: ParticipantId, _now: Instant) {
        if !self.active.load(Ordering::SeqCst) {
            return;
        }
        self.roster.load_persisted(&[participant]);
        match self.roster.faction_of(&participant) {
            Some(faction) if faction != *OBSERVERS => {
                self.ctx.charges.issue(participant);
            }
            _ => {}
        }
    }
}
