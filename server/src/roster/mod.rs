// hunt_tracker_core/server/src/roster/mod.rs
//
// Authoritative faction membership. Both directions of the index live under a
// single lock so a faction move is atomic with respect to readers; durable
// persistence is fire-and-forget and never rolls back in-memory state.

use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use dashmap::DashMap;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::core::error::{TrackerError, TrackerResult};
use crate::core::types::{FactionId, ParticipantId};
use crate::platform::{AssignmentStore, ParticipantLocator};

/// Sentinel faction: members are never auto-assigned away from it.
pub static OBSERVERS: Lazy<FactionId> = Lazy::new(|| Arc::from("observers"));
pub static HUNTER_SIDE: Lazy<FactionId> = Lazy::new(|| Arc::from("hunters"));
pub static RUNNER_SIDE: Lazy<FactionId> = Lazy::new(|| Arc::from("runners"));

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
pub enum FactionColor {
    Red,
    Blue,
    Green,
    Yellow,
    Aqua,
    Purple,
    Gold,
    Gray,
    White,
    Black,
}

#[derive(Clone, Debug)]
pub struct Faction {
    pub id: FactionId,
    pub display_name: String,
    pub color: FactionColor,
}

impl Faction {
    pub fn new(id: &str, display_name: &str, color: FactionColor) -> Self {
        Faction {
            id: Arc::from(id),
            display_name: display_name.to_string(),
            color,
        }
    }
}

#[derive(Default)]
struct RosterIndex {
    by_participant: AHashMap<ParticipantId, FactionId>,
    members: AHashMap<FactionId, AHashSet<ParticipantId>>,
}

pub struct RosterStore {
    index: RwLock<RosterIndex>,
    factions: DashMap<FactionId, Faction>,
    defined_order: RwLock<Vec<FactionId>>,
    store: Arc<dyn AssignmentStore>,
}

impl RosterStore {
    pub fn new(store: Arc<dyn AssignmentStore>) -> Self {
        let roster = RosterStore {
            index: RwLock::new(RosterIndex::default()),
            factions: DashMap::new(),
            defined_order: RwLock::new(Vec::new()),
            store,
        };
        roster.define_faction(Faction::new("observers", "Observers", FactionColor::Gray));
        roster
    }

    pub fn define_faction(&self, faction: Faction) {
        let id = faction.id.clone();
        if self.factions.insert(id.clone(), faction).is_none() {
            self.defined_order.write().push(id);
        }
    }

    pub fn faction(&self, id: &FactionId) -> Option<Faction> {
        self.factions.get(id).map(|entry| entry.value().clone())
    }

    /// Faction ids in definition order. Cycling and tie-breaks depend on this
    /// order being stable for the lifetime of the store.
    pub fn faction_ids(&self) -> Vec<FactionId> {
        self.defined_order.read().clone()
    }

    /// Moves a participant between factions, or out of all of them with
    /// `None`. Returns `Ok(false)` without touching anything when the
    /// participant sits in the observer faction and the target is a different
    /// faction: observers opt out of every automatic assignment path.
    pub fn set_faction(
        &self,
        participant: ParticipantId,
        faction: Option<&FactionId>,
    ) -> TrackerResult<bool> {
        if let Some(target) = faction {
            if !self.factions.contains_key(target) {
                return Err(TrackerError::UnknownFaction(target.to_string()));
            }
        }

        {
            let mut index = self.index.write();
            let current_is_observer = index
                .by_participant
                .get(&participant)
                .map_or(false, |f| *f == *OBSERVERS);
            if current_is_observer && faction.map_or(false, |f| *f != *OBSERVERS) {
                debug!("refusing to reassign observer {}", participant);
                return Ok(false);
            }

            if let Some(old) = index.by_participant.remove(&participant) {
                if let Some(set) = index.members.get_mut(&old) {
                    set.remove(&participant);
                }
            }
            if let Some(target) = faction {
                index.by_participant.insert(participant, target.clone());
                index
                    .members
                    .entry(target.clone())
                    .or_default()
                    .insert(participant);
            }
        }

        // In-memory state is authoritative for the running match.
        let name = faction.map(|f| f.to_string());
        if let Err(e) = self.store.set_assignment(&participant, name.as_deref()) {
            warn!("failed to persist faction assignment for {}: {}", participant, e);
        }
        Ok(true)
    }

    pub fn faction_of(&self, participant: &ParticipantId) -> Option<FactionId> {
        self.index.read().by_participant.get(participant).cloned()
    }

    /// Immutable snapshot of the member set; empty when the faction has none.
    pub fn members_of(&self, faction: &FactionId) -> AHashSet<ParticipantId> {
        self.index
            .read()
            .members
            .get(faction)
            .cloned()
            .unwrap_or_default()
    }

    /// Snapshot in stable ascending id order, for per-tick enumeration.
    pub fn members_sorted(&self, faction: &FactionId) -> Vec<ParticipantId> {
        let mut members: Vec<ParticipantId> = self.members_of(faction).into_iter().collect();
        members.sort_unstable();
        members
    }

    /// Drops offline members that have no durable assignment backing them.
    pub fn purge_offline_nonpersistent(
        &self,
        faction: &FactionId,
        locator: &dyn ParticipantLocator,
    ) {
        let stale: Vec<ParticipantId> = self
            .members_of(faction)
            .into_iter()
            .filter(|p| !locator.is_online(p) && self.store.assignment(p).is_none())
            .collect();
        if stale.is_empty() {
            return;
        }

        let mut index = self.index.write();
        for participant in &stale {
            index.by_participant.remove(participant);
            if let Some(set) = index.members.get_mut(faction) {
                set.remove(participant);
            }
        }
        debug!("purged {} offline members from {}", stale.len(), faction);
    }

    /// Re-applies durable assignments for known participants, without echoing
    /// the writes back to the store.
    pub fn load_persisted(&self, participants: &[ParticipantId]) {
        let mut index = self.index.write();
        for participant in participants {
            if index.by_participant.contains_key(participant) {
                continue;
            }
            let Some(name) = self.store.assignment(participant) else {
                continue;
            };
            let id: FactionId = Arc::from(name.as_str());
            if !self.factions.contains_key(&id) {
                debug!("stored assignment {} for {} has no defined faction", name, participant);
                continue;
            }
            index.by_participant.insert(*participant, id.clone());
            index.members.entry(id).or_default().insert(*participant);
        }
    }
}
