// hunt_tracker_core/server/src/platform.rs
//
// Capabilities the embedding host provides to the tracking core. The core
// never touches the world, the screen, or durable storage directly.

use std::time::Duration;

use dashmap::DashMap;

use crate::core::error::TrackerResult;
use crate::core::types::{
    BeaconLabel, DimensionKind, Location, MessageKey, ParticipantId, RevealEffect, StatusKind, Vec3,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Air,
    Terrain,
    Liquid,
    NetherPortal,
    EndPortalFrame,
    EndGateway,
}

impl BlockKind {
    /// Static landmarks a beacon may fall back to when no live target exists.
    pub fn is_anchor(self) -> bool {
        matches!(
            self,
            BlockKind::NetherPortal | BlockKind::EndPortalFrame | BlockKind::EndGateway
        )
    }
}

pub trait ParticipantLocator: Send + Sync {
    /// None means the participant is offline or has no position this tick.
    fn location(&self, participant: &ParticipantId) -> Option<Location>;
    fn is_online(&self, participant: &ParticipantId) -> bool;
}

pub trait WorldReader: Send + Sync {
    fn block_at(&self, dimension: DimensionKind, x: i32, y: i32, z: i32) -> BlockKind;
}

pub trait Presentation: Send + Sync {
    fn set_beacon_target(&self, participant: &ParticipantId, target: Vec3);
    fn set_beacon_display(&self, participant: &ParticipantId, label: BeaconLabel);
    fn apply_status(&self, participant: &ParticipantId, kind: StatusKind, duration: Duration);
    fn remove_status(&self, participant: &ParticipantId, kind: StatusKind);
    fn notify(&self, participant: &ParticipantId, key: MessageKey, placeholders: &[String]);
    fn play_reveal_effect(&self, participant: &ParticipantId, effect: RevealEffect);
}

pub trait AssignmentStore: Send + Sync {
    fn flag(&self, name: &str) -> Option<bool>;
    fn set_flag(&self, name: &str, value: bool) -> TrackerResult<()>;
    fn assignment(&self, participant: &ParticipantId) -> Option<String>;
    fn set_assignment(&self, participant: &ParticipantId, faction: Option<&str>)
        -> TrackerResult<()>;
}

/// In-memory assignment store. Hosts that persist to disk wrap their own
/// storage behind `AssignmentStore`; this one backs tests and ephemeral lobbies.
pub struct MemoryAssignmentStore {
    flags: DashMap<String, bool>,
    assignments: DashMap<ParticipantId, String>,
}

impl MemoryAssignmentStore {
    pub fn new() -> Self {
        MemoryAssignmentStore {
            flags: DashMap::new(),
            assignments: DashMap::new(),
        }
    }
}

impl Default for MemoryAssignmentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AssignmentStore for MemoryAssignmentStore {
    fn flag(&self, name: &str) -> Option<bool> {
        self.flags.get(name).map(|entry| *entry.value())
    }

    fn set_flag(&self, name: &str, value: bool) -> TrackerResult<()> {
        self.flags.insert(name.to_string(), value);
        Ok(())
    }

    fn assignment(&self, participant: &ParticipantId) -> Option<String> {
        self.assignments.get(participant).map(|entry| entry.value().clone())
    }

    fn set_assignment(
        &self,
        participant: &ParticipantId,
        faction: Option<&str>,
    ) -> TrackerResult<()> {
        match faction {
            Some(name) => {
                self.assignments.insert(*participant, name.to_string());
            }
            None => {
                self.assignments.remove(participant);
            }
        }
        Ok(())
    }
}
