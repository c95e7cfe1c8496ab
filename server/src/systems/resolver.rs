// hunt_tracker_core/server/src/systems/resolver.rs
//
// Nearest-opposing-member search with a fallback chain. Preference order:
// live adversary, remembered adversary, static landmark. The beacon is never
// deliberately left undirected while anything at all is known.

use std::sync::Arc;
use std::time::Instant;

use dashmap::DashMap;
use tracing::trace;

use crate::concurrent::anchor_cache::AnchorCache;
use crate::core::types::{Location, ParticipantId, Vec3};
use crate::platform::{ParticipantLocator, WorldReader};

pub struct TargetResolver {
    last_known: DashMap<ParticipantId, Location>,
    anchors: Arc<AnchorCache>,
}

impl TargetResolver {
    pub fn new(anchors: Arc<AnchorCache>) -> Self {
        TargetResolver {
            last_known: DashMap::new(),
            anchors,
        }
    }

    /// Resolves a target position for `participant`. `opposing` must be in a
    /// stable order; ties on distance go to the first member seen.
    pub fn resolve(
        &self,
        participant: ParticipantId,
        origin: Location,
        opposing: &[ParticipantId],
        locator: &dyn ParticipantLocator,
        world: &dyn WorldReader,
        now: Instant,
    ) -> Option<Vec3> {
        let mut nearest: Option<(f64, Location)> = None;
        for other in opposing {
            if !locator.is_online(other) {
                continue;
            }
            let loc = match locator.location(other) {
                Some(loc) => loc,
                None => continue,
            };
            if loc.dimension != origin.dimension {
                continue;
            }
            let dist_sq = origin.pos.distance_squared(&loc.pos);
            if nearest.map_or(true, |(best, _)| dist_sq < best) {
                nearest = Some((dist_sq, loc));
            }
        }
        if let Some((_, loc)) = nearest {
            self.last_known.insert(participant, loc);
            return Some(loc.pos);
        }

        let remembered = self.last_known.get(&participant).map(|entry| *entry.value());
        if let Some(loc) = remembered {
            if loc.dimension == origin.dimension {
                trace!("{} falling back to remembered target", participant);
                return Some(loc.pos);
            }
        }

        if let Some(anchor) = self.anchors.find_anchor(participant, origin, world, now) {
            trace!("{} falling back to anchor landmark", participant);
            return Some(anchor);
        }

        // A stale cross-dimension memory still beats no direction at all.
        remembered.map(|loc| loc.pos)
    }

    pub fn last_known(&self, participant: &ParticipantId) -> Option<Location> {
        self.last_known.get(participant).map(|entry| *entry.value())
    }

    pub fn forget(&self, participant: &ParticipantId) {
        self.last_known.remove(participant);
        self.anchors.forget(participant);
    }

    pub fn clear(&self) {
        self.last_known.clear();
    }
}
