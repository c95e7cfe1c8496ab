// hunt_tracker_core/server/src/concurrent/anchor_cache.rs
//
// Bounded grid scan for anchor landmarks (portals), cached per participant.
// The scan is O((2r/step)^3); the cache amortizes it over once-per-second
// resolution calls.

use std::time::Instant;

use dashmap::DashMap;

use crate::core::config::AnchorScanConfig;
use crate::core::types::{Location, ParticipantId, Vec3};
use crate::platform::WorldReader;
use tracing::{debug, trace};

#[derive(Clone, Debug)]
pub struct AnchorScanEntry {
    pub cached_anchor: Option<Vec3>,
    pub scan_origin: Location,
    pub scanned_at: Instant,
}

pub struct AnchorCache {
    entries: DashMap<ParticipantId, AnchorScanEntry>,
    config: AnchorScanConfig,
}

impl AnchorCache {
    pub fn new(config: AnchorScanConfig) -> Self {
        AnchorCache {
            entries: DashMap::new(),
            config,
        }
    }

    /// Returns the nearest anchor for this origin, scanning only when the
    /// cached entry is stale. A negative scan result is cached too.
    pub fn find_anchor(
        &self,
        participant: ParticipantId,
        origin: Location,
        world: &dyn WorldReader,
        now: Instant,
    ) -> Option<Vec3> {
        if let Some(entry) = self.entries.get(&participant) {
            let fresh = now.duration_since(entry.scanned_at) < self.config.ttl
                && entry.scan_origin.dimension == origin.dimension
                && entry.scan_origin.pos.distance_squared(&origin.pos)
                    <= self.config.movement_threshold_sq();
            if fresh {
                trace!("anchor cache hit for {}", participant);
                return entry.cached_anchor;
            }
        }

        let anchor = self.scan(origin, world);
        debug!(
            "anchor scan for {} in {:?}: {:?}",
            participant, origin.dimension, anchor
        );
        self.entries.insert(
            participant,
            AnchorScanEntry {
                cached_anchor: anchor,
                scan_origin: origin,
                scanned_at: now,
            },
        );
        anchor
    }

    fn scan(&self, origin: Location, world: &dyn WorldReader) -> Option<Vec3> {
        let step = self.config.step.max(1);
        let radius = self.config.radius;
        let (floor, ceiling) = origin.dimension.build_limits();

        let cx = origin.pos.x.floor() as i32;
        let cy = origin.pos.y.floor() as i32;
        let cz = origin.pos.z.floor() as i32;
        let y_min = (cy - radius).max(floor);
        let y_max = (cy + radius).min(ceiling);

        let mut best: Option<(f64, Vec3)> = None;
        for x in ((cx - radius)..=(cx + radius)).step_by(step as usize) {
            for z in ((cz - radius)..=(cz + radius)).step_by(step as usize) {
                for y in (y_min..=y_max).step_by(step as usize) {
                    if !world.block_at(origin.dimension, x, y, z).is_anchor() {
                        continue;
                    }
                    let candidate = Vec3::new(x as f64, y as f64, z as f64);
                    let dist_sq = origin.pos.distance_squared(&candidate);
                    if best.map_or(true, |(best_dist, _)| dist_sq < best_dist) {
                        best = Some((dist_sq, candidate));
                    }
                }
            }
        }
        best.map(|(_, pos)| pos)
    }

    pub fn forget(&self, participant: &ParticipantId) {
        self.entries.remove(participant);
    }

    pub fn clear(&self) {
        self.entries.clear();
    }
}
