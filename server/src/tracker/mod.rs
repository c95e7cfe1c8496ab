// hunt_tracker_core/server/src/tracker/mod.rs
//
// Mode trackers compose the roster, the resolver, the charge economy and the
// restricted phase into a per-tick update loop. Everything per-match lives in
// a TrackContext owned by the tracker and torn down entirely on stop().

pub mod hunt;
pub mod manhunt;
pub mod runtime;
pub mod team_race;

use std::sync::Arc;
use std::time::Instant;

use ahash::AHashMap;
use parking_lot::RwLock;

use crate::concurrent::anchor_cache::AnchorCache;
use crate::core::config::TrackerConfig;
use crate::core::error::TrackerResult;
use crate::core::types::{
    BeaconLabel, ChargeStatus, DimensionKind, Location, MessageKey, ParticipantId, RevealEffect,
    Vec3,
};
use crate::platform::{ParticipantLocator, Presentation, WorldReader};
use crate::systems::charge::ChargeEconomy;
use crate::systems::resolver::TargetResolver;

pub trait ModeTracker: Send + Sync {
    /// Ok(false) when the mode's enabling flag is unset; the call is then a
    /// silent no-op.
    fn start(&self, now: Instant) -> TrackerResult<bool>;
    /// Idempotent. Clears all per-match state.
    fn stop(&self);
    /// Once-per-second target resolution and charge accrual.
    fn tick(&self, now: Instant);
    /// Half-second cadence; only modes with a restricted phase care.
    fn restriction_tick(&self, _now: Instant) {}
    fn use_charge(&self, participant: &ParticipantId, now: Instant) -> bool;
    fn on_participant_join(&self, participant: ParticipantId, now: Instant);
}

/// Per-match mutable state, keyed by participant. Owned by a tracker, never
/// ambient; reset() drops every map at once.
pub struct TrackContext {
    pub charges: ChargeEconomy,
    pub resolver: TargetResolver,
    pub anchors: Arc<AnchorCache>,
    match_start: RwLock<Option<Instant>>,
}

impl TrackContext {
    pub fn new(config: &TrackerConfig) -> Self {
        let anchors = Arc::new(AnchorCache::new(config.scan.clone()));
        TrackContext {
            charges: ChargeEconomy::new(config.charge.clone()),
            resolver: TargetResolver::new(anchors.clone()),
            anchors,
            match_start: RwLock::new(None),
        }
    }

    pub fn begin(&self, now: Instant) {
        *self.match_start.write() = Some(now);
    }

    pub fn started_at(&self) -> Option<Instant> {
        *self.match_start.read()
    }

    pub fn reset(&self) {
        *self.match_start.write() = None;
        self.charges.clear();
        self.resolver.clear();
        self.anchors.clear();
    }
}

/// One tracked member's per-tick update: resolve a target, push it outward if
/// it changed, advance the charge timers and refresh the display label.
pub(crate) fn update_member_beacon(
    ctx: &TrackContext,
    member: ParticipantId,
    opposing: &[ParticipantId],
    locator: &dyn ParticipantLocator,
    world: &dyn WorldReader,
    presentation: &dyn Presentation,
    now: Instant,
) {
    let match_start = match ctx.started_at() {
        Some(start) => start,
        None => return,
    };
    let origin = match locator.location(&member) {
        Some(loc) => loc,
        None => return, // offline this tick, skip
    };
    ctx.charges.issue(member);
    if let Some(target) = ctx.resolver.resolve(member, origin, opposing, locator, world, now) {
        push_target(ctx, member, target, presentation);
    }
    advance_charge(ctx, member, match_start, now, presentation);
}

pub(crate) fn push_target(
    ctx: &TrackContext,
    member: ParticipantId,
    target: Vec3,
    presentation: &dyn Presentation,
) {
    if ctx.charges.last_displayed_target(&member) == Some(target) {
        return;
    }
    presentation.set_beacon_target(&member, target);
    ctx.charges.record_displayed_target(member, target);
}

pub(crate) fn advance_charge(
    ctx: &TrackContext,
    member: ParticipantId,
    match_start: Instant,
    now: Instant,
    presentation: &dyn Presentation,
) {
    if ctx.charges.tick(member, match_start, now) {
        presentation.notify(&member, MessageKey::BeaconCharged, &[]);
    }
    let label = match ctx.charges.status(&member) {
        Some(ChargeStatus::Charged) => BeaconLabel::Charged,
        _ => BeaconLabel::Cooldown {
            seconds_remaining: ctx
                .charges
                .cooldown_remaining(&member, match_start, now)
                .as_secs(),
        },
    };
    presentation.set_beacon_display(&member, label);
}

/// Fires the reveal that a consumed charge pays for. With opposition sharing
/// the user's dimension, everyone of them inside the notify radius glows;
/// otherwise a cosmetic flavored by the opposition's majority dimension plays
/// for the user alone.
pub(crate) fn fire_reveal(
    user: &ParticipantId,
    user_loc: Location,
    opposing: &[ParticipantId],
    locator: &dyn ParticipantLocator,
    presentation: &dyn Presentation,
    config: &TrackerConfig,
) {
    let mut located: Vec<(ParticipantId, Location)> = Vec::new();
    for other in opposing {
        if !locator.is_online(other) {
            continue;
        }
        if let Some(loc) = locator.location(other) {
            located.push((*other, loc));
        }
    }

    let same_dimension: Vec<&(ParticipantId, Location)> = located
        .iter()
        .filter(|(_, loc)| loc.dimension == user_loc.dimension)
        .collect();

    if !same_dimension.is_empty() {
        let radius_sq = config.reveal_notify_radius * config.reveal_notify_radius;
        for (other, loc) in same_dimension {
            if loc.pos.distance_squared(&user_loc.pos) > radius_sq {
                continue;
            }
            presentation.play_reveal_effect(
                other,
                RevealEffect::Glow { duration: config.reveal_glow_duration },
            );
            presentation.notify(other, MessageKey::Revealed, &[]);
        }
    } else {
        presentation.play_reveal_effect(
            user,
            RevealEffect::DimensionRift(majority_dimension(&located)),
        );
    }
    presentation.notify(user, MessageKey::RevealFired, &[]);
}

/// Majority dimension of the located opposition; ties and an empty set both
/// land on the Nether.
fn majority_dimension(located: &[(ParticipantId, Location)]) -> DimensionKind {
    let mut counts: AHashMap<DimensionKind, usize> = AHashMap::new();
    for (_, loc) in located {
        *counts.entry(loc.dimension).or_insert(0) += 1;
    }
    let max = counts.values().copied().max().unwrap_or(0);
    if max == 0 {
        return DimensionKind::Nether;
    }
    let leaders: Vec<DimensionKind> = counts
        .iter()
        .filter(|(_, count)| **count == max)
        .map(|(dim, _)| *dim)
        .collect();
    if leaders.len() == 1 {
        leaders[0]
    } else {
        DimensionKind::Nether
    }
}
