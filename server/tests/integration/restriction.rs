// hunt_tracker_core/server/tests/integration/restriction.rs

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use parking_lot::Mutex;
use uuid::Uuid;

use hunt_tracker_core::core::config::TrackerConfig;
use hunt_tracker_core::core::constants::FLAG_HUNT_ENABLED;
use hunt_tracker_core::core::types::{
    BeaconLabel, DimensionKind, Location, MessageKey, ParticipantId, RevealEffect, StatusKind,
    Vec3,
};
use hunt_tracker_core::platform::{
    AssignmentStore, BlockKind, MemoryAssignmentStore, ParticipantLocator, Presentation,
    WorldReader,
};
use hunt_tracker_core::roster::{RosterStore, HUNTER_SIDE, RUNNER_SIDE};
use hunt_tracker_core::systems::restriction::{RestrictionController, RestrictionPhase};
use hunt_tracker_core::tracker::hunt::HuntTracker;
use hunt_tracker_core::tracker::ModeTracker;

struct TestLocator {
    locations: DashMap<ParticipantId, Location>,
}

impl TestLocator {
    fn new() -> Self {
        TestLocator { locations: DashMap::new() }
    }

    fn put_online(&self, participant: ParticipantId) {
        self.locations.insert(
            participant,
            Location::new(Vec3::zero(), DimensionKind::Overworld),
        );
    }

    fn set_offline(&self, participant: &ParticipantId) {
        self.locations.remove(participant);
    }
}

impl ParticipantLocator for TestLocator {
    fn location(&self, participant: &ParticipantId) -> Option<Location> {
        self.locations.get(participant).map(|entry| *entry.value())
    }

    fn is_online(&self, participant: &ParticipantId) -> bool {
        self.locations.contains_key(participant)
    }
}

#[derive(Clone, Debug, PartialEq)]
enum Seen {
    Applied(ParticipantId, StatusKind),
    Removed(ParticipantId, StatusKind),
    Notice(ParticipantId, MessageKey, Vec<String>),
}

struct RecordingPresentation {
    seen: Mutex<Vec<Seen>>,
}

impl RecordingPresentation {
    fn new() -> Self {
        RecordingPresentation { seen: Mutex::new(Vec::new()) }
    }

    fn events(&self) -> Vec<Seen> {
        self.seen.lock().clone()
    }

    fn count(&self, wanted: &Seen) -> usize {
        self.seen.lock().iter().filter(|event| *event == wanted).count()
    }
}

impl Presentation for RecordingPresentation {
    fn set_beacon_target(&self, _participant: &ParticipantId, _target: Vec3) {}

    fn set_beacon_display(&self, _participant: &ParticipantId, _label: BeaconLabel) {}

    fn apply_status(&self, participant: &ParticipantId, kind: StatusKind, _duration: Duration) {
        self.seen.lock().push(Seen::Applied(*participant, kind));
    }

    fn remove_status(&self, participant: &ParticipantId, kind: StatusKind) {
        self.seen.lock().push(Seen::Removed(*participant, kind));
    }

    fn notify(&self, participant: &ParticipantId, key: MessageKey, placeholders: &[String]) {
        self.seen
            .lock()
            .push(Seen::Notice(*participant, key, placeholders.to_vec()));
    }

    fn play_reveal_effect(&self, _participant: &ParticipantId, _effect: RevealEffect) {}
}

struct FlatWorld;

impl WorldReader for FlatWorld {
    fn block_at(&self, _dimension: DimensionKind, _x: i32, _y: i32, _z: i32) -> BlockKind {
        BlockKind::Terrain
    }
}

const WINDOW: Duration = Duration::from_secs(120);

#[test]
fn statuses_are_refreshed_every_tick_while_restricted() {
    let controller = RestrictionController::new(WINDOW);
    let locator = TestLocator::new();
    let presentation = RecordingPresentation::new();
    let member = Uuid::new_v4();
    locator.put_online(member);

    let start = Instant::now();
    controller.start(start);

    for half_seconds in 1..=4u64 {
        controller.tick(
            &[member],
            &locator,
            &presentation,
            start + Duration::from_millis(500 * half_seconds),
        );
    }
    // Re-applied on every tick, not set once.
    assert_eq!(presentation.count(&Seen::Applied(member, StatusKind::Blindness)), 4);
    assert_eq!(presentation.count(&Seen::Applied(member, StatusKind::DamageImmunity)), 4);
}

#[test]
fn rejoin_inside_window_reports_remaining_seconds() {
    let controller = RestrictionController::new(WINDOW);
    let presentation = RecordingPresentation::new();
    let member = Uuid::new_v4();

    let start = Instant::now();
    controller.start(start);

    let at_90 = start + Duration::from_secs(90);
    assert!(controller.is_restricted(at_90));
    assert_eq!(controller.seconds_remaining(at_90), 30);

    controller.on_rejoin(&member, &presentation, at_90);
    assert_eq!(presentation.count(&Seen::Applied(member, StatusKind::Blindness)), 1);
    assert_eq!(presentation.count(&Seen::Applied(member, StatusKind::DamageImmunity)), 1);
    assert!(presentation.events().contains(&Seen::Notice(
        member,
        MessageKey::RestrictionCountdown,
        vec!["30".to_string()],
    )));
}

#[test]
fn rejoin_after_window_clears_immunity() {
    let controller = RestrictionController::new(WINDOW);
    let presentation = RecordingPresentation::new();
    let member = Uuid::new_v4();

    let start = Instant::now();
    controller.start(start);

    let at_150 = start + Duration::from_secs(150);
    assert!(!controller.is_restricted(at_150));
    controller.on_rejoin(&member, &presentation, at_150);

    assert_eq!(presentation.count(&Seen::Removed(member, StatusKind::DamageImmunity)), 1);
    assert_eq!(presentation.count(&Seen::Applied(member, StatusKind::Blindness)), 0);
}

#[test]
fn release_removes_statuses_and_notifies_exactly_once() {
    let controller = RestrictionController::new(WINDOW);
    let locator = TestLocator::new();
    let presentation = RecordingPresentation::new();
    let member = Uuid::new_v4();
    locator.put_online(member);

    let start = Instant::now();
    controller.start(start);

    let past_window = start + Duration::from_secs(121);
    controller.tick(&[member], &locator, &presentation, past_window);
    controller.tick(&[member], &locator, &presentation, past_window + Duration::from_millis(500));

    assert_eq!(presentation.count(&Seen::Removed(member, StatusKind::Blindness)), 1);
    assert_eq!(presentation.count(&Seen::Removed(member, StatusKind::DamageImmunity)), 1);
    assert_eq!(
        presentation.count(&Seen::Notice(member, MessageKey::RestrictionOver, Vec::new())),
        1
    );
    assert_eq!(controller.phase(past_window), RestrictionPhase::Released);
}

#[test]
fn offline_members_are_skipped_while_restricted() {
    let controller = RestrictionController::new(WINDOW);
    let locator = TestLocator::new();
    let presentation = RecordingPresentation::new();
    let online = Uuid::new_v4();
    let offline = Uuid::new_v4();
    locator.put_online(online);
    locator.put_online(offline);
    locator.set_offline(&offline);

    let start = Instant::now();
    controller.start(start);
    controller.tick(
        &[online, offline],
        &locator,
        &presentation,
        start + Duration::from_secs(1),
    );

    assert_eq!(presentation.count(&Seen::Applied(online, StatusKind::Blindness)), 1);
    assert_eq!(presentation.count(&Seen::Applied(offline, StatusKind::Blindness)), 0);
}

#[test]
fn stop_returns_controller_to_inactive() {
    let controller = RestrictionController::new(WINDOW);
    let start = Instant::now();
    controller.start(start);
    assert!(controller.is_restricted(start + Duration::from_secs(1)));

    controller.stop();
    assert_eq!(
        controller.phase(start + Duration::from_secs(1)),
        RestrictionPhase::Inactive
    );
    assert_eq!(controller.seconds_remaining(start + Duration::from_secs(1)), 0);
}

#[test]
fn hunt_restriction_binds_to_the_hunter_side_only() {
    let store = Arc::new(MemoryAssignmentStore::new());
    store.set_flag(FLAG_HUNT_ENABLED, true).unwrap();
    let roster = Arc::new(RosterStore::new(store.clone()));
    let locator = Arc::new(TestLocator::new());
    let presentation = Arc::new(RecordingPresentation::new());
    let tracker = HuntTracker::new(
        roster.clone(),
        locator.clone(),
        Arc::new(FlatWorld),
        presentation.clone(),
        store,
        TrackerConfig::default(),
    );

    let hunter = Uuid::new_v4();
    let runner = Uuid::new_v4();
    roster.set_faction(hunter, Some(&HUNTER_SIDE)).unwrap();
    roster.set_faction(runner, Some(&RUNNER_SIDE)).unwrap();
    locator.put_online(hunter);
    locator.put_online(runner);

    let start = Instant::now();
    assert!(tracker.start(start).unwrap());
    tracker.restriction_tick(start + Duration::from_secs(1));

    assert_eq!(presentation.count(&Seen::Applied(hunter, StatusKind::Blindness)), 1);
    assert_eq!(presentation.count(&Seen::Applied(runner, StatusKind::Blindness)), 0);
    assert!(tracker.is_restricted(start + Duration::from_secs(1)));
    assert_eq!(
        tracker.restricted_seconds_remaining(start + Duration::from_secs(30)),
        90
    );
}

#[test]
fn hunter_rejoining_mid_window_is_relocked() {
    let store = Arc::new(MemoryAssignmentStore::new());
    store.set_flag(FLAG_HUNT_ENABLED, true).unwrap();
    let roster = Arc::new(RosterStore::new(store.clone()));
    let locator = Arc::new(TestLocator::new());
    let presentation = Arc::new(RecordingPresentation::new());
    let tracker = HuntTracker::new(
        roster.clone(),
        locator.clone(),
        Arc::new(FlatWorld),
        presentation.clone(),
        store,
        TrackerConfig::default(),
    );

    let hunter = Uuid::new_v4();
    roster.set_faction(hunter, Some(&HUNTER_SIDE)).unwrap();

    let start = Instant::now();
    assert!(tracker.start(start).unwrap());

    locator.put_online(hunter);
    tracker.on_participant_join(hunter, start + Duration::from_secs(90));

    assert_eq!(presentation.count(&Seen::Applied(hunter, StatusKind::Blindness)), 1);
    assert!(presentation.events().contains(&Seen::Notice(
        hunter,
        MessageKey::RestrictionCountdown,
        vec!["30".to_string()],
    )));
}
