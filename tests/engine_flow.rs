use autoplay::engine::{AutoplayEngine, Effect, PlayerEvent};
use autoplay::filter::Filter;
use autoplay::model::{BlacklistStatus, EndReason, Track};
use autoplay::store::MemoryStore;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use std::collections::HashSet;

fn track(id: &str, author: &str, duration: u64) -> Track {
    Track {
        id: String::from(id),
        title: format!("title {id}"),
        author: String::from(author),
        uploader: String::from("uploader"),
        duration,
    }
}

fn engine() -> AutoplayEngine<MemoryStore> {
    AutoplayEngine::with_rng(MemoryStore::default(), SmallRng::seed_from_u64(42))
}

#[test]
fn autoplay_flow_works() {
    let catalog = vec![
        track("a", "admin", 120),
        track("b", "admin", 400),
        track("c", "guest", 90),
    ];
    let mut engine = engine();

    engine
        .add_filter(Filter::parse("duration:300").expect("filter"), &catalog)
        .expect("add filter");
    engine.toggle_autoplay(&catalog).expect("toggle");

    let ids: HashSet<&str> = engine.candidates().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, HashSet::from(["a", "c"]));

    // First advance with an empty player queue starts playback, the next one
    // with a pending queue only enqueues.
    let first = engine
        .handle_event(PlayerEvent::MusicEnded {
            track: catalog[1].clone(),
            reason: EndReason::Terminated,
            player_queue_len: 0,
        })
        .expect("event")
        .expect("effect");
    assert!(matches!(first, Effect::PlayTrack(_)));

    let second = engine
        .handle_event(PlayerEvent::MusicEnded {
            track: catalog[1].clone(),
            reason: EndReason::Terminated,
            player_queue_len: 1,
        })
        .expect("event")
        .expect("effect");
    assert!(matches!(second, Effect::EnqueueTrack(_)));

    let first_id = match first {
        Effect::PlayTrack(id) => id,
        Effect::EnqueueTrack(id) => id,
    };
    let second_id = match second {
        Effect::PlayTrack(id) => id,
        Effect::EnqueueTrack(id) => id,
    };
    assert_ne!(first_id, second_id);
}

#[test]
fn preset_save_and_load_restores_equivalent_filters() {
    let catalog = vec![track("a", "admin", 120)];
    let mut engine = engine();

    engine
        .add_filter(Filter::parse("author:admin").expect("filter"), &catalog)
        .expect("add filter");
    let saved_form = engine.filters().serialize();

    engine.save_preset("mine").expect("save");
    engine.reset_filters(&catalog).expect("reset");
    assert!(engine.filters().is_empty());

    engine.load_preset("mine", &catalog).expect("load");
    assert_eq!(engine.filters().serialize(), saved_form);
    assert_eq!(engine.preset_names(), vec!["mine"]);
}

#[test]
fn skipped_tracks_drop_out_of_rotation_until_replayed() {
    let catalog = vec![track("a", "x", 100), track("b", "y", 100)];
    let mut engine = engine();

    engine.toggle_blacklist(&catalog).expect("blacklist on");

    // Two forced skips push "a" to FullIgnored.
    engine
        .handle_event(PlayerEvent::ForcedNext(catalog[0].clone()))
        .expect("event");
    engine
        .handle_event(PlayerEvent::ForcedNext(catalog[0].clone()))
        .expect("event");
    assert_eq!(
        engine.blacklist().get("a"),
        Some(BlacklistStatus::FullIgnored)
    );

    engine.toggle_autoplay(&catalog).expect("autoplay on");
    assert_eq!(engine.candidate_count(), 1);

    // A human starting the track lifts the block.
    engine
        .handle_event(PlayerEvent::MusicStarted(catalog[0].clone()))
        .expect("event");
    engine.recompute_after_filter_change(&catalog);
    assert_eq!(engine.candidate_count(), 2);
}

#[test]
fn catalog_changes_update_the_queue_incrementally() {
    let catalog = vec![track("a", "x", 100)];
    let mut engine = engine();
    engine.toggle_autoplay(&catalog).expect("toggle");

    engine
        .handle_event(PlayerEvent::TrackAdded(track("b", "y", 100)))
        .expect("event");
    assert_eq!(engine.candidate_count(), 2);

    engine
        .handle_event(PlayerEvent::TrackRemoved(catalog[0].clone()))
        .expect("event");
    assert_eq!(engine.candidate_count(), 1);
    assert!(engine.candidates().all(|t| t.id == "b"));
}
