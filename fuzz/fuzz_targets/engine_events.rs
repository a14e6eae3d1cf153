#![no_main]

use autoplay::engine::{AutoplayEngine, PlayerEvent};
use autoplay::filter::Filter;
use autoplay::model::{EndReason, Track};
use autoplay::store::MemoryStore;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let catalog: Vec<Track> = (0..8u64)
        .map(|n| Track {
            id: format!("track_{n}"),
            title: format!("title {n}"),
            author: format!("author {n}"),
            uploader: format!("uploader {n}"),
            duration: 30 * (n + 1),
        })
        .collect();
    let mut engine = AutoplayEngine::new(MemoryStore::default());

    for byte in data {
        let subject = catalog[(byte >> 4) as usize % catalog.len()].clone();
        match byte % 8 {
            0 => {
                let _ = engine.toggle_autoplay(&catalog);
            }
            1 => {
                let _ = engine.toggle_blacklist(&catalog);
            }
            2 => {
                let _ = engine.handle_event(PlayerEvent::MusicEnded {
                    track: subject,
                    reason: EndReason::Terminated,
                    player_queue_len: (byte % 2) as usize,
                });
            }
            3 => {
                let _ = engine.handle_event(PlayerEvent::ForcedNext(subject));
            }
            4 => {
                let _ = engine.handle_event(PlayerEvent::TrackAdded(subject));
            }
            5 => {
                let _ = engine.handle_event(PlayerEvent::TrackRemoved(subject));
            }
            6 => {
                if let Ok(filter) = Filter::parse(&format!("!duration:{}", byte % 200)) {
                    let _ = engine.add_filter(filter, &catalog);
                }
            }
            _ => {
                let _ = engine.pick_random(&catalog);
            }
        }
    }
});
