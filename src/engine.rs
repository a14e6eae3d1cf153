use crate::blacklist::Blacklist;
use crate::error::EngineError;
use crate::filter::{Filter, FilterRepr, FilterSet};
use crate::model::{EndReason, Track};
use crate::preset::{PresetStore, StoredPreset};
use crate::store::KvStore;
use anyhow::{Context, Result};
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use serde::de::DeserializeOwned;
use std::collections::VecDeque;
use tracing::{debug, info, warn};

const BLACKLIST_KEY: &str = "blacklist";
const PRESETS_KEY: &str = "presets";
const FILTERS_KEY: &str = "filters";
const AUTOPLAY_ACTIVE_KEY: &str = "autoplay_active";
const BLACKLIST_ACTIVE_KEY: &str = "blacklist_active";

/// What the host should do to the player after an event. The engine never
/// touches the player itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    PlayTrack(String),
    EnqueueTrack(String),
}

/// Catalog and playback notifications, delivered one at a time in order.
#[derive(Debug, Clone)]
pub enum PlayerEvent {
    TrackAdded(Track),
    TrackRemoved(Track),
    MusicStarted(Track),
    MusicEnded {
        track: Track,
        reason: EndReason,
        /// Length of the external playback queue at the time of the event,
        /// used to decide between playing and enqueueing the next pick.
        player_queue_len: usize,
    },
    ForcedNext(Track),
}

/// The autoplay state machine: an active/inactive toggle, the filtered and
/// shuffled candidate queue, and the blacklist bookkeeping driven by
/// playback events.
///
/// One instance per session, owned by a single thread. Every mutation writes
/// through to the store; `load` restores the whole session at start.
pub struct AutoplayEngine<S: KvStore> {
    store: S,
    filters: FilterSet,
    blacklist: Blacklist,
    presets: PresetStore,
    autoplay_active: bool,
    blacklist_active: bool,
    candidate_queue: VecDeque<Track>,
    rng: SmallRng,
}

impl<S: KvStore> AutoplayEngine<S> {
    pub fn new(store: S) -> Self {
        Self::with_rng(store, SmallRng::from_os_rng())
    }

    /// Like `new` but with a caller-supplied RNG, so shuffles are
    /// reproducible in tests.
    pub fn with_rng(store: S, rng: SmallRng) -> Self {
        Self {
            store,
            filters: FilterSet::default(),
            blacklist: Blacklist::default(),
            presets: PresetStore::default(),
            autoplay_active: false,
            blacklist_active: false,
            candidate_queue: VecDeque::new(),
            rng,
        }
    }

    /// Restores filters, blacklist, presets and toggles from the store.
    /// Unreadable values are discarded with a warning rather than failing
    /// the session.
    pub fn load(&mut self, catalog: &[Track]) {
        self.blacklist = self.restore(BLACKLIST_KEY);
        let stored: Vec<StoredPreset> = self.restore(PRESETS_KEY);
        self.presets = PresetStore::from_stored(stored);
        let reprs: Vec<FilterRepr> = self.restore(FILTERS_KEY);
        self.filters = FilterSet::restore(reprs);
        self.autoplay_active = self.restore(AUTOPLAY_ACTIVE_KEY);
        self.blacklist_active = self.restore(BLACKLIST_ACTIVE_KEY);
        self.recompute_after_filter_change(catalog);
        info!(
            filters = self.filters.len(),
            blacklisted = self.blacklist.len(),
            presets = self.presets.len(),
            autoplay = self.autoplay_active,
            "session state restored"
        );
    }

    pub fn autoplay_active(&self) -> bool {
        self.autoplay_active
    }

    pub fn blacklist_active(&self) -> bool {
        self.blacklist_active
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    pub fn blacklist(&self) -> &Blacklist {
        &self.blacklist
    }

    pub fn candidates(&self) -> impl Iterator<Item = &Track> {
        self.candidate_queue.iter()
    }

    pub fn candidate_count(&self) -> usize {
        self.candidate_queue.len()
    }

    /// Flips autoplay. Toggling on computes the candidate queue from the
    /// catalog and shuffles it once; toggling off drops it.
    pub fn toggle_autoplay(&mut self, catalog: &[Track]) -> Result<bool> {
        self.autoplay_active = !self.autoplay_active;
        if self.autoplay_active {
            self.rebuild_candidate_queue(catalog);
        } else {
            self.candidate_queue.clear();
        }
        self.persist_flag(AUTOPLAY_ACTIVE_KEY, self.autoplay_active)?;
        info!(active = self.autoplay_active, "autoplay toggled");
        Ok(self.autoplay_active)
    }

    pub fn toggle_blacklist(&mut self, catalog: &[Track]) -> Result<bool> {
        self.blacklist_active = !self.blacklist_active;
        self.persist_flag(BLACKLIST_ACTIVE_KEY, self.blacklist_active)?;
        self.recompute_after_filter_change(catalog);
        info!(active = self.blacklist_active, "blacklist toggled");
        Ok(self.blacklist_active)
    }

    pub fn add_filter(&mut self, filter: Filter, catalog: &[Track]) -> Result<()> {
        debug!(filter = %filter, "filter added");
        self.filters.add(filter);
        self.persist_filters()?;
        self.recompute_after_filter_change(catalog);
        Ok(())
    }

    pub fn remove_filter(&mut self, index: usize, catalog: &[Track]) -> Result<Filter> {
        let removed = self.filters.remove_at(index)?;
        debug!(filter = %removed, "filter removed");
        self.persist_filters()?;
        self.recompute_after_filter_change(catalog);
        Ok(removed)
    }

    pub fn reset_filters(&mut self, catalog: &[Track]) -> Result<()> {
        self.filters.clear();
        self.persist_filters()?;
        self.recompute_after_filter_change(catalog);
        Ok(())
    }

    pub fn save_preset(&mut self, name: &str) -> Result<()> {
        let filters: Vec<Filter> = self.filters.iter().cloned().collect();
        self.presets.save(name, &filters)?;
        self.persist_presets()?;
        info!(preset = name, "filters saved as preset");
        Ok(())
    }

    /// Replaces the live filter set with the named preset's contents.
    pub fn load_preset(&mut self, name: &str, catalog: &[Track]) -> Result<()> {
        let filters = self.presets.load(name)?;
        self.filters.replace(filters);
        self.persist_filters()?;
        self.recompute_after_filter_change(catalog);
        info!(preset = name, "preset loaded");
        Ok(())
    }

    pub fn preset_names(&self) -> Vec<&str> {
        self.presets.list_names()
    }

    /// Dispatches one host notification. At most one effect comes back, and
    /// only from `MusicEnded`.
    pub fn handle_event(&mut self, event: PlayerEvent) -> Result<Option<Effect>> {
        match event {
            PlayerEvent::TrackAdded(track) => {
                self.on_track_added(&track);
                Ok(None)
            }
            PlayerEvent::TrackRemoved(track) => {
                self.on_track_removed(&track);
                Ok(None)
            }
            PlayerEvent::MusicStarted(track) => {
                self.on_music_started(&track)?;
                Ok(None)
            }
            PlayerEvent::MusicEnded {
                track,
                reason,
                player_queue_len,
            } => self.on_music_ended(&track, reason, player_queue_len),
            PlayerEvent::ForcedNext(track) => {
                self.on_player_forced_next(&track)?;
                Ok(None)
            }
        }
    }

    /// A new catalog track joins the tail of the queue if it passes the
    /// current filters; no reshuffle, so established rotation order holds.
    pub fn on_track_added(&mut self, track: &Track) {
        if self.autoplay_active
            && self
                .filters
                .is_eligible(track, &self.blacklist, self.blacklist_active)
        {
            self.candidate_queue.push_back(track.clone());
        }
    }

    pub fn on_track_removed(&mut self, track: &Track) {
        if let Some(pos) = self
            .candidate_queue
            .iter()
            .position(|candidate| candidate.id == track.id)
        {
            self.candidate_queue.remove(pos);
        }
    }

    pub fn on_music_started(&mut self, track: &Track) -> Result<()> {
        if self.blacklist.on_track_start(&track.id) {
            info!(track = %track.id, "blacklist entry lifted by manual start");
            self.persist_blacklist()?;
        }
        Ok(())
    }

    /// Runs the blacklist end-of-track rule, then advances the rotation when
    /// autoplay is on and the track wasn't stopped outright.
    pub fn on_music_ended(
        &mut self,
        track: &Track,
        reason: EndReason,
        player_queue_len: usize,
    ) -> Result<Option<Effect>> {
        if self.blacklist.on_track_end(&track.id, reason) {
            info!(track = %track.id, "blacklist entry cleared after natural end");
            self.persist_blacklist()?;
        }
        if !self.autoplay_active || reason == EndReason::Stop {
            return Ok(None);
        }
        let Some(next_id) = self.rotate_candidate() else {
            return Ok(None);
        };
        let effect = if player_queue_len == 0 {
            Effect::PlayTrack(next_id)
        } else {
            Effect::EnqueueTrack(next_id)
        };
        debug!(?effect, "autoplay advance");
        Ok(Some(effect))
    }

    pub fn on_player_forced_next(&mut self, track: &Track) -> Result<()> {
        if self.blacklist_active {
            let status = self.blacklist.mark_forced_advance(&track.id);
            debug!(track = %track.id, ?status, "forced advance recorded");
            self.persist_blacklist()?;
        }
        Ok(())
    }

    /// Caller-invoked pick: rotates the candidate queue when autoplay is on,
    /// otherwise draws uniformly from the whole catalog.
    pub fn pick_random(&mut self, catalog: &[Track]) -> Result<String, EngineError> {
        if self.autoplay_active {
            return self.rotate_candidate().ok_or(EngineError::NoTracksAvailable);
        }
        if catalog.is_empty() {
            return Err(EngineError::NoTracksAvailable);
        }
        let index = self.rng.random_range(0..catalog.len());
        Ok(catalog[index].id.clone())
    }

    /// Full rebuild, same as toggling autoplay on. Must be called by the
    /// command layer after any filter, blacklist-toggle or preset change.
    pub fn recompute_after_filter_change(&mut self, catalog: &[Track]) {
        if self.autoplay_active {
            self.rebuild_candidate_queue(catalog);
        } else {
            self.candidate_queue.clear();
        }
    }

    fn rebuild_candidate_queue(&mut self, catalog: &[Track]) {
        let mut candidates: Vec<Track> = catalog
            .iter()
            .filter(|track| {
                self.filters
                    .is_eligible(track, &self.blacklist, self.blacklist_active)
            })
            .cloned()
            .collect();
        candidates.shuffle(&mut self.rng);
        debug!(
            candidates = candidates.len(),
            catalog = catalog.len(),
            "candidate queue rebuilt"
        );
        self.candidate_queue = candidates.into();
    }

    fn rotate_candidate(&mut self) -> Option<String> {
        let track = self.candidate_queue.pop_front()?;
        let id = track.id.clone();
        self.candidate_queue.push_back(track);
        Some(id)
    }

    fn restore<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let Some(raw) = self.store.get(key) else {
            return T::default();
        };
        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                warn!(key, error = %err, "discarding unreadable stored value");
                T::default()
            }
        }
    }

    fn persist_blacklist(&mut self) -> Result<()> {
        let json =
            serde_json::to_string(&self.blacklist).context("failed to serialize blacklist")?;
        self.store.set(BLACKLIST_KEY, &json)
    }

    fn persist_filters(&mut self) -> Result<()> {
        let json = serde_json::to_string(&self.filters.serialize())
            .context("failed to serialize filters")?;
        self.store.set(FILTERS_KEY, &json)
    }

    fn persist_presets(&mut self) -> Result<()> {
        let json = serde_json::to_string(&self.presets.to_stored())
            .context("failed to serialize presets")?;
        self.store.set(PRESETS_KEY, &json)
    }

    fn persist_flag(&mut self, key: &str, value: bool) -> Result<()> {
        self.store.set(key, if value { "true" } else { "false" })
    }
}
