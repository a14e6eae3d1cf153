use crate::model::{BlacklistStatus, EndReason};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-track exclusion state, keyed by track id.
///
/// Mutators report whether anything changed so the caller knows when to
/// persist; the map itself serializes as a plain object.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Blacklist {
    entries: HashMap<String, BlacklistStatus>,
}

impl Blacklist {
    pub fn get(&self, track_id: &str) -> Option<BlacklistStatus> {
        self.entries.get(track_id).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records a forced skip. The first skip of an unknown track only marks
    /// it `Ignored`; skipping a track that already has an entry overwrites
    /// it as `FullIgnored`.
    pub fn mark_forced_advance(&mut self, track_id: &str) -> BlacklistStatus {
        match self.entries.get_mut(track_id) {
            Some(status) => {
                *status = BlacklistStatus::FullIgnored;
                BlacklistStatus::FullIgnored
            }
            None => {
                self.entries
                    .insert(track_id.to_string(), BlacklistStatus::Ignored);
                BlacklistStatus::Ignored
            }
        }
    }

    pub fn clear(&mut self, track_id: &str) -> Option<BlacklistStatus> {
        self.entries.remove(track_id)
    }

    /// The player cannot start a `FullIgnored` track on its own, so a start
    /// means a human picked it and the block is lifted. Returns true when
    /// the entry changed.
    pub fn on_track_start(&mut self, track_id: &str) -> bool {
        if self.get(track_id) == Some(BlacklistStatus::FullIgnored) {
            self.entries.remove(track_id);
            return true;
        }
        false
    }

    /// A track that played through to its natural end is welcome again.
    /// Returns true when the entry changed.
    pub fn on_track_end(&mut self, track_id: &str, reason: EndReason) -> bool {
        if reason == EndReason::Terminated {
            return self.entries.remove(track_id).is_some();
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_forced_advance_marks_ignored() {
        let mut blacklist = Blacklist::default();
        assert_eq!(
            blacklist.mark_forced_advance("42"),
            BlacklistStatus::Ignored
        );
        assert_eq!(blacklist.get("42"), Some(BlacklistStatus::Ignored));
    }

    #[test]
    fn repeated_forced_advance_upgrades_to_full_ignored() {
        let mut blacklist = Blacklist::default();
        blacklist.mark_forced_advance("42");
        assert_eq!(
            blacklist.mark_forced_advance("42"),
            BlacklistStatus::FullIgnored
        );
        assert_eq!(blacklist.get("42"), Some(BlacklistStatus::FullIgnored));

        // A third skip keeps it FullIgnored.
        blacklist.mark_forced_advance("42");
        assert_eq!(blacklist.get("42"), Some(BlacklistStatus::FullIgnored));
    }

    #[test]
    fn natural_end_clears_any_status() {
        let mut blacklist = Blacklist::default();
        blacklist.mark_forced_advance("a");
        blacklist.mark_forced_advance("b");
        blacklist.mark_forced_advance("b");

        assert!(blacklist.on_track_end("a", EndReason::Terminated));
        assert!(blacklist.on_track_end("b", EndReason::Terminated));
        assert_eq!(blacklist.get("a"), None);
        assert_eq!(blacklist.get("b"), None);
    }

    #[test]
    fn non_terminated_end_keeps_the_entry() {
        let mut blacklist = Blacklist::default();
        blacklist.mark_forced_advance("a");

        assert!(!blacklist.on_track_end("a", EndReason::Stop));
        assert!(!blacklist.on_track_end("a", EndReason::Replaced));
        assert!(!blacklist.on_track_end("a", EndReason::Error));
        assert_eq!(blacklist.get("a"), Some(BlacklistStatus::Ignored));
    }

    #[test]
    fn manual_start_lifts_full_ignored_only() {
        let mut blacklist = Blacklist::default();
        blacklist.mark_forced_advance("a");

        assert!(!blacklist.on_track_start("a"));
        assert_eq!(blacklist.get("a"), Some(BlacklistStatus::Ignored));

        blacklist.mark_forced_advance("a");
        assert!(blacklist.on_track_start("a"));
        assert_eq!(blacklist.get("a"), None);
    }

    #[test]
    fn end_of_unknown_track_is_a_no_op() {
        let mut blacklist = Blacklist::default();
        assert!(!blacklist.on_track_end("missing", EndReason::Terminated));
        assert!(!blacklist.on_track_start("missing"));
        assert!(blacklist.is_empty());
    }

    #[test]
    fn serializes_as_a_plain_map() {
        let mut blacklist = Blacklist::default();
        blacklist.mark_forced_advance("42");
        let json = serde_json::to_string(&blacklist).expect("serialize");
        assert_eq!(json, r#"{"42":"Ignored"}"#);

        let back: Blacklist = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.get("42"), Some(BlacklistStatus::Ignored));
    }
}
