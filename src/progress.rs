//! The learner's progress store.
//!
//! Owns the single `ProgressRecord`. Every mutation updates the in-memory
//! record and then writes the whole record back to storage under one key.
//! A failed write is logged; the in-memory record stays authoritative and the
//! next successful write catches storage up.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, error, info, instrument, warn};

use crate::domain::{Badge, ProgressRecord};
use crate::seeds::{FIRST_STEPS, LOGIC_MASTER};
use crate::storage::KeyValueStorage;

/// Automatic badge rules: (badge id, threshold check).
/// Badges not listed here are granted explicitly through `earn_badge`.
const BADGE_RULES: &[(&str, fn(&ProgressRecord) -> bool)] = &[
    (FIRST_STEPS, completed_any_lesson),
    (LOGIC_MASTER, reached_hundred_points),
];

fn completed_any_lesson(r: &ProgressRecord) -> bool {
    !r.completed_lessons.is_empty()
}

fn reached_hundred_points(r: &ProgressRecord) -> bool {
    r.points >= 100
}

pub struct ProgressStore {
    storage: Arc<dyn KeyValueStorage>,
    key: String,
    record: ProgressRecord,
}

impl ProgressStore {
    /// Rehydrate from storage, or start from the zero-state built on `badges`.
    ///
    /// An unreadable or unparseable blob is logged and replaced by the default
    /// record; it is overwritten on the next mutation.
    #[instrument(level = "info", skip(storage, badges))]
    pub fn open(storage: Arc<dyn KeyValueStorage>, key: &str, badges: Vec<Badge>) -> Self {
        let record = match storage.get(key) {
            Ok(Some(blob)) => match serde_json::from_str::<ProgressRecord>(&blob) {
                Ok(saved) => {
                    info!(target: "progress", %key, points = saved.points, level = saved.level, "Rehydrated progress");
                    reconcile_badges(saved, &badges)
                }
                Err(e) => {
                    error!(target: "progress", %key, error = %e, "Stored progress is corrupt; starting fresh");
                    ProgressRecord::fresh(badges)
                }
            },
            Ok(None) => {
                info!(target: "progress", %key, "No stored progress; starting fresh");
                ProgressRecord::fresh(badges)
            }
            Err(e) => {
                error!(target: "progress", %key, error = %e, "Failed to read stored progress; starting fresh");
                ProgressRecord::fresh(badges)
            }
        };

        Self { storage, key: key.to_string(), record }
    }

    pub fn record(&self) -> &ProgressRecord {
        &self.record
    }

    #[instrument(level = "debug", skip(self))]
    pub fn add_points(&mut self, points: u64) {
        self.record.points = self.record.points.saturating_add(points);
        debug!(target: "progress", added = points, total = self.record.points, "Points added");
        self.persist();
    }

    /// Record a lesson as completed. Re-completing a lesson is a no-op apart
    /// from the write.
    #[instrument(level = "debug", skip(self))]
    pub fn complete_lesson(&mut self, lesson_id: &str) {
        if self.record.has_completed(lesson_id) {
            debug!(target: "progress", %lesson_id, "Lesson already completed");
        } else {
            self.record.completed_lessons.push(lesson_id.to_string());
            info!(target: "progress", %lesson_id, completed = self.record.completed_lessons.len(), "Lesson completed");
        }
        self.persist();
    }

    #[instrument(level = "debug", skip(self))]
    pub fn unlock_level(&mut self, level: u32) {
        if level > self.record.level {
            info!(target: "progress", from = self.record.level, to = level, "Level unlocked");
            self.record.level = level;
        }
        self.persist();
    }

    /// Mark a badge earned. Returns true only on the unearned -> earned edge.
    #[instrument(level = "debug", skip(self))]
    pub fn earn_badge(&mut self, badge_id: &str) -> bool {
        let changed = match self.record.badges.iter_mut().find(|b| b.id == badge_id) {
            Some(badge) if !badge.earned => {
                badge.earned = true;
                badge.earned_at = Some(Utc::now());
                info!(target: "progress", %badge_id, "Badge earned");
                true
            }
            Some(_) => false,
            None => {
                debug!(target: "progress", %badge_id, "Ignoring unknown badge");
                false
            }
        };
        self.persist();
        changed
    }

    /// Run the automatic badge rules and earn every badge whose threshold is
    /// met. Returns the ids earned in this pass.
    #[instrument(level = "debug", skip(self))]
    pub fn check_badge_eligibility(&mut self) -> Vec<String> {
        let due: Vec<&str> = BADGE_RULES
            .iter()
            .filter(|(id, rule)| rule(&self.record) && !self.record.has_earned(id))
            .map(|(id, _)| *id)
            .collect();

        due.into_iter()
            .filter(|id| self.earn_badge(id))
            .map(str::to_string)
            .collect()
    }

    fn persist(&self) {
        let blob = match serde_json::to_string(&self.record) {
            Ok(b) => b,
            Err(e) => {
                error!(target: "progress", key = %self.key, error = %e, "Failed to serialize progress");
                return;
            }
        };
        if let Err(e) = self.storage.set(&self.key, &blob) {
            error!(target: "progress", key = %self.key, error = %e, "Failed to persist progress; in-memory record kept");
        }
    }
}

/// Keep the badge set fixed: the configured badges in their order, carrying
/// earned state over from the stored record where the ids match.
fn reconcile_badges(mut saved: ProgressRecord, badges: &[Badge]) -> ProgressRecord {
    let stored = std::mem::take(&mut saved.badges);
    for old in &stored {
        if !badges.iter().any(|b| b.id == old.id) {
            warn!(target: "progress", badge_id = %old.id, "Dropping stored badge not in the badge set");
        }
    }
    saved.badges = badges
        .iter()
        .map(|b| match stored.iter().find(|s| s.id == b.id) {
            Some(s) => Badge { earned: s.earned, earned_at: s.earned_at, ..b.clone() },
            None => Badge { earned: false, earned_at: None, ..b.clone() },
        })
        .collect();
    saved
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seeds::seed_badges;
    use crate::storage::MemoryStorage;

    const KEY: &str = "debate-platform-progress";

    fn fresh_store() -> (Arc<MemoryStorage>, ProgressStore) {
        let storage = Arc::new(MemoryStorage::new());
        let store = ProgressStore::open(storage.clone(), KEY, seed_badges());
        (storage, store)
    }

    fn stored(storage: &MemoryStorage) -> ProgressRecord {
        let blob = storage.get(KEY).unwrap().expect("record was persisted");
        serde_json::from_str(&blob).unwrap()
    }

    #[test]
    fn default_record_is_zero_state() {
        let (_, store) = fresh_store();
        let r = store.record();
        assert_eq!(r.points, 0);
        assert_eq!(r.level, 0);
        assert!(r.completed_lessons.is_empty());
        assert_eq!(r.badges.len(), 6);
        assert!(r.badges.iter().all(|b| !b.earned && b.earned_at.is_none()));
    }

    #[test]
    fn points_accumulate_and_never_decrease() {
        let (_, mut store) = fresh_store();
        let mut last = 0;
        for n in [0, 5, 20, 0, 75] {
            store.add_points(n);
            assert!(store.record().points >= last);
            last = store.record().points;
        }
        assert_eq!(store.record().points, 100);
    }

    #[test]
    fn unlock_level_takes_the_max() {
        let (_, mut store) = fresh_store();
        store.unlock_level(2);
        assert_eq!(store.record().level, 2);
        store.unlock_level(1);
        assert_eq!(store.record().level, 2);
        store.unlock_level(2);
        assert_eq!(store.record().level, 2);
        store.unlock_level(4);
        assert_eq!(store.record().level, 4);
    }

    #[test]
    fn earn_badge_is_idempotent() {
        let (_, mut store) = fresh_store();
        assert!(store.earn_badge("rebuttal-expert"));
        let after_first = store.record().clone();
        let badge = after_first.badge("rebuttal-expert").unwrap();
        assert!(badge.earned);
        assert!(badge.earned_at.is_some());

        assert!(!store.earn_badge("rebuttal-expert"));
        assert_eq!(store.record(), &after_first);
    }

    #[test]
    fn unknown_badge_leaves_badges_unchanged() {
        let (storage, mut store) = fresh_store();
        let before = store.record().badges.clone();
        assert!(!store.earn_badge("nonexistent"));
        assert_eq!(store.record().badges, before);
        // still written
        assert_eq!(stored(&storage).badges, before);
    }

    #[test]
    fn completing_twice_keeps_one_entry() {
        let (_, mut store) = fresh_store();
        store.complete_lesson("basics-1");
        store.complete_lesson("basics-1");
        assert_eq!(store.record().completed_lessons, vec!["basics-1".to_string()]);
    }

    #[test]
    fn first_steps_is_earned_exactly_once() {
        let (_, mut store) = fresh_store();
        store.complete_lesson("x");
        assert_eq!(store.check_badge_eligibility(), vec![FIRST_STEPS.to_string()]);
        let earned_at = store.record().badge(FIRST_STEPS).unwrap().earned_at;
        for _ in 0..3 {
            assert!(store.check_badge_eligibility().is_empty());
        }
        assert_eq!(store.record().badge(FIRST_STEPS).unwrap().earned_at, earned_at);
    }

    #[test]
    fn lesson_then_twenty_points_earns_only_first_steps() {
        let (_, mut store) = fresh_store();
        store.complete_lesson("basics-1-q1");
        store.add_points(20);
        store.check_badge_eligibility();

        let r = store.record();
        assert_eq!(r.completed_lessons, vec!["basics-1-q1".to_string()]);
        assert_eq!(r.points, 20);
        assert!(r.has_earned(FIRST_STEPS));
        assert!(!r.has_earned(LOGIC_MASTER));
    }

    #[test]
    fn hundred_points_earns_logic_master() {
        let (_, mut store) = fresh_store();
        store.add_points(100);
        assert_eq!(store.check_badge_eligibility(), vec![LOGIC_MASTER.to_string()]);
        assert!(store.record().has_earned(LOGIC_MASTER));
        assert!(!store.record().has_earned(FIRST_STEPS));
    }

    #[test]
    fn every_mutation_is_persisted_and_rehydrates_equal() {
        let (storage, mut store) = fresh_store();
        store.add_points(42);
        store.complete_lesson("basics-2");
        store.unlock_level(1);
        store.earn_badge("fallacy-hunter");
        assert_eq!(&stored(&storage), store.record());

        let reopened = ProgressStore::open(storage.clone(), KEY, seed_badges());
        assert_eq!(reopened.record(), store.record());
    }

    #[test]
    fn failed_write_keeps_in_memory_record() {
        let (storage, mut store) = fresh_store();
        store.add_points(10);
        storage.set_fail_writes(true);
        store.add_points(5);
        assert_eq!(store.record().points, 15);
        assert_eq!(stored(&storage).points, 10);

        storage.set_fail_writes(false);
        store.unlock_level(1);
        assert_eq!(stored(&storage).points, 15);
    }

    #[test]
    fn corrupt_blob_falls_back_to_default() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(KEY, "{not json").unwrap();
        let store = ProgressStore::open(storage, KEY, seed_badges());
        assert_eq!(store.record(), &ProgressRecord::fresh(seed_badges()));
    }

    #[test]
    fn rehydrate_reads_the_original_blob_shape() {
        let storage = Arc::new(MemoryStorage::new());
        let blob = r#"{
            "level": 1,
            "points": 85,
            "badges": [
                {"id": "first-steps", "name": "First Steps", "description": "Complete your first lesson",
                 "icon": "🎯", "earned": true, "earnedAt": "2025-03-01T10:00:00.000Z"},
                {"id": "retired-badge", "name": "Old", "description": "", "icon": "", "earned": true}
            ],
            "completedLessons": ["basics-1", "basics-2"]
        }"#;
        storage.set(KEY, blob).unwrap();

        let store = ProgressStore::open(storage, KEY, seed_badges());
        let r = store.record();
        assert_eq!(r.level, 1);
        assert_eq!(r.points, 85);
        assert_eq!(r.completed_lessons.len(), 2);
        assert_eq!(r.badges.len(), 6);
        assert!(r.has_earned(FIRST_STEPS));
        assert!(r.badge("retired-badge").is_none());
        assert!(!r.has_earned(LOGIC_MASTER));
    }
}
