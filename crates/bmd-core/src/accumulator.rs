//! Cumulative execution time per named entity.

use std::collections::HashMap;

use chrono::{DateTime, TimeDelta, Utc};

use crate::event::EntityKind;

/// Aggregated statistics for one named entity across all of its invocations
/// within the current session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionRecord {
    pub name: String,
    /// Total time across every invocation, not the most recent one.
    pub cumulative: TimeDelta,
    pub last_started_at: DateTime<Utc>,
    pub last_finished_at: DateTime<Utc>,
    pub last_succeeded: bool,
    /// Position of this entity's first completion, for stable tie ordering.
    first_seen: usize,
}

impl ExecutionRecord {
    /// Duration of the most recent invocation alone.
    #[must_use]
    pub fn last_invocation(&self) -> TimeDelta {
        self.last_finished_at - self.last_started_at
    }
}

/// Name-keyed store of [`ExecutionRecord`]s for one entity kind.
///
/// At most one record exists per name; repeated completions merge into the
/// existing record rather than replacing its history.
#[derive(Debug, Default)]
pub struct DurationStore {
    records: HashMap<String, ExecutionRecord>,
    next_index: usize,
}

impl DurationStore {
    /// Folds one completed invocation into the store and returns the merged
    /// record.
    ///
    /// A non-positive duration is reported as suspicious (host clock
    /// anomalies are outside this crate's control) but accumulated as-is,
    /// never clamped.
    pub fn record_completion(
        &mut self,
        name: &str,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        succeeded: bool,
    ) -> &ExecutionRecord {
        let duration = finished_at - started_at;
        if duration <= TimeDelta::zero() {
            tracing::warn!(
                name,
                duration_ms = duration.num_milliseconds(),
                "suspicious non-positive execution duration"
            );
        }

        let index = self.next_index;
        let record = self
            .records
            .entry(name.to_string())
            .and_modify(|existing| {
                existing.cumulative += duration;
                existing.last_started_at = started_at;
                existing.last_finished_at = finished_at;
                existing.last_succeeded = succeeded;
            })
            .or_insert_with(|| ExecutionRecord {
                name: name.to_string(),
                cumulative: duration,
                last_started_at: started_at,
                last_finished_at: finished_at,
                last_succeeded: succeeded,
                first_seen: index,
            });
        if record.first_seen == index {
            self.next_index += 1;
        }
        record
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ExecutionRecord> {
        self.records.get(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records sorted by cumulative duration descending; ties keep the order
    /// in which the entities first completed.
    #[must_use]
    pub fn ranked(&self) -> Vec<&ExecutionRecord> {
        let mut records: Vec<_> = self.records.values().collect();
        records.sort_by_key(|r| (std::cmp::Reverse(r.cumulative), r.first_seen));
        records
    }
}

/// One [`DurationStore`] per entity kind.
#[derive(Debug, Default)]
pub struct DurationAccumulator {
    projects: DurationStore,
    targets: DurationStore,
    tasks: DurationStore,
}

impl DurationAccumulator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_completion(
        &mut self,
        kind: EntityKind,
        name: &str,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        succeeded: bool,
    ) -> &ExecutionRecord {
        self.store_mut(kind)
            .record_completion(name, started_at, finished_at, succeeded)
    }

    #[must_use]
    pub fn store(&self, kind: EntityKind) -> &DurationStore {
        match kind {
            EntityKind::Project => &self.projects,
            EntityKind::Target => &self.targets,
            EntityKind::Task => &self.tasks,
        }
    }

    fn store_mut(&mut self, kind: EntityKind) -> &mut DurationStore {
        match kind {
            EntityKind::Project => &mut self.projects,
            EntityKind::Target => &mut self.targets,
            EntityKind::Task => &mut self.tasks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(seconds: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0)
            .single()
            .expect("valid test timestamp")
            + TimeDelta::seconds(seconds)
    }

    #[test]
    fn single_completion_records_elapsed_time() {
        let mut store = DurationStore::default();
        let record = store.record_completion("Compile", ts(0), ts(3), true);

        assert_eq!(record.cumulative, TimeDelta::seconds(3));
        assert_eq!(record.last_invocation(), TimeDelta::seconds(3));
        assert!(record.last_succeeded);
    }

    #[test]
    fn repeated_completions_accumulate() {
        let mut store = DurationStore::default();
        store.record_completion("Build", ts(0), ts(2), true);
        let record = store.record_completion("Build", ts(3), ts(5), true);

        assert_eq!(record.cumulative, TimeDelta::seconds(4));
        assert_eq!(record.last_invocation(), TimeDelta::seconds(2));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn accumulation_is_independent_of_interleaving() {
        let mut store = DurationStore::default();
        store.record_completion("A", ts(0), ts(1), true);
        store.record_completion("B", ts(1), ts(4), true);
        store.record_completion("A", ts(4), ts(6), true);
        store.record_completion("B", ts(6), ts(7), false);

        assert_eq!(store.get("A").unwrap().cumulative, TimeDelta::seconds(3));
        assert_eq!(store.get("B").unwrap().cumulative, TimeDelta::seconds(4));
        assert!(!store.get("B").unwrap().last_succeeded);
    }

    #[test]
    fn ranked_sorts_by_cumulative_descending() {
        let mut store = DurationStore::default();
        store.record_completion("Fast", ts(0), ts(1), true);
        store.record_completion("Slow", ts(1), ts(9), true);
        store.record_completion("Medium", ts(9), ts(13), true);

        let names: Vec<_> = store.ranked().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Slow", "Medium", "Fast"]);
    }

    #[test]
    fn ranked_ties_keep_first_completion_order() {
        let mut store = DurationStore::default();
        store.record_completion("Second", ts(0), ts(2), true);
        store.record_completion("Third", ts(2), ts(4), true);
        store.record_completion("First", ts(4), ts(9), true);

        // Second and Third both total 2s; Second completed first.
        let names: Vec<_> = store.ranked().iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["First", "Second", "Third"]);
    }

    #[test]
    fn negative_duration_is_kept_not_clamped() {
        let mut store = DurationStore::default();
        let record = store.record_completion("Odd", ts(5), ts(2), true);
        assert_eq!(record.cumulative, TimeDelta::seconds(-3));
    }

    #[test]
    fn accumulator_keeps_kinds_separate() {
        let mut acc = DurationAccumulator::new();
        acc.record_completion(EntityKind::Target, "Build", ts(0), ts(2), true);
        acc.record_completion(EntityKind::Task, "Build", ts(0), ts(5), true);

        assert_eq!(
            acc.store(EntityKind::Target).get("Build").unwrap().cumulative,
            TimeDelta::seconds(2)
        );
        assert_eq!(
            acc.store(EntityKind::Task).get("Build").unwrap().cumulative,
            TimeDelta::seconds(5)
        );
        assert!(acc.store(EntityKind::Project).is_empty());
    }
}
