//! Linear undo/redo over timeline snapshots
//!
//! Every committed edit stores the whole resulting [`Timeline`]. Snapshots are
//! never mutated after they are recorded; undo and redo only move a cursor.
//! Recording while the cursor is not at the newest snapshot discards the redo
//! branch, the usual editor behavior.

use super::Timeline;
use std::collections::VecDeque;
use std::time::Instant;
use tracing::trace;

/// Configuration for history depth
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HistoryConfig {
    /// Maximum number of snapshots kept, the current one included
    ///
    /// Oldest snapshots are evicted first. Values below 1 behave as 1.
    pub max_snapshots: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_snapshots: 100 }
    }
}

/// A recorded timeline state
#[derive(Debug, Clone)]
pub struct EditSnapshot {
    timeline: Timeline,
    description: String,
    recorded_at: Instant,
}

impl EditSnapshot {
    fn new(timeline: Timeline, description: String) -> Self {
        Self {
            timeline,
            description,
            recorded_at: Instant::now(),
        }
    }

    /// Timeline state stored by this snapshot
    #[must_use]
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Description of the edit that produced this state
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// When the snapshot was recorded
    #[must_use]
    pub fn recorded_at(&self) -> Instant {
        self.recorded_at
    }
}

/// Counters describing the history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryStats {
    /// Snapshots currently stored
    pub snapshots: usize,
    /// Steps available to undo
    pub undo_depth: usize,
    /// Steps available to redo
    pub redo_depth: usize,
    /// Snapshots evicted because of the depth limit
    pub evicted: usize,
}

/// Snapshot list with a cursor to the current state
///
/// Always holds at least one snapshot, so [`History::current`] never fails.
#[derive(Debug, Clone)]
pub struct History {
    config: HistoryConfig,
    snapshots: VecDeque<EditSnapshot>,
    index: usize,
    evicted: usize,
}

impl History {
    /// Start a history whose only snapshot is `initial`
    #[must_use]
    pub fn new(initial: Timeline) -> Self {
        Self::with_config(initial, HistoryConfig::default())
    }

    /// Start a history with a custom depth limit
    #[must_use]
    pub fn with_config(initial: Timeline, config: HistoryConfig) -> Self {
        let mut snapshots = VecDeque::new();
        snapshots.push_back(EditSnapshot::new(initial, String::from("initial")));
        Self {
            config,
            snapshots,
            index: 0,
            evicted: 0,
        }
    }

    /// Record a new state after the current one
    ///
    /// Snapshots after the cursor are dropped first, then `timeline` becomes
    /// the newest snapshot and the cursor moves onto it.
    pub fn record(&mut self, timeline: Timeline, description: impl Into<String>) -> &Timeline {
        let description = description.into();
        let discarded = self.snapshots.len() - self.index - 1;
        self.snapshots.truncate(self.index + 1);
        self.snapshots
            .push_back(EditSnapshot::new(timeline, description));
        self.index = self.snapshots.len() - 1;
        self.enforce_limit();

        trace!(
            index = self.index,
            snapshots = self.snapshots.len(),
            discarded,
            "recorded snapshot"
        );
        self.current()
    }

    /// Step back one snapshot; no-op at the oldest one
    pub fn undo(&mut self) -> &Timeline {
        if self.index > 0 {
            self.index -= 1;
        }
        self.current()
    }

    /// Step forward one snapshot; no-op at the newest one
    pub fn redo(&mut self) -> &Timeline {
        if self.index + 1 < self.snapshots.len() {
            self.index += 1;
        }
        self.current()
    }

    /// Timeline at the cursor
    #[must_use]
    pub fn current(&self) -> &Timeline {
        &self.snapshots[self.index].timeline
    }

    /// Snapshot at the cursor
    #[must_use]
    pub fn current_snapshot(&self) -> &EditSnapshot {
        &self.snapshots[self.index]
    }

    /// Check if undo would change the current state
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    /// Check if redo would change the current state
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.index + 1 < self.snapshots.len()
    }

    /// Description of the edit an undo would revert
    #[must_use]
    pub fn undo_description(&self) -> Option<&str> {
        self.can_undo()
            .then(|| self.snapshots[self.index].description())
    }

    /// Description of the edit a redo would reapply
    #[must_use]
    pub fn redo_description(&self) -> Option<&str> {
        self.snapshots
            .get(self.index + 1)
            .map(EditSnapshot::description)
    }

    /// Cursor position
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of stored snapshots
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Always false; a history holds at least its current snapshot
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Stored snapshots, oldest first
    pub fn snapshots(&self) -> impl Iterator<Item = &EditSnapshot> {
        self.snapshots.iter()
    }

    /// Depth limit in use
    #[must_use]
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Counters for the current state
    #[must_use]
    pub fn stats(&self) -> HistoryStats {
        HistoryStats {
            snapshots: self.snapshots.len(),
            undo_depth: self.index,
            redo_depth: self.snapshots.len() - self.index - 1,
            evicted: self.evicted,
        }
    }

    /// Forget every snapshot except the current one
    pub fn clear(&mut self) {
        if let Some(current) = self.snapshots.remove(self.index) {
            self.snapshots.clear();
            self.snapshots.push_back(current);
        }
        self.index = 0;
    }

    fn enforce_limit(&mut self) {
        let limit = self.config.max_snapshots.max(1);
        while self.snapshots.len() > limit && self.index > 0 {
            self.snapshots.pop_front();
            self.index -= 1;
            self.evicted += 1;
        }
    }
}
