//! Pool-size checkpoint timeline.
//!
//! Every operation that changes the pool total appends one
//! [`PoolCheckpoint`]. Between two checkpoints the total is constant, so the
//! log partitions time into [`Segment`]s with a fixed reward denominator.
//!
//! Timestamps are non-decreasing. Several checkpoints may share a timestamp
//! (operations in the same second); the last of them is the one in effect.
//! Lookups binary-search the log with `partition_point`.

use crate::error::LedgerError;
use crate::types::{Amount, PoolCheckpoint, Segment, Timestamp};

/// Append-only timeline of pool totals.
#[derive(Debug, Clone, Default)]
pub struct PoolCheckpointLog {
    entries: Vec<PoolCheckpoint>,
}

impl PoolCheckpointLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Record that the pool total became `total_staked` at `timestamp`.
    ///
    /// # Errors
    ///
    /// [`LedgerError::ClockWentBackwards`] if `timestamp` precedes the latest
    /// checkpoint.
    pub fn append(&mut self, timestamp: Timestamp, total_staked: Amount) -> Result<(), LedgerError> {
        self.check_time(timestamp)?;
        self.entries.push(PoolCheckpoint { timestamp, total_staked });
        Ok(())
    }

    /// Verify that an append at `timestamp` would keep the log ordered.
    pub fn check_time(&self, timestamp: Timestamp) -> Result<(), LedgerError> {
        match self.entries.last() {
            Some(last) if timestamp < last.timestamp => Err(LedgerError::ClockWentBackwards {
                last: last.timestamp,
                now: timestamp,
            }),
            _ => Ok(()),
        }
    }

    /// Discard checkpoints appended after the log had `len` entries.
    ///
    /// Only for undoing appends of an operation that failed before it
    /// committed; committed history is never rewritten.
    pub fn rollback_to(&mut self, len: usize) {
        self.entries.truncate(len);
    }

    /// The most recent checkpoint.
    pub fn latest(&self) -> Option<&PoolCheckpoint> {
        self.entries.last()
    }

    /// Pool total of the most recent checkpoint, or 0 for an empty log.
    pub fn latest_total(&self) -> Amount {
        self.latest().map_or(0, |c| c.total_staked)
    }

    /// Pool total in effect at time `t`.
    ///
    /// Returns `None` if `t` precedes the first checkpoint.
    pub fn total_at(&self, t: Timestamp) -> Option<Amount> {
        let idx = self.entries.partition_point(|c| c.timestamp <= t);
        idx.checked_sub(1).map(|i| self.entries[i].total_staked)
    }

    /// Split `[from, to)` into constant-total segments.
    ///
    /// Boundaries are `from`, every checkpoint strictly inside the range,
    /// and `to`. Yields nothing when `to <= from`.
    pub fn segments(&self, from: Timestamp, to: Timestamp) -> Segments<'_> {
        let next = self.entries.partition_point(|c| c.timestamp <= from);
        let total = next.checked_sub(1).map_or(0, |i| self.entries[i].total_staked);
        Segments {
            entries: &self.entries,
            next,
            cursor: from,
            end: to,
            total,
        }
    }

    /// All checkpoints, oldest first.
    pub fn as_slice(&self) -> &[PoolCheckpoint] {
        &self.entries
    }

    /// Number of checkpoints.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no checkpoint has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Iterator over the constant-total segments of a time range.
///
/// Produced by [`PoolCheckpointLog::segments`].
pub struct Segments<'a> {
    entries: &'a [PoolCheckpoint],
    /// Index of the first checkpoint strictly after `cursor`.
    next: usize,
    cursor: Timestamp,
    end: Timestamp,
    /// Total in effect at `cursor`.
    total: Amount,
}

impl Iterator for Segments<'_> {
    type Item = Segment;

    fn next(&mut self) -> Option<Segment> {
        if self.cursor >= self.end {
            return None;
        }

        let boundary = match self.entries.get(self.next) {
            Some(c) if c.timestamp < self.end => c.timestamp,
            _ => self.end,
        };
        let segment = Segment {
            start: self.cursor,
            end: boundary,
            total_staked: self.total,
        };

        // Absorb every checkpoint at the new boundary; the last one wins.
        self.cursor = boundary;
        while let Some(c) = self.entries.get(self.next) {
            if c.timestamp > self.cursor {
                break;
            }
            self.total = c.total_staked;
            self.next += 1;
        }

        Some(segment)
    }
}
