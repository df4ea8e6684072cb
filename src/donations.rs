//! Weekly donation tracking.
//!
//! The API only reports donations for the current upstream period, so this
//! module keeps its own history: at most one snapshot per week (newest first,
//! the last [`HISTORY_CAPACITY`] kept) and running all-time totals per member.
//! Totals are updated before old snapshots are pruned, so pruning never loses
//! a member's contribution.

use chrono::{DateTime, Utc};
use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, Serializer};

use crate::Map;

use std::collections::vec_deque::{self, VecDeque};



/// Number of weekly snapshots kept in a [`DonationHistory`].
pub const HISTORY_CAPACITY: usize = 12;
/// Minimum whole days between two snapshots.
pub const SNAPSHOT_INTERVAL_DAYS: i64 = 6;

/// An ordered sequence holding at most `N` entries, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedHistory<T, const N: usize> {
  entries: VecDeque<T>
}

impl<T, const N: usize> BoundedHistory<T, N> {
  pub const CAPACITY: usize = N;

  pub fn new() -> Self {
    BoundedHistory { entries: VecDeque::with_capacity(N) }
  }

  /// Inserts `entry` at the front, dropping entries beyond the capacity.
  /// Returns the entries that were dropped, oldest last.
  pub fn push_front(&mut self, entry: T) -> Vec<T> {
    self.entries.push_front(entry);
    self.entries.drain(N.min(self.entries.len())..).collect()
  }

  /// The most recent entry.
  #[inline]
  pub fn latest(&self) -> Option<&T> {
    self.entries.front()
  }

  #[inline]
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  #[inline]
  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }

  #[inline]
  pub fn iter(&self) -> vec_deque::Iter<'_, T> {
    self.entries.iter()
  }
}

impl<T, const N: usize> Default for BoundedHistory<T, N> {
  #[inline]
  fn default() -> Self {
    BoundedHistory::new()
  }
}

/// Keeps the first `N` items, treating the iterator as newest first.
impl<T, const N: usize> FromIterator<T> for BoundedHistory<T, N> {
  fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
    BoundedHistory { entries: iter.into_iter().take(N).collect() }
  }
}

impl<'a, T, const N: usize> IntoIterator for &'a BoundedHistory<T, N> {
  type Item = &'a T;
  type IntoIter = vec_deque::Iter<'a, T>;

  #[inline]
  fn into_iter(self) -> Self::IntoIter {
    self.entries.iter()
  }
}

impl<T: Serialize, const N: usize> Serialize for BoundedHistory<T, N> {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(&self.entries)
  }
}

impl<'de, T: Deserialize<'de>, const N: usize> Deserialize<'de> for BoundedHistory<T, N> {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    Vec::<T>::deserialize(deserializer).map(BoundedHistory::from_iter)
  }
}

/// Donation counts of every member at the time the snapshot was taken.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySnapshot {
  pub date: DateTime<Utc>,
  pub donations: Map<String, u32>
}

/// Written to `donation_history.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationHistory {
  #[serde(rename = "trackingStartDate")]
  pub tracking_start_date: DateTime<Utc>,
  #[serde(rename = "weeklySnapshots")]
  pub weekly_snapshots: BoundedHistory<WeeklySnapshot, HISTORY_CAPACITY>,
  #[serde(rename = "allTimeTotals")]
  pub all_time_totals: Map<String, u64>
}

impl DonationHistory {
  /// An empty history whose tracking starts at `now`.
  pub fn new(now: DateTime<Utc>) -> Self {
    DonationHistory {
      tracking_start_date: now,
      weekly_snapshots: BoundedHistory::new(),
      all_time_totals: Map::new()
    }
  }

  #[inline]
  pub fn latest_snapshot(&self) -> Option<&WeeklySnapshot> {
    self.weekly_snapshots.latest()
  }

  /// Whether a snapshot taken at `now` would be recorded.
  /// Elapsed time is truncated to whole days, so 6 days and 23 hours counts as 6.
  pub fn is_snapshot_due(&self, now: DateTime<Utc>) -> bool {
    match self.latest_snapshot() {
      Some(latest) => (now - latest.date).num_days() >= SNAPSHOT_INTERVAL_DAYS,
      None => true
    }
  }

  /// Records `current` as a new snapshot if one is due, adding every count to
  /// the all-time totals. Returns whether a snapshot was taken.
  pub fn record(&mut self, now: DateTime<Utc>, current: &Map<String, u32>) -> bool {
    if !self.is_snapshot_due(now) { return false };

    for (name, &count) in current.iter() {
      *self.all_time_totals.entry(name.clone()).or_insert(0) += count as u64;
    };

    let pruned = self.weekly_snapshots.push_front(WeeklySnapshot {
      date: now,
      donations: current.clone()
    });
    for snapshot in pruned.iter() {
      debug!("pruned donation snapshot from {}", snapshot.date);
    };

    true
  }

  /// Total donations of `member_name` across every snapshot ever taken.
  pub fn all_time_total(&self, member_name: &str) -> u64 {
    self.all_time_totals.get(member_name).copied().unwrap_or(0)
  }
}

/// Applies one tracking step: starts a new history if there is none, then
/// records `current` if a snapshot is due. Returns the history and whether a
/// snapshot was taken.
pub fn track(
  history: Option<DonationHistory>,
  current: &Map<String, u32>,
  now: DateTime<Utc>
) -> (DonationHistory, bool) {
  let mut history = history.unwrap_or_else(|| DonationHistory::new(now));
  let taken = history.record(now, current);
  (history, taken)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn push_front_trims_oldest() {
    let mut history = BoundedHistory::<u32, 3>::new();
    assert!(history.push_front(1).is_empty());
    history.push_front(2);
    history.push_front(3);
    assert_eq!(history.push_front(4), vec![1]);
    assert_eq!(history.iter().copied().collect::<Vec<_>>(), vec![4, 3, 2]);
    assert_eq!(history.latest(), Some(&4));
  }

  #[test]
  fn oversized_list_is_trimmed_on_load() {
    let history: BoundedHistory<u32, 2> = serde_json::from_str("[5, 4, 3]").unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(serde_json::to_string(&history).unwrap(), "[5,4]");
  }
}
