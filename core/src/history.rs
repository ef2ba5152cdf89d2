use crate::models::HistorySnapshot;

/// Snapshots kept per ingredient.
pub const HISTORY_LIMIT: usize = 2;

/// Put `snapshot` in front of `history`, dropping the oldest entries past
/// [`HISTORY_LIMIT`].
#[must_use]
pub fn push_snapshot(history: &[HistorySnapshot], snapshot: HistorySnapshot) -> Vec<HistorySnapshot> {
    let mut updated = Vec::with_capacity(HISTORY_LIMIT + 1);
    updated.push(snapshot);
    updated.extend(history.iter().take(HISTORY_LIMIT).cloned());
    updated.truncate(HISTORY_LIMIT);
    updated
}
