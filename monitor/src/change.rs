//! Selecting the representatives that warrant a delegation change.

use crate::overview::FullOverview;

/// Entries that are not trusted and carry a weight, uptime or warn flag.
/// Input order is kept.
pub fn detect_changes(overviews: &[FullOverview]) -> Vec<FullOverview> {
    overviews
        .iter()
        .filter(|rep| rep.status.needs_change())
        .cloned()
        .collect()
}
