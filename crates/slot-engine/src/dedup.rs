//! Collapse conflicts that describe the same underlying problem.

use std::collections::HashSet;

use tracing::trace;

use crate::conflict::ConflictRecord;

/// Keep the first conflict per [`ConflictRecord::dedup_key`], preserving order.
pub fn deduplicate(conflicts: Vec<ConflictRecord>) -> Vec<ConflictRecord> {
    let mut seen = HashSet::with_capacity(conflicts.len());
    conflicts
        .into_iter()
        .filter(|c| {
            let fresh = seen.insert(c.dedup_key());
            if !fresh {
                trace!(id = %c.id, "dropping duplicate conflict");
            }
            fresh
        })
        .collect()
}
