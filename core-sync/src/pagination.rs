//! # Pagination Walker
//!
//! Drives a cursor-paged listing to completion, handing every record to a
//! per-record action. Both systems hand out opaque cursors; the walk stops
//! when a page comes back empty or without a next cursor.

use crate::error::{Result, SyncError};
use crate::outcome::SyncOutcome;
use bridge_traits::error::Result as BridgeResult;
use core_runtime::events::SweepCounts;
use futures::future::BoxFuture;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Progress of one sweep leg, updated in place so partial counts survive a
/// failed page fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    pub counts: SweepCounts,
    pub cancelled: bool,
}

impl SweepStats {
    /// Tally one record. `None` means the record failed.
    pub fn record(&mut self, outcome: Option<SyncOutcome>) {
        let counts = &mut self.counts;
        counts.processed += 1;
        match outcome {
            Some(SyncOutcome::Created) => counts.created += 1,
            Some(SyncOutcome::Updated) => counts.updated += 1,
            Some(SyncOutcome::Deleted) => counts.deleted += 1,
            Some(SyncOutcome::Skipped(_)) => counts.skipped += 1,
            None => counts.failed += 1,
        }
    }
}

/// Walk every page starting at `start_cursor`.
///
/// Cancellation is checked before each page and each record; a record that
/// has started always finishes. A failed page fetch ends the walk with
/// [`SyncError::Pagination`].
pub async fn walk_pages<'a, T, F, P>(
    start_cursor: Option<String>,
    mut fetch_page: F,
    mut per_record: P,
    cancel: &CancellationToken,
    stats: &mut SweepStats,
) -> Result<()>
where
    F: FnMut(Option<String>) -> BoxFuture<'a, BridgeResult<(Vec<T>, Option<String>)>>,
    P: FnMut(T) -> BoxFuture<'a, Option<SyncOutcome>>,
{
    let mut cursor = start_cursor;

    loop {
        if cancel.is_cancelled() {
            stats.cancelled = true;
            return Ok(());
        }

        let (records, next) =
            fetch_page(cursor.take())
                .await
                .map_err(|source| SyncError::Pagination {
                    pages: stats.counts.pages,
                    source,
                })?;

        if records.is_empty() {
            break;
        }
        stats.counts.pages += 1;
        debug!(page = stats.counts.pages, records = records.len(), "Fetched page");

        for record in records {
            if cancel.is_cancelled() {
                stats.cancelled = true;
                return Ok(());
            }
            let outcome = per_record(record).await;
            stats.record(outcome);
        }

        match next {
            Some(next) if !next.is_empty() => cursor = Some(next),
            _ => break,
        }
    }

    Ok(())
}
