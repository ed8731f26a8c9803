//! Read-through cache of past generations.

use crate::error::{HistoryError, ServiceError};
use crate::gateway::types::{HistoryEntry, HistoryListing};
use crate::gateway::{self, Endpoint, Gateway};
use std::sync::{Arc, Mutex};

struct HistoryState {
    /// Ticket handed to the most recently started refresh.
    issued: u64,
    /// Ticket of the refresh whose listing is currently cached.
    applied: u64,
    entries: Arc<Vec<HistoryEntry>>,
}

pub struct HistorySynchronizer {
    gateway: Arc<dyn Gateway>,
    state: Mutex<HistoryState>,
}

impl HistorySynchronizer {
    pub fn new(gateway: Arc<dyn Gateway>) -> Arc<Self> {
        Arc::new(Self {
            gateway,
            state: Mutex::new(HistoryState {
                issued: 0,
                applied: 0,
                entries: Arc::new(Vec::new()),
            }),
        })
    }

    /// Cached entries in server order (newest first).
    pub fn entries(&self) -> Arc<Vec<HistoryEntry>> {
        Arc::clone(
            &self
                .state
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .entries,
        )
    }

    /// Fetch the listing and replace the cache with it. A refresh that
    /// finishes after a newer one has already been applied leaves the cache
    /// alone. On failure the cache keeps its last good contents.
    pub async fn refresh(&self) -> Result<Arc<Vec<HistoryEntry>>, ServiceError> {
        let ticket = {
            let mut state = self
                .state
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            state.issued += 1;
            state.issued
        };

        let listing = match gateway::fetch::<HistoryListing>(
            self.gateway.as_ref(),
            Endpoint::HistoryList,
        )
        .await
        {
            Ok(listing) => listing,
            Err(err) => {
                tracing::warn!(ticket, error = %err, "history.refresh_failed");
                return Err(err);
            }
        };
        let entries = Arc::new(listing.into_entries());

        let mut state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if ticket > state.applied {
            state.applied = ticket;
            state.entries = Arc::clone(&entries);
            tracing::debug!(ticket, count = entries.len(), "history.refreshed");
        } else {
            tracing::debug!(ticket, applied = state.applied, "history.stale");
        }
        Ok(entries)
    }

    /// Delete `id` on the server, then refresh. The cache only changes once
    /// the server has accepted the delete.
    pub async fn remove(&self, id: &str) -> Result<(), HistoryError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(HistoryError::InvalidId);
        }

        self.gateway
            .call(Endpoint::HistoryDelete(id.to_string()), None)
            .await
            .inspect_err(|err| tracing::warn!(id, error = %err, "history.delete_failed"))?;
        // Listings requested up to now may predate the delete.
        let deleted_after = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .issued;
        tracing::info!(id, "history.deleted");

        if self.refresh().await.is_err() {
            // The server no longer has the entry; reflect that locally even
            // though the fresh listing is unavailable.
            let mut state = self
                .state
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            state.applied = state.applied.max(deleted_after);
            let kept: Vec<HistoryEntry> = state
                .entries
                .iter()
                .filter(|entry| entry.id != id)
                .cloned()
                .collect();
            state.entries = Arc::new(kept);
            tracing::warn!(id, "history.dropped_locally");
        }
        Ok(())
    }
}
