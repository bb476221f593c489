//! Per-run dedup session over the seen-set.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::error::SeenError;
use super::store::{SeenSet, SeenStore};

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEnd {
    /// Normal end: only identifiers confirmed this run were kept.
    Committed,
    /// Error end: prior and current identifiers were kept.
    Abandoned,
    /// Dropped without an explicit end (early return or panic).
    Dropped,
}

/// Counts describing what a session persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub end: SessionEnd,
    /// Identifiers loaded at open.
    pub prior: usize,
    /// Identifiers marked seen during the session.
    pub current: usize,
    /// Identifiers written to the store.
    pub persisted: usize,
    /// Prior identifiers that were not written back.
    pub pruned: usize,
}

/// Tracks which identifiers were seen before and during one run.
///
/// The store is written exactly once, by [`commit`](Self::commit),
/// [`abandon`](Self::abandon), or on drop if neither was called.
pub struct DedupSession {
    store: Arc<dyn SeenStore>,
    prior: SeenSet,
    current: SeenSet,
    finished: bool,
}

impl std::fmt::Debug for DedupSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DedupSession")
            .field("prior", &self.prior.len())
            .field("current", &self.current.len())
            .field("finished", &self.finished)
            .finish()
    }
}

impl DedupSession {
    /// Open a session, loading the prior generation from the store.
    pub fn open(store: Arc<dyn SeenStore>) -> Result<Self, SeenError> {
        let prior = store.load()?;
        debug!(prior = prior.len(), "Opened dedup session");
        Ok(Self {
            store,
            prior,
            current: SeenSet::new(),
            finished: false,
        })
    }

    /// Whether `id` was seen before this run or already confirmed during it.
    pub fn has_seen(&self, id: &str) -> bool {
        self.prior.contains(id) || self.current.contains(id)
    }

    /// Record `id` as seen. Call only once the item is safely downloaded.
    ///
    /// Returns `false` if it was already marked during this session.
    pub fn mark_seen(&mut self, id: impl Into<String>) -> bool {
        self.current.insert(id.into())
    }

    /// Identifiers loaded when the session was opened.
    pub fn prior(&self) -> &SeenSet {
        &self.prior
    }

    /// Identifiers marked during this session.
    pub fn current(&self) -> &SeenSet {
        &self.current
    }

    /// End the session normally: persist only the current generation.
    pub fn commit(mut self) -> Result<SessionSummary, SeenError> {
        self.finish(SessionEnd::Committed)
    }

    /// End the session after a failure: persist prior ∪ current.
    pub fn abandon(mut self) -> Result<SessionSummary, SeenError> {
        self.finish(SessionEnd::Abandoned)
    }

    fn finish(&mut self, end: SessionEnd) -> Result<SessionSummary, SeenError> {
        // Mark first so a failed save is not retried from Drop
        self.finished = true;

        let payload = match end {
            SessionEnd::Committed => self.current.clone(),
            SessionEnd::Abandoned | SessionEnd::Dropped => {
                self.prior.union(&self.current).cloned().collect()
            }
        };
        let pruned = self
            .prior
            .iter()
            .filter(|id| !payload.contains(*id))
            .count();

        self.store.save(&payload)?;

        let summary = SessionSummary {
            end,
            prior: self.prior.len(),
            current: self.current.len(),
            persisted: payload.len(),
            pruned,
        };
        info!(
            end = ?summary.end,
            persisted = summary.persisted,
            pruned = summary.pruned,
            "Dedup session closed"
        );
        Ok(summary)
    }
}

impl Drop for DedupSession {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        warn!("Dedup session dropped without finishing, keeping all known identifiers");
        if let Err(e) = self.finish(SessionEnd::Dropped) {
            error!("Failed to persist seen-set: {}", e);
        }
    }
}
