//! In-memory seen-set store for testing.

use std::sync::Mutex;

use crate::seen::{SeenError, SeenSet, SeenStore};

#[derive(Debug, Default)]
struct State {
    ids: SeenSet,
    saves: Vec<SeenSet>,
    fail_saves: bool,
    fail_loads: bool,
}

/// A [`SeenStore`] kept in memory, recording every successful save.
#[derive(Debug, Default)]
pub struct MemorySeenStore {
    state: Mutex<State>,
}

impl MemorySeenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `ids`.
    pub fn with_ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let store = Self::new();
        store.lock().ids = ids.into_iter().map(Into::into).collect();
        store
    }

    /// Currently persisted identifiers.
    pub fn ids(&self) -> SeenSet {
        self.lock().ids.clone()
    }

    /// Every payload successfully saved, oldest first.
    pub fn saves(&self) -> Vec<SeenSet> {
        self.lock().saves.clone()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.lock().saves.len()
    }

    /// Make subsequent saves fail without touching the stored set.
    pub fn fail_saves(&self, fail: bool) {
        self.lock().fail_saves = fail;
    }

    /// Make subsequent loads fail.
    pub fn fail_loads(&self, fail: bool) {
        self.lock().fail_loads = fail;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // Ignore poisoning: sessions still save from Drop while unwinding
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn injected(write: bool) -> SeenError {
        let source = std::io::Error::other("injected failure");
        let path = "memory".into();
        if write {
            SeenError::Write { path, source }
        } else {
            SeenError::Read { path, source }
        }
    }
}

impl SeenStore for MemorySeenStore {
    fn load(&self) -> Result<SeenSet, SeenError> {
        let state = self.lock();
        if state.fail_loads {
            return Err(Self::injected(false));
        }
        Ok(state.ids.clone())
    }

    fn save(&self, ids: &SeenSet) -> Result<(), SeenError> {
        let mut state = self.lock();
        if state.fail_saves {
            return Err(Self::injected(true));
        }
        state.ids = ids.clone();
        state.saves.push(ids.clone());
        Ok(())
    }
}
