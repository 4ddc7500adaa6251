//! Scoped logo handles.
//!
//! Every selected logo is backed by an entry in a [`LogoStore`]. The entry lives
//! exactly as long as its [`LogoHandle`]: replacing the logo or closing the
//! session drops the handle, which removes the entry.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use qrcanvas_core::LogoSource;
use uuid::Uuid;

/// Identifier of a live logo acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LogoId(Uuid);

impl LogoId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for LogoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Entry backing one handle.
#[derive(Debug)]
struct StoreEntry {
    /// Human-readable description of the source.
    source: String,
    /// When the handle was acquired.
    acquired_at: Instant,
}

/// Acquisition statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Handles ever acquired.
    pub acquired: u64,
    /// Handles released.
    pub released: u64,
}

impl StoreStats {
    /// Handles acquired but not yet released.
    #[must_use]
    pub fn outstanding(&self) -> u64 {
        self.acquired - self.released
    }
}

#[derive(Debug, Default)]
struct StoreInner {
    entries: HashMap<LogoId, StoreEntry>,
    stats: StoreStats,
}

/// Tracks live logo handles.
///
/// Cloning shares the same store.
#[derive(Debug, Clone, Default)]
pub struct LogoStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl LogoStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Acquire a handle for `source`.
    #[must_use]
    pub fn acquire(&self, source: &LogoSource) -> LogoHandle {
        let id = LogoId::new();
        let description = source.describe();
        {
            let mut inner = self.lock();
            inner.entries.insert(
                id,
                StoreEntry {
                    source: description.clone(),
                    acquired_at: Instant::now(),
                },
            );
            inner.stats.acquired += 1;
        }
        tracing::debug!(%id, source = %description, "Acquired logo handle");
        LogoHandle {
            id,
            source: description,
            store: self.clone(),
        }
    }

    /// Number of handles currently live.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.lock().entries.len()
    }

    /// Whether `id` is still live.
    #[must_use]
    pub fn contains(&self, id: LogoId) -> bool {
        self.lock().entries.contains_key(&id)
    }

    /// How long `id` has been held, if live.
    #[must_use]
    pub fn held_for(&self, id: LogoId) -> Option<Duration> {
        self.lock()
            .entries
            .get(&id)
            .map(|entry| entry.acquired_at.elapsed())
    }

    /// Acquisition statistics.
    #[must_use]
    pub fn stats(&self) -> StoreStats {
        self.lock().stats
    }

    fn release(&self, id: LogoId) {
        let removed = {
            let mut inner = self.lock();
            let removed = inner.entries.remove(&id);
            if removed.is_some() {
                inner.stats.released += 1;
            }
            removed
        };
        if let Some(entry) = removed {
            tracing::debug!(
                %id,
                source = %entry.source,
                held_ms = entry.acquired_at.elapsed().as_millis(),
                "Released logo handle"
            );
        }
    }
}

/// A live logo acquisition. Dropping it releases the entry.
#[derive(Debug)]
pub struct LogoHandle {
    id: LogoId,
    source: String,
    store: LogoStore,
}

impl LogoHandle {
    /// Handle id.
    #[must_use]
    pub fn id(&self) -> LogoId {
        self.id
    }

    /// Description of the source this handle was acquired for.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Release explicitly. Equivalent to dropping.
    pub fn release(self) {
        drop(self);
    }
}

impl Drop for LogoHandle {
    fn drop(&mut self) {
        self.store.release(self.id);
    }
}
