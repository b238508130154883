/// Recently deleted PHP files.
///
/// Editors report a rename or move as a delete followed by a create. Each
/// deletion is remembered for a short time so that a following creation can
/// be paired with it. Expired entries are swept whenever the record is
/// touched; there are no timers.
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// How long a deletion stays eligible for pairing.
pub const DELETION_TTL: Duration = Duration::from_secs(5);

/// Upper bound on remembered deletions. The oldest entry is dropped first.
pub const MAX_PENDING: usize = 256;

#[derive(Debug, Clone)]
pub struct PendingDeletions {
    /// Insertion-ordered `(path, deleted_at)` pairs, unique by path.
    entries: Vec<(PathBuf, Instant)>,
    ttl: Duration,
    capacity: usize,
}

impl Default for PendingDeletions {
    fn default() -> Self {
        Self::new(DELETION_TTL, MAX_PENDING)
    }
}

impl PendingDeletions {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            ttl,
            capacity: capacity.max(1),
        }
    }

    /// Remember that `path` was deleted at `now`.
    pub fn record(&mut self, path: &Path, now: Instant) {
        self.sweep(now);
        self.entries.retain(|(p, _)| p != path);
        if self.entries.len() >= self.capacity {
            self.entries.remove(0);
        }
        self.entries.push((path.to_path_buf(), now));
    }

    /// Unexpired deletions, oldest first.
    pub fn live(&mut self, now: Instant) -> Vec<PathBuf> {
        self.sweep(now);
        self.entries.iter().map(|(p, _)| p.clone()).collect()
    }

    /// Consume the entry for `path`. Returns whether it was still live.
    pub fn take(&mut self, path: &Path, now: Instant) -> bool {
        self.sweep(now);
        let before = self.entries.len();
        self.entries.retain(|(p, _)| p != path);
        self.entries.len() != before
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn sweep(&mut self, now: Instant) {
        let ttl = self.ttl;
        self.entries
            .retain(|(_, at)| now.saturating_duration_since(*at) < ttl);
    }
}
