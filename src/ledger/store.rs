//! Ledger storage backends.
//!
//! The ledger is a flat reviewer → count object. Backends read it whole and
//! replace it whole; there is no append log.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::LedgerCounts;
use crate::error::StorageError;

const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Durable home of a [`LoadLedger`](super::LoadLedger).
pub trait LedgerStore {
    /// Reads the persisted counts, or `None` if nothing was ever persisted.
    fn read(&self) -> Result<Option<LedgerCounts>, StorageError>;

    /// Replaces the persisted counts.
    fn write(&self, counts: &LedgerCounts) -> Result<(), StorageError>;
}

impl<T: LedgerStore + ?Sized> LedgerStore for &T {
    fn read(&self) -> Result<Option<LedgerCounts>, StorageError> {
        (**self).read()
    }

    fn write(&self, counts: &LedgerCounts) -> Result<(), StorageError> {
        (**self).write(counts)
    }
}

/// JSON file at a single well-known path.
///
/// Writes go to a sibling temp file that is then renamed over the ledger,
/// so a crash mid-write leaves the previous ledger intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        sibling(&self.path, "lock")
    }

    /// Takes the single-writer lock, waiting up to `timeout`.
    ///
    /// Hold the returned guard across load → increment → persist.
    pub fn lock(&self, timeout: Duration) -> Result<LedgerLock, StorageError> {
        let lock_path = self.lock_path();
        if let Some(dir) = lock_path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| io_error(dir, source))?;
        }

        let deadline = Instant::now() + timeout;
        loop {
            match OpenOptions::new().write(true).create_new(true).open(&lock_path) {
                Ok(mut file) => {
                    // Owner pid helps operators clear stale locks.
                    let _ = writeln!(file, "{}", std::process::id());
                    debug!(path = %lock_path.display(), "ledger lock acquired");
                    return Ok(LedgerLock { path: lock_path });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    if Instant::now() >= deadline {
                        return Err(StorageError::Locked(lock_path));
                    }
                    thread::sleep(LOCK_POLL_INTERVAL);
                }
                Err(source) => return Err(io_error(&lock_path, source)),
            }
        }
    }
}

impl LedgerStore for JsonFileStore {
    fn read(&self) -> Result<Option<LedgerCounts>, StorageError> {
        let json = match fs::read_to_string(&self.path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(io_error(&self.path, source)),
        };
        let counts = serde_json::from_str(&json).map_err(|source| StorageError::Json {
            path: self.path.clone(),
            source,
        })?;
        Ok(Some(counts))
    }

    fn write(&self, counts: &LedgerCounts) -> Result<(), StorageError> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|source| io_error(dir, source))?;
        }
        let json = serde_json::to_string_pretty(counts).map_err(|source| StorageError::Json {
            path: self.path.clone(),
            source,
        })?;

        let tmp = sibling(&self.path, "tmp");
        fs::write(&tmp, json).map_err(|source| io_error(&tmp, source))?;
        fs::rename(&tmp, &self.path).map_err(|source| io_error(&self.path, source))?;
        Ok(())
    }
}

/// Guard for the ledger lock file. Removes the file on drop.
#[derive(Debug)]
pub struct LedgerLock {
    path: PathBuf,
}

impl LedgerLock {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LedgerLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "failed to remove ledger lock");
        }
    }
}

/// In-memory backend. Clones share the same state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    counts: Option<LedgerCounts>,
    writes: usize,
    fail_writes: bool,
}

impl MemoryStore {
    /// Empty store: nothing persisted yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with persisted counts.
    pub fn with_counts(counts: LedgerCounts) -> Self {
        let store = Self::new();
        if let Ok(mut state) = store.inner.lock() {
            state.counts = Some(counts);
        }
        store
    }

    /// Makes every later write fail.
    pub fn fail_writes(&self) {
        if let Ok(mut state) = self.inner.lock() {
            state.fail_writes = true;
        }
    }

    /// Currently persisted counts.
    pub fn snapshot(&self) -> Option<LedgerCounts> {
        self.inner.lock().ok().and_then(|s| s.counts.clone())
    }

    /// Number of successful writes.
    pub fn write_count(&self) -> usize {
        self.inner.lock().map(|s| s.writes).unwrap_or(0)
    }
}

impl LedgerStore for MemoryStore {
    fn read(&self) -> Result<Option<LedgerCounts>, StorageError> {
        let state = self
            .inner
            .lock()
            .map_err(|_| StorageError::Backend("memory store poisoned".into()))?;
        Ok(state.counts.clone())
    }

    fn write(&self, counts: &LedgerCounts) -> Result<(), StorageError> {
        let mut state = self
            .inner
            .lock()
            .map_err(|_| StorageError::Backend("memory store poisoned".into()))?;
        if state.fail_writes {
            return Err(StorageError::Backend("write rejected".into()));
        }
        state.counts = Some(counts.clone());
        state.writes += 1;
        Ok(())
    }
}

fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.to_path_buf(),
        source,
    }
}
