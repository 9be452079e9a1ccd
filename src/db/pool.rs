//! A small connection pool over [`Database`].
//!
//! SQLite connections are not `Sync`, so request handlers check one out for
//! the duration of a blocking task and hand it back on drop. WAL mode lets the
//! checked-out connections read concurrently.

use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{debug, info};

use super::Database;
use crate::error::CatalogResult;

struct PoolInner {
    path: PathBuf,
    max_idle: usize,
    idle: Mutex<Vec<Database>>,
    closed: AtomicBool,
}

impl PoolInner {
    fn idle(&self) -> MutexGuard<'_, Vec<Database>> {
        self.idle.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Cheaply cloneable handle to the store, shared by every handler.
#[derive(Clone)]
pub struct DbPool {
    inner: Arc<PoolInner>,
}

impl DbPool {
    /// Open the store at `path`, creating the schema if needed.
    pub fn open(path: &Path, max_idle: usize) -> CatalogResult<Self> {
        let first = Database::open(path)?;
        info!("Opened catalog pool: {}", path.display());
        Ok(DbPool {
            inner: Arc::new(PoolInner {
                path: path.to_path_buf(),
                max_idle: max_idle.max(1),
                idle: Mutex::new(vec![first]),
                closed: AtomicBool::new(false),
            }),
        })
    }

    /// Check out a connection, opening a fresh one when none is idle.
    pub fn get(&self) -> CatalogResult<PooledDb> {
        let reused = self.inner.idle().pop();
        let db = match reused {
            Some(db) => db,
            None => {
                debug!("Opening additional connection");
                Database::open_existing(&self.inner.path)?
            }
        };
        Ok(PooledDb {
            db: Some(db),
            pool: Arc::clone(&self.inner),
        })
    }

    /// Number of connections waiting in the pool.
    pub fn idle_count(&self) -> usize {
        self.inner.idle().len()
    }

    /// Drop idle connections; connections still checked out are closed when returned.
    pub fn close(&self) {
        self.inner.closed.store(true, Ordering::SeqCst);
        let drained = std::mem::take(&mut *self.inner.idle());
        info!("Closed catalog pool ({} idle connections)", drained.len());
    }
}

/// A checked-out connection. Returned to the pool on drop.
pub struct PooledDb {
    db: Option<Database>,
    pool: Arc<PoolInner>,
}

impl Deref for PooledDb {
    type Target = Database;

    fn deref(&self) -> &Database {
        self.db.as_ref().expect("connection present until drop")
    }
}

impl Drop for PooledDb {
    fn drop(&mut self) {
        let Some(db) = self.db.take() else { return };
        if self.pool.closed.load(Ordering::SeqCst) {
            return;
        }
        let mut idle = self.pool.idle();
        if idle.len() < self.pool.max_idle {
            idle.push(db);
        }
    }
}
