//! Persisting store changes to the backing store.
//!
//! A [`Session`] pairs the in-memory [`TaskStore`] with a [`Remote`]. Each
//! user action runs against the store, the resulting snapshot is persisted,
//! and only then is the change confirmed. If persisting fails the store is
//! rolled back, so the board on screen never drifts from what was saved.

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::config::Config;
use crate::db::Database;
use crate::error::{Error, Result};
use crate::store::{TaskStore, Tentative};

/// Somewhere a board snapshot can be loaded from and written to.
pub trait Remote {
    fn load(&mut self) -> Result<Database>;
    fn persist(&mut self, db: &Database) -> Result<()>;
}

/// A snapshot kept as a JSON file on local disk.
#[derive(Debug, Clone)]
pub struct JsonFileRemote {
    path: PathBuf,
}

impl JsonFileRemote {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileRemote { path: path.into() }
    }
}

impl Remote for JsonFileRemote {
    fn load(&mut self) -> Result<Database> {
        Database::load(&self.path)
    }

    fn persist(&mut self, db: &Database) -> Result<()> {
        db.save(&self.path)
    }
}

pub struct Session<R: Remote> {
    store: TaskStore,
    remote: R,
}

impl<R: Remote> Session<R> {
    /// Load the board from `remote` and build a store around it.
    pub fn open(mut remote: R, config: &Config) -> Result<Self> {
        let db = remote.load()?;
        debug!(tasks = db.tasks.len(), "opened board");
        Ok(Session {
            store: TaskStore::new(db, config),
            remote,
        })
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    /// Run one mutation and persist it, rolling the store back on failure.
    pub fn commit<T, F>(&mut self, op: F) -> Result<T>
    where
        F: FnOnce(&mut TaskStore) -> Result<Tentative<T>>,
    {
        let tentative = op(&mut self.store)?;
        match self.remote.persist(self.store.snapshot()) {
            Ok(()) => Ok(self.store.confirm(tentative)),
            Err(err) => {
                warn!(error = %err, "persist failed, rolling back");
                self.store.rollback(tentative);
                Err(Error::Persist(err.to_string()))
            }
        }
    }
}
