//! Concurrent endpoint configuration store.
//!
//! All endpoints live in one map behind a single reader/writer lock. Reads
//! run concurrently; a write holds the lock across the in-memory mutation
//! and the rewrite of the backing CSV file, so the file always reflects the
//! logical order of mutations. If the file cannot be written the mutation is
//! rolled back before the lock is released.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, error};

use crate::endpoint::Endpoint;
use crate::persistence::{CsvFile, PersistenceError};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("path identifier \"{path}\" does not match record identifier \"{record}\"")]
    IdentifierMismatch { path: String, record: String },

    #[error("failed to persist store: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("store lock poisoned")]
    Poisoned,
}

/// Result of a successful [`ConfigStore::put`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    Created,
    Replaced,
}

pub struct ConfigStore {
    endpoints: RwLock<HashMap<String, Endpoint>>,
    file: CsvFile,
}

impl ConfigStore {
    /// Opens the store backed by `path`, loading any existing rows.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PersistenceError> {
        let file = CsvFile::new(path);
        let endpoints = file.load()?;
        Ok(Self::with_endpoints(file, endpoints))
    }

    /// Builds a store from an already loaded map without touching the file.
    pub fn with_endpoints(file: CsvFile, endpoints: HashMap<String, Endpoint>) -> Self {
        Self {
            endpoints: RwLock::new(endpoints),
            file,
        }
    }

    pub fn file(&self) -> &CsvFile {
        &self.file
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Endpoint>>, StoreError> {
        self.endpoints.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Endpoint>>, StoreError> {
        self.endpoints.write().map_err(|_| StoreError::Poisoned)
    }

    pub fn get(&self, identifier: &str) -> Result<Option<Endpoint>, StoreError> {
        Ok(self.read()?.get(identifier).cloned())
    }

    /// Snapshot of all endpoints, sorted by identifier.
    pub fn list(&self) -> Result<Vec<Endpoint>, StoreError> {
        let mut endpoints: Vec<Endpoint> = self.read()?.values().cloned().collect();
        endpoints.sort_by(|a, b| a.identifier.cmp(&b.identifier));
        Ok(endpoints)
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.read()?.is_empty())
    }

    /// Inserts or replaces the endpoint stored under `identifier` and
    /// persists the result.
    pub fn put(&self, identifier: &str, endpoint: Endpoint) -> Result<PutOutcome, StoreError> {
        if endpoint.identifier != identifier {
            return Err(StoreError::IdentifierMismatch {
                path: identifier.to_string(),
                record: endpoint.identifier,
            });
        }

        let mut endpoints = self.write()?;
        let previous = endpoints.insert(identifier.to_string(), endpoint);
        let outcome = if previous.is_some() {
            PutOutcome::Replaced
        } else {
            PutOutcome::Created
        };

        if let Err(e) = self.file.save(&endpoints) {
            error!("Rolling back \"{}\" after persistence failure: {}", identifier, e);
            match previous {
                Some(previous) => endpoints.insert(identifier.to_string(), previous),
                None => endpoints.remove(identifier),
            };
            return Err(e.into());
        }

        debug!("Stored endpoint \"{}\" ({:?})", identifier, outcome);
        Ok(outcome)
    }

    /// Removes `identifier`, returning whether it was present. Removing an
    /// absent identifier is a no-op and leaves the file untouched.
    pub fn delete(&self, identifier: &str) -> Result<bool, StoreError> {
        let mut endpoints = self.write()?;
        let Some(removed) = endpoints.remove(identifier) else {
            debug!("Delete of unknown endpoint \"{}\" ignored", identifier);
            return Ok(false);
        };

        if let Err(e) = self.file.save(&endpoints) {
            error!("Restoring \"{}\" after persistence failure: {}", identifier, e);
            endpoints.insert(identifier.to_string(), removed);
            return Err(e.into());
        }

        debug!("Deleted endpoint \"{}\"", identifier);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn endpoint(identifier: &str, fail_after: u8) -> Endpoint {
        Endpoint::new(
            identifier,
            "http://example.com/health",
            "GET",
            200,
            Duration::from_secs(60),
            fail_after,
        )
        .unwrap()
    }

    #[test]
    fn test_put_rejects_identifier_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::open(dir.path().join("config.csv")).unwrap();

        let result = store.put("other", endpoint("svc-a", 1));
        assert!(matches!(result, Err(StoreError::IdentifierMismatch { .. })));
        assert!(store.is_empty().unwrap());
        assert!(!dir.path().join("config.csv").exists());
    }

    #[test]
    fn test_delete_absent_does_not_create_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.csv");
        let store = ConfigStore::open(&path).unwrap();

        assert!(!store.delete("missing").unwrap());
        assert!(!store.delete("missing").unwrap());
        assert!(!path.exists());
    }
}
