use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, info};

use super::domain::LoanApplication;
use super::store::{
    ApplicationFilter, ApplicationStore, ApplicationUpdate, DocumentCollection, StoreError,
    StoredDocument, UpdateOutcome,
};

/// Store that mirrors the collection into a JSON array on disk after each write.
///
/// Writes are staged on a copy of the collection and only become visible once the file has
/// been replaced, so a failed write leaves both memory and disk as they were.
#[derive(Debug)]
pub struct FileApplicationStore {
    path: PathBuf,
    collection: Mutex<DocumentCollection>,
}

impl FileApplicationStore {
    /// Loads `path` if it exists; a missing file starts an empty collection.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let documents = read_documents(&path)?;
        info!(path = %path.display(), documents = documents.len(), "application store opened");

        Ok(Self {
            path,
            collection: Mutex::new(DocumentCollection::from_documents(documents)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, DocumentCollection>, StoreError> {
        self.collection
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))
    }

    fn persist(&self, collection: &DocumentCollection) -> Result<(), StoreError> {
        let encoded = serde_json::to_vec_pretty(collection.documents()).map_err(|source| {
            StoreError::Encode {
                path: self.path.display().to_string(),
                source,
            }
        })?;

        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, encoded).map_err(|source| self.io_error(source))?;
        fs::rename(&staging, &self.path).map_err(|source| self.io_error(source))?;
        debug!(path = %self.path.display(), documents = collection.count(), "application store persisted");
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}

/// Reads the persisted documents without opening a store, e.g. for offline listing.
pub fn read_documents(path: &Path) -> Result<Vec<StoredDocument>, StoreError> {
    let raw = match fs::read(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(StoreError::Io {
                path: path.display().to_string(),
                source,
            })
        }
    };

    serde_json::from_slice(&raw).map_err(|source| StoreError::Corrupt {
        path: path.display().to_string(),
        source,
    })
}

impl ApplicationStore for FileApplicationStore {
    fn insert_one(&self, application: LoanApplication) -> Result<(), StoreError> {
        let mut collection = self.lock()?;
        let mut candidate = collection.clone();
        candidate.insert_one(application);
        self.persist(&candidate)?;
        *collection = candidate;
        Ok(())
    }

    fn find_one(&self, filter: &ApplicationFilter) -> Result<Option<LoanApplication>, StoreError> {
        Ok(self.lock()?.find_one(filter))
    }

    fn find(&self, filter: &ApplicationFilter) -> Result<Vec<LoanApplication>, StoreError> {
        Ok(self.lock()?.find(filter))
    }

    fn update_one(
        &self,
        filter: &ApplicationFilter,
        update: &ApplicationUpdate,
    ) -> Result<UpdateOutcome, StoreError> {
        let mut collection = self.lock()?;
        let mut candidate = collection.clone();
        let outcome = candidate.update_one(filter, update);
        if outcome.modified > 0 {
            self.persist(&candidate)?;
            *collection = candidate;
        }
        Ok(outcome)
    }

    fn count(&self) -> Result<u64, StoreError> {
        Ok(self.lock()?.count())
    }

    fn flush(&self) -> Result<(), StoreError> {
        let collection = self.lock()?;
        self.persist(&collection)?;
        info!(path = %self.path.display(), "application store flushed");
        Ok(())
    }
}
