use std::sync::{Mutex, MutexGuard};

use super::domain::LoanApplication;
use super::store::{
    ApplicationFilter, ApplicationStore, ApplicationUpdate, DocumentCollection, StoreError,
    UpdateOutcome,
};

/// Process-local store; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryApplicationStore {
    collection: Mutex<DocumentCollection>,
}

impl MemoryApplicationStore {
    fn lock(&self) -> Result<MutexGuard<'_, DocumentCollection>, StoreError> {
        self.collection
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))
    }
}

impl ApplicationStore for MemoryApplicationStore {
    fn insert_one(&self, application: LoanApplication) -> Result<(), StoreError> {
        self.lock()?.insert_one(application);
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
        Ok(self.lock()?.update_one(filter, update))
    }

    fn count(&self) -> Result<u64, StoreError> {
        Ok(self.lock()?.count())
    }
}
