use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::applications::domain::{
    AcceptRequest, ApplicationNumber, ChangeStatusRequest, LoanApplication, Zipcode,
};
use crate::applications::memory::MemoryApplicationStore;
use crate::applications::store::{
    ApplicationFilter, ApplicationStore, ApplicationUpdate, StoreError, UpdateOutcome,
};
use crate::applications::{application_router, LoanApplicationService};

pub(super) fn accept_request(name: &str, zipcode: &str) -> AcceptRequest {
    AcceptRequest {
        name: Some(name.to_string()),
        zipcode: Some(Zipcode::from(zipcode)),
        address: None,
    }
}

pub(super) fn change_request(application_number: u64, new_status: &str) -> ChangeStatusRequest {
    ChangeStatusRequest {
        application_number: Some(ApplicationNumber(application_number).into()),
        new_status: Some(new_status.to_string()),
    }
}

pub(super) fn build_service() -> (
    LoanApplicationService<MemoryApplicationStore>,
    Arc<MemoryApplicationStore>,
) {
    let store = Arc::new(MemoryApplicationStore::default());
    let service = LoanApplicationService::new(store.clone());
    (service, store)
}

pub(super) fn application_router_with_service<S>(
    service: LoanApplicationService<S>,
) -> axum::Router
where
    S: ApplicationStore + 'static,
{
    application_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) struct UnavailableStore;

impl ApplicationStore for UnavailableStore {
    fn insert_one(&self, _application: LoanApplication) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn find_one(&self, _filter: &ApplicationFilter) -> Result<Option<LoanApplication>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn find(&self, _filter: &ApplicationFilter) -> Result<Vec<LoanApplication>, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn update_one(
        &self,
        _filter: &ApplicationFilter,
        _update: &ApplicationUpdate,
    ) -> Result<UpdateOutcome, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }

    fn count(&self) -> Result<u64, StoreError> {
        Err(StoreError::Unavailable("database offline".to_string()))
    }
}

/// Replays the view a request gets when another request is in flight: the duplicate lookup
/// misses and the count has not caught up with the concurrent insert.
#[derive(Default)]
pub(super) struct InterleavedStore {
    pub(super) inner: MemoryApplicationStore,
    pub(super) frozen_count: u64,
}

impl ApplicationStore for InterleavedStore {
    fn insert_one(&self, application: LoanApplication) -> Result<(), StoreError> {
        self.inner.insert_one(application)
    }

    fn find_one(&self, _filter: &ApplicationFilter) -> Result<Option<LoanApplication>, StoreError> {
        Ok(None)
    }

    fn find(&self, filter: &ApplicationFilter) -> Result<Vec<LoanApplication>, StoreError> {
        self.inner.find(filter)
    }

    fn update_one(
        &self,
        filter: &ApplicationFilter,
        update: &ApplicationUpdate,
    ) -> Result<UpdateOutcome, StoreError> {
        self.inner.update_one(filter, update)
    }

    fn count(&self) -> Result<u64, StoreError> {
        Ok(self.frozen_count)
    }
}
