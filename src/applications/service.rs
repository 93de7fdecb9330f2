use std::sync::Arc;

use tracing::{info, warn};

use super::domain::{AcceptRequest, ApplicationNumber, ChangeStatusRequest, LoanApplication};
use super::store::{ApplicationFilter, ApplicationStore, ApplicationUpdate, StoreError};

/// Request handlers for intake, status lookups, and status changes.
///
/// The service holds no state of its own; every decision is re-derived from the store.
pub struct LoanApplicationService<S> {
    store: Arc<S>,
}

impl<S> LoanApplicationService<S>
where
    S: ApplicationStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Next number is the current document count plus one, recomputed on every call.
    pub fn next_application_number(&self) -> Result<ApplicationNumber, ApplicationServiceError> {
        Ok(ApplicationNumber::following(self.store.count()?))
    }

    /// Accept a new application, rejecting repeats of the same name and zipcode.
    ///
    /// The duplicate check, the count, and the insert are separate store calls. Concurrent
    /// submissions can therefore both pass the check or receive the same number.
    pub fn accept(
        &self,
        request: AcceptRequest,
    ) -> Result<ApplicationNumber, ApplicationServiceError> {
        let intake = request
            .into_intake()
            .ok_or(ApplicationServiceError::MissingApplicant)?;

        let existing = self
            .store
            .find_one(&ApplicationFilter::by_applicant(&intake.name, &intake.zipcode))?;
        if let Some(existing) = existing {
            info!(
                application_number = %existing.application_number,
                "duplicate application rejected"
            );
            return Err(ApplicationServiceError::Duplicate {
                application_number: existing.application_number,
            });
        }

        let application_number = self.next_application_number()?;
        self.store
            .insert_one(LoanApplication::received(application_number, intake))?;

        info!(%application_number, "application accepted");
        Ok(application_number)
    }

    /// Current status label for an application number.
    pub fn status(
        &self,
        application_number: ApplicationNumber,
    ) -> Result<String, ApplicationServiceError> {
        let application = self
            .store
            .find_one(&ApplicationFilter::by_number(application_number))?
            .ok_or(ApplicationServiceError::NotFound)?;
        Ok(application.status_label().to_string())
    }

    /// Overwrite the status of the first matching application.
    ///
    /// Success requires the store to report a modified document, so re-applying the current
    /// status yields `NotFound` even though the application exists.
    pub fn change_status(
        &self,
        request: ChangeStatusRequest,
    ) -> Result<(), ApplicationServiceError> {
        let (requested, new_status) = request
            .into_parts()
            .ok_or(ApplicationServiceError::MissingStatusChange)?;
        let Some(application_number) = requested.resolve() else {
            info!(%requested, "status change names no storable application number");
            return Err(ApplicationServiceError::NotFound);
        };

        let outcome = self.store.update_one(
            &ApplicationFilter::by_number(application_number),
            &ApplicationUpdate::SetStatus(new_status.clone()),
        )?;

        if outcome.modified > 0 {
            info!(%application_number, status = %new_status, "application status changed");
            return Ok(());
        }

        if outcome.matched > 0 {
            warn!(
                %application_number,
                status = %new_status,
                "status change matched an application but modified nothing"
            );
        }
        Err(ApplicationServiceError::NotFound)
    }

    /// Every stored application in store order.
    pub fn list(&self) -> Result<Vec<LoanApplication>, ApplicationServiceError> {
        Ok(self.store.find(&ApplicationFilter::all())?)
    }
}

/// Error raised by the application service.
#[derive(Debug, thiserror::Error)]
pub enum ApplicationServiceError {
    #[error("Name and Zipcode are required")]
    MissingApplicant,
    #[error("Application number and new status are required")]
    MissingStatusChange,
    #[error("Invalid request body: {0}")]
    MalformedBody(String),
    #[error("Application with this name and zipcode already exists")]
    Duplicate {
        application_number: ApplicationNumber,
    },
    #[error("Application not found")]
    NotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("store operation did not complete: {0}")]
    Interrupted(String),
}

impl ApplicationServiceError {
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            ApplicationServiceError::MissingApplicant
                | ApplicationServiceError::MissingStatusChange
                | ApplicationServiceError::MalformedBody(_)
        )
    }
}
