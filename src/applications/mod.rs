//! Loan application intake: numbering, duplicate detection, and status tracking.

pub mod domain;
pub mod file;
pub mod memory;
pub mod router;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use domain::{
    AcceptRequest, ApplicantIntake, ApplicationNumber, ChangeStatusRequest, LoanApplication,
    RequestedNumber, Zipcode, RECEIVED_STATUS, UNKNOWN_STATUS,
};
pub use file::FileApplicationStore;
pub use memory::MemoryApplicationStore;
pub use router::application_router;
pub use service::{ApplicationServiceError, LoanApplicationService};
pub use store::{
    ApplicationFilter, ApplicationStore, ApplicationUpdate, StoreError, StoredDocument,
    UpdateOutcome,
};
