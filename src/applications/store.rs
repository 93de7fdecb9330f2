use serde::{Deserialize, Serialize};

use super::domain::{ApplicationNumber, LoanApplication, Zipcode};

/// Document collection backing the intake service.
///
/// Every call is atomic on its own, but nothing ties two calls together: callers that read and
/// then write observe whatever other requests did in between.
pub trait ApplicationStore: Send + Sync {
    fn insert_one(&self, application: LoanApplication) -> Result<(), StoreError>;
    fn find_one(&self, filter: &ApplicationFilter) -> Result<Option<LoanApplication>, StoreError>;
    fn find(&self, filter: &ApplicationFilter) -> Result<Vec<LoanApplication>, StoreError>;
    fn update_one(
        &self,
        filter: &ApplicationFilter,
        update: &ApplicationUpdate,
    ) -> Result<UpdateOutcome, StoreError>;
    fn count(&self) -> Result<u64, StoreError>;

    /// Release hook invoked once the server has drained.
    fn flush(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Equality filter; unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicationFilter {
    pub application_number: Option<ApplicationNumber>,
    pub name: Option<String>,
    pub zipcode: Option<Zipcode>,
}

impl ApplicationFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_number(application_number: ApplicationNumber) -> Self {
        Self {
            application_number: Some(application_number),
            ..Self::default()
        }
    }

    pub fn by_applicant(name: &str, zipcode: &Zipcode) -> Self {
        Self {
            name: Some(name.to_string()),
            zipcode: Some(zipcode.clone()),
            ..Self::default()
        }
    }

    pub fn matches(&self, application: &LoanApplication) -> bool {
        self.application_number
            .map_or(true, |number| application.application_number == number)
            && self
                .name
                .as_deref()
                .map_or(true, |name| application.name == name)
            && self
                .zipcode
                .as_ref()
                .map_or(true, |zipcode| application.zipcode == *zipcode)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplicationUpdate {
    SetStatus(String),
}

impl ApplicationUpdate {
    /// Applies the update and reports whether the document actually changed.
    pub fn apply(&self, application: &mut LoanApplication) -> bool {
        match self {
            ApplicationUpdate::SetStatus(status) => {
                if application.status == *status {
                    false
                } else {
                    application.status = status.clone();
                    true
                }
            }
        }
    }
}

/// Match/modify counts, mirroring what document stores report for a single-document update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("store file {path} could not be read or written: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("store file {path} could not be encoded: {source}")]
    Encode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("store file {path} is corrupt: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Internal storage identifier, stripped before documents leave the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub u64);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDocument {
    #[serde(rename = "_id")]
    pub id: DocumentId,
    #[serde(flatten)]
    pub application: LoanApplication,
}

/// Insertion-ordered documents plus `_id` allocation; the bundled stores wrap this in a lock.
#[derive(Debug, Clone, Default)]
pub struct DocumentCollection {
    documents: Vec<StoredDocument>,
    next_id: u64,
}

impl DocumentCollection {
    pub fn from_documents(documents: Vec<StoredDocument>) -> Self {
        let next_id = documents
            .iter()
            .map(|document| document.id.0 + 1)
            .max()
            .unwrap_or(0);
        Self { documents, next_id }
    }

    pub fn documents(&self) -> &[StoredDocument] {
        &self.documents
    }

    pub fn insert_one(&mut self, application: LoanApplication) -> DocumentId {
        let id = DocumentId(self.next_id);
        self.next_id += 1;
        self.documents.push(StoredDocument { id, application });
        id
    }

    pub fn find_one(&self, filter: &ApplicationFilter) -> Option<LoanApplication> {
        self.documents
            .iter()
            .find(|document| filter.matches(&document.application))
            .map(|document| document.application.clone())
    }

    pub fn find(&self, filter: &ApplicationFilter) -> Vec<LoanApplication> {
        self.documents
            .iter()
            .filter(|document| filter.matches(&document.application))
            .map(|document| document.application.clone())
            .collect()
    }

    pub fn update_one(
        &mut self,
        filter: &ApplicationFilter,
        update: &ApplicationUpdate,
    ) -> UpdateOutcome {
        match self
            .documents
            .iter_mut()
            .find(|document| filter.matches(&document.application))
        {
            Some(document) => UpdateOutcome {
                matched: 1,
                modified: u64::from(update.apply(&mut document.application)),
            },
            None => UpdateOutcome::default(),
        }
    }

    pub fn count(&self) -> u64 {
        self.documents.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::applications::domain::ApplicantIntake;

    fn application(number: u64, name: &str, zipcode: &str) -> LoanApplication {
        LoanApplication::received(
            ApplicationNumber(number),
            ApplicantIntake {
                name: name.to_string(),
                zipcode: Zipcode::from(zipcode),
                address: String::new(),
            },
        )
    }

    #[test]
    fn filter_matches_exact_case_sensitive_values() {
        let alice = application(1, "Alice", "10001");
        let zipcode = Zipcode::from("10001");
        assert!(ApplicationFilter::by_applicant("Alice", &zipcode).matches(&alice));
        assert!(!ApplicationFilter::by_applicant("alice", &zipcode).matches(&alice));
        assert!(!ApplicationFilter::by_applicant("Alice", &Zipcode::from("10002")).matches(&alice));
        assert!(!ApplicationFilter::by_applicant("Alice", &Zipcode::from(10001)).matches(&alice));
        assert!(ApplicationFilter::by_number(ApplicationNumber(1)).matches(&alice));
        assert!(ApplicationFilter::all().matches(&alice));
    }

    #[test]
    fn update_one_reports_matched_but_unmodified() {
        let mut collection = DocumentCollection::default();
        collection.insert_one(application(1, "Alice", "10001"));
        let filter = ApplicationFilter::by_number(ApplicationNumber(1));

        let same = collection.update_one(
            &filter,
            &ApplicationUpdate::SetStatus("received".to_string()),
        );
        assert_eq!(
            same,
            UpdateOutcome {
                matched: 1,
                modified: 0
            }
        );

        let changed = collection.update_one(
            &filter,
            &ApplicationUpdate::SetStatus("approved".to_string()),
        );
        assert_eq!(changed.modified, 1);

        let missing = collection.update_one(
            &ApplicationFilter::by_number(ApplicationNumber(7)),
            &ApplicationUpdate::SetStatus("approved".to_string()),
        );
        assert_eq!(missing, UpdateOutcome::default());
    }

    #[test]
    fn update_one_touches_only_first_match() {
        let mut collection = DocumentCollection::default();
        collection.insert_one(application(1, "Alice", "10001"));
        collection.insert_one(application(1, "Bob", "10002"));

        collection.update_one(
            &ApplicationFilter::by_number(ApplicationNumber(1)),
            &ApplicationUpdate::SetStatus("approved".to_string()),
        );

        let statuses: Vec<_> = collection
            .find(&ApplicationFilter::all())
            .into_iter()
            .map(|application| application.status)
            .collect();
        assert_eq!(statuses, vec!["approved", "received"]);
    }

    #[test]
    fn from_documents_continues_id_allocation() {
        let mut collection = DocumentCollection::from_documents(vec![StoredDocument {
            id: DocumentId(4),
            application: application(1, "Alice", "10001"),
        }]);
        let id = collection.insert_one(application(2, "Bob", "10002"));
        assert_eq!(id, DocumentId(5));
        assert_eq!(collection.count(), 2);
    }
}
