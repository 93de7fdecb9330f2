use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status assigned to every freshly accepted application.
pub const RECEIVED_STATUS: &str = "received";

/// Reported when a stored document carries no status.
pub const UNKNOWN_STATUS: &str = "unknown";

/// Sequential identifier handed back to applicants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationNumber(pub u64);

impl ApplicationNumber {
    /// Numbering is derived from the collection size, never from a durable counter.
    pub fn following(count: u64) -> Self {
        Self(count + 1)
    }
}

impl fmt::Display for ApplicationNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A loan application document as exposed to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanApplication {
    pub application_number: ApplicationNumber,
    pub name: String,
    pub zipcode: Zipcode,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub notes: Vec<String>,
}

impl LoanApplication {
    pub fn received(application_number: ApplicationNumber, intake: ApplicantIntake) -> Self {
        Self {
            application_number,
            name: intake.name,
            zipcode: intake.zipcode,
            address: intake.address,
            status: RECEIVED_STATUS.to_string(),
            notes: Vec::new(),
        }
    }

    pub fn status_label(&self) -> &str {
        if self.status.is_empty() {
            UNKNOWN_STATUS
        } else {
            &self.status
        }
    }
}

/// Zipcode exactly as submitted. `"10001"` and `10001` are different values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Zipcode(pub Value);

impl Zipcode {
    pub fn is_present(&self) -> bool {
        is_present(&self.0)
    }
}

impl From<&str> for Zipcode {
    fn from(value: &str) -> Self {
        Self(Value::String(value.to_string()))
    }
}

impl From<u64> for Zipcode {
    fn from(value: u64) -> Self {
        Self(Value::from(value))
    }
}

impl fmt::Display for Zipcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(text) => f.write_str(text),
            other => write!(f, "{other}"),
        }
    }
}

/// Application number as a client wrote it in a status change.
///
/// Any JSON value is carried through; only non-negative integral numbers can address a stored
/// application, so `1.0` resolves to `1` while `"1"` or `-1` resolve to nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestedNumber(pub Value);

impl RequestedNumber {
    pub fn is_present(&self) -> bool {
        is_present(&self.0)
    }

    pub fn resolve(&self) -> Option<ApplicationNumber> {
        if let Some(number) = self.0.as_u64() {
            return Some(ApplicationNumber(number));
        }
        let number = self.0.as_f64()?;
        let integral = number.fract() == 0.0 && number >= 0.0 && number <= u64::MAX as f64;
        integral.then(|| ApplicationNumber(number as u64))
    }
}

impl From<ApplicationNumber> for RequestedNumber {
    fn from(value: ApplicationNumber) -> Self {
        Self(Value::from(value.0))
    }
}

impl fmt::Display for RequestedNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validated applicant fields, ready for the duplicate check.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicantIntake {
    pub name: String,
    pub zipcode: Zipcode,
    pub address: String,
}

/// Body of `POST /api/accept`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AcceptRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub zipcode: Option<Zipcode>,
    #[serde(default)]
    pub address: Option<String>,
}

impl AcceptRequest {
    /// Presence check only; values are otherwise taken as given.
    pub fn into_intake(self) -> Option<ApplicantIntake> {
        let name = self.name.filter(|value| !value.is_empty())?;
        let zipcode = self.zipcode.filter(Zipcode::is_present)?;
        Some(ApplicantIntake {
            name,
            zipcode,
            address: self.address.unwrap_or_default(),
        })
    }
}

/// Body of `POST /api/change_status`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChangeStatusRequest {
    #[serde(default)]
    pub application_number: Option<RequestedNumber>,
    #[serde(default)]
    pub new_status: Option<String>,
}

impl ChangeStatusRequest {
    /// Zero, empty and null values count as missing.
    pub fn into_parts(self) -> Option<(RequestedNumber, String)> {
        let number = self.application_number.filter(RequestedNumber::is_present)?;
        let status = self.new_status.filter(|value| !value.is_empty())?;
        Some((number, status))
    }
}

/// Form-style presence: null, false, zero and empty values are absent.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().map_or(true, |number| number != 0.0),
        Value::String(text) => !text.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(fields) => !fields.is_empty(),
    }
}
