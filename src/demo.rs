use crate::applications::{
    AcceptRequest, ApplicationServiceError, ChangeStatusRequest, LoanApplicationService,
    MemoryApplicationStore,
};
use crate::error::AppError;
use std::sync::Arc;

pub(crate) fn run_demo() -> Result<(), AppError> {
    let service = LoanApplicationService::new(Arc::new(MemoryApplicationStore::default()));
    for line in demo_transcript(&service)? {
        println!("{line}");
    }
    Ok(())
}

/// Runs the canonical intake walkthrough and returns what happened at each step.
fn demo_transcript(
    service: &LoanApplicationService<MemoryApplicationStore>,
) -> Result<Vec<String>, AppError> {
    let mut transcript = vec!["Loan intake demo (in-memory store)".to_string()];

    let alice = AcceptRequest {
        name: Some("Alice".to_string()),
        zipcode: Some("10001".into()),
        address: Some("12 Hudson St, New York".to_string()),
    };

    let number = service.accept(alice.clone())?;
    transcript.push(format!("- Accepted Alice/10001 as application {number}"));

    match service.accept(alice) {
        Err(ApplicationServiceError::Duplicate { application_number }) => transcript.push(
            format!("- Resubmission rejected as duplicate of application {application_number}"),
        ),
        Ok(other) => transcript.push(format!("- Resubmission unexpectedly accepted as {other}")),
        Err(err) => transcript.push(format!("- Resubmission failed: {err}")),
    }

    let status = service.status(number)?;
    transcript.push(format!("- Status of {number}: {status}"));

    let approve = ChangeStatusRequest {
        application_number: Some(number.into()),
        new_status: Some("approved".to_string()),
    };
    match service.change_status(approve.clone()) {
        Ok(()) => transcript.push(format!("- Application {number} approved")),
        Err(err) => transcript.push(format!("- Approval failed: {err}")),
    }
    match service.change_status(approve) {
        Ok(()) => transcript.push("- Repeated approval reported success".to_string()),
        Err(err) => transcript.push(format!("- Repeated approval reported: {err}")),
    }

    let status = service.status(number)?;
    transcript.push(format!("- Status of {number}: {status}"));

    let applications = service.list()?;
    transcript.push(format!(
        "- Stored applications:\n{}",
        serde_json::to_string_pretty(&applications)?
    ));

    Ok(transcript)
}
