//! Request validation

use super::error::BrokerError;
use crate::core::types::BrokerRequest;

/// Check the structural requirements every request must meet.
///
/// The request kind is enforced by the type; malformed JSON is rejected
/// before a [`BrokerRequest`] exists.
pub fn validate_request(request: &BrokerRequest) -> Result<(), BrokerError> {
    let mut problems = Vec::new();

    if request.id.trim().is_empty() {
        problems.push("id is required");
    }
    if request.user_id.trim().is_empty() {
        problems.push("user_id is required");
    }
    if request.parameters.is_empty() {
        problems.push("parameters must not be empty");
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(BrokerError::validation(problems.join("; ")))
    }
}
