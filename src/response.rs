//! Response extraction and result classification.
//!
//! Order of checks for every response:
//! 1. a `Fault` in the SOAP body wins over anything else (500),
//! 2. `ResultCode == 405000000` is success,
//! 3. a `ResultDesc` containing the busy marker is an overload (503),
//! 4. anything else is a business rejection (400) carrying `ResultDesc`.

use crate::envelope::Operation;
use crate::error::{CbsError, ClassifiedError};
use crate::parser::XmlElement;

/// ResultCode of a successful CBS call.
pub const SUCCESS_CODE: &str = "405000000";

/// Message returned to callers when CBS reports it is busy.
pub const SYSTEM_BUSY_MESSAGE: &str = "The CBS system is busy, please try again later";

/// Classify a result header.
pub fn classify_result(code: &str, desc: &str, busy_marker: &str) -> Result<(), ClassifiedError> {
    if code == SUCCESS_CODE {
        return Ok(());
    }
    if !busy_marker.is_empty() && desc.contains(busy_marker) {
        return Err(ClassifiedError::transient_overload(SYSTEM_BUSY_MESSAGE));
    }
    Err(ClassifiedError::business_rejection(desc))
}

/// Locate the SOAP body of a parsed response.
pub fn soap_body(document: &XmlElement) -> Result<&XmlElement, CbsError> {
    document
        .element_at(&["Envelope", "Body"])
        .ok_or_else(|| CbsError::UnexpectedResponse("missing SOAP Envelope/Body".to_string()))
}

/// Fault string of a SOAP fault in `body`, if any.
pub fn fault_string(body: &XmlElement) -> Option<String> {
    let fault = body.child("Fault")?;
    let message = fault
        .as_element()
        .and_then(|f| f.text_at(&["faultstring"]).or_else(|| f.text_at(&["faultString"])))
        .unwrap_or("SOAP fault without faultstring");
    Some(message.to_string())
}

/// Return the result message of `operation` if CBS reported success.
///
/// Every non-success outcome becomes a [`ClassifiedError`]. A response that
/// has neither a fault nor the expected message is an
/// [`CbsError::UnexpectedResponse`].
pub fn extract_result<'a>(
    document: &'a XmlElement,
    operation: Operation,
    busy_marker: &str,
) -> Result<&'a XmlElement, CbsError> {
    let body = soap_body(document)?;

    if let Some(message) = fault_string(body) {
        return Err(ClassifiedError::protocol_fault(message).into());
    }

    let result_msg = body.element_at(&[operation.result_message()]).ok_or_else(|| {
        CbsError::UnexpectedResponse(format!("missing {}", operation.result_message()))
    })?;

    let code = result_msg
        .text_at(&["ResultHeader", "ResultCode"])
        .ok_or_else(|| CbsError::UnexpectedResponse("missing ResultHeader/ResultCode".to_string()))?;
    let desc = result_msg
        .text_at(&["ResultHeader", "ResultDesc"])
        .unwrap_or_default();

    classify_result(code, desc, busy_marker)?;
    Ok(result_msg)
}
