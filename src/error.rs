//! Error types for the CBS adapter.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Originating-system tag carried by every classified error.
pub const CBS_SYSTEM: &str = "CBS";

/// CBS adapter errors.
#[derive(Error, Debug)]
pub enum CbsError {
    /// The backend answered with a non-success outcome.
    #[error(transparent)]
    Classified(#[from] ClassifiedError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("XML parsing error: {0}")]
    XmlParse(String),

    #[error("Unexpected CBS response: {0}")]
    UnexpectedResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CbsError {
    /// The backend classification, if this error carries one.
    pub fn classified(&self) -> Option<&ClassifiedError> {
        match self {
            Self::Classified(e) => Some(e),
            _ => None,
        }
    }
}

/// Failures of the HTTP exchange itself. Never classified further.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CBS endpoint answered with HTTP {status}")]
    Status { status: u16, body: String },
}

/// Classes of backend outcomes that are not a success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorClass {
    /// The backend rejected the request for a business reason
    BusinessRejection,
    /// The backend reported it is overloaded
    TransientOverload,
    /// The backend answered with a SOAP fault
    ProtocolFault,
}

impl ErrorClass {
    /// Status class surfaced to callers.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BusinessRejection => 400,
            Self::TransientOverload => 503,
            Self::ProtocolFault => 500,
        }
    }

    /// Get the string code for this class.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BusinessRejection => "BUSINESS_REJECTION",
            Self::TransientOverload => "TRANSIENT_OVERLOAD",
            Self::ProtocolFault => "PROTOCOL_FAULT",
        }
    }

    /// Whether a caller may reasonably retry the same call later.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::TransientOverload)
    }
}

/// A non-success backend outcome, converted for the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("[{system}] {message}")]
pub struct ClassifiedError {
    /// Outcome class
    pub class: ErrorClass,
    /// Human-readable message
    pub message: String,
    /// Originating system
    pub system: &'static str,
}

impl ClassifiedError {
    /// Create a classified error originating from CBS.
    pub fn new(class: ErrorClass, message: impl Into<String>) -> Self {
        Self {
            class,
            message: message.into(),
            system: CBS_SYSTEM,
        }
    }

    pub fn business_rejection(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::BusinessRejection, message)
    }

    pub fn transient_overload(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::TransientOverload, message)
    }

    pub fn protocol_fault(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::ProtocolFault, message)
    }

    pub fn status_code(&self) -> u16 {
        self.class.status_code()
    }
}

/// Escape a value for inclusion in XML text or attribute content.
pub(crate) fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
