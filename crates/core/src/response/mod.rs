//! Registry acknowledgments: the typed model, the server-side encoder and the client-side
//! parser.

mod encode;
mod parser;

pub use encode::{encode_registry_response, encode_soap_fault, FaultCode};
pub use parser::RegistryResponseParser;

use crate::constants::{
    SEVERITY_ERROR, SEVERITY_WARNING, STATUS_FAILURE, STATUS_PARTIAL_SUCCESS, STATUS_SUCCESS,
};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseStatus {
    Success,
    Failure,
    PartialSuccess,
    /// A status URN this crate does not know, passed through unchanged.
    Other(String),
}

impl ResponseStatus {
    pub fn from_urn(urn: &str) -> Self {
        match urn.trim() {
            STATUS_SUCCESS => Self::Success,
            STATUS_FAILURE => Self::Failure,
            STATUS_PARTIAL_SUCCESS => Self::PartialSuccess,
            other => Self::Other(other.to_owned()),
        }
    }

    pub fn as_urn(&self) -> &str {
        match self {
            Self::Success => STATUS_SUCCESS,
            Self::Failure => STATUS_FAILURE,
            Self::PartialSuccess => STATUS_PARTIAL_SUCCESS,
            Self::Other(urn) => urn,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    /// Unrecognised severities are errors.
    pub fn from_urn(urn: &str) -> Self {
        if urn.trim() == SEVERITY_WARNING {
            Self::Warning
        } else {
            Self::Error
        }
    }

    pub fn as_urn(&self) -> &'static str {
        match self {
            Self::Error => SEVERITY_ERROR,
            Self::Warning => SEVERITY_WARNING,
        }
    }
}

/// One entry of a `RegistryErrorList`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryIssue {
    pub code: String,
    pub context: String,
    pub severity: Severity,
    pub location: Option<String>,
}

impl RegistryIssue {
    pub fn error(code: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            context: context.into(),
            severity: Severity::Error,
            location: None,
        }
    }

    pub fn warning(code: impl Into<String>, context: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(code, context)
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryResponse {
    pub status: ResponseStatus,
    pub response_message_id: Option<String>,
    pub request_correlation_id: Option<String>,
    pub submission_set_id: Option<String>,
    pub document_ids: Vec<String>,
    pub errors: Vec<RegistryIssue>,
    pub warnings: Vec<RegistryIssue>,
}

impl RegistryResponse {
    pub fn new(status: ResponseStatus) -> Self {
        Self {
            status,
            response_message_id: None,
            request_correlation_id: None,
            submission_set_id: None,
            document_ids: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// A `Success` response echoing the given identifiers.
    pub fn success(submission_set_id: Option<String>, document_ids: Vec<String>) -> Self {
        Self {
            submission_set_id,
            document_ids,
            ..Self::new(ResponseStatus::Success)
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResponseStatus::Success
    }

    /// Adds an issue to `errors` or `warnings` according to its severity.
    pub fn push_issue(&mut self, issue: RegistryIssue) {
        match issue.severity {
            Severity::Error => self.errors.push(issue),
            Severity::Warning => self.warnings.push(issue),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_urns_round_trip() {
        for status in [
            ResponseStatus::Success,
            ResponseStatus::Failure,
            ResponseStatus::PartialSuccess,
            ResponseStatus::Other("urn:example:Deferred".into()),
        ] {
            assert_eq!(ResponseStatus::from_urn(status.as_urn()), status);
        }
    }

    #[test]
    fn test_unknown_severity_is_error() {
        assert_eq!(Severity::from_urn("urn:example:Info"), Severity::Error);
        assert_eq!(Severity::from_urn(SEVERITY_WARNING), Severity::Warning);
    }

    #[test]
    fn test_push_issue_partitions_by_severity() {
        let mut response = RegistryResponse::new(ResponseStatus::PartialSuccess);
        response.push_issue(RegistryIssue::error("XDSRegistryError", "boom"));
        response.push_issue(RegistryIssue::warning("XDSExtraMetadataNotSaved", "ignored"));
        assert_eq!(response.errors.len(), 1);
        assert_eq!(response.warnings.len(), 1);
    }
}
