//! Server side of ITI-41: decode, validate and acknowledge a submission.
//!
//! Stages run in order and stop at the first failure:
//! content type, MTOM decode, metadata validation, attachment matching, response. Every
//! request is then recorded to the transaction log, whatever the outcome.

use crate::config::ValidationMode;
use crate::constants::{
    FAULT_INTERNAL, FAULT_INVALID_CONTENT_TYPE, FAULT_INVALID_METADATA, FAULT_MISSING_ATTACHMENT,
    FAULT_MTOM_PARSING, SOAP_CONTENT_TYPE,
};
use crate::metadata::MetadataSummary;
use crate::response::{encode_registry_response, encode_soap_fault, FaultCode, RegistryResponse};
use crate::transaction_log::{TransactionLog, TransactionRecord};
use crate::xml::Element;
use bytes::Bytes;
use std::sync::Arc;
use xds_mtom::{ContentType, MtomAttachment, MtomCodec, MtomError};
use xds_uuid::UuidService;

/// Result of handling one request. Always produces a response body.
#[derive(Clone, Debug)]
pub struct HandlerOutcome {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
    pub record: TransactionRecord,
    /// Attachments of an accepted submission, for optional persistence.
    pub documents: Vec<MtomAttachment>,
}

impl HandlerOutcome {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

struct Rejection {
    status: u16,
    reason: &'static str,
    detail: String,
}

impl Rejection {
    fn bad_request(reason: &'static str, detail: impl Into<String>) -> Self {
        Self {
            status: 400,
            reason,
            detail: detail.into(),
        }
    }

    fn internal(detail: impl Into<String>) -> Self {
        Self {
            status: 500,
            reason: FAULT_INTERNAL,
            detail: detail.into(),
        }
    }
}

/// Mock registry request handler. Holds no per-request state and is shared across requests.
#[derive(Clone)]
pub struct RegistryRequestHandler {
    codec: MtomCodec,
    validation_mode: ValidationMode,
    log: Arc<dyn TransactionLog>,
}

impl RegistryRequestHandler {
    pub fn new(validation_mode: ValidationMode, log: Arc<dyn TransactionLog>) -> Self {
        Self {
            codec: MtomCodec::new(),
            validation_mode,
            log,
        }
    }

    pub fn with_codec(mut self, codec: MtomCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn validation_mode(&self) -> ValidationMode {
        self.validation_mode
    }

    /// Handles one request body with its `Content-Type` header value.
    pub fn handle(&self, content_type: Option<&str>, body: &Bytes) -> HandlerOutcome {
        let mut record = TransactionRecord::received(UuidService::new().to_string());

        let outcome = match self.process(content_type, body, &mut record) {
            Ok((response, documents)) => {
                record.http_status = 200;
                HandlerOutcome {
                    status: 200,
                    content_type: SOAP_CONTENT_TYPE,
                    body: encode_registry_response(&response),
                    record,
                    documents,
                }
            }
            Err(rejection) => {
                tracing::warn!(
                    correlation_id = %record.correlation_id,
                    message_id = record.request_message_id.as_deref().unwrap_or("-"),
                    status = rejection.status,
                    reason = rejection.reason,
                    detail = %rejection.detail,
                    "rejected ITI-41 request"
                );
                record.http_status = rejection.status;
                record.fault_reason = Some(rejection.reason.to_owned());
                HandlerOutcome {
                    status: rejection.status,
                    content_type: SOAP_CONTENT_TYPE,
                    body: encode_soap_fault(
                        FaultCode::for_http_status(rejection.status),
                        rejection.reason,
                    ),
                    record,
                    documents: Vec::new(),
                }
            }
        };

        self.log.record(&outcome.record);
        outcome
    }

    fn process(
        &self,
        content_type: Option<&str>,
        body: &Bytes,
        record: &mut TransactionRecord,
    ) -> Result<(RegistryResponse, Vec<MtomAttachment>), Rejection> {
        let content_type = content_type
            .ok_or_else(|| Rejection::bad_request(FAULT_INVALID_CONTENT_TYPE, "no Content-Type header"))?;
        ContentType::parse_multipart(content_type)
            .map_err(|e| Rejection::bad_request(FAULT_INVALID_CONTENT_TYPE, e.to_string()))?;

        let package = self
            .codec
            .decode_parts(body, content_type)
            .map_err(|e| match e {
                MtomError::InvalidContentType(_) => {
                    Rejection::bad_request(FAULT_INVALID_CONTENT_TYPE, e.to_string())
                }
                MtomError::Io(_) => Rejection::internal(e.to_string()),
                _ => Rejection::bad_request(FAULT_MTOM_PARSING, e.to_string()),
            })?;

        let root = Element::parse(&package.control_xml)
            .map_err(|e| Rejection::bad_request(FAULT_INVALID_METADATA, e.to_string()))?;
        let summary = MetadataSummary::from_element(&root);
        record.request_message_id = summary.message_id.clone();
        record.submission_set_id = summary.submission_set_id.clone();
        record.document_ids = summary.document_ids.clone();
        record.patient_id = summary.patient_id.clone();

        summary
            .validate(self.validation_mode)
            .map_err(|detail| Rejection::bad_request(FAULT_INVALID_METADATA, detail))?;

        if package.attachments.is_empty() {
            return Err(Rejection::bad_request(
                FAULT_MISSING_ATTACHMENT,
                "package has no attachments",
            ));
        }
        package.resolve_references().map_err(|e| match e {
            MtomError::MissingAttachment(_) => {
                Rejection::bad_request(FAULT_MISSING_ATTACHMENT, e.to_string())
            }
            _ => Rejection::internal(e.to_string()),
        })?;

        let mut response =
            RegistryResponse::success(summary.submission_set_id, summary.document_ids);
        response.response_message_id = Some(UuidService::new().to_string());
        response.request_correlation_id = summary.message_id;

        tracing::info!(
            correlation_id = %record.correlation_id,
            submission_set_id = response.submission_set_id.as_deref().unwrap_or("-"),
            documents = package.attachments.len(),
            bytes = package.attachment_bytes(),
            "accepted ITI-41 request"
        );

        Ok((response, package.attachments))
    }
}
