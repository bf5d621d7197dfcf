//! Client-side parsing of registry acknowledgments.

use super::{RegistryIssue, RegistryResponse, ResponseStatus, Severity};
use crate::constants::{RS_NS, SOAP11_NS, SOAP12_NS, WSA_NS};
use crate::metadata::MetadataSummary;
use crate::xml::{Element, NsCandidates};
use crate::{XdsError, XdsResult};
use bytes::Bytes;
use xds_mtom::{ContentType, MtomCodec};

/// Turns response bytes (a registry response or a SOAP fault) into a [`RegistryResponse`].
#[derive(Clone, Debug, Default)]
pub struct RegistryResponseParser {
    codec: MtomCodec,
}

impl RegistryResponseParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_codec(codec: MtomCodec) -> Self {
        Self { codec }
    }

    /// Parses a response body, unwrapping it through the MTOM codec first when
    /// `content_type` declares `multipart/related`.
    ///
    /// # Errors
    ///
    /// `XdsError::Mtom` for a malformed multipart body, otherwise as [`Self::parse`].
    pub fn parse_bytes(&self, body: &Bytes, content_type: Option<&str>) -> XdsResult<RegistryResponse> {
        let is_multipart = content_type
            .map(|ct| ContentType::parse(ct).is_multipart_related())
            .unwrap_or(false);

        if let (true, Some(content_type)) = (is_multipart, content_type) {
            let package = self.codec.decode_envelope(body, content_type)?;
            return self.parse(&package.control_xml);
        }

        let xml = std::str::from_utf8(body)
            .map_err(|e| XdsError::ResponseParse(format!("response is not UTF-8: {e}")))?;
        self.parse(xml)
    }

    /// Parses a response document.
    ///
    /// A SOAP fault short-circuits to `Failure` with one `SOAP:{code}` error. Otherwise the
    /// `RegistryResponse` element supplies status, echoed identifiers and issues.
    ///
    /// # Errors
    ///
    /// `XdsError::ResponseParse` when the input is not XML or contains neither a fault nor a
    /// `RegistryResponse` element.
    pub fn parse(&self, xml: &str) -> XdsResult<RegistryResponse> {
        let root = Element::parse(xml)
            .map_err(|e| XdsError::ResponseParse(format!("response is not XML: {e}")))?;

        let soap = NsCandidates::only(SOAP12_NS).or(SOAP11_NS);
        if let Some(fault) = root.find(&soap, "Fault") {
            return Ok(fault_response(fault, &soap));
        }

        let registry_response = root
            .find(&NsCandidates::with_root(RS_NS, &root), "RegistryResponse")
            .ok_or_else(|| {
                XdsError::ResponseParse("no RegistryResponse or SOAP Fault element found".into())
            })?;

        let status_urn = registry_response.attr("status").unwrap_or_default();
        let status = ResponseStatus::from_urn(status_urn);
        if let ResponseStatus::Other(urn) = &status {
            tracing::warn!(status = %urn, "unrecognised registry response status");
        }

        let wsa = NsCandidates::only(WSA_NS);
        let header_text = |name: &str| {
            root.find(&wsa, name)
                .map(|e| e.text().to_owned())
                .filter(|t| !t.is_empty())
        };

        let summary = MetadataSummary::from_element(registry_response);
        let mut response = RegistryResponse {
            response_message_id: header_text("MessageID"),
            request_correlation_id: header_text("RelatesTo"),
            submission_set_id: summary.submission_set_id,
            document_ids: summary.document_ids,
            ..RegistryResponse::new(status)
        };

        let rs = NsCandidates::with_root(RS_NS, &root);
        for error in registry_response.find_all(&rs, "RegistryError") {
            let context = error
                .attr("codeContext")
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| error.text());
            response.push_issue(RegistryIssue {
                code: error.attr("errorCode").unwrap_or_default().to_owned(),
                context: context.to_owned(),
                severity: Severity::from_urn(error.attr("severity").unwrap_or_default()),
                location: error.attr("location").map(str::to_owned),
            });
        }

        Ok(response)
    }
}

fn fault_response(fault: &Element, soap: &NsCandidates<'_>) -> RegistryResponse {
    let unqualified = NsCandidates::only(SOAP12_NS).or_unqualified();

    // SOAP 1.2: Code/Value and Reason/Text. SOAP 1.1: faultcode and faultstring.
    let code = fault
        .child(soap, "Code")
        .and_then(|c| c.child(soap, "Value"))
        .or_else(|| fault.child(&unqualified, "faultcode"))
        .map(Element::text)
        .unwrap_or_default();
    let reason = fault
        .child(soap, "Reason")
        .and_then(|r| r.child(soap, "Text"))
        .or_else(|| fault.child(&unqualified, "faultstring"))
        .map(Element::text)
        .unwrap_or_default();

    let local_code = code.rsplit(':').next().unwrap_or(code);

    let mut response = RegistryResponse::new(ResponseStatus::Failure);
    response.push_issue(RegistryIssue::error(format!("SOAP:{local_code}"), reason));
    response
}
