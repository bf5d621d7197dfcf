use super::{RegistryIssue, RegistryResponse, Severity};
use crate::constants::{
    DOCUMENT_ENTRY_OBJECT_TYPE, DOCUMENT_ENTRY_UNIQUE_ID, DOCUMENT_MIME_TYPE,
    EXTERNAL_IDENTIFIER_OBJECT_TYPE, ITI41_RESPONSE_ACTION, RIM_NS, RS_NS, SOAP12_NS,
    SUBMISSION_SET_UNIQUE_ID, WSA_NS,
};
use crate::xml::{XmlElement, XML_DECLARATION};
use xds_uuid::UuidService;

/// SOAP 1.2 fault code.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaultCode {
    /// The request was at fault (HTTP 4xx).
    Sender,
    /// The registry failed (HTTP 5xx).
    Receiver,
}

impl FaultCode {
    pub fn for_http_status(status: u16) -> Self {
        if status >= 500 {
            Self::Receiver
        } else {
            Self::Sender
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sender => "Sender",
            Self::Receiver => "Receiver",
        }
    }
}

/// Renders a registry response as a SOAP 1.2 envelope.
///
/// Echoed identifiers are wrapped in `rim:RegistryPackage` / `rim:ExtrinsicObject`
/// containers so readers can scope them.
pub fn encode_registry_response(response: &RegistryResponse) -> String {
    let mut header = XmlElement::new("soapenv:Header").child(
        XmlElement::new("wsa:Action")
            .attr("soapenv:mustUnderstand", "1")
            .text(ITI41_RESPONSE_ACTION),
    );
    if let Some(id) = &response.response_message_id {
        header.push(XmlElement::new("wsa:MessageID").text(id));
    }
    if let Some(id) = &response.request_correlation_id {
        header.push(XmlElement::new("wsa:RelatesTo").text(id));
    }

    let mut registry_response = XmlElement::new("rs:RegistryResponse")
        .attr("xmlns:rs", RS_NS)
        .attr("xmlns:rim", RIM_NS)
        .attr("status", response.status.as_urn());

    if response.submission_set_id.is_some() || !response.document_ids.is_empty() {
        let mut objects = XmlElement::new("rim:RegistryObjectList");
        if let Some(set_id) = &response.submission_set_id {
            objects.push(
                XmlElement::new("rim:RegistryPackage")
                    .attr("id", set_id)
                    .child(echoed_identifier(SUBMISSION_SET_UNIQUE_ID, set_id)),
            );
        }
        for document_id in &response.document_ids {
            objects.push(
                XmlElement::new("rim:ExtrinsicObject")
                    .attr("id", document_id)
                    .attr("mimeType", DOCUMENT_MIME_TYPE)
                    .attr("objectType", DOCUMENT_ENTRY_OBJECT_TYPE)
                    .child(echoed_identifier(DOCUMENT_ENTRY_UNIQUE_ID, document_id)),
            );
        }
        registry_response.push(objects);
    }

    if !response.errors.is_empty() || !response.warnings.is_empty() {
        let highest = if response.errors.is_empty() {
            Severity::Warning
        } else {
            Severity::Error
        };
        registry_response.push(
            XmlElement::new("rs:RegistryErrorList")
                .attr("highestSeverity", highest.as_urn())
                .children(
                    response
                        .errors
                        .iter()
                        .chain(&response.warnings)
                        .map(registry_error),
                ),
        );
    }

    let envelope = XmlElement::new("soapenv:Envelope")
        .attr("xmlns:soapenv", SOAP12_NS)
        .attr("xmlns:wsa", WSA_NS)
        .child(header)
        .child(XmlElement::new("soapenv:Body").child(registry_response));

    let mut out = String::from(XML_DECLARATION);
    envelope.write_to(&mut out);
    out
}

/// Renders a SOAP 1.2 fault carrying `reason` verbatim.
pub fn encode_soap_fault(code: FaultCode, reason: &str) -> String {
    let fault = XmlElement::new("soapenv:Fault")
        .child(
            XmlElement::new("soapenv:Code").child(
                XmlElement::new("soapenv:Value").text(format!("soapenv:{}", code.as_str())),
            ),
        )
        .child(
            XmlElement::new("soapenv:Reason").child(
                XmlElement::new("soapenv:Text")
                    .attr("xml:lang", "en")
                    .text(reason),
            ),
        );

    let envelope = XmlElement::new("soapenv:Envelope")
        .attr("xmlns:soapenv", SOAP12_NS)
        .child(XmlElement::new("soapenv:Body").child(fault));

    let mut out = String::from(XML_DECLARATION);
    envelope.write_to(&mut out);
    out
}

fn echoed_identifier(scheme: &str, value: &str) -> XmlElement {
    XmlElement::new("rim:ExternalIdentifier")
        .attr("id", UuidService::new().to_string())
        .attr("objectType", EXTERNAL_IDENTIFIER_OBJECT_TYPE)
        .attr("identificationScheme", scheme)
        .attr("registryObject", value)
        .attr("value", value)
}

fn registry_error(issue: &RegistryIssue) -> XmlElement {
    let mut element = XmlElement::new("rs:RegistryError")
        .attr("errorCode", &issue.code)
        .attr("codeContext", &issue.context)
        .attr("severity", issue.severity.as_urn());
    if let Some(location) = &issue.location {
        element = element.attr("location", location);
    }
    element
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_code_follows_http_status() {
        assert_eq!(FaultCode::for_http_status(400), FaultCode::Sender);
        assert_eq!(FaultCode::for_http_status(500), FaultCode::Receiver);
    }

    #[test]
    fn test_soap_fault_carries_reason_verbatim() {
        let xml = encode_soap_fault(FaultCode::Sender, "Invalid Content-Type");
        assert!(xml.contains("<soapenv:Value>soapenv:Sender</soapenv:Value>"));
        assert!(xml.contains(r#"<soapenv:Text xml:lang="en">Invalid Content-Type</soapenv:Text>"#));
    }

    #[test]
    fn test_response_carries_action_and_relates_to() {
        let mut response = RegistryResponse::success(Some("1.2.3".into()), vec!["1.2.4".into()]);
        response.response_message_id = Some("urn:uuid:out".into());
        response.request_correlation_id = Some("urn:uuid:in".into());

        let xml = encode_registry_response(&response);

        assert!(xml.contains(ITI41_RESPONSE_ACTION));
        assert!(xml.contains("<wsa:RelatesTo>urn:uuid:in</wsa:RelatesTo>"));
        assert!(xml.contains(r#"status="urn:oasis:names:tc:ebxml-regrep:ResponseStatusType:Success""#));
        assert!(!xml.contains("RegistryErrorList"));
    }
}
