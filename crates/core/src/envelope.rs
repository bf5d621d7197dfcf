//! ITI-41 ProvideAndRegisterDocumentSet-b request construction.

use crate::config::RegistryConfig;
use crate::constants::{ITI41_ACTION, SOAP12_NS, WSA_NS, XDSB_NS, XOP_NS};
use crate::document::Document;
use crate::metadata::{MetadataBuilder, SubmissionPackage};
use crate::xml::{XmlElement, XML_DECLARATION};
use crate::{XdsError, XdsResult};
use std::sync::Arc;
use xds_mtom::{EncodedBody, MtomAttachment, MtomCodec};
use xds_uuid::{ContentId, UuidService};

const WSA_ANONYMOUS: &str = "http://www.w3.org/2005/08/addressing/anonymous";

/// The SOAP control part and the document attachment it references.
#[derive(Clone, Debug)]
pub struct ProvideAndRegisterRequest {
    pub message_id: String,
    pub control_xml: String,
    pub attachment: MtomAttachment,
}

impl ProvideAndRegisterRequest {
    /// Wraps built metadata in a SOAP 1.2 envelope.
    ///
    /// `security_header` is inserted verbatim inside `soapenv:Header`; it is produced and
    /// signed elsewhere.
    pub fn new(
        package: &SubmissionPackage,
        document: &Document,
        content_id: &ContentId,
        endpoint: Option<&str>,
        security_header: Option<&str>,
    ) -> Self {
        let message_id = UuidService::new().to_string();

        let mut header = XmlElement::new("soapenv:Header")
            .child(
                XmlElement::new("wsa:Action")
                    .attr("soapenv:mustUnderstand", "1")
                    .text(ITI41_ACTION),
            )
            .child(XmlElement::new("wsa:MessageID").text(&message_id))
            .child(
                XmlElement::new("wsa:ReplyTo")
                    .child(XmlElement::new("wsa:Address").text(WSA_ANONYMOUS)),
            );
        if let Some(endpoint) = endpoint {
            header.push(
                XmlElement::new("wsa:To")
                    .attr("soapenv:mustUnderstand", "1")
                    .text(endpoint),
            );
        }
        if let Some(security) = security_header {
            header = header.raw(security);
        }

        let request = XmlElement::new("xdsb:ProvideAndRegisterDocumentSetRequest")
            .attr("xmlns:xdsb", XDSB_NS)
            .child(package.metadata.clone())
            .child(
                XmlElement::new("xdsb:Document")
                    .attr("id", &package.document_entry_id)
                    .child(
                        XmlElement::new("xop:Include")
                            .attr("xmlns:xop", XOP_NS)
                            .attr("href", content_id.cid_uri()),
                    ),
            );

        let envelope = XmlElement::new("soapenv:Envelope")
            .attr("xmlns:soapenv", SOAP12_NS)
            .attr("xmlns:wsa", WSA_NS)
            .child(header)
            .child(XmlElement::new("soapenv:Body").child(request));

        let mut control_xml = String::from(XML_DECLARATION);
        envelope.write_to(&mut control_xml);

        Self {
            message_id,
            control_xml,
            attachment: MtomAttachment::binary(
                content_id.as_str(),
                document.mime_type(),
                document.content().clone(),
            ),
        }
    }
}

/// A ready-to-send ITI-41 request body.
#[derive(Clone, Debug)]
pub struct OutboundRequest {
    pub message_id: String,
    pub submission_set_id: String,
    pub document_entry_id: String,
    pub body: EncodedBody,
}

impl OutboundRequest {
    /// Builds metadata, wraps it in the SOAP envelope and MTOM-encodes it with `document`.
    ///
    /// # Arguments
    ///
    /// * `security_header` - pre-signed header markup, must be UTF-8
    ///
    /// # Errors
    ///
    /// - `XdsError::InvalidOid` for a bad `patient_oid`
    /// - `XdsError::InvalidInput` when `security_header` is not UTF-8
    pub fn build(
        config: Arc<RegistryConfig>,
        patient_id: &str,
        patient_oid: &str,
        document: Document,
        security_header: Option<&[u8]>,
        codec: &MtomCodec,
    ) -> XdsResult<Self> {
        let security_header = security_header
            .map(std::str::from_utf8)
            .transpose()
            .map_err(|e| XdsError::InvalidInput(format!("security header is not UTF-8: {e}")))?;

        let endpoint = config.endpoint.clone();
        let mut builder = MetadataBuilder::new(config);
        builder.set_patient_identifier(patient_id, patient_oid)?;
        builder.set_document(document);
        let package = builder.build()?;
        let document = builder.document().ok_or(XdsError::DocumentNotSet)?;

        let content_id = ContentId::new();
        let request = ProvideAndRegisterRequest::new(
            &package,
            document,
            &content_id,
            endpoint.as_deref(),
            security_header,
        );
        let body = codec.encode(&request.control_xml, &[request.attachment], None);

        tracing::info!(
            message_id = %request.message_id,
            submission_set_id = %package.submission_set_id,
            bytes = body.len(),
            "built ITI-41 request"
        );

        Ok(Self {
            message_id: request.message_id,
            submission_set_id: package.submission_set_id,
            document_entry_id: package.document_entry_id,
            body,
        })
    }

    pub fn content_type(&self) -> &str {
        self.body.content_type()
    }
}
