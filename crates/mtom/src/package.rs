//! In-memory package model.

use crate::xop::{normalise_cid, xop_references};
use crate::{MtomError, MtomResult};
use bytes::Bytes;

/// Transfer encoding used for every part this codec writes.
pub const BINARY_TRANSFER_ENCODING: &str = "binary";

/// One MIME part carrying a binary payload.
///
/// `content_id` is stored without angle brackets; it is the value referenced by
/// `cid:` URIs from the control part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MtomAttachment {
    pub content_id: String,
    pub content_type: String,
    pub transfer_encoding: String,
    pub payload: Bytes,
}

impl MtomAttachment {
    /// An attachment written with `Content-Transfer-Encoding: binary`.
    pub fn binary(
        content_id: impl Into<String>,
        content_type: impl Into<String>,
        payload: impl Into<Bytes>,
    ) -> Self {
        Self {
            content_id: content_id.into(),
            content_type: content_type.into(),
            transfer_encoding: BINARY_TRANSFER_ENCODING.into(),
            payload: payload.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}

/// A decoded (or about-to-be-encoded) package: boundary, control part and attachments in
/// wire order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MtomPackage {
    pub boundary: String,
    pub root_content_id: String,
    pub control_xml: String,
    pub attachments: Vec<MtomAttachment>,
}

impl MtomPackage {
    /// Looks up an attachment by content id. `cid:` prefixes, angle brackets and
    /// percent-encoding on the query are ignored.
    pub fn attachment(&self, content_id: &str) -> Option<&MtomAttachment> {
        let wanted = normalise_cid(content_id);
        self.attachments
            .iter()
            .find(|a| normalise_cid(&a.content_id) == wanted)
    }

    /// Checks that every `xop:Include` reference in the control part resolves to an attachment.
    ///
    /// # Errors
    ///
    /// - [`MtomError::MissingAttachment`] naming the first unresolved reference.
    /// - [`MtomError::MalformedPackage`] if the control part is not well-formed XML.
    pub fn resolve_references(&self) -> MtomResult<Vec<String>> {
        let references = xop_references(&self.control_xml)?;
        for reference in &references {
            if self.attachment(reference).is_none() {
                return Err(MtomError::MissingAttachment(reference.clone()));
            }
        }
        Ok(references)
    }

    /// Total payload bytes across attachments.
    pub fn attachment_bytes(&self) -> usize {
        self.attachments.iter().map(MtomAttachment::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package(control_xml: &str, ids: &[&str]) -> MtomPackage {
        MtomPackage {
            boundary: "b".into(),
            root_content_id: "root@test".into(),
            control_xml: control_xml.into(),
            attachments: ids
                .iter()
                .map(|id| MtomAttachment::binary(*id, "text/xml", Bytes::from_static(b"<x/>")))
                .collect(),
        }
    }

    #[test]
    fn resolve_references_succeeds_when_all_present() {
        let xml = r#"<d xmlns:xop="http://www.w3.org/2004/08/xop/include"><xop:Include href="cid:doc1@test"/></d>"#;
        let refs = package(xml, &["doc1@test"]).resolve_references().unwrap();
        assert_eq!(refs, vec!["doc1@test".to_string()]);
    }

    #[test]
    fn resolve_references_reports_missing_cid() {
        let xml = r#"<d xmlns:xop="http://www.w3.org/2004/08/xop/include"><xop:Include href="cid:gone@test"/></d>"#;
        let err = package(xml, &["doc1@test"]).resolve_references().unwrap_err();
        assert!(matches!(err, MtomError::MissingAttachment(cid) if cid == "gone@test"));
    }

    #[test]
    fn attachment_bytes_sums_payloads() {
        assert_eq!(package("<r/>", &["a@x", "b@x"]).attachment_bytes(), 8);
        assert_eq!(package("<r/>", &[]).attachment_bytes(), 0);
    }

    #[test]
    fn attachment_lookup_accepts_percent_encoded_reference() {
        let pkg = package("<r/>", &["doc1@test"]);
        assert!(pkg.attachment("cid:doc1%40test").is_some());
        assert!(pkg.attachment("<doc1@test>").is_some());
        assert!(pkg.attachment("other@test").is_none());
    }
}
