//! Reading identifiers back out of submitted metadata or registry responses.
//!
//! Records are recognised by identification-scheme URN, never by position.

use crate::config::ValidationMode;
use crate::constants::{
    DOCUMENT_ENTRY_PATIENT_ID, DOCUMENT_ENTRY_UNIQUE_ID, HAS_MEMBER, LCM_NS, RIM_NS,
    SUBMISSION_SET_PATIENT_ID, SUBMISSION_SET_UNIQUE_ID, WSA_NS, XDSB_NS, XOP_NS,
};
use crate::xml::{Element, NsCandidates};
use crate::XdsResult;

/// Correlation identifiers and structural facts found in a metadata-bearing document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetadataSummary {
    pub message_id: Option<String>,
    pub submission_set_id: Option<String>,
    pub document_ids: Vec<String>,
    pub patient_id: Option<String>,
    /// `cid:` targets of `xdsb:Document` includes, without the scheme.
    pub document_references: Vec<String>,
    pub has_submit_objects_request: bool,
    pub has_registry_object_list: bool,
    pub has_member_association: bool,
}

impl MetadataSummary {
    pub fn from_xml(xml: &str) -> XdsResult<Self> {
        Ok(Self::from_element(&Element::parse(xml)?))
    }

    /// Summarises `root`, which may be a SOAP envelope, a ProvideAndRegister request, a bare
    /// SubmitObjectsRequest or a RegistryResponse.
    pub fn from_element(root: &Element) -> Self {
        let rim = NsCandidates::with_root(RIM_NS, root);
        let lcm = NsCandidates::with_root(LCM_NS, root);

        let submit = root.find(&lcm, "SubmitObjectsRequest");
        let has_registry_object_list = submit
            .map(|s| s.find(&rim, "RegistryObjectList").is_some())
            .unwrap_or(false);

        let submission_set_id = scoped_identifiers(root, &rim, "RegistryPackage", SUBMISSION_SET_UNIQUE_ID)
            .into_iter()
            .next();
        let document_ids = scoped_identifiers(root, &rim, "ExtrinsicObject", DOCUMENT_ENTRY_UNIQUE_ID);
        let patient_id = identifiers(root, &rim, DOCUMENT_ENTRY_PATIENT_ID)
            .into_iter()
            .chain(identifiers(root, &rim, SUBMISSION_SET_PATIENT_ID))
            .next();

        let has_member_association = root
            .find_all(&rim, "Association")
            .iter()
            .any(|a| {
                a.attr("associationType")
                    .map(|t| t == HAS_MEMBER || t == "HasMember")
                    .unwrap_or(false)
            });

        let message_id = root
            .find(&NsCandidates::only(WSA_NS), "MessageID")
            .map(|e| e.text().to_owned())
            .filter(|id| !id.is_empty());

        let xop = NsCandidates::only(XOP_NS);
        let document_references = root
            .find_all(&NsCandidates::with_root(XDSB_NS, root), "Document")
            .into_iter()
            .filter_map(|document| document.find(&xop, "Include"))
            .filter_map(|include| include.attr("href"))
            .filter_map(|href| href.trim().strip_prefix("cid:"))
            .map(str::to_owned)
            .collect();

        Self {
            message_id,
            submission_set_id,
            document_ids,
            patient_id,
            document_references,
            has_submit_objects_request: submit.is_some(),
            has_registry_object_list,
            has_member_association,
        }
    }

    /// Checks the summary against `mode`, returning what is missing on failure.
    pub fn validate(&self, mode: ValidationMode) -> Result<(), String> {
        if !self.has_submit_objects_request {
            return Err("no SubmitObjectsRequest".into());
        }
        if !self.has_registry_object_list {
            return Err("SubmitObjectsRequest has no RegistryObjectList".into());
        }
        if mode == ValidationMode::Lenient {
            return Ok(());
        }

        if self.submission_set_id.is_none() {
            return Err("no submission set uniqueId".into());
        }
        if self.document_ids.is_empty() {
            return Err("no document entry uniqueId".into());
        }
        if self.patient_id.is_none() {
            return Err("no patientId".into());
        }
        if !self.has_member_association {
            return Err("no HasMember association".into());
        }
        Ok(())
    }
}

/// Values of identifiers with `scheme` whose registry object is a `container` element.
/// Falls back to any identifier with that scheme when none are nested in a container.
fn scoped_identifiers(
    root: &Element,
    rim: &NsCandidates<'_>,
    container: &str,
    scheme: &str,
) -> Vec<String> {
    let scoped: Vec<String> = root
        .find_all(rim, container)
        .into_iter()
        .flat_map(|c| c.children_named(rim, "ExternalIdentifier"))
        .filter(|e| e.attr("identificationScheme") == Some(scheme))
        .filter_map(|e| e.attr("value"))
        .map(str::to_owned)
        .collect();

    if scoped.is_empty() {
        identifiers(root, rim, scheme)
    } else {
        scoped
    }
}

fn identifiers(root: &Element, rim: &NsCandidates<'_>, scheme: &str) -> Vec<String> {
    root.find_all(rim, "ExternalIdentifier")
        .into_iter()
        .filter(|e| e.attr("identificationScheme") == Some(scheme))
        .filter_map(|e| e.attr("value"))
        .map(str::to_owned)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::tests::sample_config;
    use crate::document::Document;
    use crate::metadata::MetadataBuilder;
    use std::sync::Arc;

    #[test]
    fn test_reads_back_built_metadata() {
        let mut builder = MetadataBuilder::new(Arc::new(sample_config()));
        builder.set_patient_identifier("PAT-9", "1.2.3").unwrap();
        builder.set_document(Document::new("ccd", "PAT-9", &b"<doc/>"[..]));
        let package = builder.build().unwrap();

        let summary = MetadataSummary::from_xml(&package.to_xml_string()).unwrap();

        assert_eq!(summary.submission_set_id, Some(package.submission_set_id));
        assert_eq!(summary.document_ids, vec![package.document_entry_id]);
        assert_eq!(summary.patient_id.as_deref(), Some("PAT-9^^^&1.2.3&ISO"));
        assert!(summary.has_submit_objects_request);
        assert!(summary.has_registry_object_list);
        assert!(summary.has_member_association);
        assert!(summary.validate(ValidationMode::Strict).is_ok());
    }

    #[test]
    fn test_legacy_default_namespace_falls_back_to_root() {
        let xml = format!(
            r#"<SubmitObjectsRequest xmlns="urn:legacy"><RegistryObjectList><ExtrinsicObject id="d"><ExternalIdentifier identificationScheme="{DOCUMENT_ENTRY_UNIQUE_ID}" value="1.2.3.9"/></ExtrinsicObject></RegistryObjectList></SubmitObjectsRequest>"#
        );
        let summary = MetadataSummary::from_xml(&xml).unwrap();

        assert!(summary.has_submit_objects_request);
        assert!(summary.has_registry_object_list);
        assert_eq!(summary.document_ids, vec!["1.2.3.9"]);
        assert!(summary.validate(ValidationMode::Lenient).is_ok());
        assert_eq!(
            summary.validate(ValidationMode::Strict),
            Err("no submission set uniqueId".to_string())
        );
    }

    #[test]
    fn test_lenient_rejects_missing_submit_request() {
        let summary = MetadataSummary::from_xml("<Envelope><Body/></Envelope>").unwrap();
        assert!(summary.validate(ValidationMode::Lenient).is_err());
    }

    #[test]
    fn test_reads_message_id_and_document_references() {
        let xml = format!(
            r#"<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope" xmlns:wsa="{WSA_NS}"><s:Header><wsa:MessageID> urn:uuid:abc </wsa:MessageID></s:Header><s:Body><x:ProvideAndRegisterDocumentSetRequest xmlns:x="{XDSB_NS}"><x:Document id="d"><xop:Include xmlns:xop="{XOP_NS}" href="cid:doc1@test"/></x:Document></x:ProvideAndRegisterDocumentSetRequest></s:Body></s:Envelope>"#
        );
        let summary = MetadataSummary::from_xml(&xml).unwrap();

        assert_eq!(summary.message_id.as_deref(), Some("urn:uuid:abc"));
        assert_eq!(summary.document_references, vec!["doc1@test"]);
        assert!(!summary.has_submit_objects_request);
    }
}
