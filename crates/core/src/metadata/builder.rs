//! Composition of the ebRIM metadata fragment for one document.
//!
//! The fragment is an `lcm:SubmitObjectsRequest` holding, in order, the document entry
//! (`rim:ExtrinsicObject`), the submission set (`rim:RegistryPackage`), the classification
//! marking the package as a submission set, and the HasMember association between the two.

use crate::config::{Code, IdScheme, RegistryConfig};
use crate::constants::{
    ASSOCIATION_OBJECT_TYPE, CLASSIFICATION_OBJECT_TYPE, DOCUMENT_ENTRY_AUTHOR,
    DOCUMENT_ENTRY_OBJECT_TYPE, DOCUMENT_ENTRY_PATIENT_ID, DOCUMENT_ENTRY_UNIQUE_ID, DTM_FORMAT,
    EXTERNAL_IDENTIFIER_OBJECT_TYPE, HAS_MEMBER, LCM_NS, RIM_NS, SUBMISSION_SET_AUTHOR,
    SUBMISSION_SET_CLASSIFICATION_NODE, SUBMISSION_SET_CONTENT_TYPE_CODE,
    SUBMISSION_SET_PATIENT_ID, SUBMISSION_SET_SOURCE_ID, SUBMISSION_SET_STATUS_ORIGINAL,
    SUBMISSION_SET_UNIQUE_ID,
};
use crate::document::Document;
use crate::xml::{XmlElement, XML_DECLARATION};
use crate::{XdsError, XdsResult};
use chrono::Utc;
use indexmap::IndexMap;
use std::sync::Arc;
use xds_types::Oid;
use xds_uuid::{OidSuffix, UuidService};

/// Slot names derived from the document that callers cannot override.
pub const RESERVED_SLOTS: [&str; 2] = ["hash", "size"];

/// Result of [`MetadataBuilder::build`]. Owned by the caller; never cached.
#[derive(Clone, Debug)]
pub struct SubmissionPackage {
    pub submission_set_id: String,
    pub document_entry_id: String,
    pub metadata: XmlElement,
}

impl SubmissionPackage {
    pub fn to_xml_string(&self) -> String {
        let mut out = String::from(XML_DECLARATION);
        self.metadata.write_to(&mut out);
        out
    }
}

/// Builds registry metadata for a single document.
///
/// Setters take `&mut self`; [`MetadataBuilder::build`] takes `&self` so one configured
/// builder can be shared by many threads, each call producing fresh identifiers.
#[derive(Clone, Debug)]
pub struct MetadataBuilder {
    config: Arc<RegistryConfig>,
    patient_id: Option<String>,
    document: Option<Document>,
    slots: IndexMap<String, Vec<String>>,
}

impl MetadataBuilder {
    pub fn new(config: Arc<RegistryConfig>) -> Self {
        Self {
            config,
            patient_id: None,
            document: None,
            slots: IndexMap::new(),
        }
    }

    /// Sets the patient identifier as `{id}^^^&{oid}&ISO`.
    ///
    /// # Errors
    ///
    /// `XdsError::InvalidOid` when `oid` is not a dot-separated numeric OID.
    pub fn set_patient_identifier(&mut self, id: &str, oid: &str) -> XdsResult<()> {
        let oid = Oid::parse(oid).map_err(|_| XdsError::InvalidOid(oid.to_owned()))?;
        self.patient_id = Some(format!("{id}^^^&{oid}&ISO"));
        Ok(())
    }

    /// Stores the document, deriving hash and size now if the producer did not.
    pub fn set_document(&mut self, mut document: Document) {
        document.ensure_integrity();
        self.document = Some(document);
    }

    /// Adds a free-form slot to the document entry. A repeated name replaces the earlier
    /// values but keeps its original position.
    pub fn add_slot(&mut self, name: impl Into<String>, values: Vec<String>) {
        let name = name.into();
        if RESERVED_SLOTS.contains(&name.as_str()) {
            tracing::warn!(slot = %name, "ignoring custom slot that would override document integrity");
            return;
        }
        self.slots.insert(name, values);
    }

    pub fn patient_identifier(&self) -> Option<&str> {
        self.patient_id.as_deref()
    }

    pub fn document(&self) -> Option<&Document> {
        self.document.as_ref()
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Composes the metadata tree with freshly generated identifiers.
    ///
    /// When no patient identifier was set the document's own patient id is used verbatim.
    ///
    /// # Errors
    ///
    /// - `XdsError::DocumentNotSet` if [`MetadataBuilder::set_document`] was never called.
    /// - `XdsError::InvalidConfig` if the hierarchical scheme has no root OID.
    pub fn build(&self) -> XdsResult<SubmissionPackage> {
        let document = self.document.as_ref().ok_or(XdsError::DocumentNotSet)?;
        let submission_set_id = self.generate_id()?;
        let document_entry_id = self.generate_id()?;
        let patient_id = self
            .patient_id
            .clone()
            .unwrap_or_else(|| document.patient_id().to_owned());

        let metadata = XmlElement::new("lcm:SubmitObjectsRequest")
            .attr("xmlns:lcm", LCM_NS)
            .attr("xmlns:rim", RIM_NS)
            .child(
                XmlElement::new("rim:RegistryObjectList")
                    .child(self.document_entry(document, &document_entry_id, &patient_id))
                    .child(self.submission_set(&submission_set_id, &patient_id))
                    .child(
                        XmlElement::new("rim:Classification")
                            .attr("id", symbolic_id())
                            .attr("objectType", CLASSIFICATION_OBJECT_TYPE)
                            .attr("classifiedObject", &submission_set_id)
                            .attr("classificationNode", SUBMISSION_SET_CLASSIFICATION_NODE),
                    )
                    .child(
                        XmlElement::new("rim:Association")
                            .attr("id", symbolic_id())
                            .attr("objectType", ASSOCIATION_OBJECT_TYPE)
                            .attr("associationType", HAS_MEMBER)
                            .attr("sourceObject", &submission_set_id)
                            .attr("targetObject", &document_entry_id)
                            .child(slot(
                                "SubmissionSetStatus",
                                [SUBMISSION_SET_STATUS_ORIGINAL],
                            )),
                    ),
            );

        tracing::debug!(
            submission_set_id = %submission_set_id,
            document_entry_id = %document_entry_id,
            "built submission metadata"
        );

        Ok(SubmissionPackage {
            submission_set_id,
            document_entry_id,
            metadata,
        })
    }

    /// [`MetadataBuilder::build`] serialised with an XML declaration.
    pub fn build_xml_string(&self) -> XdsResult<String> {
        Ok(self.build()?.to_xml_string())
    }

    fn generate_id(&self) -> XdsResult<String> {
        match self.config.id_scheme {
            IdScheme::RandomUnique => Ok(UuidService::new().to_string()),
            IdScheme::Hierarchical => {
                let root = self.config.root_oid.as_ref().ok_or_else(|| {
                    XdsError::InvalidConfig(
                        "root_oid is required when id_scheme is hierarchical".into(),
                    )
                })?;
                Ok(OidSuffix::next_under(root))
            }
        }
    }

    fn document_entry(&self, document: &Document, entry_id: &str, patient_id: &str) -> XmlElement {
        let mut slots: IndexMap<String, Vec<String>> = IndexMap::new();
        slots.insert(
            "creationTime".into(),
            vec![document.created_at().format(DTM_FORMAT).to_string()],
        );
        slots.insert(
            "hash".into(),
            vec![document
                .hash()
                .map(|h| h.as_str().to_owned())
                .unwrap_or_default()],
        );
        slots.insert(
            "size".into(),
            vec![document.size().unwrap_or_default().to_string()],
        );
        slots.insert("sourcePatientId".into(), vec![patient_id.to_owned()]);
        for (name, values) in &self.slots {
            slots.insert(name.clone(), values.clone());
        }

        let mut entry = XmlElement::new("rim:ExtrinsicObject")
            .attr("id", entry_id)
            .attr("mimeType", document.mime_type())
            .attr("objectType", DOCUMENT_ENTRY_OBJECT_TYPE)
            .children(slots.iter().map(|(name, values)| slot(name, values)))
            .child(localized_name(document.id()));

        if let Some(author) = self.author_classification(DOCUMENT_ENTRY_AUTHOR, entry_id) {
            entry.push(author);
        }
        for (scheme, code) in self.config.codes.entries() {
            entry.push(classification(scheme, entry_id, code));
        }

        entry
            .child(external_identifier(
                DOCUMENT_ENTRY_PATIENT_ID,
                entry_id,
                patient_id,
                "XDSDocumentEntry.patientId",
            ))
            .child(external_identifier(
                DOCUMENT_ENTRY_UNIQUE_ID,
                entry_id,
                entry_id,
                "XDSDocumentEntry.uniqueId",
            ))
    }

    fn submission_set(&self, set_id: &str, patient_id: &str) -> XmlElement {
        let mut package = XmlElement::new("rim:RegistryPackage")
            .attr("id", set_id)
            .child(slot(
                "submissionTime",
                [Utc::now().format(DTM_FORMAT).to_string()],
            ));

        if let Some(author) = self.author_classification(SUBMISSION_SET_AUTHOR, set_id) {
            package.push(author);
        }

        package
            .child(classification(
                SUBMISSION_SET_CONTENT_TYPE_CODE,
                set_id,
                &self.config.codes.class,
            ))
            .child(external_identifier(
                SUBMISSION_SET_UNIQUE_ID,
                set_id,
                set_id,
                "XDSSubmissionSet.uniqueId",
            ))
            .child(external_identifier(
                SUBMISSION_SET_SOURCE_ID,
                set_id,
                &self.config.source_id,
                "XDSSubmissionSet.sourceId",
            ))
            .child(external_identifier(
                SUBMISSION_SET_PATIENT_ID,
                set_id,
                patient_id,
                "XDSSubmissionSet.patientId",
            ))
    }

    fn author_classification(&self, scheme: &str, classified: &str) -> Option<XmlElement> {
        let author = self.config.author.as_ref().filter(|a| !a.is_empty())?;
        let mut element = XmlElement::new("rim:Classification")
            .attr("id", symbolic_id())
            .attr("objectType", CLASSIFICATION_OBJECT_TYPE)
            .attr("classificationScheme", scheme)
            .attr("classifiedObject", classified)
            .attr("nodeRepresentation", "");
        if let Some(person) = author.person() {
            element.push(slot("authorPerson", [person]));
        }
        if let Some(institution) = author.institution() {
            element.push(slot("authorInstitution", [institution]));
        }
        Some(element)
    }
}

fn symbolic_id() -> String {
    UuidService::new().to_string()
}

fn slot<I, S>(name: &str, values: I) -> XmlElement
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    XmlElement::new("rim:Slot").attr("name", name).child(
        XmlElement::new("rim:ValueList").children(
            values
                .into_iter()
                .map(|v| XmlElement::new("rim:Value").text(v.as_ref())),
        ),
    )
}

fn localized_name(value: &str) -> XmlElement {
    XmlElement::new("rim:Name").child(XmlElement::new("rim:LocalizedString").attr("value", value))
}

/// One coded classification of `classified`.
///
/// `classificationScheme` carries the kind URN (class, type, format and so on), which is how
/// registries recognise the facet. The code's own coding system goes in the `codingScheme`
/// slot and its display name in `Name`.
fn classification(scheme: &str, classified: &str, code: &Code) -> XmlElement {
    XmlElement::new("rim:Classification")
        .attr("id", symbolic_id())
        .attr("objectType", CLASSIFICATION_OBJECT_TYPE)
        .attr("classificationScheme", scheme)
        .attr("classifiedObject", classified)
        .attr("nodeRepresentation", &code.code)
        .child(slot("codingScheme", [&code.coding_system]))
        .child(localized_name(&code.display_name))
}

fn external_identifier(scheme: &str, registry_object: &str, value: &str, name: &str) -> XmlElement {
    XmlElement::new("rim:ExternalIdentifier")
        .attr("id", symbolic_id())
        .attr("objectType", EXTERNAL_IDENTIFIER_OBJECT_TYPE)
        .attr("identificationScheme", scheme)
        .attr("registryObject", registry_object)
        .attr("value", value)
        .child(localized_name(name))
}
