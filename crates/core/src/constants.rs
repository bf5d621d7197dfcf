//! Wire-contract constants.
//!
//! Registry readers identify records purely by these URNs, never by element position, so
//! every value here must match byte-for-byte.

/// ebRIM 3.0 namespace.
pub const RIM_NS: &str = "urn:oasis:names:tc:ebxml-regrep:xsd:rim:3.0";
/// ebXML life-cycle management namespace (SubmitObjectsRequest).
pub const LCM_NS: &str = "urn:oasis:names:tc:ebxml-regrep:xsd:lcm:3.0";
/// ebXML registry services namespace (RegistryResponse).
pub const RS_NS: &str = "urn:oasis:names:tc:ebxml-regrep:xsd:rs:3.0";
/// IHE XDS.b namespace.
pub const XDSB_NS: &str = "urn:ihe:iti:xds-b:2007";
pub const SOAP12_NS: &str = "http://www.w3.org/2003/05/soap-envelope";
pub const SOAP11_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const WSA_NS: &str = "http://www.w3.org/2005/08/addressing";
pub const XOP_NS: &str = "http://www.w3.org/2004/08/xop/include";

pub const ITI41_ACTION: &str = "urn:ihe:iti:2007:ProvideAndRegisterDocumentSet-b";
pub const ITI41_RESPONSE_ACTION: &str = "urn:ihe:iti:2007:ProvideAndRegisterDocumentSet-bResponse";

// Submission set
pub const SUBMISSION_SET_UNIQUE_ID: &str = "urn:uuid:96fdda7c-d067-4183-912e-bf5ee74998a8";
pub const SUBMISSION_SET_SOURCE_ID: &str = "urn:uuid:554ac39e-e3fe-47fe-b233-965d2a147832";
pub const SUBMISSION_SET_PATIENT_ID: &str = "urn:uuid:6b5aea1a-874d-4603-a4bc-96a0a7b38446";
pub const SUBMISSION_SET_CLASSIFICATION_NODE: &str =
    "urn:uuid:a54d6aa5-d40d-43f9-88c5-b4633d873bdd";
pub const SUBMISSION_SET_AUTHOR: &str = "urn:uuid:a7058bb9-b4e4-4307-ba5b-e3f0ab85e12d";
pub const SUBMISSION_SET_CONTENT_TYPE_CODE: &str =
    "urn:uuid:aa543740-bdda-424e-8c96-df4873be8500";

// Document entry
pub const DOCUMENT_ENTRY_UNIQUE_ID: &str = "urn:uuid:2e82c1f6-a085-4c72-9da3-8640a32e42ab";
pub const DOCUMENT_ENTRY_PATIENT_ID: &str = "urn:uuid:58a6f841-87b3-4a3e-92fd-a8ffeff98427";
pub const DOCUMENT_ENTRY_OBJECT_TYPE: &str = "urn:uuid:7edca82f-054d-47f2-a032-9b2a5b5186c1";
pub const DOCUMENT_ENTRY_AUTHOR: &str = "urn:uuid:93606bcf-9494-43ec-9b4e-a7748d1a838d";

// Classification schemes
pub const CLASS_CODE: &str = "urn:uuid:41a5887f-8865-4c09-adf7-e362475b143a";
pub const TYPE_CODE: &str = "urn:uuid:f0306f51-975f-434e-a61c-c59651d33983";
pub const FORMAT_CODE: &str = "urn:uuid:a09d5840-386c-46f2-b5ad-9c3699a4309d";
pub const CONFIDENTIALITY_CODE: &str = "urn:uuid:f4f85eac-e6cb-4883-b524-f2705394840f";
pub const HEALTHCARE_FACILITY_TYPE_CODE: &str = "urn:uuid:f33fb8ac-18af-42cc-ae0e-ed0b0bdb91e1";
pub const PRACTICE_SETTING_CODE: &str = "urn:uuid:cccf5598-8b07-4b77-a05e-ae952c785ead";

// Registry object types
pub const REGISTRY_PACKAGE_OBJECT_TYPE: &str =
    "urn:oasis:names:tc:ebxml-regrep:ObjectType:RegistryObject:RegistryPackage";
pub const ASSOCIATION_OBJECT_TYPE: &str =
    "urn:oasis:names:tc:ebxml-regrep:ObjectType:RegistryObject:Association";
pub const CLASSIFICATION_OBJECT_TYPE: &str =
    "urn:oasis:names:tc:ebxml-regrep:ObjectType:RegistryObject:Classification";
pub const EXTERNAL_IDENTIFIER_OBJECT_TYPE: &str =
    "urn:oasis:names:tc:ebxml-regrep:ObjectType:RegistryObject:ExternalIdentifier";

pub const HAS_MEMBER: &str = "urn:oasis:names:tc:ebxml-regrep:AssociationType:HasMember";

// Registry status
pub const STATUS_SUCCESS: &str = "urn:oasis:names:tc:ebxml-regrep:ResponseStatusType:Success";
pub const STATUS_FAILURE: &str = "urn:oasis:names:tc:ebxml-regrep:ResponseStatusType:Failure";
pub const STATUS_PARTIAL_SUCCESS: &str = "urn:ihe:iti:2007:ResponseStatusType:PartialSuccess";

// Error severity
pub const SEVERITY_ERROR: &str = "urn:oasis:names:tc:ebxml-regrep:ErrorSeverityType:Error";
pub const SEVERITY_WARNING: &str = "urn:oasis:names:tc:ebxml-regrep:ErrorSeverityType:Warning";

/// Fixed MIME type of every document in this system.
pub const DOCUMENT_MIME_TYPE: &str = "text/xml";

/// `SubmissionSetStatus` slot value on the HasMember association.
pub const SUBMISSION_SET_STATUS_ORIGINAL: &str = "Original";

/// `YYYYMMDDHHMMSS`, UTC.
pub const DTM_FORMAT: &str = "%Y%m%d%H%M%S";

/// Fault reasons. Callers and tests match on the exact wording.
pub const FAULT_INVALID_CONTENT_TYPE: &str = "Invalid Content-Type";
pub const FAULT_MTOM_PARSING: &str = "MTOM Parsing Error";
pub const FAULT_INVALID_METADATA: &str = "Invalid XDSb Metadata";
pub const FAULT_MISSING_ATTACHMENT: &str = "Missing CCD document attachment";
pub const FAULT_INTERNAL: &str = "Internal Server Error";

/// Response content type for both registry responses and faults.
pub const SOAP_CONTENT_TYPE: &str = "application/soap+xml; charset=UTF-8";
