//! # XDS Core
//!
//! Document transport and metadata for an XDS.b "provide and register document set" test
//! harness:
//! - [`MetadataBuilder`] composes the ebRIM registry metadata for one document
//! - [`OutboundRequest`] wraps it in an ITI-41 SOAP envelope and MTOM-encodes it
//! - [`RegistryRequestHandler`] is the mock registry's decode → validate → respond pipeline
//! - [`RegistryResponseParser`] turns a registry acknowledgment into a typed result
//!
//! **No transport concerns**: HTTP serving lives in `api-rest`; this crate only consumes and
//! produces bytes plus content-type strings.

pub mod config;
pub mod constants;
pub mod document;
pub mod envelope;
pub mod error;
pub mod handler;
pub mod metadata;
pub mod response;
pub mod transaction_log;
pub mod xml;

pub use config::{
    AuthorDescriptor, ClassificationCodes, Code, IdScheme, MockServerConfig, RegistryConfig,
    ValidationMode,
};
pub use document::Document;
pub use envelope::{OutboundRequest, ProvideAndRegisterRequest};
pub use error::{XdsError, XdsResult};
pub use handler::{HandlerOutcome, RegistryRequestHandler};
pub use metadata::{MetadataBuilder, MetadataSummary, SubmissionPackage};
pub use response::{
    encode_registry_response, encode_soap_fault, FaultCode, RegistryIssue, RegistryResponse,
    RegistryResponseParser, ResponseStatus, Severity,
};
pub use transaction_log::{
    FileTransactionLog, MemoryTransactionLog, TracingTransactionLog, TransactionLog,
    TransactionRecord,
};

pub use xds_mtom as mtom;
