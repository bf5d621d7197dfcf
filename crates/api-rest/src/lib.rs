//! # API REST
//!
//! HTTP surface of the XDS.b mock registry.
//!
//! Handles:
//! - `POST /xds/iti41`: ProvideAndRegisterDocumentSet-b requests
//! - `GET /health`
//! - OpenAPI/Swagger documentation and CORS
//!
//! Request semantics live in `xds-core`; this crate only moves bytes and headers, and runs
//! transaction logging and document persistence off the response path.

#![warn(rust_2018_idioms)]

mod routes;
mod state;

pub use routes::{router, ApiDoc, HealthRes, MAX_REQUEST_BYTES};
pub use state::{AppState, BackgroundTransactionLog};
