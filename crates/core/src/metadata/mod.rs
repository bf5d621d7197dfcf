//! Registry metadata: building it for outbound submissions and reading it back.

mod builder;
mod extract;

pub use builder::{MetadataBuilder, SubmissionPackage, RESERVED_SLOTS};
pub use extract::MetadataSummary;
