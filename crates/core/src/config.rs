//! Runtime configuration.
//!
//! Both configurations here are resolved once at process startup and then passed into the
//! builder, handler and router. Nothing in request handling reads environment variables or
//! configuration files.

use crate::constants::{
    CLASS_CODE, CONFIDENTIALITY_CODE, FORMAT_CODE, HEALTHCARE_FACILITY_TYPE_CODE,
    PRACTICE_SETTING_CODE, TYPE_CODE,
};
use crate::{XdsError, XdsResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use xds_types::Oid;

/// How submission-set and document-entry identifiers are generated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdScheme {
    /// `urn:uuid:{v4}`
    #[default]
    RandomUnique,
    /// `{root_oid}.{suffix}`
    Hierarchical,
}

/// A coded value: (code, display name, coding system).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Code {
    pub code: String,
    pub display_name: String,
    pub coding_system: String,
}

impl Code {
    pub fn new(
        code: impl Into<String>,
        display_name: impl Into<String>,
        coding_system: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            display_name: display_name.into(),
            coding_system: coding_system.into(),
        }
    }
}

/// The six classification code sets emitted on every document entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationCodes {
    pub class: Code,
    #[serde(rename = "type")]
    pub type_code: Code,
    pub format: Code,
    pub confidentiality: Code,
    pub healthcare_facility_type: Code,
    pub practice_setting: Code,
}

impl ClassificationCodes {
    /// `(classification scheme URN, code)` pairs in emission order.
    pub fn entries(&self) -> [(&'static str, &Code); 6] {
        [
            (CLASS_CODE, &self.class),
            (TYPE_CODE, &self.type_code),
            (FORMAT_CODE, &self.format),
            (CONFIDENTIALITY_CODE, &self.confidentiality),
            (HEALTHCARE_FACILITY_TYPE_CODE, &self.healthcare_facility_type),
            (PRACTICE_SETTING_CODE, &self.practice_setting),
        ]
    }
}

/// Author of the submission. Every part is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorDescriptor {
    #[serde(default)]
    pub given: Option<String>,
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub institution: Option<String>,
}

impl AuthorDescriptor {
    /// XCN-formatted person (`^family^given^^^prefix`), or `None` when no name part is set.
    pub fn person(&self) -> Option<String> {
        if self.given.is_none() && self.family.is_none() && self.prefix.is_none() {
            return None;
        }
        Some(format!(
            "^{}^{}^^^{}",
            self.family.as_deref().unwrap_or_default(),
            self.given.as_deref().unwrap_or_default(),
            self.prefix.as_deref().unwrap_or_default()
        ))
    }

    pub fn institution(&self) -> Option<&str> {
        self.institution.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.person().is_none() && self.institution.is_none()
    }
}

/// Registry-side configuration for building submissions. Read-only once constructed;
/// share it across threads behind an `Arc`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub id_scheme: IdScheme,
    #[serde(default)]
    pub root_oid: Option<Oid>,
    pub source_id: String,
    /// Endpoint placed in `wsa:To`, when set.
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub author: Option<AuthorDescriptor>,
    pub codes: ClassificationCodes,
}

impl RegistryConfig {
    /// Parses and validates a YAML configuration.
    ///
    /// # Errors
    ///
    /// Returns `XdsError::InvalidConfig` naming the failing field path when the YAML does not
    /// match the schema, or when [`RegistryConfig::validate`] fails.
    pub fn from_yaml_str(yaml_text: &str) -> XdsResult<Self> {
        let deserializer = serde_yaml::Deserializer::from_str(yaml_text);

        let config = match serde_path_to_error::deserialize::<_, RegistryConfig>(deserializer) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() || path == "." {
                    "<root>"
                } else {
                    path.as_str()
                };
                return Err(XdsError::InvalidConfig(format!(
                    "Registry config schema mismatch at {path}: {source}"
                )));
            }
        };

        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: &Path) -> XdsResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// Checks cross-field rules serde cannot express.
    ///
    /// - the hierarchical scheme requires `root_oid`
    /// - `source_id` must not be blank
    /// - every classification code needs a code and a coding system
    pub fn validate(&self) -> XdsResult<()> {
        if self.id_scheme == IdScheme::Hierarchical && self.root_oid.is_none() {
            return Err(XdsError::InvalidConfig(
                "root_oid is required when id_scheme is hierarchical".into(),
            ));
        }
        if self.source_id.trim().is_empty() {
            return Err(XdsError::InvalidConfig("source_id cannot be empty".into()));
        }
        for (scheme, code) in self.codes.entries() {
            if code.code.trim().is_empty() || code.coding_system.trim().is_empty() {
                return Err(XdsError::InvalidConfig(format!(
                    "classification {scheme} needs both code and coding_system"
                )));
            }
        }
        Ok(())
    }
}

/// Policy for what the mock registry accepts as valid metadata.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationMode {
    /// Requires a SubmitObjectsRequest holding a RegistryObjectList.
    #[default]
    Lenient,
    /// Additionally requires submission-set and document unique ids, a patient id and a
    /// HasMember association.
    Strict,
}

impl FromStr for ValidationMode {
    type Err = XdsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(Self::Lenient),
            "strict" => Ok(Self::Strict),
            other => Err(XdsError::InvalidConfig(format!(
                "unknown validation mode '{other}' (expected lenient or strict)"
            ))),
        }
    }
}

pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";

/// Mock registry server configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MockServerConfig {
    rest_addr: String,
    validation_mode: ValidationMode,
    transaction_log_dir: Option<PathBuf>,
    document_store_dir: Option<PathBuf>,
}

impl Default for MockServerConfig {
    fn default() -> Self {
        Self {
            rest_addr: DEFAULT_REST_ADDR.into(),
            validation_mode: ValidationMode::default(),
            transaction_log_dir: None,
            document_store_dir: None,
        }
    }
}

impl MockServerConfig {
    pub fn new(
        rest_addr: String,
        validation_mode: ValidationMode,
        transaction_log_dir: Option<PathBuf>,
        document_store_dir: Option<PathBuf>,
    ) -> XdsResult<Self> {
        if rest_addr.trim().is_empty() {
            return Err(XdsError::InvalidConfig("rest_addr cannot be empty".into()));
        }
        Ok(Self {
            rest_addr,
            validation_mode,
            transaction_log_dir,
            document_store_dir,
        })
    }

    /// Resolves the configuration from `XDS_*` environment variables.
    ///
    /// Call once at startup.
    pub fn from_env() -> XdsResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves the configuration through `lookup`, which maps a variable name to its value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> XdsResult<Self> {
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let rest_addr = non_blank("XDS_REST_ADDR").unwrap_or_else(|| DEFAULT_REST_ADDR.into());
        let validation_mode = match non_blank("XDS_VALIDATION_MODE") {
            Some(mode) => mode.parse()?,
            None => ValidationMode::default(),
        };

        Self::new(
            rest_addr,
            validation_mode,
            non_blank("XDS_TRANSACTION_LOG_DIR").map(PathBuf::from),
            non_blank("XDS_DOCUMENT_STORE_DIR").map(PathBuf::from),
        )
    }

    pub fn rest_addr(&self) -> &str {
        &self.rest_addr
    }

    pub fn validation_mode(&self) -> ValidationMode {
        self.validation_mode
    }

    pub fn transaction_log_dir(&self) -> Option<&Path> {
        self.transaction_log_dir.as_deref()
    }

    pub fn document_store_dir(&self) -> Option<&Path> {
        self.document_store_dir.as_deref()
    }
}
