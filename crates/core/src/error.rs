use xds_mtom::MtomError;

#[derive(Debug, thiserror::Error)]
pub enum XdsError {
    #[error("invalid OID: {0}")]
    InvalidOid(String),
    #[error("document not set before build")]
    DocumentNotSet,
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("failed to parse registry response: {0}")]
    ResponseParse(String),
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("MTOM error: {0}")]
    Mtom(#[from] MtomError),
    #[error("failed to deserialize YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("failed to serialize transaction record: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type XdsResult<T> = std::result::Result<T, XdsError>;
