//! Error types for mediaitem

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MediaItemError {
    #[error("Failed to parse DIDL-Lite payload: {0}")]
    Xml(#[from] quick_xml::de::DeError),

    #[error("Failed to write DIDL-Lite payload: {0}")]
    XmlWrite(#[from] quick_xml::se::SeError),

    #[error("Invalid duration: {0}")]
    InvalidDuration(String),

    #[error("Invalid protocolInfo '{0}': expected protocol:network:contentFormat:additionalInfo")]
    InvalidProtocolInfo(String),
}

/// Result type for mediaitem
pub type Result<T> = std::result::Result<T, MediaItemError>;
