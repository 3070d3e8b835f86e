//! Error types for OOXML processing

use thiserror::Error;

/// Errors that can occur during OOXML processing
#[derive(Error, Debug)]
pub enum DocxError {
    /// Error reading or writing the package zip
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// XML parsing error
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// XML attribute error
    #[error("XML attribute error: {0}")]
    XmlAttr(#[from] quick_xml::events::attributes::AttrError),

    /// Required part not found in the package
    #[error("Required part not found: {0}")]
    MissingPart(String),

    /// Invalid document structure
    #[error("Invalid document structure: {0}")]
    InvalidStructure(String),

    /// Image processing error
    #[error("Image error: {0}")]
    Image(String),

    /// Template syntax or load error
    #[error("Template error: {0}")]
    Template(String),

    /// Template not present in the engine cache
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    /// UTF-8 decoding error
    #[error("UTF-8 error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Result type alias for OOXML operations
pub type Result<T> = std::result::Result<T, DocxError>;
