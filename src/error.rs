use std::path::PathBuf;

use thiserror::Error;

/// Main application error type that encompasses all fatal failure modes.
///
/// A document that parses but does not conform to its schema is not an error;
/// it is reported through [`crate::validator::Verdict::Invalid`].
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot read {file}: {source}")]
    Unreadable {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Document parsing error: {file} - {details}")]
    DocumentParse { file: PathBuf, details: String },

    #[error("Schema parsing error: {file} - {details}")]
    SchemaParse { file: PathBuf, details: String },

    #[error("LibXML2 internal error: {details}")]
    LibXml2Internal { details: String },
}

impl ValidationError {
    /// True when the document or the schema could not be read or parsed.
    ///
    /// `Io` is not included: it only comes from writing the verdict.
    pub fn is_parse_error(&self) -> bool {
        matches!(
            self,
            ValidationError::Unreadable { .. }
                | ValidationError::DocumentParse { .. }
                | ValidationError::SchemaParse { .. }
        )
    }
}

/// LibXML2-specific error types
#[derive(Error, Debug)]
pub enum LibXml2Error {
    #[error("Schema parsing failed: {details}")]
    SchemaParseFailed { details: String },

    #[error("Document parsing failed: {details}")]
    DocumentParseFailed { details: String },

    #[error("Validation context creation failed")]
    ValidationContextCreationFailed,

    #[error("Validation failed with code {code}: {file}")]
    ValidationFailed { code: i32, file: PathBuf },

    #[error("Path cannot be passed to libxml2: {path}")]
    InvalidPath { path: PathBuf },
}

impl From<LibXml2Error> for ValidationError {
    fn from(err: LibXml2Error) -> Self {
        ValidationError::LibXml2Internal {
            details: err.to_string(),
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, ValidationError>;

/// LibXML2 result type alias
pub type LibXml2Result<T> = std::result::Result<T, LibXml2Error>;
