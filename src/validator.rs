//! Schema Validation
//!
//! Checks one XML document against one XSD schema in a single linear pass:
//! parse schema, parse document, validate, report.
//!
//! Failures to read or parse either file are fatal and come back as
//! [`ValidationError`]. A well-formed document that breaks the schema is an
//! ordinary outcome, returned as [`Verdict::Invalid`].

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::error::{LibXml2Error, Result, ValidationError};
use crate::libxml2::{LibXml2Wrapper, ValidationResult};
use crate::output::Output;

/// Conformance of a document to its schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// The document conforms to the schema
    Valid,
    /// The document is well-formed but violates the schema
    Invalid {
        error_count: i32,
        errors: Vec<String>,
    },
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid)
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Verdict::Invalid { .. })
    }
}

/// Validates documents against XML Schemas through libxml2
pub struct Validator {
    libxml2: LibXml2Wrapper,
}

impl Validator {
    pub fn new() -> Self {
        Self {
            libxml2: LibXml2Wrapper::new(),
        }
    }

    /// Check `document_path` against the schema at `schema_path`.
    ///
    /// The schema is loaded first, so a missing schema fails before the document
    /// is opened.
    ///
    /// # Errors
    ///
    /// - `ValidationError::Unreadable` if either file cannot be opened.
    /// - `ValidationError::SchemaParse` if the schema is not well-formed or not a
    ///   legal XML Schema.
    /// - `ValidationError::DocumentParse` if the document is not well-formed.
    /// - `ValidationError::LibXml2Internal` if libxml2 fails internally.
    pub fn validate(&self, document_path: &Path, schema_path: &Path) -> Result<Verdict> {
        ensure_readable(schema_path)?;
        debug!(schema = %schema_path.display(), "parsing schema");
        let schema = self
            .libxml2
            .parse_schema_file(schema_path)
            .map_err(|err| parse_error(err, schema_path))?;

        ensure_readable(document_path)?;
        debug!(document = %document_path.display(), "parsing document");
        let mut document = self
            .libxml2
            .parse_document_file(document_path)
            .map_err(|err| parse_error(err, document_path))?;

        debug!(document = %document_path.display(), "validating");
        let result = self
            .libxml2
            .validate_document(&schema, &mut document, document_path)?;

        Ok(match result {
            ValidationResult::Valid => Verdict::Valid,
            ValidationResult::Invalid {
                error_count,
                errors,
            } => {
                for message in &errors {
                    debug!(document = %document_path.display(), "schema violation: {}", message);
                }
                Verdict::Invalid {
                    error_count,
                    errors,
                }
            }
        })
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

fn ensure_readable(path: &Path) -> Result<()> {
    let unreadable = |source| ValidationError::Unreadable {
        file: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(unreadable)?;
    if file.metadata().map_err(unreadable)?.is_dir() {
        return Err(unreadable(io::Error::from(io::ErrorKind::IsADirectory)));
    }
    Ok(())
}

fn parse_error(err: LibXml2Error, path: &Path) -> ValidationError {
    match err {
        LibXml2Error::SchemaParseFailed { details } => ValidationError::SchemaParse {
            file: path.to_path_buf(),
            details,
        },
        LibXml2Error::DocumentParseFailed { details } => ValidationError::DocumentParse {
            file: path.to_path_buf(),
            details,
        },
        other => other.into(),
    }
}

/// Validate the configured document and write the verdict line to `out`.
///
/// Nothing is written when validation cannot run.
pub fn run<W: Write>(config: &Config, out: &mut W) -> Result<Verdict> {
    let verdict = Validator::new().validate(&config.document, &config.schema)?;
    Output::new().write_verdict(out, &config.document, &verdict)?;
    Ok(verdict)
}
