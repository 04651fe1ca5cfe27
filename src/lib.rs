//! # validate-herds Library
//!
//! Checks a herd file (`sample_herds.xml`) against its XML Schema (`herds.xsd`)
//! with libxml2 and reports a one-line verdict.

pub mod cli;
pub mod config;
pub mod error;
pub mod libxml2;
pub mod output;
pub mod validator;

pub use cli::{Cli, VerbosityLevel};
pub use config::{Config, ConfigError, ConfigManager, DOCUMENT_PATH, EnvProvider, SCHEMA_PATH};
pub use error::{LibXml2Error, ValidationError};
pub use libxml2::{LibXml2Wrapper, ValidationResult};
pub use output::Output;
pub use validator::{Validator, Verdict, run};
