#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use validate_herds::{DOCUMENT_PATH, SCHEMA_PATH};

/// Test fixture paths
pub struct TestFixtures {
    pub fixtures_dir: PathBuf,
}

impl TestFixtures {
    pub fn new() -> Self {
        let fixtures_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("tests")
            .join("fixtures");

        Self { fixtures_dir }
    }

    pub fn herds_schema(&self) -> PathBuf {
        self.fixtures_dir.join("herds.xsd")
    }

    pub fn valid_herds(&self) -> PathBuf {
        self.fixtures_dir.join("sample_herds.xml")
    }

    pub fn missing_size_herds(&self) -> PathBuf {
        self.fixtures_dir.join("missing_size_herds.xml")
    }

    pub fn bad_status_herds(&self) -> PathBuf {
        self.fixtures_dir.join("bad_status_herds.xml")
    }

    pub fn malformed_herds(&self) -> PathBuf {
        self.fixtures_dir.join("not_well_formed_herds.xml")
    }
}

/// A scratch working directory laid out the way the binary expects:
/// `sample_herds.xml` next to `herds.xsd`.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    /// Stage `document` as `sample_herds.xml` and, if given, `schema` as `herds.xsd`.
    pub fn with(document: &Path, schema: Option<&Path>) -> Self {
        let dir = TempDir::new().unwrap();
        fs::copy(document, dir.path().join(DOCUMENT_PATH)).unwrap();
        if let Some(schema) = schema {
            fs::copy(schema, dir.path().join(SCHEMA_PATH)).unwrap();
        }
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn document(&self) -> PathBuf {
        self.dir.path().join(DOCUMENT_PATH)
    }

    pub fn schema(&self) -> PathBuf {
        self.dir.path().join(SCHEMA_PATH)
    }
}
