//! LibXML2 FFI Wrapper Module
//!
//! This module provides a safe wrapper around the handful of libxml2 calls needed to
//! check one document against one XML Schema.
//!
//! There is no mature pure Rust XSD validator, so schema validation goes through
//! libxml2 directly. Every libxml2 object is owned by a small RAII wrapper
//! ([`XmlSchemaPtr`], [`XmlDocPtr`]) that frees it on drop, and every raw pointer
//! returned by libxml2 is null-checked before it is wrapped.
//!
//! Both inputs are read with `xmlReadFile` and the schema is compiled from its
//! parsed tree, so syntax errors in either file are captured the same way. While
//! libxml2 is parsing, a structured error handler collects its diagnostics into a
//! buffer; the library never writes to stderr on its own.

use std::ffi::{CStr, CString};
use std::marker::PhantomData;
use std::path::Path;
use std::sync::Once;

use libc::{c_char, c_int, c_void};

use crate::error::{LibXml2Error, LibXml2Result};

/// Global initialization flag for libxml2
///
/// libxml2's initialization functions are not thread-safe, so they run exactly once.
static LIBXML2_INIT: Once = Once::new();

/// Forbid network access while parsing.
const XML_PARSE_NONET: c_int = 1 << 11;
/// Suppress error reports on stderr.
const XML_PARSE_NOERROR: c_int = 1 << 5;
/// Suppress warning reports on stderr.
const XML_PARSE_NOWARNING: c_int = 1 << 6;

const DOCUMENT_PARSE_OPTIONS: c_int = XML_PARSE_NONET | XML_PARSE_NOERROR | XML_PARSE_NOWARNING;

// Opaque libxml2 structures
#[repr(C)]
pub struct XmlSchema {
    _private: [u8; 0],
}

#[repr(C)]
pub struct XmlSchemaParserCtxt {
    _private: [u8; 0],
}

#[repr(C)]
pub struct XmlSchemaValidCtxt {
    _private: [u8; 0],
}

#[repr(C)]
pub struct XmlDoc {
    _private: [u8; 0],
}

#[repr(C)]
pub struct xmlError {
    pub domain: c_int,
    pub code: c_int,
    pub message: *const c_char,
    pub level: c_int,
    pub file: *const c_char,
    pub line: c_int,
    pub str1: *const c_char,
    pub str2: *const c_char,
    pub str3: *const c_char,
    pub int1: c_int,
    pub int2: c_int,
    pub ctxt: *mut c_void,
    pub node: *mut c_void,
}

pub type XmlStructuredErrorFunc =
    Option<unsafe extern "C" fn(user_data: *mut c_void, error: *mut xmlError)>;

// External libxml2 FFI declarations
#[cfg_attr(target_os = "windows", link(name = "libxml2"))]
#[cfg_attr(not(target_os = "windows"), link(name = "xml2"))]
unsafe extern "C" {
    pub fn xmlInitParser();

    // Error state
    pub fn xmlGetLastError() -> *const xmlError;
    pub fn xmlResetLastError();
    pub fn xmlSetStructuredErrorFunc(ctx: *mut c_void, handler: XmlStructuredErrorFunc);

    // Document parsing functions
    pub fn xmlReadFile(url: *const c_char, encoding: *const c_char, options: c_int) -> *mut XmlDoc;
    pub fn xmlFreeDoc(doc: *mut XmlDoc);

    // Schema parsing functions
    pub fn xmlSchemaNewDocParserCtxt(doc: *mut XmlDoc) -> *mut XmlSchemaParserCtxt;
    pub fn xmlSchemaSetParserStructuredErrors(
        ctxt: *mut XmlSchemaParserCtxt,
        serror: XmlStructuredErrorFunc,
        ctx: *mut c_void,
    );
    pub fn xmlSchemaParse(ctxt: *const XmlSchemaParserCtxt) -> *mut XmlSchema;
    pub fn xmlSchemaFreeParserCtxt(ctxt: *mut XmlSchemaParserCtxt);
    pub fn xmlSchemaFree(schema: *mut XmlSchema);

    // Schema validation functions
    pub fn xmlSchemaNewValidCtxt(schema: *const XmlSchema) -> *mut XmlSchemaValidCtxt;
    pub fn xmlSchemaFreeValidCtxt(ctxt: *mut XmlSchemaValidCtxt);
    pub fn xmlSchemaSetValidStructuredErrors(
        ctxt: *mut XmlSchemaValidCtxt,
        serror: XmlStructuredErrorFunc,
        ctx: *mut c_void,
    );
    pub fn xmlSchemaValidateDoc(ctxt: *mut XmlSchemaValidCtxt, doc: *mut XmlDoc) -> c_int;
}

/// Read the message of a libxml2 error, if it has one.
///
/// # Safety
///
/// `error` must be null or point to a live `xmlError`.
unsafe fn error_message(error: *const xmlError) -> Option<String> {
    if error.is_null() {
        return None;
    }
    let msg_ptr = unsafe { (*error).message };
    if msg_ptr.is_null() {
        return None;
    }
    let c_str = unsafe { CStr::from_ptr(msg_ptr) };
    Some(c_str.to_string_lossy().trim().to_string())
}

/// Callback for libxml2 to report schema and validation errors (structured)
unsafe extern "C" fn structured_error_callback(user_data: *mut c_void, error: *mut xmlError) {
    let errors = unsafe { &mut *(user_data as *mut Vec<String>) };

    if let Some(message) = unsafe { error_message(error) } {
        errors.push(message);
    }
}

fn path_to_cstring(path: &Path) -> LibXml2Result<CString> {
    path.to_str()
        .and_then(|s| CString::new(s).ok())
        .ok_or_else(|| LibXml2Error::InvalidPath {
            path: path.to_path_buf(),
        })
}

/// Collects every error libxml2 raises on this thread while alive.
///
/// libxml2 keeps the handler per thread, so captures on different threads do
/// not interfere.
struct ErrorCapture {
    // Boxed so the address handed to libxml2 survives moves of the guard
    #[allow(clippy::box_collection)]
    errors: Box<Vec<String>>,
}

impl ErrorCapture {
    fn install() -> Self {
        let mut errors = Box::new(Vec::new());
        unsafe {
            xmlSetStructuredErrorFunc(
                &mut *errors as *mut Vec<String> as *mut c_void,
                Some(structured_error_callback),
            );
        }
        ErrorCapture { errors }
    }

    fn into_messages(mut self) -> Vec<String> {
        std::mem::take(&mut *self.errors)
    }
}

impl Drop for ErrorCapture {
    fn drop(&mut self) {
        unsafe {
            xmlSetStructuredErrorFunc(std::ptr::null_mut(), None);
        }
    }
}

/// Read a file into a libxml2 tree without network access.
///
/// `not_well_formed` builds the error from libxml2's diagnostics.
fn read_xml_file(
    path: &Path,
    not_well_formed: impl FnOnce(String) -> LibXml2Error,
) -> LibXml2Result<XmlDocPtr> {
    let c_path = path_to_cstring(path)?;
    let capture = ErrorCapture::install();

    unsafe {
        xmlResetLastError();
        let doc_ptr = xmlReadFile(c_path.as_ptr(), std::ptr::null(), DOCUMENT_PARSE_OPTIONS);
        if let Some(doc) = XmlDocPtr::from_raw(doc_ptr) {
            return Ok(doc);
        }

        let mut messages = capture.into_messages();
        if messages.is_empty() {
            messages.extend(error_message(xmlGetLastError()));
        }
        xmlResetLastError();
        Err(not_well_formed(join_or(messages, "not well-formed XML")))
    }
}

/// Owned libxml2 schema, freed on drop
///
/// The schema keeps the tree it was compiled from; the tree is freed after the
/// schema.
#[derive(Debug)]
pub struct XmlSchemaPtr {
    ptr: *mut XmlSchema,
    _source: XmlDocPtr,
    _phantom: PhantomData<XmlSchema>,
}

impl XmlSchemaPtr {
    /// # Safety
    ///
    /// The pointer must come from `xmlSchemaParse` on a context built from
    /// `source`, and must not be freed elsewhere.
    unsafe fn from_raw(ptr: *mut XmlSchema, source: XmlDocPtr) -> Option<Self> {
        if ptr.is_null() {
            return None;
        }
        Some(XmlSchemaPtr {
            ptr,
            _source: source,
            _phantom: PhantomData,
        })
    }

    pub(crate) fn as_ptr(&self) -> *const XmlSchema {
        self.ptr
    }
}

impl Drop for XmlSchemaPtr {
    fn drop(&mut self) {
        unsafe {
            xmlSchemaFree(self.ptr);
        }
    }
}

/// Owned libxml2 document tree, freed on drop
#[derive(Debug)]
pub struct XmlDocPtr {
    ptr: *mut XmlDoc,
    _phantom: PhantomData<XmlDoc>,
}

impl XmlDocPtr {
    /// # Safety
    ///
    /// The pointer must come from a libxml2 document parser and must not be freed elsewhere.
    unsafe fn from_raw(ptr: *mut XmlDoc) -> Option<Self> {
        if ptr.is_null() {
            return None;
        }
        Some(XmlDocPtr {
            ptr,
            _phantom: PhantomData,
        })
    }

    pub(crate) fn as_mut_ptr(&mut self) -> *mut XmlDoc {
        self.ptr
    }
}

impl Drop for XmlDocPtr {
    fn drop(&mut self) {
        unsafe {
            xmlFreeDoc(self.ptr);
        }
    }
}

/// Outcome of checking a parsed document against a parsed schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    /// Validation succeeded (return code 0)
    Valid,
    /// Validation failed with errors (return code > 0)
    Invalid {
        error_count: i32,
        errors: Vec<String>,
    },
}

impl ValidationResult {
    /// Create ValidationResult from libxml2 return code and captured errors.
    ///
    /// A negative code is an internal libxml2 failure and has no result.
    pub fn from_code(code: c_int, errors: Vec<String>) -> Option<Self> {
        match code {
            0 => Some(ValidationResult::Valid),
            n if n > 0 => Some(ValidationResult::Invalid {
                error_count: n,
                errors,
            }),
            _ => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid)
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, ValidationResult::Invalid { .. })
    }
}

/// Safe access to the libxml2 parse and validate calls
///
/// Creating a wrapper initializes libxml2 on first use; any number of wrappers
/// can coexist.
pub struct LibXml2Wrapper {
    _phantom: PhantomData<()>,
}

impl LibXml2Wrapper {
    pub fn new() -> Self {
        LIBXML2_INIT.call_once(|| unsafe {
            xmlInitParser();
        });

        LibXml2Wrapper {
            _phantom: PhantomData,
        }
    }

    /// Parse an XML Schema from a file.
    ///
    /// The file is read into a tree first and the schema is compiled from that
    /// tree. Relative `xs:include` and `xs:import` locations still resolve against
    /// the schema's own directory.
    ///
    /// # Errors
    ///
    /// Returns `LibXml2Error::SchemaParseFailed` when the file is missing, is not
    /// well-formed XML, or is not a legal XML Schema. The captured libxml2 messages
    /// are joined into `details`.
    pub fn parse_schema_file(&self, schema_path: &Path) -> LibXml2Result<XmlSchemaPtr> {
        let source = read_xml_file(schema_path, |details| LibXml2Error::SchemaParseFailed {
            details,
        })?;
        let mut errors: Vec<String> = Vec::new();
        let capture = ErrorCapture::install();

        unsafe {
            let parser_ctxt = xmlSchemaNewDocParserCtxt(source.ptr);
            if parser_ctxt.is_null() {
                return Err(LibXml2Error::SchemaParseFailed {
                    details: "could not create schema parser context".to_string(),
                });
            }

            xmlSchemaSetParserStructuredErrors(
                parser_ctxt,
                Some(structured_error_callback),
                &mut errors as *mut Vec<String> as *mut c_void,
            );

            let schema_ptr = xmlSchemaParse(parser_ctxt);

            // Always free the parser context
            xmlSchemaFreeParserCtxt(parser_ctxt);

            XmlSchemaPtr::from_raw(schema_ptr, source).ok_or_else(|| {
                errors.extend(capture.into_messages());
                LibXml2Error::SchemaParseFailed {
                    details: join_or(errors, "schema could not be parsed"),
                }
            })
        }
    }

    /// Parse an XML document from a file without touching the network.
    ///
    /// # Errors
    ///
    /// Returns `LibXml2Error::DocumentParseFailed` when the file is missing or is
    /// not well-formed.
    pub fn parse_document_file(&self, document_path: &Path) -> LibXml2Result<XmlDocPtr> {
        read_xml_file(document_path, |details| LibXml2Error::DocumentParseFailed {
            details,
        })
    }

    /// Validate a parsed document against a parsed schema.
    ///
    /// A fresh validation context is created for each call and freed before returning.
    ///
    /// # Errors
    ///
    /// Returns `LibXml2Error::ValidationContextCreationFailed` if the context cannot be
    /// created, and `LibXml2Error::ValidationFailed` when libxml2 reports an internal
    /// error (negative return code).
    pub fn validate_document(
        &self,
        schema: &XmlSchemaPtr,
        document: &mut XmlDocPtr,
        document_path: &Path,
    ) -> LibXml2Result<ValidationResult> {
        let mut errors: Vec<String> = Vec::new();

        unsafe {
            let valid_ctxt = xmlSchemaNewValidCtxt(schema.as_ptr());
            if valid_ctxt.is_null() {
                return Err(LibXml2Error::ValidationContextCreationFailed);
            }

            xmlSchemaSetValidStructuredErrors(
                valid_ctxt,
                Some(structured_error_callback),
                &mut errors as *mut Vec<String> as *mut c_void,
            );

            let result_code = xmlSchemaValidateDoc(valid_ctxt, document.as_mut_ptr());

            // Always free the validation context
            xmlSchemaFreeValidCtxt(valid_ctxt);

            ValidationResult::from_code(result_code, errors).ok_or_else(|| {
                LibXml2Error::ValidationFailed {
                    code: result_code,
                    file: document_path.to_path_buf(),
                }
            })
        }
    }
}

impl Default for LibXml2Wrapper {
    fn default() -> Self {
        Self::new()
    }
}

fn join_or(errors: Vec<String>, fallback: &str) -> String {
    if errors.is_empty() {
        fallback.to_string()
    } else {
        errors.join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SIMPLE_XSD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">
    <xs:element name="root" type="xs:string"/>
</xs:schema>"#;

    const VALID_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<root>Hello World</root>"#;

    const INVALID_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<root><invalid>content</invalid></root>"#;

    fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_libxml2_wrapper_creation() {
        let wrapper = LibXml2Wrapper::new();
        drop(wrapper);
    }

    #[test]
    fn test_schema_parsing_success() {
        let dir = TempDir::new().unwrap();
        let schema_path = write(&dir, "simple.xsd", SIMPLE_XSD);

        let wrapper = LibXml2Wrapper::new();
        let schema = wrapper.parse_schema_file(&schema_path).unwrap();
        assert!(!schema.as_ptr().is_null());
    }

    #[test]
    fn test_schema_parsing_invalid_schema() {
        let dir = TempDir::new().unwrap();
        let schema_path = write(&dir, "bogus.xsd", "<invalid>not a schema</invalid>");

        let wrapper = LibXml2Wrapper::new();
        match wrapper.parse_schema_file(&schema_path) {
            Err(LibXml2Error::SchemaParseFailed { details }) => assert!(!details.is_empty()),
            other => panic!("Expected SchemaParseFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_schema_syntax_error_is_captured() {
        let dir = TempDir::new().unwrap();
        let schema_path = write(
            &dir,
            "truncated.xsd",
            r#"<xs:schema xmlns:xs="http://www.w3.org/2001/XMLSchema">"#,
        );

        let wrapper = LibXml2Wrapper::new();
        match wrapper.parse_schema_file(&schema_path) {
            Err(LibXml2Error::SchemaParseFailed { details }) => {
                assert!(details.contains("Premature end of data"), "{details}");
                assert!(!details.contains("Failed to parse the XML resource"));
            }
            other => panic!("Expected SchemaParseFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_schema_parsing_missing_file() {
        let dir = TempDir::new().unwrap();
        let wrapper = LibXml2Wrapper::new();

        let result = wrapper.parse_schema_file(&dir.path().join("absent.xsd"));
        assert!(matches!(result, Err(LibXml2Error::SchemaParseFailed { .. })));
    }

    #[test]
    fn test_document_parsing_malformed() {
        let dir = TempDir::new().unwrap();
        let doc_path = write(&dir, "broken.xml", "<root><unclosed></root>");

        let wrapper = LibXml2Wrapper::new();
        match wrapper.parse_document_file(&doc_path) {
            Err(LibXml2Error::DocumentParseFailed { details }) => assert!(!details.is_empty()),
            other => panic!("Expected DocumentParseFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_document_valid_and_invalid() {
        let dir = TempDir::new().unwrap();
        let schema_path = write(&dir, "simple.xsd", SIMPLE_XSD);
        let valid_path = write(&dir, "valid.xml", VALID_XML);
        let invalid_path = write(&dir, "invalid.xml", INVALID_XML);

        let wrapper = LibXml2Wrapper::new();
        let schema = wrapper.parse_schema_file(&schema_path).unwrap();

        let mut valid_doc = wrapper.parse_document_file(&valid_path).unwrap();
        let result = wrapper
            .validate_document(&schema, &mut valid_doc, &valid_path)
            .unwrap();
        assert_eq!(result, ValidationResult::Valid);

        let mut invalid_doc = wrapper.parse_document_file(&invalid_path).unwrap();
        let result = wrapper
            .validate_document(&schema, &mut invalid_doc, &invalid_path)
            .unwrap();
        match result {
            ValidationResult::Invalid {
                error_count,
                errors,
            } => {
                assert!(error_count > 0);
                assert!(!errors.is_empty());
            }
            other => panic!("Expected Invalid, got {:?}", other),
        }
    }

    #[test]
    fn test_validation_result_from_code() {
        assert_eq!(
            ValidationResult::from_code(0, vec![]),
            Some(ValidationResult::Valid)
        );
        assert_eq!(
            ValidationResult::from_code(5, vec![]),
            Some(ValidationResult::Invalid {
                error_count: 5,
                errors: vec![]
            })
        );
        assert_eq!(ValidationResult::from_code(-1, vec![]), None);
    }

    #[test]
    fn test_validation_result_predicates() {
        let valid = ValidationResult::Valid;
        assert!(valid.is_valid());
        assert!(!valid.is_invalid());

        let invalid = ValidationResult::Invalid {
            error_count: 1,
            errors: vec![],
        };
        assert!(!invalid.is_valid());
        assert!(invalid.is_invalid());
    }

    #[test]
    fn test_schema_reuse_across_documents() {
        let dir = TempDir::new().unwrap();
        let schema_path = write(&dir, "simple.xsd", SIMPLE_XSD);
        let wrapper = LibXml2Wrapper::new();
        let schema = wrapper.parse_schema_file(&schema_path).unwrap();

        for i in 0..3 {
            let path = write(&dir, &format!("doc{i}.xml"), VALID_XML);
            let mut doc = wrapper.parse_document_file(&path).unwrap();
            let result = wrapper.validate_document(&schema, &mut doc, &path).unwrap();
            assert!(result.is_valid(), "Validation {} failed", i);
        }
    }
}
