//! Minimal libxml2 FFI surface.
//!
//! Only the handful of entry points the crate actually calls are declared
//! here: tree parsing, XSD compilation and validation, and the pull-mode
//! text reader. Diagnostics are routed through a structured error hook
//! into a thread-local log so failure messages can be attached to the
//! error the caller sees instead of leaking to stderr.

#![allow(non_snake_case, non_upper_case_globals)]

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::fmt;
use std::path::Path;
use std::sync::Once;

use libc::{c_char, c_int, c_void};

/// libxml2 uses UTF-8 encoded bytes for all names and content.
pub type XmlChar = u8;

// Opaque libxml2 structures.
#[repr(C)]
pub struct XmlDoc {
    _private: [u8; 0],
}

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
pub struct XmlTextReader {
    _private: [u8; 0],
}

/// Layout of `struct _xmlNs` (stable public ABI since libxml2 2.x).
#[repr(C)]
pub struct XmlNs {
    pub next: *mut XmlNs,
    pub kind: c_int,
    pub href: *const XmlChar,
    pub prefix: *const XmlChar,
    pub private: *mut c_void,
    pub context: *mut XmlDoc,
}

/// Layout of `struct _xmlNode` (stable public ABI since libxml2 2.x).
/// Only `kind`, `name` and `ns` are read directly; traversal goes through
/// the element helper functions below.
#[repr(C)]
pub struct XmlNode {
    pub private: *mut c_void,
    pub kind: c_int,
    pub name: *const XmlChar,
    pub children: *mut XmlNode,
    pub last: *mut XmlNode,
    pub parent: *mut XmlNode,
    pub next: *mut XmlNode,
    pub prev: *mut XmlNode,
    pub doc: *mut XmlDoc,
    pub ns: *mut XmlNs,
    pub content: *mut XmlChar,
    pub properties: *mut c_void,
    pub ns_def: *mut XmlNs,
    pub psvi: *mut c_void,
    pub line: u16,
    pub extra: u16,
}

/// Layout of `struct _xmlError` (stable public ABI since libxml2 2.6).
#[repr(C)]
pub struct XmlError {
    pub domain: c_int,
    pub code: c_int,
    pub message: *mut c_char,
    pub level: c_int,
    pub file: *mut c_char,
    pub line: c_int,
    pub str1: *mut c_char,
    pub str2: *mut c_char,
    pub str3: *mut c_char,
    pub int1: c_int,
    pub int2: c_int,
    pub ctxt: *mut c_void,
    pub node: *mut c_void,
}

pub type StructuredErrorFunc = unsafe extern "C" fn(ctx: *mut c_void, error: *mut XmlError);

// Parse option flags (xmlParserOption).
pub const XML_PARSE_RECOVER: c_int = 1 << 0;
pub const XML_PARSE_NOBLANKS: c_int = 1 << 8;
pub const XML_PARSE_NONET: c_int = 1 << 11;
pub const XML_PARSE_NOCDATA: c_int = 1 << 14;
pub const XML_PARSE_HUGE: c_int = 1 << 19;

// xmlReaderTypes values reported by xmlTextReaderNodeType.
pub const XML_READER_TYPE_ELEMENT: c_int = 1;
pub const XML_READER_TYPE_END_ELEMENT: c_int = 15;

#[cfg_attr(target_os = "windows", link(name = "libxml2"))]
#[cfg_attr(not(target_os = "windows"), link(name = "xml2"))]
extern "C" {
    fn xmlInitParser();
    fn xmlSetStructuredErrorFunc(ctx: *mut c_void, handler: Option<StructuredErrorFunc>);

    // Tree parsing.
    pub fn xmlReadFile(url: *const c_char, encoding: *const c_char, options: c_int)
        -> *mut XmlDoc;
    pub fn xmlReadMemory(
        buffer: *const c_char,
        size: c_int,
        url: *const c_char,
        encoding: *const c_char,
        options: c_int,
    ) -> *mut XmlDoc;
    pub fn xmlFreeDoc(doc: *mut XmlDoc);
    pub fn xmlDocGetRootElement(doc: *mut XmlDoc) -> *mut XmlNode;
    pub fn xmlFirstElementChild(parent: *mut XmlNode) -> *mut XmlNode;
    pub fn xmlNextElementSibling(node: *mut XmlNode) -> *mut XmlNode;
    pub fn xmlGetProp(node: *mut XmlNode, name: *const XmlChar) -> *mut XmlChar;
    pub fn xmlNodeGetContent(node: *const XmlNode) -> *mut XmlChar;

    // XSD compilation and whole-tree validation.
    pub fn xmlSchemaNewParserCtxt(url: *const c_char) -> *mut XmlSchemaParserCtxt;
    pub fn xmlSchemaParse(ctxt: *mut XmlSchemaParserCtxt) -> *mut XmlSchema;
    pub fn xmlSchemaFreeParserCtxt(ctxt: *mut XmlSchemaParserCtxt);
    pub fn xmlSchemaFree(schema: *mut XmlSchema);
    pub fn xmlSchemaNewValidCtxt(schema: *mut XmlSchema) -> *mut XmlSchemaValidCtxt;
    pub fn xmlSchemaFreeValidCtxt(ctxt: *mut XmlSchemaValidCtxt);
    pub fn xmlSchemaValidateDoc(ctxt: *mut XmlSchemaValidCtxt, doc: *mut XmlDoc) -> c_int;

    // Pull-mode reader with concurrent validation.
    pub fn xmlReaderForFile(
        filename: *const c_char,
        encoding: *const c_char,
        options: c_int,
    ) -> *mut XmlTextReader;
    pub fn xmlReaderForMemory(
        buffer: *const c_char,
        size: c_int,
        url: *const c_char,
        encoding: *const c_char,
        options: c_int,
    ) -> *mut XmlTextReader;
    pub fn xmlFreeTextReader(reader: *mut XmlTextReader);
    pub fn xmlTextReaderRead(reader: *mut XmlTextReader) -> c_int;
    pub fn xmlTextReaderNodeType(reader: *mut XmlTextReader) -> c_int;
    pub fn xmlTextReaderConstName(reader: *mut XmlTextReader) -> *const XmlChar;
    pub fn xmlTextReaderIsEmptyElement(reader: *mut XmlTextReader) -> c_int;
    pub fn xmlTextReaderSchemaValidate(
        reader: *mut XmlTextReader,
        xsd: *const c_char,
    ) -> c_int;
    pub fn xmlTextReaderIsValid(reader: *mut XmlTextReader) -> c_int;
    pub fn xmlTextReaderGetParserLineNumber(reader: *mut XmlTextReader) -> c_int;

    // `xmlFree` is a global function pointer in libxml2, not a function.
    pub static xmlFree: unsafe extern "C" fn(ptr: *mut c_void);
}

/// A single diagnostic captured from libxml2.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub message: String,
    pub line: Option<u32>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "line {line}: {}", self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

thread_local! {
    static DIAGNOSTICS: RefCell<Vec<Diagnostic>> = const { RefCell::new(Vec::new()) };
}

/// Structured error hook: append to the calling thread's diagnostic log.
unsafe extern "C" fn record_diagnostic(_ctx: *mut c_void, error: *mut XmlError) {
    if error.is_null() {
        return;
    }
    let error = &*error;
    let message = if error.message.is_null() {
        String::from("unknown libxml2 error")
    } else {
        CStr::from_ptr(error.message)
            .to_string_lossy()
            .trim_end()
            .to_string()
    };
    let line = (error.line > 0).then_some(error.line as u32);
    DIAGNOSTICS.with(|log| log.borrow_mut().push(Diagnostic { message, line }));
}

static LIBXML2_INIT: Once = Once::new();

/// Prepare this thread for a parse or validation pass: make sure libxml2
/// is initialized, route its diagnostics into the thread-local log, and
/// clear any leftovers from a previous pass.
///
/// libxml2 error handlers are per-thread globals, so the hook has to be
/// installed on every thread that parses, not just once per process.
pub fn begin_capture() {
    LIBXML2_INIT.call_once(|| unsafe {
        xmlInitParser();
    });
    unsafe {
        xmlSetStructuredErrorFunc(std::ptr::null_mut(), Some(record_diagnostic));
    }
    DIAGNOSTICS.with(|log| log.borrow_mut().clear());
}

/// Drain the calling thread's diagnostic log.
pub fn take_diagnostics() -> Vec<Diagnostic> {
    DIAGNOSTICS.with(|log| std::mem::take(&mut *log.borrow_mut()))
}

/// Collapse captured diagnostics into one message: the first entry plus up
/// to three more. Falls back to `fallback` when nothing was captured.
pub fn summarize(diagnostics: Vec<Diagnostic>, fallback: &str) -> String {
    let mut iter = diagnostics.into_iter();
    let Some(first) = iter.next() else {
        return fallback.to_string();
    };
    let mut message = first.to_string();
    for diagnostic in iter.take(3) {
        message.push_str("; ");
        message.push_str(&diagnostic.to_string());
    }
    message
}

/// NUL-terminated copy of a path for handing to libxml2.
/// Returns `None` when the path contains an interior NUL byte.
pub fn c_path(path: &Path) -> Option<CString> {
    CString::new(path.as_os_str().as_encoded_bytes()).ok()
}

/// Copy a libxml2-owned string and release the original with `xmlFree`.
///
/// # Safety
/// `ptr` must be NULL or a valid NUL-terminated allocation owned by
/// libxml2 that nothing else will free.
pub unsafe fn take_xml_string(ptr: *mut XmlChar) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    let value = CStr::from_ptr(ptr as *const c_char)
        .to_string_lossy()
        .into_owned();
    (xmlFree)(ptr as *mut c_void);
    Some(value)
}

/// Borrow a libxml2-owned string without taking ownership.
///
/// # Safety
/// `ptr` must be NULL or a valid NUL-terminated string that outlives the
/// returned value's use.
pub unsafe fn peek_xml_string(ptr: *const XmlChar) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(
        CStr::from_ptr(ptr as *const c_char)
            .to_string_lossy()
            .into_owned(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarize_joins_first_four_diagnostics() {
        let diagnostics = (1..=6)
            .map(|n| Diagnostic {
                message: format!("problem {n}"),
                line: Some(n),
            })
            .collect();
        let message = summarize(diagnostics, "unused");
        assert_eq!(
            message,
            "line 1: problem 1; line 2: problem 2; line 3: problem 3; line 4: problem 4"
        );
    }

    #[test]
    fn summarize_falls_back_when_empty() {
        assert_eq!(summarize(Vec::new(), "nothing captured"), "nothing captured");
    }

    #[test]
    fn diagnostic_display_without_line() {
        let diagnostic = Diagnostic {
            message: "boom".to_string(),
            line: None,
        };
        assert_eq!(diagnostic.to_string(), "boom");
    }

    #[test]
    fn c_path_rejects_interior_nul() {
        assert!(c_path(Path::new("a\0b")).is_none());
        assert!(c_path(Path::new("/tmp/ok.xml")).is_some());
    }
}
