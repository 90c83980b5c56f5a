//! Schema location and the process-wide compiled schema.

use std::path::{Path, PathBuf};
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, OnceLock};

use tracing::debug;

use crate::document::Document;
use crate::error::NrmlError;
use crate::ffi;

const NRML_SCHEMA_FILE: &str = "nrml.xsd";

/// Absolute path to the bundled NRML schema file.
///
/// Purely computed from the crate's install location; performs no I/O and
/// does not check that the file exists.
pub fn nrml_schema_file() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("schema")
        .join(NRML_SCHEMA_FILE)
}

/// A compiled XSD, ready to validate documents.
#[derive(Debug)]
pub(crate) struct CompiledSchema {
    schema: NonNull<ffi::XmlSchema>,
}

// Compiled schemas are immutable after xmlSchemaParse; every validation
// pass gets its own validation context.
unsafe impl Send for CompiledSchema {}
unsafe impl Sync for CompiledSchema {}

impl CompiledSchema {
    /// Parse and compile the schema at `path`.
    pub(crate) fn compile(path: &Path) -> Result<Self, NrmlError> {
        ffi::begin_capture();
        let compile_failed = |detail: String| NrmlError::SchemaCompile {
            path: path.to_path_buf(),
            detail,
        };
        let c_path = ffi::c_path(path)
            .ok_or_else(|| compile_failed("path contains a NUL byte".to_string()))?;
        let schema = unsafe {
            let ctxt = ffi::xmlSchemaNewParserCtxt(c_path.as_ptr());
            if ctxt.is_null() {
                return Err(compile_failed(ffi::summarize(
                    ffi::take_diagnostics(),
                    "schema file could not be opened",
                )));
            }
            let schema = ffi::xmlSchemaParse(ctxt);
            ffi::xmlSchemaFreeParserCtxt(ctxt);
            schema
        };
        let schema = NonNull::new(schema).ok_or_else(|| {
            compile_failed(ffi::summarize(
                ffi::take_diagnostics(),
                "schema is not a valid XSD document",
            ))
        })?;
        Ok(Self { schema })
    }

    /// Validate a parsed document, returning the engine's diagnostics as
    /// one collapsed message on failure.
    pub(crate) fn validate(&self, document: &Document) -> Result<(), String> {
        ffi::begin_capture();
        let outcome = unsafe {
            let ctxt = ffi::xmlSchemaNewValidCtxt(self.schema.as_ptr());
            if ctxt.is_null() {
                return Err("could not allocate a validation context".to_string());
            }
            let outcome = ffi::xmlSchemaValidateDoc(ctxt, document.as_ptr());
            ffi::xmlSchemaFreeValidCtxt(ctxt);
            outcome
        };
        if outcome == 0 {
            Ok(())
        } else {
            Err(ffi::summarize(
                ffi::take_diagnostics(),
                "document does not conform to the NRML schema",
            ))
        }
    }
}

impl Drop for CompiledSchema {
    fn drop(&mut self) {
        unsafe { ffi::xmlSchemaFree(self.schema.as_ptr()) };
    }
}

static SCHEMA: OnceLock<CompiledSchema> = OnceLock::new();
static COMPILE_GUARD: Mutex<()> = Mutex::new(());
static COMPILATIONS: AtomicUsize = AtomicUsize::new(0);

/// The process-wide compiled schema, built on first use.
///
/// Exactly one caller compiles; concurrent first callers wait on the
/// guard and reuse the result. A failed compilation caches nothing, so
/// the next call retries from scratch.
pub(crate) fn compiled_schema() -> Result<&'static CompiledSchema, NrmlError> {
    if let Some(schema) = SCHEMA.get() {
        return Ok(schema);
    }
    let _guard = COMPILE_GUARD
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(schema) = SCHEMA.get() {
        return Ok(schema);
    }
    let path = nrml_schema_file();
    let compiled = CompiledSchema::compile(&path)?;
    COMPILATIONS.fetch_add(1, Ordering::Relaxed);
    debug!(path = %path.display(), "compiled NRML schema");
    Ok(SCHEMA.get_or_init(|| compiled))
}

/// How many times the process-wide schema has been compiled. Stays at one
/// for the whole process once the first validation succeeds; the
/// incremental reader path never touches it.
pub(crate) fn compilation_count() -> usize {
    COMPILATIONS.load(Ordering::Relaxed)
}
