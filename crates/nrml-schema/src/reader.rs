//! Incremental parse with concurrent schema validation.
//!
//! This path is independent of [`crate::assert_valid`]: the schema is
//! recompiled fresh for every call instead of going through the
//! process-wide cache, and failures keep their native [`ReaderError`]
//! shape instead of collapsing into [`crate::NrmlError::InvalidFile`].

use std::io::Read;
use std::path::PathBuf;
use std::ptr::NonNull;

use crate::ffi;
use crate::parser::{ParserConfig, Source};
use crate::schema::nrml_schema_file;

/// Structural events reported while traversing a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// An element's start tag was read.
    Start,
    /// An element's end tag was read. Empty-element tags report a start
    /// immediately followed by an end.
    End,
}

/// Events reported when the caller does not ask for a specific set.
pub const DEFAULT_EVENTS: &[EventKind] = &[EventKind::Start, EventKind::End];

/// Errors surfaced by the incremental path, untranslated.
///
/// Callers get the traversal engine's own failure surface here, with
/// line numbers, rather than the single collapsed kind the whole-tree
/// validator reports.
#[derive(Debug, thiserror::Error)]
pub enum ReaderError {
    /// The source could not be opened for traversal.
    #[error("cannot open {0} for incremental parse")]
    Open(String),

    /// Reading bytes from a stream source failed.
    #[error("cannot read source: {0}")]
    Io(#[from] std::io::Error),

    /// The schema could not be loaded into the traversal engine.
    #[error("cannot activate schema validation with {}: {detail}", schema.display())]
    SchemaActivation { schema: PathBuf, detail: String },

    /// The document stopped being well-formed at `line`.
    #[error("parse error at line {line}: {detail}")]
    Parse { line: u32, detail: String },

    /// The document violated the schema at `line`.
    #[error("document invalid at line {line}: {detail}")]
    Invalid { line: u32, detail: String },
}

/// Lazily traverse `source`, validating against a freshly compiled NRML
/// schema as the traversal advances.
///
/// The returned stream is forward-only and single-pass; iterate it again
/// by calling this function again. A schema violation partway through the
/// document surfaces as an `Err` item at that point of the traversal,
/// after the events that preceded it have already been yielded.
pub fn iter_events(
    source: impl Into<Source>,
    events: &[EventKind],
) -> Result<EventStream, ReaderError> {
    ffi::begin_capture();
    let flags = ParserConfig::default().to_flags();

    let (reader, buffer, name) = match source.into() {
        Source::Path(path) => {
            let name = path.display().to_string();
            let c_path = ffi::c_path(&path).ok_or_else(|| ReaderError::Open(name.clone()))?;
            let reader =
                unsafe { ffi::xmlReaderForFile(c_path.as_ptr(), std::ptr::null(), flags) };
            (reader, None, name)
        }
        Source::Reader { mut reader, name } => {
            let mut buffer = Vec::new();
            reader.read_to_end(&mut buffer)?;
            let len = libc::c_int::try_from(buffer.len())
                .map_err(|_| ReaderError::Open(name.clone()))?;
            let reader = unsafe {
                ffi::xmlReaderForMemory(
                    buffer.as_ptr() as *const libc::c_char,
                    len,
                    std::ptr::null(),
                    std::ptr::null(),
                    flags,
                )
            };
            (reader, Some(buffer), name)
        }
    };
    let reader = NonNull::new(reader).ok_or(ReaderError::Open(name))?;

    // Schema validation must be armed before the first read. The reader
    // compiles its own schema here; the process-wide cache is not used.
    let schema = nrml_schema_file();
    let activated = ffi::c_path(&schema).map(|c_schema| unsafe {
        ffi::xmlTextReaderSchemaValidate(reader.as_ptr(), c_schema.as_ptr())
    });
    if activated != Some(0) {
        unsafe { ffi::xmlFreeTextReader(reader.as_ptr()) };
        return Err(ReaderError::SchemaActivation {
            schema,
            detail: ffi::summarize(ffi::take_diagnostics(), "schema could not be loaded"),
        });
    }

    Ok(EventStream {
        reader,
        _buffer: buffer,
        want_start: events.contains(&EventKind::Start),
        want_end: events.contains(&EventKind::End),
        pending_end: None,
        finished: false,
    })
}

/// Forward-only stream of `(event, element name)` pairs.
#[derive(Debug)]
pub struct EventStream {
    reader: NonNull<ffi::XmlTextReader>,
    // Backing storage for memory sources; the reader borrows from it.
    _buffer: Option<Vec<u8>>,
    want_start: bool,
    want_end: bool,
    pending_end: Option<String>,
    finished: bool,
}

impl EventStream {
    fn current_line(&self) -> u32 {
        let line = unsafe { ffi::xmlTextReaderGetParserLineNumber(self.reader.as_ptr()) };
        line.max(0) as u32
    }

    fn element_name(&self) -> String {
        let name = unsafe { ffi::xmlTextReaderConstName(self.reader.as_ptr()) };
        unsafe { ffi::peek_xml_string(name) }.unwrap_or_default()
    }
}

impl Iterator for EventStream {
    type Item = Result<(EventKind, String), ReaderError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            // Empty-element tags produce no end node; the synthesized end
            // event queued at the start tag is delivered first.
            if let Some(name) = self.pending_end.take() {
                if self.want_end {
                    return Some(Ok((EventKind::End, name)));
                }
            }

            let advanced = unsafe { ffi::xmlTextReaderRead(self.reader.as_ptr()) };
            if advanced == 0 {
                self.finished = true;
                return None;
            }
            if advanced < 0 {
                self.finished = true;
                return Some(Err(ReaderError::Parse {
                    line: self.current_line(),
                    detail: ffi::summarize(
                        ffi::take_diagnostics(),
                        "document is not well-formed XML",
                    ),
                }));
            }
            // Validity is checked after every advance so a violation
            // surfaces at the node where the engine detected it.
            if unsafe { ffi::xmlTextReaderIsValid(self.reader.as_ptr()) } == 0 {
                self.finished = true;
                return Some(Err(ReaderError::Invalid {
                    line: self.current_line(),
                    detail: ffi::summarize(
                        ffi::take_diagnostics(),
                        "document does not conform to the NRML schema",
                    ),
                }));
            }

            let node_type = unsafe { ffi::xmlTextReaderNodeType(self.reader.as_ptr()) };
            match node_type {
                ffi::XML_READER_TYPE_ELEMENT => {
                    let name = self.element_name();
                    let empty = unsafe {
                        ffi::xmlTextReaderIsEmptyElement(self.reader.as_ptr())
                    } != 0;
                    if empty {
                        self.pending_end = Some(name.clone());
                    }
                    if self.want_start {
                        return Some(Ok((EventKind::Start, name)));
                    }
                }
                ffi::XML_READER_TYPE_END_ELEMENT if self.want_end => {
                    return Some(Ok((EventKind::End, self.element_name())));
                }
                _ => {}
            }
        }
    }
}

impl Drop for EventStream {
    fn drop(&mut self) {
        unsafe { ffi::xmlFreeTextReader(self.reader.as_ptr()) };
    }
}
