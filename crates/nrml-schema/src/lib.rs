//! Schema-validated parsing for NRML, the seismic hazard and risk markup
//! dialect layered on GML.
//!
//! The crate bundles the NRML XSD and exposes two validation paths plus a
//! scoped file helper:
//!
//! - [`assert_valid`] parses a whole document into memory and validates
//!   it against a compiled schema that is built once per process. All
//!   parse and validation failures collapse into one error kind.
//! - [`iter_events`] traverses a document start-tag by end-tag while the
//!   engine validates concurrently, compiling the schema fresh each call
//!   and reporting its own untranslated errors.
//! - [`NrmlFile`] scopes open/close of a path or an adopted stream.

pub mod document;
pub mod error;
mod ffi;
pub mod parser;
pub mod reader;
pub mod schema;
pub mod scoped;
pub mod validator;

pub use document::{Children, Document, Element};
pub use error::{NrmlError, Result};
pub use parser::{ParserConfig, Source};
pub use reader::{iter_events, EventKind, EventStream, ReaderError, DEFAULT_EVENTS};
pub use schema::nrml_schema_file;
pub use scoped::{Destination, NrmlFile, OpenMode, Stream};
pub use validator::{assert_valid, assert_valid_with};

/// Namespace of NRML's own elements.
pub const NAMESPACE: &str = "http://openquake.org/xmlns/nrml/0.4";

/// Namespace of the embedded geometry markup.
pub const GML_NAMESPACE: &str = "http://www.opengis.net/gml";

/// Prefix map used when parsing and recognizing elements: both
/// namespaces carry explicit prefixes.
pub const PARSE_NS_MAP: [(&str, &str); 2] = [("nrml", NAMESPACE), ("gml", GML_NAMESPACE)];

/// Prefix map used when serializing: the document namespace is the
/// default so nrml elements are written unprefixed, gml stays prefixed.
pub const SERIALIZE_NS_MAP: [(Option<&str>, &str); 2] =
    [(None, NAMESPACE), (Some("gml"), GML_NAMESPACE)];
