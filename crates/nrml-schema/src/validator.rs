//! Whole-tree parse and schema validation.

use std::io::Read;
use std::ptr::NonNull;

use libc::{c_char, c_int};

use crate::document::Document;
use crate::error::{NrmlError, Result};
use crate::ffi;
use crate::parser::{ParserConfig, Source};
use crate::schema;

/// Parse `source` and validate it against the bundled NRML schema,
/// using the default permissive parser configuration.
///
/// Returns the fully parsed tree on success. The whole document is
/// materialized in memory for the duration of the call and beyond; there
/// is no streaming mode here (see [`crate::iter_events`] for that).
pub fn assert_valid(source: impl Into<Source>) -> Result<Document> {
    assert_valid_with(source, ParserConfig::default())
}

/// Like [`assert_valid`], with an explicit parser configuration.
///
/// Failure contract: a path source that does not exist fails with
/// [`NrmlError::NotFound`] before anything is parsed. Every other
/// failure, malformed markup and schema violations alike, collapses to
/// [`NrmlError::InvalidFile`] with the source's display name and the
/// engine's message.
pub fn assert_valid_with(source: impl Into<Source>, config: ParserConfig) -> Result<Document> {
    let source = source.into();
    let name = source.display_name();

    if let Source::Path(path) = &source {
        if !path.exists() {
            return Err(NrmlError::NotFound(path.display().to_string()));
        }
    }

    // The compiled schema is built at most once per process; compilation
    // failures surface as their own kind, not as InvalidFile.
    let compiled = schema::compiled_schema()?;

    let document = parse_source(source, config).map_err(|cause| NrmlError::InvalidFile {
        name: name.clone(),
        cause,
    })?;

    compiled
        .validate(&document)
        .map_err(|cause| NrmlError::InvalidFile { name, cause })?;

    Ok(document)
}

fn parse_source(source: Source, config: ParserConfig) -> std::result::Result<Document, String> {
    ffi::begin_capture();
    let flags = config.to_flags();
    let doc = match source {
        Source::Path(path) => {
            let c_path = ffi::c_path(&path).ok_or("path contains a NUL byte")?;
            unsafe { ffi::xmlReadFile(c_path.as_ptr(), std::ptr::null(), flags) }
        }
        Source::Reader { mut reader, .. } => {
            let mut buffer = Vec::new();
            reader
                .read_to_end(&mut buffer)
                .map_err(|err| err.to_string())?;
            let len = c_int::try_from(buffer.len())
                .map_err(|_| "document exceeds 2 GiB".to_string())?;
            unsafe {
                ffi::xmlReadMemory(
                    buffer.as_ptr() as *const c_char,
                    len,
                    std::ptr::null(),
                    std::ptr::null(),
                    flags,
                )
            }
        }
    };
    match NonNull::new(doc) {
        Some(doc) => Ok(unsafe { Document::from_raw(doc) }),
        None => Err(ffi::summarize(
            ffi::take_diagnostics(),
            "document is not well-formed XML",
        )),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::path::{Path, PathBuf};

    use super::*;
    use crate::schema::compilation_count;

    const VALID_EXPOSURE: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<nrml xmlns="http://openquake.org/xmlns/nrml/0.4">
  <exposureModel id="ep1" category="buildings">
    <description>Test portfolio</description>
    <assets>
      <asset id="a1" taxonomy="RC" number="2"/>
      <asset id="a2" taxonomy="W" number="1"/>
    </assets>
  </exposureModel>
</nrml>
"#;

    const SCHEMA_INVALID: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<nrml xmlns="http://openquake.org/xmlns/nrml/0.4">
  <exposureModel id="ep1" category="buildings">
    <assets>
      <asset id="a1" taxonomy="RC" number="2"/>
    </assets>
  </exposureModel>
</nrml>
"#;

    const MALFORMED: &str = "<nrml><unclosed></nrml>";

    fn unique_temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "nrml-validator-{tag}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time should be after epoch")
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
        dir
    }

    fn write_fixture(dir: &Path, file_name: &str, contents: &str) -> PathBuf {
        let path = dir.join(file_name);
        std::fs::write(&path, contents).expect("fixture should be writable");
        path
    }

    #[test]
    fn valid_document_returns_tree_with_matching_root() {
        let dir = unique_temp_dir("valid");
        let path = write_fixture(&dir, "exposure.xml", VALID_EXPOSURE);

        let document = assert_valid(path.as_path()).expect("document should validate");
        let root = document.root().expect("tree should have a root");
        assert_eq!(root.name(), "nrml");
        assert_eq!(root.namespace().as_deref(), Some(crate::NAMESPACE));

        let model = root.children().next().expect("root should have a child");
        assert_eq!(model.name(), "exposureModel");
        assert_eq!(model.attribute("id").as_deref(), Some("ep1"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn second_validation_reuses_compiled_schema() {
        let dir = unique_temp_dir("reuse");
        let path = write_fixture(&dir, "exposure.xml", VALID_EXPOSURE);

        assert_valid(path.as_path()).expect("first validation should pass");
        assert_valid(path.as_path()).expect("second validation should pass");
        assert_eq!(compilation_count(), 1);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_path_fails_with_errno_text_before_parsing() {
        let err = assert_valid("/no/such/file.xml").unwrap_err();
        assert!(matches!(err, NrmlError::NotFound(_)));
        assert_eq!(
            err.to_string(),
            "[Errno 2] No such file or directory: '/no/such/file.xml'"
        );
    }

    #[test]
    fn schema_violation_collapses_to_invalid_file() {
        let dir = unique_temp_dir("violation");
        let path = write_fixture(&dir, "bad.xml", SCHEMA_INVALID);

        let err = assert_valid(path.as_path()).unwrap_err();
        match &err {
            NrmlError::InvalidFile { name, cause } => {
                assert_eq!(name, &path.display().to_string());
                assert!(!cause.is_empty());
            }
            other => panic!("expected InvalidFile, got {other}"),
        }
        let prefix = format!("{}:", path.display());
        assert!(err.to_string().starts_with(&prefix));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn malformed_markup_collapses_to_the_same_kind() {
        let dir = unique_temp_dir("malformed");
        let path = write_fixture(&dir, "broken.xml", MALFORMED);

        let err = assert_valid(path.as_path()).unwrap_err();
        assert!(matches!(err, NrmlError::InvalidFile { .. }));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn stream_sources_use_type_derived_display_name() {
        let source = Source::from_reader(Cursor::new(SCHEMA_INVALID.as_bytes().to_vec()));
        let err = assert_valid(source).unwrap_err();
        match err {
            NrmlError::InvalidFile { name, .. } => assert_eq!(name, "<Cursor>"),
            other => panic!("expected InvalidFile, got {other}"),
        }
    }

    #[test]
    fn stream_sources_validate_like_paths() {
        let source = Source::from_reader(Cursor::new(VALID_EXPOSURE.as_bytes().to_vec()));
        let document = assert_valid(source).expect("stream should validate");
        assert_eq!(document.root().expect("root").name(), "nrml");
    }
}
