use std::path::PathBuf;

/// Errors raised by the validating parse path.
#[derive(Debug, thiserror::Error)]
pub enum NrmlError {
    /// The source path does not exist on disk.
    ///
    /// Raised before any parse attempt. The message mirrors the classic
    /// errno text so existing callers can keep pattern-matching on it.
    #[error("[Errno 2] No such file or directory: '{0}'")]
    NotFound(String),

    /// The bundled schema file is missing or is not a valid schema.
    #[error("failed to compile schema {}: {detail}", path.display())]
    SchemaCompile { path: PathBuf, detail: String },

    /// Catch-all for anything that goes wrong while parsing or validating
    /// a source: malformed markup, schema violations, read failures.
    ///
    /// Only the display name and the stringified cause survive; the
    /// underlying error's type is not preserved across this boundary.
    #[error("{name}:{cause}")]
    InvalidFile { name: String, cause: String },
}

pub type Result<T> = std::result::Result<T, NrmlError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_matches_errno_text() {
        let err = NrmlError::NotFound("/no/such/file.xml".to_string());
        assert_eq!(
            err.to_string(),
            "[Errno 2] No such file or directory: '/no/such/file.xml'"
        );
    }

    #[test]
    fn invalid_file_prefixes_display_name() {
        let err = NrmlError::InvalidFile {
            name: "/data/exposure.xml".to_string(),
            cause: "line 4: missing description".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "/data/exposure.xml:line 4: missing description"
        );
    }
}
