use std::fmt;

use nrml_schema::{NrmlError, ReaderError};

// Exit code constants aligned with BSD sysexits semantics.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const DATA_INVALID: i32 = 60;
#[allow(dead_code)]
pub const USAGE: i32 = 64;
pub const NO_INPUT: i32 = 66;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn nrml_error(context: &str, err: NrmlError) -> CliError {
    let code = match err {
        NrmlError::NotFound(_) => NO_INPUT,
        NrmlError::InvalidFile { .. } => DATA_INVALID,
        NrmlError::SchemaCompile { .. } => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn reader_error(context: &str, err: ReaderError) -> CliError {
    let code = match err {
        ReaderError::Open(_) => NO_INPUT,
        ReaderError::Io(_) => FAILURE,
        ReaderError::SchemaActivation { .. } => INTERNAL,
        ReaderError::Parse { .. } | ReaderError::Invalid { .. } => DATA_INVALID,
    };
    CliError::new(code, format!("{context}: {err}"))
}
