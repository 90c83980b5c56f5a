//! Scope-managed file handles for NRML input and output.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// Byte stream usable behind [`NrmlFile`].
pub trait Stream: Read + Write {}

impl<T: Read + Write> Stream for T {}

/// Where a scoped file points: a path to open, or a handle that is
/// already open.
pub enum Destination {
    /// Filesystem path, opened by the wrapper in the requested mode.
    Path(PathBuf),
    /// Already-open handle, used as-is.
    Stream(Box<dyn Stream>),
}

impl Destination {
    /// Wrap an already-open stream.
    pub fn stream(stream: impl Stream + 'static) -> Self {
        Destination::Stream(Box::new(stream))
    }
}

impl From<PathBuf> for Destination {
    fn from(path: PathBuf) -> Self {
        Destination::Path(path)
    }
}

impl From<&Path> for Destination {
    fn from(path: &Path) -> Self {
        Destination::Path(path.to_path_buf())
    }
}

impl From<&str> for Destination {
    fn from(path: &str) -> Self {
        Destination::Path(PathBuf::from(path))
    }
}

impl From<String> for Destination {
    fn from(path: String) -> Self {
        Destination::Path(PathBuf::from(path))
    }
}

impl From<File> for Destination {
    fn from(file: File) -> Self {
        Destination::Stream(Box::new(file))
    }
}

/// Access mode for path destinations. Ignored for destinations that are
/// already open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OpenMode {
    /// Open an existing file for reading.
    #[default]
    Read,
    /// Create or truncate, then write.
    Write,
    /// Create if needed, append on write.
    Append,
    /// Open an existing file for reading and writing.
    ReadWrite,
}

impl OpenMode {
    fn options(self) -> OpenOptions {
        let mut options = OpenOptions::new();
        match self {
            OpenMode::Read => options.read(true),
            OpenMode::Write => options.write(true).create(true).truncate(true),
            OpenMode::Append => options.append(true).create(true),
            OpenMode::ReadWrite => options.read(true).write(true),
        };
        options
    }
}

/// Scope-managed NRML file that accepts either a path or an already-open
/// stream, and behaves like a file while it lives.
///
/// Dropping the wrapper closes whatever handle it holds. That includes
/// streams the caller opened and passed in: the wrapper takes ownership
/// on entry, so the handle is gone once the scope ends. This matches the
/// historical contract and is kept for compatibility; pass a path when
/// the stream must stay usable afterwards.
pub struct NrmlFile {
    stream: Box<dyn Stream>,
}

impl std::fmt::Debug for NrmlFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NrmlFile").finish_non_exhaustive()
    }
}

impl NrmlFile {
    /// Enter the scope: open `dest` if it is a path, adopt it if it is a
    /// stream. `mode` only applies to paths.
    pub fn open(dest: impl Into<Destination>, mode: OpenMode) -> io::Result<Self> {
        let stream: Box<dyn Stream> = match dest.into() {
            Destination::Path(path) => Box::new(mode.options().open(path)?),
            Destination::Stream(stream) => stream,
        };
        Ok(Self { stream })
    }

    /// Flush and close, surfacing flush errors that a plain drop would
    /// swallow.
    pub fn close(mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

impl Read for NrmlFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

impl Write for NrmlFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}
