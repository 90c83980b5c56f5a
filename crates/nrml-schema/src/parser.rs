//! Parser configuration and input sources.

use std::io::Read;
use std::path::{Path, PathBuf};

use libc::c_int;

use crate::ffi;

/// Controls how document sources are parsed.
///
/// The default is a permissive compatibility mode that tolerates common
/// quirks in NRML files found in the wild: CDATA sections are merged into
/// text and network access during parsing is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserConfig {
    /// Keep going past recoverable parse errors instead of failing.
    pub recover: bool,
    /// Refuse to fetch external resources over the network.
    pub no_network: bool,
    /// Merge CDATA sections into adjacent text nodes.
    pub merge_cdata: bool,
    /// Drop ignorable whitespace-only text nodes.
    pub strip_blanks: bool,
    /// Lift hard-coded parser limits for very large documents.
    pub huge: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            recover: false,
            no_network: true,
            merge_cdata: true,
            strip_blanks: false,
            huge: false,
        }
    }
}

impl ParserConfig {
    pub(crate) fn to_flags(self) -> c_int {
        let mut flags = 0;
        if self.recover {
            flags |= ffi::XML_PARSE_RECOVER;
        }
        if self.no_network {
            flags |= ffi::XML_PARSE_NONET;
        }
        if self.merge_cdata {
            flags |= ffi::XML_PARSE_NOCDATA;
        }
        if self.strip_blanks {
            flags |= ffi::XML_PARSE_NOBLANKS;
        }
        if self.huge {
            flags |= ffi::XML_PARSE_HUGE;
        }
        flags
    }
}

/// A document source: a filesystem path, or an already-open byte stream.
///
/// Path sources keep their path as the display name used in error
/// messages. Stream sources get a name derived from the stream's concrete
/// type, `"<Cursor>"` for example, since there is no path to report.
pub enum Source {
    /// Filesystem path, used verbatim in error messages.
    Path(PathBuf),
    /// Already-open stream plus the display name recorded for it.
    Reader {
        name: String,
        reader: Box<dyn Read>,
    },
}

impl Source {
    /// Wrap an open stream, recording its type name for error messages.
    pub fn from_reader<R: Read + 'static>(reader: R) -> Self {
        Source::Reader {
            name: format!("<{}>", short_type_name::<R>()),
            reader: Box::new(reader),
        }
    }

    /// Name used to prefix error messages for this source.
    pub fn display_name(&self) -> String {
        match self {
            Source::Path(path) => path.display().to_string(),
            Source::Reader { name, .. } => name.clone(),
        }
    }
}

impl std::fmt::Debug for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Source({})", self.display_name())
    }
}

impl From<PathBuf> for Source {
    fn from(path: PathBuf) -> Self {
        Source::Path(path)
    }
}

impl From<&Path> for Source {
    fn from(path: &Path) -> Self {
        Source::Path(path.to_path_buf())
    }
}

impl From<&str> for Source {
    fn from(path: &str) -> Self {
        Source::Path(PathBuf::from(path))
    }
}

impl From<String> for Source {
    fn from(path: String) -> Self {
        Source::Path(PathBuf::from(path))
    }
}

/// Base type name with module path and generic arguments stripped:
/// `std::io::cursor::Cursor<Vec<u8>>` becomes `Cursor`.
fn short_type_name<T>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn default_config_is_compat_mode() {
        let config = ParserConfig::default();
        assert!(config.no_network);
        assert!(config.merge_cdata);
        assert!(!config.recover);
        assert_eq!(
            config.to_flags(),
            ffi::XML_PARSE_NONET | ffi::XML_PARSE_NOCDATA
        );
    }

    #[test]
    fn path_source_displays_verbatim() {
        let source = Source::from("/data/job/exposure.xml");
        assert_eq!(source.display_name(), "/data/job/exposure.xml");
    }

    #[test]
    fn reader_source_displays_type_name() {
        let source = Source::from_reader(Cursor::new(b"<nrml/>".to_vec()));
        assert_eq!(source.display_name(), "<Cursor>");
    }

    #[test]
    fn reader_source_strips_module_path() {
        let file_backed = Source::from_reader(std::io::empty());
        assert_eq!(file_backed.display_name(), "<Empty>");
    }
}
