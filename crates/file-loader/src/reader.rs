//! Error types, file formats and read sources
//!
//! Format selection is extension based: the suffix after the last `.` of the
//! file name picks the reader. Matching is case-sensitive.

use crate::table::Table;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while loading a table
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("XLSX error: {0}")]
    Xlsx(#[from] calamine::XlsxError),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Invalid value {value:?} in column {column}: expected {expected}")]
    InvalidValue {
        column: String,
        value: String,
        expected: String,
    },

    #[error("Invalid options: {0}")]
    Config(String),
}

/// Result type for loader operations
pub type LoaderResult<T> = Result<T, LoaderError>;

/// Tabular file formats the loader can dispatch to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    Csv,
    Parquet,
    Xlsx,
}

impl FileFormat {
    /// Map an extension (without the dot) to a format
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            "csv" => Some(FileFormat::Csv),
            "parquet" => Some(FileFormat::Parquet),
            "xlsx" => Some(FileFormat::Xlsx),
            _ => None,
        }
    }

    /// Detect the format of a path from its extension
    pub fn from_path(path: impl AsRef<Path>) -> LoaderResult<Self> {
        let extension = extension_of(path.as_ref());
        Self::from_extension(&extension).ok_or_else(|| {
            LoaderError::UnsupportedFormat(if extension.is_empty() {
                format!("no extension in {}", path.as_ref().display())
            } else {
                extension
            })
        })
    }

    /// The canonical extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            FileFormat::Csv => "csv",
            FileFormat::Parquet => "parquet",
            FileFormat::Xlsx => "xlsx",
        }
    }
}

impl fmt::Display for FileFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FileFormat::Csv => "CSV",
            FileFormat::Parquet => "Parquet",
            FileFormat::Xlsx => "XLSX",
        };
        f.write_str(name)
    }
}

/// Extract the suffix after the last `.` of the file name.
///
/// Returns an empty string when the name has no `.` at all. A leading dot
/// counts, so `.csv` has the extension `csv`.
pub fn extension_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy())
        .and_then(|name| name.rsplit_once('.').map(|(_, ext)| ext.to_string()))
        .unwrap_or_default()
}

/// Trait implemented by the per-format readers
///
/// A reader is configured with its options up front and then reads one
/// source fully into memory.
pub trait TableReader {
    /// Read the whole source into a table
    fn read(&self, source: Source) -> LoaderResult<Table>;
}

/// A boxed reader for dynamic dispatch
pub type BoxedReader = Box<dyn TableReader>;

/// List supported file extensions
pub fn supported_extensions() -> Vec<&'static str> {
    vec![
        FileFormat::Csv.extension(),
        FileFormat::Parquet.extension(),
        FileFormat::Xlsx.extension(),
    ]
}

/// Where a reader takes its bytes from
pub enum Source {
    /// A file on disk
    Path(PathBuf),
    /// An in-memory buffer
    Bytes(Vec<u8>),
    /// An already-open stream, read to the end
    Reader(Box<dyn Read + Send>),
}

impl Source {
    /// Open the source as a byte stream
    pub(crate) fn into_reader(self) -> LoaderResult<Box<dyn Read + Send>> {
        Ok(match self {
            Source::Path(path) => Box::new(std::fs::File::open(path)?),
            Source::Bytes(bytes) => Box::new(std::io::Cursor::new(bytes)),
            Source::Reader(reader) => reader,
        })
    }

    /// Read the whole source into memory
    pub(crate) fn into_bytes(self) -> LoaderResult<Vec<u8>> {
        match self {
            Source::Path(path) => Ok(std::fs::read(path)?),
            Source::Bytes(bytes) => Ok(bytes),
            Source::Reader(mut reader) => {
                let mut buffer = Vec::new();
                reader.read_to_end(&mut buffer)?;
                Ok(buffer)
            }
        }
    }

    /// Short description used in log lines
    pub(crate) fn describe(&self) -> String {
        match self {
            Source::Path(path) => path.display().to_string(),
            Source::Bytes(bytes) => format!("<{} bytes>", bytes.len()),
            Source::Reader(_) => "<reader>".to_string(),
        }
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Path(path) => f.debug_tuple("Path").field(path).finish(),
            Source::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Source::Reader(_) => f.write_str("Reader(..)"),
        }
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

impl From<Vec<u8>> for Source {
    fn from(bytes: Vec<u8>) -> Self {
        Source::Bytes(bytes)
    }
}
