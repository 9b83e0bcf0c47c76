//! The `Loader`: extension dispatch over the format readers

use std::path::{Path, PathBuf};

use crate::csv_reader::CsvReader;
use crate::options::ReadOptions;
use crate::parquet_reader::ParquetReader;
use crate::reader::{extension_of, BoxedReader, FileFormat, LoaderResult, Source};
use crate::table::Table;
use crate::xlsx_reader::XlsxReader;

/// Loads a tabular file, picking the reader from the file extension.
///
/// The path is only inspected when a read is attempted, so constructing a
/// loader for a missing or unsupported file always succeeds.
///
/// ```no_run
/// use file_loader::{CsvOptions, Loader, ReadOptions};
///
/// # fn main() -> Result<(), file_loader::LoaderError> {
/// let loader = Loader::new("data.csv");
/// let options = ReadOptions::new().with_csv(CsvOptions::default().with_delimiter(';'));
/// let table = loader.read_file(options)?;
/// println!("rows={}", table.num_rows());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loader {
    path: PathBuf,
}

impl Loader {
    /// Create a loader for `path`. Nothing is opened until a read.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The path or file name this loader was built with
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Suffix after the last `.` of the file name, empty if there is none
    pub fn extension(&self) -> String {
        extension_of(&self.path)
    }

    /// Format selected by the extension
    pub fn format(&self) -> LoaderResult<FileFormat> {
        FileFormat::from_path(&self.path)
    }

    /// Read the file with the reader its extension selects.
    ///
    /// Only the options for the selected format are used. When
    /// `options.source` is set, that source is read instead of the
    /// loader's path; dispatch still follows the loader's path.
    pub fn read_file(&self, options: ReadOptions) -> LoaderResult<Table> {
        let format = self.format().map_err(|e| {
            tracing::warn!(path = %self.path.display(), "no reader for file extension");
            e
        })?;
        tracing::debug!(path = %self.path.display(), %format, "dispatching read");
        self.read_as(format, options)
    }

    /// Read as CSV, bypassing dispatch.
    ///
    /// The loader's extension must still be a supported one, otherwise this
    /// fails with [`UnsupportedFormat`](crate::LoaderError::UnsupportedFormat).
    /// A `data.parquet` loader can read CSV from `options.source`.
    pub fn read_csv(&self, options: ReadOptions) -> LoaderResult<Table> {
        self.format()?;
        self.read_as(FileFormat::Csv, options)
    }

    /// Read as Parquet, bypassing dispatch
    pub fn read_parquet(&self, options: ReadOptions) -> LoaderResult<Table> {
        self.format()?;
        self.read_as(FileFormat::Parquet, options)
    }

    /// Read as XLSX, bypassing dispatch
    pub fn read_xlsx(&self, options: ReadOptions) -> LoaderResult<Table> {
        self.format()?;
        self.read_as(FileFormat::Xlsx, options)
    }

    fn read_as(&self, format: FileFormat, options: ReadOptions) -> LoaderResult<Table> {
        let source = options
            .source
            .unwrap_or_else(|| Source::Path(self.path.clone()));

        let reader: BoxedReader = match format {
            FileFormat::Csv => Box::new(CsvReader::new(options.csv)),
            FileFormat::Parquet => Box::new(ParquetReader::new(options.parquet)),
            FileFormat::Xlsx => Box::new(XlsxReader::new(options.xlsx)),
        };
        reader.read(source)
    }
}
