//! Reader options
//!
//! `ReadOptions` bundles the options for every format; the loader hands the
//! part matching the dispatched format to the reader and ignores the rest.
//! Options can be built in code or loaded from TOML:
//!
//! ```toml
//! [csv]
//! delimiter = ";"
//! has_header = true
//! na_values = ["-"]
//!
//! [csv.dtypes]
//! zip = "string"
//!
//! [parquet]
//! columns = ["ID", "Name"]
//!
//! [xlsx]
//! sheet = "Results"
//! n_rows = 100
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::reader::{LoaderError, LoaderResult, Source};
use crate::table::ColumnType;

/// Options for a read, covering all formats
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadOptions {
    /// Data to read instead of the loader's own path
    #[serde(skip)]
    pub source: Option<Source>,
    pub csv: CsvOptions,
    pub parquet: ParquetOptions,
    pub xlsx: XlsxOptions,
}

impl ReadOptions {
    /// Create options with every format at its defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Read from `source` instead of the loader's path
    pub fn with_source(mut self, source: impl Into<Source>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_csv(mut self, csv: CsvOptions) -> Self {
        self.csv = csv;
        self
    }

    pub fn with_parquet(mut self, parquet: ParquetOptions) -> Self {
        self.parquet = parquet;
        self
    }

    pub fn with_xlsx(mut self, xlsx: XlsxOptions) -> Self {
        self.xlsx = xlsx;
        self
    }

    /// Parse options from a TOML document
    pub fn from_toml_str(content: &str) -> LoaderResult<Self> {
        toml::from_str(content).map_err(|e| LoaderError::Config(e.to_string()))
    }

    /// Load options from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> LoaderResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| LoaderError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&content)
    }
}

/// CSV reader options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    /// Field delimiter, a single ASCII character
    pub delimiter: char,
    pub quote: char,
    /// Treat the first row (after `skip_rows`) as column names
    pub has_header: bool,
    /// Column names to use instead of the header row
    pub names: Option<Vec<String>>,
    /// Lines to skip before the header or first record
    pub skip_rows: usize,
    /// Maximum number of records to read
    pub n_rows: Option<usize>,
    /// Columns to keep, in this order
    pub use_columns: Option<Vec<String>>,
    /// Column types that override inference
    pub dtypes: BTreeMap<String, ColumnType>,
    /// Extra strings read as null
    pub na_values: Vec<String>,
    /// Also read the built-in markers (`NA`, `NaN`, `null`, ...) as null
    pub keep_default_na: bool,
    /// Lines starting with this character are ignored
    pub comment: Option<char>,
    /// Allow records with differing field counts
    pub flexible: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: ',',
            quote: '"',
            has_header: true,
            names: None,
            skip_rows: 0,
            n_rows: None,
            use_columns: None,
            dtypes: BTreeMap::new(),
            na_values: Vec::new(),
            keep_default_na: true,
            comment: None,
            flexible: false,
        }
    }
}

impl CsvOptions {
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_quote(mut self, quote: char) -> Self {
        self.quote = quote;
        self
    }

    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    pub fn with_names<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_skip_rows(mut self, skip_rows: usize) -> Self {
        self.skip_rows = skip_rows;
        self
    }

    pub fn with_n_rows(mut self, n_rows: usize) -> Self {
        self.n_rows = Some(n_rows);
        self
    }

    pub fn with_columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.use_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_dtype(mut self, column: impl Into<String>, dtype: ColumnType) -> Self {
        self.dtypes.insert(column.into(), dtype);
        self
    }

    pub fn with_na_value(mut self, marker: impl Into<String>) -> Self {
        self.na_values.push(marker.into());
        self
    }

    pub fn with_default_na(mut self, keep_default_na: bool) -> Self {
        self.keep_default_na = keep_default_na;
        self
    }

    pub fn with_comment(mut self, comment: char) -> Self {
        self.comment = Some(comment);
        self
    }

    pub fn with_flexible(mut self, flexible: bool) -> Self {
        self.flexible = flexible;
        self
    }
}

/// Parquet reader options
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParquetOptions {
    /// Columns to project, in this order
    pub columns: Option<Vec<String>>,
    /// Maximum number of rows to read
    pub n_rows: Option<usize>,
}

impl ParquetOptions {
    pub fn with_columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_n_rows(mut self, n_rows: usize) -> Self {
        self.n_rows = Some(n_rows);
        self
    }
}

/// Which worksheet to read
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SheetSelector {
    /// Zero-based position in the workbook
    Index(usize),
    Name(String),
}

impl Default for SheetSelector {
    fn default() -> Self {
        SheetSelector::Index(0)
    }
}

impl From<usize> for SheetSelector {
    fn from(index: usize) -> Self {
        SheetSelector::Index(index)
    }
}

impl From<&str> for SheetSelector {
    fn from(name: &str) -> Self {
        SheetSelector::Name(name.to_string())
    }
}

/// XLSX reader options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct XlsxOptions {
    pub sheet: SheetSelector,
    /// Treat the first row (after `skip_rows`) as column names
    pub has_header: bool,
    /// Rows to skip at the top of the used range
    pub skip_rows: usize,
    /// Maximum number of data rows to read
    pub n_rows: Option<usize>,
    /// Columns to keep, in this order
    pub use_columns: Option<Vec<String>>,
    /// Column types that override inference
    pub dtypes: BTreeMap<String, ColumnType>,
}

impl Default for XlsxOptions {
    fn default() -> Self {
        Self {
            sheet: SheetSelector::default(),
            has_header: true,
            skip_rows: 0,
            n_rows: None,
            use_columns: None,
            dtypes: BTreeMap::new(),
        }
    }
}

impl XlsxOptions {
    pub fn with_sheet(mut self, sheet: impl Into<SheetSelector>) -> Self {
        self.sheet = sheet.into();
        self
    }

    pub fn with_header(mut self, has_header: bool) -> Self {
        self.has_header = has_header;
        self
    }

    pub fn with_skip_rows(mut self, skip_rows: usize) -> Self {
        self.skip_rows = skip_rows;
        self
    }

    pub fn with_n_rows(mut self, n_rows: usize) -> Self {
        self.n_rows = Some(n_rows);
        self
    }

    pub fn with_columns<S: Into<String>>(mut self, columns: impl IntoIterator<Item = S>) -> Self {
        self.use_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_dtype(mut self, column: impl Into<String>, dtype: ColumnType) -> Self {
        self.dtypes.insert(column.into(), dtype);
        self
    }
}
