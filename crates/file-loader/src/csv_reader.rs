//! CSV file reader with type inference

use crate::options::CsvOptions;
use crate::reader::{LoaderError, LoaderResult, Source, TableReader};
use crate::table::{cast_column, header_names, parse_bool, Column, ColumnType, Table, Value};
use std::io::{BufRead, BufReader};

/// Strings read as null unless `keep_default_na` is off
const DEFAULT_NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// CSV file reader
pub struct CsvReader {
    options: CsvOptions,
}

impl CsvReader {
    /// Create a reader with the given parsing options
    pub fn new(options: CsvOptions) -> Self {
        Self { options }
    }

    fn is_na(&self, value: &str) -> bool {
        (self.options.keep_default_na && DEFAULT_NA_VALUES.contains(&value))
            || self.options.na_values.iter().any(|na| na == value)
    }

    fn column_names(&self, header: Option<Vec<String>>, width: usize) -> Vec<String> {
        if let Some(names) = &self.options.names {
            return names.clone();
        }
        match header {
            Some(header) => header_names(header),
            None => (0..width).map(|i| i.to_string()).collect(),
        }
    }
}

impl TableReader for CsvReader {
    fn read(&self, source: Source) -> LoaderResult<Table> {
        let description = source.describe();
        let delimiter = ascii_byte(self.options.delimiter, "delimiter")?;
        let quote = ascii_byte(self.options.quote, "quote")?;
        let comment = self
            .options
            .comment
            .map(|c| ascii_byte(c, "comment"))
            .transpose()?;

        let mut input = BufReader::new(source.into_reader()?);
        skip_lines(&mut input, self.options.skip_rows)?;

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .quote(quote)
            .comment(comment)
            .has_headers(self.options.has_header)
            .flexible(self.options.flexible)
            .from_reader(input);

        let header = if self.options.has_header {
            Some(
                reader
                    .headers()?
                    .iter()
                    .map(|s| s.to_string())
                    .collect::<Vec<_>>(),
            )
        } else {
            None
        };

        let limit = self.options.n_rows.unwrap_or(usize::MAX);
        let mut records: Vec<Vec<Option<String>>> = Vec::new();
        for result in reader.records().take(limit) {
            let record = result?;
            records.push(
                record
                    .iter()
                    .map(|field| (!self.is_na(field)).then(|| field.to_string()))
                    .collect(),
            );
        }

        let width = header
            .as_ref()
            .map(Vec::len)
            .unwrap_or_else(|| records.iter().map(Vec::len).max().unwrap_or(0));
        let names = self.column_names(header, width);

        let truncated = records.iter().filter(|record| record.len() > names.len()).count();
        if truncated > 0 {
            tracing::warn!(
                source = %description,
                rows = truncated,
                columns = names.len(),
                "dropping fields beyond the named columns"
            );
        }

        let mut columns = Vec::with_capacity(names.len());
        for (index, name) in names.into_iter().enumerate() {
            let cells: Vec<Option<String>> = records
                .iter_mut()
                .map(|record| record.get_mut(index).and_then(Option::take))
                .collect();
            let dtype = match self.options.dtypes.get(&name) {
                Some(dtype) => *dtype,
                None => infer_type(&cells),
            };
            let values = cells
                .into_iter()
                .map(|cell| cell.map_or(Value::Null, Value::String))
                .collect();
            let data = cast_column(&name, values, dtype)?;
            columns.push(Column::new(name, data));
        }

        let mut table = Table::new(columns)?;
        if let Some(selected) = &self.options.use_columns {
            table = table.select(selected)?;
        }

        tracing::debug!(
            source = %description,
            rows = table.num_rows(),
            columns = table.num_columns(),
            "read CSV"
        );
        Ok(table)
    }
}

fn ascii_byte(c: char, what: &str) -> LoaderResult<u8> {
    u8::try_from(c)
        .ok()
        .filter(u8::is_ascii)
        .ok_or_else(|| LoaderError::Config(format!("{what} must be a single ASCII character, got {c:?}")))
}

fn skip_lines(input: &mut impl BufRead, count: usize) -> LoaderResult<()> {
    let mut line = Vec::new();
    for _ in 0..count {
        line.clear();
        if input.read_until(b'\n', &mut line)? == 0 {
            break;
        }
    }
    Ok(())
}

/// Infer column type from the non-null cells
fn infer_type(values: &[Option<String>]) -> ColumnType {
    let non_null: Vec<&str> = values.iter().flatten().map(String::as_str).collect();
    if non_null.is_empty() {
        return ColumnType::String;
    }

    if non_null.iter().all(|s| s.parse::<i64>().is_ok()) {
        return ColumnType::Int64;
    }

    if non_null.iter().all(|s| s.parse::<f64>().is_ok()) {
        return ColumnType::Float64;
    }

    if non_null.iter().all(|s| parse_bool(s).is_some()) {
        return ColumnType::Bool;
    }

    ColumnType::String
}
