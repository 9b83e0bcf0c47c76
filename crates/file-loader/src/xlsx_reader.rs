//! Excel (XLSX) workbook reader

use crate::options::{SheetSelector, XlsxOptions};
use crate::reader::{LoaderError, LoaderResult, Source, TableReader};
use crate::table::{cast_column, header_names, Column, ColumnData, Table, Value};
use calamine::{Data, DataType, Range, Reader, Xlsx};
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};

/// Largest magnitude at which every integral f64 is exact
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// XLSX workbook reader
pub struct XlsxReader {
    options: XlsxOptions,
}

impl XlsxReader {
    /// Create a reader for the sheet and layout in `options`
    pub fn new(options: XlsxOptions) -> Self {
        Self { options }
    }

    fn sheet_range<RS: Read + Seek>(&self, workbook: &mut Xlsx<RS>) -> LoaderResult<(String, Range<Data>)> {
        let sheet_names = workbook.sheet_names();
        let name = match &self.options.sheet {
            SheetSelector::Index(index) => sheet_names
                .get(*index)
                .cloned()
                .ok_or_else(|| LoaderError::SheetNotFound(format!("index {index}")))?,
            SheetSelector::Name(name) if sheet_names.contains(name) => name.clone(),
            SheetSelector::Name(name) => return Err(LoaderError::SheetNotFound(name.clone())),
        };
        let range = workbook.worksheet_range(&name)?;
        Ok((name, range))
    }

    fn read_workbook<RS: Read + Seek>(&self, mut workbook: Xlsx<RS>) -> LoaderResult<Table> {
        let (sheet, range) = self.sheet_range(&mut workbook)?;
        let mut rows = range.rows().skip(self.options.skip_rows);

        let header = if self.options.has_header {
            rows.next().map(|row| {
                row.iter()
                    .map(|cell| match cell {
                        Data::Empty => String::new(),
                        other => other.to_string(),
                    })
                    .collect::<Vec<_>>()
            })
        } else {
            None
        };

        let limit = self.options.n_rows.unwrap_or(usize::MAX);
        let mut cells: Vec<Vec<Value>> = vec![Vec::new(); range.width()];
        for row in rows.take(limit) {
            for (column, cell) in cells.iter_mut().zip(row) {
                column.push(cell_value(cell));
            }
        }

        let names = match header {
            Some(header) => header_names(header),
            None if self.options.has_header => Vec::new(),
            None => (0..cells.len()).map(|i| i.to_string()).collect(),
        };

        let mut columns = Vec::with_capacity(names.len());
        for (name, values) in names.into_iter().zip(cells) {
            let data = match self.options.dtypes.get(&name) {
                Some(dtype) => cast_column(&name, values, *dtype)?,
                None => ColumnData::from_values(values),
            };
            columns.push(Column::new(name, data));
        }

        let mut table = Table::new(columns)?;
        if let Some(selected) = &self.options.use_columns {
            table = table.select(selected)?;
        }

        tracing::debug!(sheet = %sheet, rows = table.num_rows(), "read worksheet");
        Ok(table)
    }
}

impl TableReader for XlsxReader {
    fn read(&self, source: Source) -> LoaderResult<Table> {
        let description = source.describe();
        let table = match source {
            Source::Path(path) => {
                let file = BufReader::new(File::open(path)?);
                self.read_workbook(Xlsx::new(file)?)?
            }
            other => self.read_workbook(Xlsx::new(Cursor::new(other.into_bytes()?))?)?,
        };

        tracing::debug!(
            source = %description,
            rows = table.num_rows(),
            columns = table.num_columns(),
            "read XLSX"
        );
        Ok(table)
    }
}

/// Convert a spreadsheet cell. Integral numbers come back as integers since
/// XLSX stores every number as a double.
fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty | Data::Error(_) => Value::Null,
        Data::Int(v) => Value::Int64(*v),
        Data::Float(v) if v.fract() == 0.0 && v.abs() <= MAX_EXACT_INTEGER => {
            Value::Int64(*v as i64)
        }
        Data::Float(v) => Value::Float64(*v),
        Data::Bool(v) => Value::Bool(*v),
        Data::String(s) if s.is_empty() => Value::Null,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Value::String(s.clone()),
        Data::DateTime(_) => cell
            .as_datetime()
            .map(|dt| Value::String(dt.to_string()))
            .unwrap_or_else(|| Value::String(cell.to_string())),
    }
}
