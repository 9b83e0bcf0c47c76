//! Apache Parquet file reader
//!
//! Reads through the `parquet` record API. Column types follow the file
//! schema: booleans, integers and floats keep their kind. Unsigned 64-bit
//! integers, strings, dates, decimals and nested groups are rendered as text.

use crate::options::ParquetOptions;
use crate::reader::{LoaderError, LoaderResult, Source, TableReader};
use crate::table::{Column, ColumnData, ColumnType, Table, Value};
use bytes::Bytes;
use parquet::basic::{ConvertedType, LogicalType, Type as PhysicalType};
use parquet::file::reader::{ChunkReader, FileReader, SerializedFileReader};
use parquet::record::Field;
use parquet::schema::types::{Type, TypePtr};
use std::collections::HashMap;
use std::fs::File;

/// Parquet file reader
pub struct ParquetReader {
    options: ParquetOptions,
}

impl ParquetReader {
    /// Create a reader with the given projection and row limit
    pub fn new(options: ParquetOptions) -> Self {
        Self { options }
    }

    fn read_from<R: ChunkReader + 'static>(&self, reader: SerializedFileReader<R>) -> LoaderResult<Table> {
        let root = reader.metadata().file_metadata().schema();
        let fields = self.project(root.get_fields())?;
        let projection = Type::group_type_builder(root.name())
            .with_fields(fields.clone())
            .build()?;

        let index: HashMap<&str, usize> = fields
            .iter()
            .enumerate()
            .map(|(i, field)| (field.name(), i))
            .collect();
        let mut columns: Vec<ColumnData> = fields
            .iter()
            .map(|field| ColumnData::new(column_type(field)))
            .collect();

        let limit = self.options.n_rows.unwrap_or(usize::MAX);
        for row in reader.get_row_iter(Some(projection))?.take(limit) {
            let row = row?;
            for (name, field) in row.get_column_iter() {
                let Some(&i) = index.get(name.as_str()) else {
                    continue;
                };
                let column = &mut columns[i];
                let expected = column.dtype();
                column
                    .push(field_value(field))
                    .map_err(|value| LoaderError::InvalidValue {
                        column: name.clone(),
                        value: value.to_string(),
                        expected: expected.to_string(),
                    })?;
            }
        }

        Table::new(
            fields
                .iter()
                .zip(columns)
                .map(|(field, data)| Column::new(field.name(), data))
                .collect(),
        )
    }

    /// Top-level fields to read, in the requested order
    fn project(&self, fields: &[TypePtr]) -> LoaderResult<Vec<TypePtr>> {
        let Some(names) = &self.options.columns else {
            return Ok(fields.to_vec());
        };
        names
            .iter()
            .map(|name| {
                fields
                    .iter()
                    .find(|field| field.name() == name)
                    .cloned()
                    .ok_or_else(|| LoaderError::ColumnNotFound(name.clone()))
            })
            .collect()
    }
}

impl TableReader for ParquetReader {
    fn read(&self, source: Source) -> LoaderResult<Table> {
        let description = source.describe();
        let table = match source {
            Source::Path(path) => self.read_from(SerializedFileReader::new(File::open(path)?)?)?,
            other => self.read_from(SerializedFileReader::new(Bytes::from(other.into_bytes()?))?)?,
        };

        tracing::debug!(
            source = %description,
            rows = table.num_rows(),
            columns = table.num_columns(),
            "read Parquet"
        );
        Ok(table)
    }
}

/// Map a schema field to the column type its values land in
fn column_type(field: &Type) -> ColumnType {
    if !field.is_primitive() {
        return ColumnType::String;
    }

    let info = field.get_basic_info();
    // u64 values past i64::MAX only fit as text
    let unsigned_64 = info.converted_type() == ConvertedType::UINT_64
        || matches!(
            info.logical_type(),
            Some(LogicalType::Integer {
                bit_width: 64,
                is_signed: false
            })
        );
    let integer = !unsigned_64
        && matches!(info.logical_type(), None | Some(LogicalType::Integer { .. }))
        && matches!(
            info.converted_type(),
            ConvertedType::NONE
                | ConvertedType::INT_8
                | ConvertedType::INT_16
                | ConvertedType::INT_32
                | ConvertedType::INT_64
                | ConvertedType::UINT_8
                | ConvertedType::UINT_16
                | ConvertedType::UINT_32
        );

    match field.get_physical_type() {
        PhysicalType::BOOLEAN => ColumnType::Bool,
        PhysicalType::INT32 | PhysicalType::INT64 if integer => ColumnType::Int64,
        PhysicalType::FLOAT | PhysicalType::DOUBLE => ColumnType::Float64,
        _ => ColumnType::String,
    }
}

fn field_value(field: &Field) -> Value {
    match field {
        Field::Null => Value::Null,
        Field::Bool(v) => Value::Bool(*v),
        Field::Byte(v) => Value::Int64(i64::from(*v)),
        Field::Short(v) => Value::Int64(i64::from(*v)),
        Field::Int(v) => Value::Int64(i64::from(*v)),
        Field::Long(v) => Value::Int64(*v),
        Field::UByte(v) => Value::Int64(i64::from(*v)),
        Field::UShort(v) => Value::Int64(i64::from(*v)),
        Field::UInt(v) => Value::Int64(i64::from(*v)),
        Field::ULong(v) => i64::try_from(*v)
            .map(Value::Int64)
            .unwrap_or_else(|_| Value::String(v.to_string())),
        Field::Float(v) => Value::Float64(f64::from(*v)),
        Field::Double(v) => Value::Float64(*v),
        Field::Str(v) => Value::String(v.clone()),
        other => Value::String(other.to_string()),
    }
}
