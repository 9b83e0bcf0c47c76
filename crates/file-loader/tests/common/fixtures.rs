//! Fixture writers for the loader integration tests

#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parquet::data_type::{BoolType, ByteArray, ByteArrayType, DoubleType, Int64Type};
use parquet::file::properties::WriterProperties;
use parquet::file::writer::SerializedFileWriter;
use parquet::schema::parser::parse_message_type;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;

/// A spreadsheet cell for fixture workbooks
#[derive(Debug, Clone, Copy)]
pub enum Cell<'a> {
    Number(f64),
    Text(&'a str),
    Bool(bool),
    Empty,
}

impl<'a> From<&'a str> for Cell<'a> {
    fn from(v: &'a str) -> Self {
        Cell::Text(v)
    }
}

/// Temporary directory holding fixture files
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Write rows as comma-joined lines
pub fn write_csv(dir: &Path, name: &str, rows: &[&[&str]]) -> PathBuf {
    let path = dir.join(name);
    let mut content = String::new();
    for row in rows {
        content.push_str(&row.join(","));
        content.push('\n');
    }
    std::fs::write(&path, content).expect("Failed to write CSV fixture");
    path
}

/// Write a Parquet file with `ID` (INT64) and `Name` (UTF8) columns
pub fn write_people_parquet(dir: &Path, name: &str, ids: &[i64], names: &[&str]) -> PathBuf {
    let path = dir.join(name);
    let schema = Arc::new(
        parse_message_type(
            "message schema {
                REQUIRED INT64 ID;
                REQUIRED BYTE_ARRAY Name (UTF8);
            }",
        )
        .unwrap(),
    );
    let props = Arc::new(WriterProperties::builder().build());
    let file = File::create(&path).unwrap();
    let mut writer = SerializedFileWriter::new(file, schema, props).unwrap();
    let mut row_group = writer.next_row_group().unwrap();

    let mut column = row_group.next_column().unwrap().unwrap();
    column
        .typed::<Int64Type>()
        .write_batch(ids, None, None)
        .unwrap();
    column.close().unwrap();

    let values: Vec<ByteArray> = names.iter().map(|n| ByteArray::from(*n)).collect();
    let mut column = row_group.next_column().unwrap().unwrap();
    column
        .typed::<ByteArrayType>()
        .write_batch(&values, None, None)
        .unwrap();
    column.close().unwrap();

    row_group.close().unwrap();
    writer.close().unwrap();
    path
}

/// Write a Parquet file with a single unsigned 64-bit column `big`
pub fn write_unsigned_parquet(dir: &Path, name: &str, values: &[u64]) -> PathBuf {
    let path = dir.join(name);
    let schema = Arc::new(
        parse_message_type(
            "message schema {
                REQUIRED INT64 big (UINT_64);
            }",
        )
        .unwrap(),
    );
    let props = Arc::new(WriterProperties::builder().build());
    let file = File::create(&path).unwrap();
    let mut writer = SerializedFileWriter::new(file, schema, props).unwrap();
    let mut row_group = writer.next_row_group().unwrap();

    // UINT_64 is stored as the INT64 bit pattern
    let raw: Vec<i64> = values.iter().map(|v| *v as i64).collect();
    let mut column = row_group.next_column().unwrap().unwrap();
    column
        .typed::<Int64Type>()
        .write_batch(&raw, None, None)
        .unwrap();
    column.close().unwrap();

    row_group.close().unwrap();
    writer.close().unwrap();
    path
}

/// Write a Parquet file with nullable `score` (DOUBLE) and `active` (BOOLEAN)
/// columns. `None` entries become nulls.
pub fn write_scores_parquet(
    dir: &Path,
    name: &str,
    scores: &[Option<f64>],
    active: &[Option<bool>],
) -> PathBuf {
    fn levels<T: Copy>(values: &[Option<T>]) -> (Vec<T>, Vec<i16>) {
        let present = values.iter().flatten().copied().collect();
        let defs = values.iter().map(|v| i16::from(v.is_some())).collect();
        (present, defs)
    }

    let path = dir.join(name);
    let schema = Arc::new(
        parse_message_type(
            "message schema {
                OPTIONAL DOUBLE score;
                OPTIONAL BOOLEAN active;
            }",
        )
        .unwrap(),
    );
    let props = Arc::new(WriterProperties::builder().build());
    let file = File::create(&path).unwrap();
    let mut writer = SerializedFileWriter::new(file, schema, props).unwrap();
    let mut row_group = writer.next_row_group().unwrap();

    let (values, defs) = levels(scores);
    let mut column = row_group.next_column().unwrap().unwrap();
    column
        .typed::<DoubleType>()
        .write_batch(&values, Some(&defs), None)
        .unwrap();
    column.close().unwrap();

    let (values, defs) = levels(active);
    let mut column = row_group.next_column().unwrap().unwrap();
    column
        .typed::<BoolType>()
        .write_batch(&values, Some(&defs), None)
        .unwrap();
    column.close().unwrap();

    row_group.close().unwrap();
    writer.close().unwrap();
    path
}

/// Build an XLSX workbook in memory, one `(sheet name, rows)` pair per sheet
pub fn xlsx_bytes(sheets: &[(&str, Vec<Vec<Cell<'_>>>)]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);

    let mut add = |name: &str, content: String| {
        zip.start_file(name, options.clone()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    };

    let mut content_types = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
    );
    let mut sheet_entries = String::new();
    let mut relationships = String::new();
    for (i, (sheet, _)) in sheets.iter().enumerate() {
        let n = i + 1;
        content_types.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{n}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        ));
        sheet_entries.push_str(&format!(
            r#"<sheet name="{}" sheetId="{n}" r:id="rId{n}"/>"#,
            escape(sheet)
        ));
        relationships.push_str(&format!(
            r#"<Relationship Id="rId{n}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet{n}.xml"/>"#
        ));
    }
    content_types.push_str("</Types>");

    add("[Content_Types].xml", content_types);
    add(
        "_rels/.rels",
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#
            .to_string(),
    );
    add(
        "xl/workbook.xml",
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets>{sheet_entries}</sheets></workbook>"#
        ),
    );
    add(
        "xl/_rels/workbook.xml.rels",
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{relationships}</Relationships>"#
        ),
    );
    for (i, (_, rows)) in sheets.iter().enumerate() {
        add(&format!("xl/worksheets/sheet{}.xml", i + 1), sheet_xml(rows));
    }

    zip.finish().unwrap().into_inner()
}

/// Write a single-sheet workbook named `Sheet1`
pub fn write_xlsx(dir: &Path, name: &str, rows: Vec<Vec<Cell<'_>>>) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, xlsx_bytes(&[("Sheet1", rows)])).expect("Failed to write XLSX fixture");
    path
}

fn sheet_xml(rows: &[Vec<Cell<'_>>]) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    for (r, row) in rows.iter().enumerate() {
        let r = r + 1;
        xml.push_str(&format!(r#"<row r="{r}">"#));
        for (c, cell) in row.iter().enumerate() {
            let reference = format!("{}{r}", char::from(b'A' + c as u8));
            match cell {
                Cell::Number(v) => xml.push_str(&format!(r#"<c r="{reference}"><v>{v}</v></c>"#)),
                Cell::Text(s) => xml.push_str(&format!(
                    r#"<c r="{reference}" t="inlineStr"><is><t>{}</t></is></c>"#,
                    escape(s)
                )),
                Cell::Bool(b) => xml.push_str(&format!(
                    r#"<c r="{reference}" t="b"><v>{}</v></c>"#,
                    u8::from(*b)
                )),
                Cell::Empty => {}
            }
        }
        xml.push_str("</row>");
    }
    xml.push_str("</sheetData></worksheet>");
    xml
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
