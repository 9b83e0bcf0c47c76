//! file-loader - Load tabular files by extension
//!
//! A [`Loader`] is built from a file path and reads it with the reader its
//! extension selects:
//!
//! - **CSV** (`.csv`): delimiter, header, NA markers and type inference
//! - **Parquet** (`.parquet`): column projection, types from the file schema
//! - **XLSX** (`.xlsx`): sheet selection, integral numbers as integers
//!
//! Every reader returns the same in-memory [`Table`]. Matching is
//! case-sensitive and happens when a read is attempted, not at construction.

pub mod csv_reader;
pub mod loader;
pub mod options;
pub mod parquet_reader;
pub mod reader;
pub mod table;
pub mod xlsx_reader;

pub use loader::Loader;
pub use options::*;
pub use reader::*;
pub use table::*;
