//! Tabula Core -- compiles spreadsheet tables into typed game data.
//!
//! A sheet's first row names the fields, its second row gives each field's
//! type token, and every following row is one entry. The `Name` column
//! (typed `string`) supplies the row keys. Rows whose first cell is empty or
//! starts with `#` are ignored.
//!
//! # Pipeline
//!
//! [`compiler::TableCompiler::compile`] runs each sheet through:
//!
//! 1. **Load** -- [`raw::RawTable`] reads CSV or workbook cells with their
//!    source positions.
//! 2. **Validate** -- the table must have a string `Name` column.
//! 3. **Schema** -- [`schema::SchemaGenerator`] resolves every type token
//!    through a [`resolver::TypeResolver`] and collects the row keys. When a
//!    schema artifact is configured, the generated Rust source is written if
//!    it changed.
//! 4. **Bind** -- a [`compiler::BindPlan`] converts every cell with
//!    [`convert::ValueConverter`].
//!
//! Every error that leaves the compiler names the source file and, when it
//! concerns a cell, its 1-based row and column.
//!
//! # Key Types
//!
//! - [`types::TypeDescriptor`] -- Resolved column type: primitive, enum,
//!   array, vector composite, asset reference, or record.
//! - [`catalog::TypeCatalog`] -- User-registered enums, asset kinds, and
//!   record types, searched after the built-ins.
//! - [`value::Value`] -- One converted cell.
//! - [`table::CompiledTable`] -- Bound entries, indexed by row id and key.
//! - [`record::TypedTable`] -- Typed view over a compiled table, driven by
//!   generated code.
//! - [`table_set::TableSet`] -- Every table compiled from a directory.
//! - [`settings::ImportSettings`] -- Importer configuration file.

pub mod asset;
pub mod catalog;
pub mod compiler;
pub mod convert;
pub mod error;
pub mod raw;
pub mod record;
pub mod resolver;
pub mod schema;
pub mod settings;
pub mod table;
pub mod table_set;
pub mod types;
pub mod value;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

/// Re-exported for generated code, which names `Decimal` fields through it.
pub use rust_decimal;

pub use compiler::{CompileOptions, CompileOutcome, SchemaStatus, SchemaSync, TableCompiler};
pub use error::{Location, TableError};
pub use table::{CompiledTable, DataTable, Entry};
