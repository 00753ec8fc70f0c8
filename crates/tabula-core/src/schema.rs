//! Table schemas and generated Rust source.
//!
//! [`SchemaGenerator::build_schema`] derives the field and key shape of a
//! table from its header row, type row, and `Name` column.
//! [`SchemaGenerator::generate`] renders that shape as Rust source: a key enum,
//! a typed entry struct with accessors, and a [`TypedTable`] alias. The output
//! carries no timestamps, so regenerating from an unchanged sheet yields the
//! same bytes and [`write_artifact`] can skip the write.
//!
//! [`TypedTable`]: crate::record::TypedTable

use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;

use convert_case::{Case, Casing};
use log::{debug, info};

use crate::error::{Location, TableError};
use crate::raw::RawTable;
use crate::resolver::{ResolveError, TypeResolver};
use crate::types::{PrimitiveKind, TypeDescriptor};

/// Suffix of the generated key enum: `Heroes` -> `HeroesNames`.
pub const KEY_ENUM_SUFFIX: &str = "Names";

/// Suffix of the generated entry struct: `Heroes` -> `HeroesEntry`.
pub const ENTRY_SUFFIX: &str = "Entry";

const RECORD_PATH: &str = "::tabula_core::record";
const TABLE_PATH: &str = "::tabula_core::table";
const VALUE_PATH: &str = "::tabula_core::value";

// ===========================================================================
// Schema types
// ===========================================================================

/// One column of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Header text, as written in the sheet.
    pub name: String,
    /// Type token, as written in the sheet.
    pub type_name: String,
    pub resolved_type: TypeDescriptor,
    /// 0-based grid column.
    pub column: usize,
}

/// Field and key shape of one table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    pub table_name: String,
    pub namespace: String,
    /// File name of the source sheet, for the generated header comment.
    pub source_name: String,
    /// Fields in column order.
    pub fields: Vec<FieldDescriptor>,
    /// Row keys in data-row order. The key ordinal is the index.
    pub keys: Vec<String>,
    /// 0-based grid column holding the keys.
    pub key_column: usize,
}

impl TableSchema {
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn key_ordinal(&self, key: &str) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

// ===========================================================================
// Naming
// ===========================================================================

/// Private field name for a header: first character lower-cased.
pub fn to_field_name(header: &str) -> String {
    let mut chars = header.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Public accessor name for a header: first character upper-cased.
pub fn to_property_name(header: &str) -> String {
    let mut chars = header.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Strict and reserved keywords of the 2024 edition.
const RUST_KEYWORDS: &[&str] = &[
    "Self", "abstract", "as", "async", "await", "become", "box", "break", "const", "continue",
    "crate", "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if",
    "impl", "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv",
    "pub", "ref", "return", "self", "static", "struct", "super", "trait", "true", "try", "type",
    "typeof", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Whether `name` can be used verbatim as a Rust item, field, or variant name.
pub fn is_rust_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first == '_' || unicode_ident::is_xid_start(first))
        && chars.all(unicode_ident::is_xid_continue)
        && name != "_"
        && !RUST_KEYWORDS.contains(&name)
}

/// Module path for a namespace: `Game.Data` and `game::data` both give
/// `["game", "data"]`.
pub fn namespace_modules(namespace: &str) -> Vec<String> {
    if namespace.trim().is_empty() {
        return Vec::new();
    }
    namespace
        .replace("::", ".")
        .split('.')
        .map(|segment| segment.trim().to_case(Case::Snake))
        .collect()
}

// ===========================================================================
// SchemaGenerator
// ===========================================================================

/// Derives schemas from raw tables and renders them as Rust source.
pub struct SchemaGenerator;

impl SchemaGenerator {
    /// Build the schema of `raw`.
    pub fn build_schema(
        namespace: &str,
        raw: &RawTable,
        resolver: &TypeResolver<'_>,
    ) -> Result<TableSchema, TableError> {
        let file = raw.path();
        if raw.row_count() < 2 {
            return Err(TableError::schema(
                Location::file(file),
                "table needs a header row and a type row",
            ));
        }

        let headers = raw.row(0);
        let types = raw.row(1);
        if headers.len() != types.len() {
            let (longer, column) = if headers.len() > types.len() {
                (headers, types.len())
            } else {
                (types, headers.len())
            };
            return Err(TableError::schema(
                Location::cell(file, &longer[column]),
                format!(
                    "header row has {} columns but type row has {}",
                    headers.len(),
                    types.len()
                ),
            ));
        }

        let mut fields = Vec::with_capacity(headers.len());
        let mut seen: HashMap<String, usize> = HashMap::new();
        for (column, (header, token)) in headers.iter().zip(types).enumerate() {
            if header.data.is_empty() {
                return Err(TableError::schema(
                    Location::cell(file, header),
                    "field name is empty",
                ));
            }
            if let Some(first) = seen.insert(to_field_name(&header.data), header.column) {
                return Err(TableError::schema(
                    Location::cell(file, header),
                    format!(
                        "field '{}' collides with column {first}",
                        header.data
                    ),
                ));
            }

            let resolved_type = resolver.resolve(&token.data).map_err(|e| match e {
                ResolveError::UnknownType { type_name } => TableError::UnknownType {
                    location: Location::cell(file, token),
                    type_name,
                },
                ResolveError::EmptyTypeName => TableError::schema(
                    Location::cell(file, token),
                    format!("field '{}' has no type", header.data),
                ),
            })?;

            fields.push(FieldDescriptor {
                name: header.data.clone(),
                type_name: token.data.clone(),
                resolved_type,
                column,
            });
        }

        let key_column = raw.key_column().ok_or_else(|| {
            TableError::schema(Location::file(file), "missing 'Name' key column")
        })?;

        let mut keys = Vec::with_capacity(raw.data_row_count());
        let mut first_rows: HashMap<&str, usize> = HashMap::new();
        for row in &raw.rows()[2..] {
            let row_number = row.first().map(|c| c.row).unwrap_or_default();
            let location = Location::at(file, row_number, key_column + 1);
            let key = row.get(key_column).map(|c| c.data.as_str()).unwrap_or("");
            if key.is_empty() {
                return Err(TableError::schema(location, "row has an empty key"));
            }
            if let Some(first) = first_rows.insert(key, row_number) {
                return Err(TableError::schema(
                    location,
                    format!("duplicate key '{key}' (first defined at row {first})"),
                ));
            }
            keys.push(key.to_string());
        }

        let schema = TableSchema {
            table_name: raw.table_name(),
            namespace: namespace.to_string(),
            source_name: file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            fields,
            keys,
            key_column,
        };
        debug!(
            "schema for {}: {} fields, {} keys",
            schema.table_name,
            schema.fields.len(),
            schema.keys.len()
        );
        Ok(schema)
    }

    /// Build the schema of `raw` and render it as Rust source.
    pub fn generate(
        namespace: &str,
        raw: &RawTable,
        resolver: &TypeResolver<'_>,
    ) -> Result<String, TableError> {
        let schema = Self::build_schema(namespace, raw, resolver)?;
        Self::emit(&schema, raw)
    }

    /// Check that every generated name is a usable identifier, then render.
    ///
    /// `raw` must be the table `schema` was built from; it supplies error
    /// positions.
    pub fn emit(schema: &TableSchema, raw: &RawTable) -> Result<String, TableError> {
        Self::check_identifiers(schema, raw)?;
        Ok(Self::render(schema))
    }

    fn check_identifiers(schema: &TableSchema, raw: &RawTable) -> Result<(), TableError> {
        let file = raw.path();
        if !is_rust_identifier(&schema.table_name) {
            return Err(TableError::schema(
                Location::file(file),
                format!(
                    "table name '{}' is not a valid Rust identifier",
                    schema.table_name
                ),
            ));
        }
        for module in namespace_modules(&schema.namespace) {
            if !is_rust_identifier(&module) {
                return Err(TableError::schema(
                    Location::file(file),
                    format!(
                        "namespace '{}' does not map to Rust modules ('{module}')",
                        schema.namespace
                    ),
                ));
            }
        }
        for field in &schema.fields {
            let name = to_field_name(&field.name);
            if !is_rust_identifier(&name) || !is_rust_identifier(&to_property_name(&field.name)) {
                let location = raw
                    .cell(0, field.column)
                    .map(|c| Location::cell(file, c))
                    .unwrap_or_else(|| Location::file(file));
                return Err(TableError::schema(
                    location,
                    format!("field '{}' is not a valid Rust identifier", field.name),
                ));
            }
        }
        for (ordinal, key) in schema.keys.iter().enumerate() {
            if !is_rust_identifier(key) {
                let location = raw
                    .cell(ordinal + 2, schema.key_column)
                    .map(|c| Location::cell(file, c))
                    .unwrap_or_else(|| Location::file(file));
                return Err(TableError::schema(
                    location,
                    format!("key '{key}' is not a valid Rust identifier"),
                ));
            }
        }
        Ok(())
    }

    /// Render `schema` as Rust source. Names are assumed valid.
    pub fn render(schema: &TableSchema) -> String {
        let table = &schema.table_name;
        let names = format!("{table}{KEY_ENUM_SUFFIX}");
        let entry = format!("{table}{ENTRY_SUFFIX}");
        let modules = namespace_modules(&schema.namespace);

        let mut w = CodeWriter::default();
        w.line(&format!(
            "// Generated by tabula from {}. Do not edit.",
            schema.source_name
        ));
        w.blank();
        for module in &modules {
            w.open(&format!("pub mod {module}"));
        }

        // Key enum
        w.line("#[allow(non_camel_case_types)]");
        w.line("#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]");
        w.open(&format!("pub enum {names}"));
        for (ordinal, key) in schema.keys.iter().enumerate() {
            w.line(&format!("{key} = {ordinal},"));
        }
        w.close("");
        w.blank();
        w.open(&format!("impl {RECORD_PATH}::TableKey for {names}"));
        w.line(&format!(
            "const NAMES: &'static [&'static str] = &[{}];",
            quoted_list(schema.keys.iter().map(String::as_str))
        ));
        w.blank();
        w.open("fn ordinal(self) -> usize");
        w.line(if schema.keys.is_empty() {
            "match self {}"
        } else {
            "self as usize"
        });
        w.close("");
        w.close("");
        w.blank();

        // Entry struct
        w.line("#[allow(non_snake_case)]");
        w.line("#[derive(Debug, Clone)]");
        w.open(&format!("pub struct {entry}"));
        for field in &schema.fields {
            w.line(&format!(
                "{}: {},",
                to_field_name(&field.name),
                rust_type(&field.resolved_type)
            ));
        }
        w.close("");
        w.blank();

        w.line("#[allow(non_snake_case)]");
        w.open(&format!("impl {entry}"));
        for (i, field) in schema.fields.iter().enumerate() {
            if i > 0 {
                w.blank();
            }
            let (ret, body) = accessor(&field.resolved_type, &to_field_name(&field.name));
            w.open(&format!(
                "pub fn {}(&self) -> {ret}",
                to_property_name(&field.name)
            ));
            w.line(&body);
            w.close("");
        }
        w.close("");
        w.blank();

        // Record impl
        w.open(&format!("impl {RECORD_PATH}::Record for {entry}"));
        w.line(&format!("type Key = {names};"));
        w.blank();
        w.line(&format!("const TABLE_NAME: &'static str = {table:?};"));
        w.line(&format!(
            "const FIELDS: &'static [&'static str] = &[{}];",
            quoted_list(schema.field_names())
        ));
        w.blank();
        w.open(&format!(
            "fn from_entry(entry: &{TABLE_PATH}::Entry) -> Result<Self, {RECORD_PATH}::DecodeError>"
        ));
        w.open("Ok(Self");
        for (i, field) in schema.fields.iter().enumerate() {
            w.line(&format!(
                "{}: {}?,",
                to_field_name(&field.name),
                decode_expr(&field.resolved_type, &format!("entry.field({i})?"))
            ));
        }
        w.close(")");
        w.close("");
        w.close("");
        w.blank();

        w.line(&format!(
            "pub type {table} = {RECORD_PATH}::TypedTable<{entry}>;"
        ));
        for _ in &modules {
            w.close("");
        }
        w.finish()
    }
}

/// Write `text` to `path` unless the file already holds exactly that text.
///
/// Returns whether the file was written.
pub fn write_artifact(path: &Path, text: &str) -> Result<bool, TableError> {
    match std::fs::read_to_string(path) {
        Ok(existing) if existing == text => {
            debug!("schema artifact {} is up to date", path.display());
            return Ok(false);
        }
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(TableError::io(path, e)),
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| TableError::io(parent, e))?;
        }
    }
    std::fs::write(path, text).map_err(|e| TableError::io(path, e))?;
    info!("regenerated schema artifact {}", path.display());
    Ok(true)
}

// ===========================================================================
// Rendering helpers
// ===========================================================================

fn rust_type(ty: &TypeDescriptor) -> String {
    match ty {
        TypeDescriptor::Primitive(kind) => kind.rust_type().to_string(),
        TypeDescriptor::Enum(e) => e.rust_path.clone(),
        TypeDescriptor::Array(inner) => format!("Vec<{}>", rust_type(inner)),
        TypeDescriptor::Composite(kind) => format!("{VALUE_PATH}::{}", kind.name()),
        TypeDescriptor::AssetReference(_) => format!("Option<{VALUE_PATH}::AssetHandle>"),
        TypeDescriptor::Record(r) => r.rust_path.clone(),
    }
}

/// Return type and body of the accessor for a field.
fn accessor(ty: &TypeDescriptor, field: &str) -> (String, String) {
    match ty {
        _ if ty.is_copy() => (rust_type(ty), format!("self.{field}")),
        TypeDescriptor::Primitive(PrimitiveKind::String) => {
            ("&str".to_string(), format!("&self.{field}"))
        }
        TypeDescriptor::Array(inner) => (
            format!("&[{}]", rust_type(inner)),
            format!("&self.{field}"),
        ),
        TypeDescriptor::AssetReference(_) => (
            format!("Option<&{VALUE_PATH}::AssetHandle>"),
            format!("self.{field}.as_ref()"),
        ),
        _ => (format!("&{}", rust_type(ty)), format!("&self.{field}")),
    }
}

/// Expression decoding `value` (a `&Value`) into the field's Rust type.
fn decode_expr(ty: &TypeDescriptor, value: &str) -> String {
    match ty {
        TypeDescriptor::Array(inner) => format!(
            "{RECORD_PATH}::decode_list({value}, |v| {})",
            decode_expr(inner, "v")
        ),
        TypeDescriptor::Enum(e) => {
            format!("{RECORD_PATH}::decode_enum::<{}>({value})", e.rust_path)
        }
        _ => format!("{RECORD_PATH}::decode::<{}>({value})", rust_type(ty)),
    }
}

fn quoted_list<'a>(items: impl Iterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for (i, item) in items.enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        let _ = write!(out, "{item:?}");
    }
    out
}

/// Line-oriented source writer with four-space indentation.
#[derive(Default)]
struct CodeWriter {
    out: String,
    depth: usize,
}

impl CodeWriter {
    fn line(&mut self, text: &str) {
        for _ in 0..self.depth {
            self.out.push_str("    ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn open(&mut self, head: &str) {
        self.line(&format!("{head} {{"));
        self.depth += 1;
    }

    fn close(&mut self, suffix: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.line(&format!("}}{suffix}"));
    }

    fn finish(self) -> String {
        self.out
    }
}

// ===========================================================================
// Tests
// ===========================================================================
