//! Typed access to compiled tables.
//!
//! Generated schema code implements [`Record`] for each entry struct and
//! [`TableKey`] for each key enum. [`TypedTable`] decodes a [`CompiledTable`]
//! into those structs once, after checking that the generated code and the
//! compiled data agree on fields and keys.

use std::ops::Index;

use rust_decimal::Decimal;

use crate::table::{CompiledTable, DataTable, Entry};
use crate::value::{AssetHandle, Value, Vector2, Vector2Int, Vector3, Vector3Int, Vector4};

/// Errors raised while decoding entries into generated record types.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("expected {expected} value, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("entry has no field at index {index}")]
    MissingField { index: usize },

    #[error("enum member '{member}' (ordinal {ordinal}) is not in the compiled enum")]
    UnknownMember { ordinal: usize, member: String },

    /// The generated code was produced from a different version of the sheet.
    #[error("schema of table '{table}' is stale: {detail}")]
    StaleSchema { table: String, detail: String },

    #[error("entry '{key}': {source}")]
    Entry {
        key: String,
        #[source]
        source: Box<DecodeError>,
    },
}

// ===========================================================================
// Traits implemented by generated code
// ===========================================================================

/// A generated key enum: one variant per row key, in row order.
pub trait TableKey: Copy + 'static {
    const NAMES: &'static [&'static str];

    fn ordinal(self) -> usize;

    fn name(self) -> &'static str {
        Self::NAMES[self.ordinal()]
    }
}

/// A generated entry struct.
pub trait Record: Sized {
    type Key: TableKey;

    const TABLE_NAME: &'static str;
    const FIELDS: &'static [&'static str];

    fn from_entry(entry: &Entry) -> Result<Self, DecodeError>;
}

/// A Rust enum that mirrors a catalog enum, member for member.
pub trait CatalogEnum: Copy {
    const MEMBERS: &'static [&'static str];

    fn from_ordinal(ordinal: usize) -> Option<Self>;
}

/// Conversion from a bound cell value.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, DecodeError>;
}

fn mismatch<T>(expected: &'static str, value: &Value) -> Result<T, DecodeError> {
    Err(DecodeError::TypeMismatch {
        expected,
        found: value.kind_name(),
    })
}

macro_rules! impl_from_value {
    ($($ty:ty => $variant:ident, $name:literal;)*) => {
        $(
            impl FromValue for $ty {
                fn from_value(value: &Value) -> Result<Self, DecodeError> {
                    match value {
                        Value::$variant(v) => Ok(v.clone()),
                        other => mismatch($name, other),
                    }
                }
            }
        )*
    };
}

impl_from_value! {
    i8 => I8, "i8";
    u8 => U8, "u8";
    i16 => I16, "i16";
    u16 => U16, "u16";
    i32 => I32, "i32";
    u32 => U32, "u32";
    i64 => I64, "i64";
    u64 => U64, "u64";
    f32 => F32, "f32";
    f64 => F64, "f64";
    Decimal => Decimal, "decimal";
    bool => Bool, "bool";
    String => String, "string";
    Vector2 => Vector2, "Vector2";
    Vector3 => Vector3, "Vector3";
    Vector4 => Vector4, "Vector4";
    Vector2Int => Vector2Int, "Vector2Int";
    Vector3Int => Vector3Int, "Vector3Int";
    Option<AssetHandle> => Asset, "asset";
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: &Value) -> Result<Self, DecodeError> {
        decode_list(value, T::from_value)
    }
}

// ===========================================================================
// Decode helpers called from generated code
// ===========================================================================

pub fn decode<T: FromValue>(value: &Value) -> Result<T, DecodeError> {
    T::from_value(value)
}

pub fn decode_list<T, F>(value: &Value, item: F) -> Result<Vec<T>, DecodeError>
where
    F: Fn(&Value) -> Result<T, DecodeError>,
{
    match value {
        Value::Array(items) => items.iter().map(item).collect(),
        other => mismatch("array", other),
    }
}

pub fn decode_enum<E: CatalogEnum>(value: &Value) -> Result<E, DecodeError> {
    match value {
        Value::Enum { ordinal, member } => {
            let unknown = || DecodeError::UnknownMember {
                ordinal: *ordinal,
                member: member.clone(),
            };
            if E::MEMBERS.get(*ordinal) != Some(&member.as_str()) {
                return Err(unknown());
            }
            E::from_ordinal(*ordinal).ok_or_else(unknown)
        }
        other => mismatch("enum", other),
    }
}

// ===========================================================================
// TypedTable
// ===========================================================================

/// A compiled table decoded into generated record structs.
#[derive(Debug, Clone)]
pub struct TypedTable<R> {
    entries: Vec<R>,
}

impl<R: Record> TypedTable<R> {
    /// Decode every entry of `table`.
    ///
    /// Fails with [`DecodeError::StaleSchema`] when the table's fields or keys
    /// differ from the ones `R` was generated for.
    pub fn from_compiled(table: &CompiledTable) -> Result<Self, DecodeError> {
        let stale = |detail: String| DecodeError::StaleSchema {
            table: R::TABLE_NAME.to_string(),
            detail,
        };

        let fields: Vec<&str> = table.schema().field_names().collect();
        if fields != R::FIELDS {
            return Err(stale(format!(
                "generated fields {:?}, compiled fields {fields:?}",
                R::FIELDS
            )));
        }
        let keys: Vec<&str> = table.keys().collect();
        if keys != <R::Key as TableKey>::NAMES {
            return Err(stale(format!(
                "generated {} keys, compiled {} keys ({keys:?})",
                <R::Key as TableKey>::NAMES.len(),
                keys.len()
            )));
        }

        let entries = table
            .iter()
            .map(|entry| {
                R::from_entry(entry).map_err(|e| DecodeError::Entry {
                    key: entry.key.clone(),
                    source: Box::new(e),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    /// The entry for `key`. Keys and entries are checked to line up when the
    /// table is decoded.
    pub fn get(&self, key: R::Key) -> &R {
        &self.entries[key.ordinal()]
    }

    pub fn get_by_id(&self, id: usize) -> Option<&R> {
        self.entries.get(id)
    }

    /// Entries in key order.
    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[R] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<R: Record> Index<R::Key> for TypedTable<R> {
    type Output = R;

    fn index(&self, key: R::Key) -> &R {
        self.get(key)
    }
}

impl<R: Record> DataTable for TypedTable<R> {
    type Entry = R;

    fn table_name(&self) -> &str {
        R::TABLE_NAME
    }

    fn get(&self, id: usize) -> Option<&R> {
        self.entries.get(id)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
