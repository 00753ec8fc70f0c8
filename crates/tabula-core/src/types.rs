//! Value-type descriptors for table columns.
//!
//! A [`TypeDescriptor`] is what a type token like `int[]` or `Vector3`
//! resolves to. The converter and the code generator both dispatch on it.

use std::fmt;
use std::sync::Arc;

use crate::value::Value;

// ===========================================================================
// Primitives
// ===========================================================================

/// Built-in scalar kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    I64,
    U64,
    F32,
    F64,
    Decimal,
    Bool,
    String,
}

/// Every accepted spelling for each primitive: sheet keyword, Rust name,
/// and qualified name.
const PRIMITIVE_SPELLINGS: &[(PrimitiveKind, [&str; 3])] = &[
    (PrimitiveKind::I8, ["sbyte", "i8", "System.SByte"]),
    (PrimitiveKind::U8, ["byte", "u8", "System.Byte"]),
    (PrimitiveKind::I16, ["short", "i16", "System.Int16"]),
    (PrimitiveKind::U16, ["ushort", "u16", "System.UInt16"]),
    (PrimitiveKind::I32, ["int", "i32", "System.Int32"]),
    (PrimitiveKind::U32, ["uint", "u32", "System.UInt32"]),
    (PrimitiveKind::I64, ["long", "i64", "System.Int64"]),
    (PrimitiveKind::U64, ["ulong", "u64", "System.UInt64"]),
    (PrimitiveKind::F32, ["float", "f32", "System.Single"]),
    (PrimitiveKind::F64, ["double", "f64", "System.Double"]),
    (PrimitiveKind::Decimal, ["decimal", "Decimal", "System.Decimal"]),
    (PrimitiveKind::Bool, ["bool", "bool", "System.Boolean"]),
    (PrimitiveKind::String, ["string", "String", "System.String"]),
];

impl PrimitiveKind {
    /// Exact-match a primitive spelling.
    pub fn from_spelling(token: &str) -> Option<Self> {
        PRIMITIVE_SPELLINGS
            .iter()
            .find(|(_, spellings)| spellings.contains(&token))
            .map(|(kind, _)| *kind)
    }

    /// The sheet keyword for this kind (`int`, `float`, ...).
    pub fn keyword(self) -> &'static str {
        PRIMITIVE_SPELLINGS
            .iter()
            .find(|(kind, _)| *kind == self)
            .map(|(_, spellings)| spellings[0])
            .unwrap_or("?")
    }

    /// Rust type the generated code uses for this kind.
    pub fn rust_type(self) -> &'static str {
        match self {
            Self::I8 => "i8",
            Self::U8 => "u8",
            Self::I16 => "i16",
            Self::U16 => "u16",
            Self::I32 => "i32",
            Self::U32 => "u32",
            Self::I64 => "i64",
            Self::U64 => "u64",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Decimal => "::tabula_core::rust_decimal::Decimal",
            Self::Bool => "bool",
            Self::String => "String",
        }
    }

    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Self::I8
                | Self::U8
                | Self::I16
                | Self::U16
                | Self::I32
                | Self::U32
                | Self::I64
                | Self::U64
        )
    }

    /// The zero-equivalent value an empty cell converts to.
    pub fn default_value(self) -> Value {
        match self {
            Self::I8 => Value::I8(0),
            Self::U8 => Value::U8(0),
            Self::I16 => Value::I16(0),
            Self::U16 => Value::U16(0),
            Self::I32 => Value::I32(0),
            Self::U32 => Value::U32(0),
            Self::I64 => Value::I64(0),
            Self::U64 => Value::U64(0),
            Self::F32 => Value::F32(0.0),
            Self::F64 => Value::F64(0.0),
            Self::Decimal => Value::Decimal(rust_decimal::Decimal::ZERO),
            Self::Bool => Value::Bool(false),
            Self::String => Value::String(String::new()),
        }
    }
}

/// Whether `token` is one of the string spellings accepted for the key column.
pub fn is_string_spelling(token: &str) -> bool {
    PrimitiveKind::from_spelling(token) == Some(PrimitiveKind::String)
}

// ===========================================================================
// Composites
// ===========================================================================

/// Fixed-arity numeric tuple types (engine vector aliases).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositeKind {
    Vector2,
    Vector3,
    Vector4,
    Vector2Int,
    Vector3Int,
}

impl CompositeKind {
    pub const ALL: [Self; 5] = [
        Self::Vector2,
        Self::Vector3,
        Self::Vector4,
        Self::Vector2Int,
        Self::Vector3Int,
    ];

    pub fn from_alias(token: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == token)
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Vector2 => "Vector2",
            Self::Vector3 => "Vector3",
            Self::Vector4 => "Vector4",
            Self::Vector2Int => "Vector2Int",
            Self::Vector3Int => "Vector3Int",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            Self::Vector2 | Self::Vector2Int => 2,
            Self::Vector3 | Self::Vector3Int => 3,
            Self::Vector4 => 4,
        }
    }

    /// Integer-flavored aliases parse their components as `i32`.
    pub fn is_integer(self) -> bool {
        matches!(self, Self::Vector2Int | Self::Vector3Int)
    }
}

// ===========================================================================
// Catalog-backed types
// ===========================================================================

/// An enumeration registered in the type catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    pub name: String,
    pub members: Arc<[String]>,
    /// Path the generated code uses to name this type.
    pub rust_path: String,
}

impl EnumType {
    /// Ordinal of a member, matched case-sensitively.
    pub fn ordinal_of(&self, member: &str) -> Option<usize> {
        self.members.iter().position(|m| m == member)
    }
}

/// Parses a non-empty cell into a record value.
pub type RecordParser = Arc<dyn Fn(&str) -> Result<Value, String> + Send + Sync>;

/// A user record type registered in the type catalog.
#[derive(Clone)]
pub struct RecordType {
    pub name: String,
    pub rust_path: String,
    /// Value an empty cell converts to.
    pub default: Value,
    /// Converter for non-empty cells; `None` means only empty cells convert.
    pub parser: Option<RecordParser>,
}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordType")
            .field("name", &self.name)
            .field("rust_path", &self.rust_path)
            .field("default", &self.default)
            .field("parser", &self.parser.as_ref().map(|_| ".."))
            .finish()
    }
}

impl PartialEq for RecordType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.rust_path == other.rust_path
    }
}

// ===========================================================================
// TypeDescriptor
// ===========================================================================

/// Resolved column type.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDescriptor {
    Primitive(PrimitiveKind),
    Enum(EnumType),
    Array(Box<TypeDescriptor>),
    Composite(CompositeKind),
    /// Reference to a host asset of the given kind, resolved by path.
    AssetReference(String),
    Record(RecordType),
}

impl TypeDescriptor {
    pub fn array_of(inner: TypeDescriptor) -> Self {
        Self::Array(Box::new(inner))
    }

    /// Human-readable name, used in error messages (`int[][]`, `Vector3`).
    pub fn display_name(&self) -> String {
        match self {
            Self::Primitive(kind) => kind.keyword().to_string(),
            Self::Enum(e) => e.name.clone(),
            Self::Array(inner) => format!("{}[]", inner.display_name()),
            Self::Composite(kind) => kind.name().to_string(),
            Self::AssetReference(kind) => kind.clone(),
            Self::Record(r) => r.name.clone(),
        }
    }

    /// Whether generated accessors can return this type by value.
    pub fn is_copy(&self) -> bool {
        match self {
            Self::Primitive(kind) => *kind != PrimitiveKind::String,
            Self::Enum(_) | Self::Composite(_) => true,
            Self::Array(_) | Self::AssetReference(_) | Self::Record(_) => false,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name())
    }
}

// ===========================================================================
// Tests
// ===========================================================================
