//! Typed cell values produced by the converter.

use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// 2-component float vector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

/// 3-component float vector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// 4-component float vector.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Vector4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

/// 2-component integer vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Vector2Int {
    pub x: i32,
    pub y: i32,
}

/// 3-component integer vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Vector3Int {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// Opaque reference to a host asset, handed out by an
/// [`AssetResolver`](crate::asset::AssetResolver).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AssetHandle {
    pub kind: String,
    pub path: String,
}

/// One converted cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    I64(i64),
    U64(u64),
    F32(f32),
    F64(f64),
    Decimal(Decimal),
    Bool(bool),
    String(String),
    Enum { ordinal: usize, member: String },
    Vector2(Vector2),
    Vector3(Vector3),
    Vector4(Vector4),
    Vector2Int(Vector2Int),
    Vector3Int(Vector3Int),
    Array(Vec<Value>),
    /// `None` is the "no reference" value of an empty asset cell.
    Asset(Option<AssetHandle>),
}

impl Value {
    /// Short name of the variant, for decode error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::I8(_) => "i8",
            Self::U8(_) => "u8",
            Self::I16(_) => "i16",
            Self::U16(_) => "u16",
            Self::I32(_) => "i32",
            Self::U32(_) => "u32",
            Self::I64(_) => "i64",
            Self::U64(_) => "u64",
            Self::F32(_) => "f32",
            Self::F64(_) => "f64",
            Self::Decimal(_) => "decimal",
            Self::Bool(_) => "bool",
            Self::String(_) => "string",
            Self::Enum { .. } => "enum",
            Self::Vector2(_) => "Vector2",
            Self::Vector3(_) => "Vector3",
            Self::Vector4(_) => "Vector4",
            Self::Vector2Int(_) => "Vector2Int",
            Self::Vector3Int(_) => "Vector3Int",
            Self::Array(_) => "array",
            Self::Asset(_) => "asset",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items),
            _ => None,
        }
    }

    /// Any integer variant widened to `i64`, when it fits.
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Self::I8(v) => Some(v.into()),
            Self::U8(v) => Some(v.into()),
            Self::I16(v) => Some(v.into()),
            Self::U16(v) => Some(v.into()),
            Self::I32(v) => Some(v.into()),
            Self::U32(v) => Some(v.into()),
            Self::I64(v) => Some(v),
            Self::U64(v) => i64::try_from(v).ok(),
            _ => None,
        }
    }

    /// Either float variant widened to `f64`.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Self::F32(v) => Some(v.into()),
            Self::F64(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::I8(v) => write!(f, "{v}"),
            Self::U8(v) => write!(f, "{v}"),
            Self::I16(v) => write!(f, "{v}"),
            Self::U16(v) => write!(f, "{v}"),
            Self::I32(v) => write!(f, "{v}"),
            Self::U32(v) => write!(f, "{v}"),
            Self::I64(v) => write!(f, "{v}"),
            Self::U64(v) => write!(f, "{v}"),
            Self::F32(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
            Self::Decimal(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
            Self::String(s) => write!(f, "{s}"),
            Self::Enum { member, .. } => write!(f, "{member}"),
            Self::Vector2(v) => write!(f, "({}, {})", v.x, v.y),
            Self::Vector3(v) => write!(f, "({}, {}, {})", v.x, v.y, v.z),
            Self::Vector4(v) => write!(f, "({}, {}, {}, {})", v.x, v.y, v.z, v.w),
            Self::Vector2Int(v) => write!(f, "({}, {})", v.x, v.y),
            Self::Vector3Int(v) => write!(f, "({}, {}, {})", v.x, v.y, v.z),
            Self::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Self::Asset(Some(handle)) => write!(f, "{}", handle.path),
            Self::Asset(None) => Ok(()),
        }
    }
}
