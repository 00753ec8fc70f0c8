//! Converts raw cell text into typed [`Value`]s.
//!
//! Empty cells convert to each kind's default: zero for numbers, the first
//! member for enums, an empty list for arrays, `None` for asset references,
//! and the registered default for records. Composites have no default; an
//! empty composite cell is an error.

use std::fmt::Display;
use std::str::FromStr;

use rust_decimal::Decimal;

use crate::asset::{AssetResolver, NoAssets};
use crate::types::{CompositeKind, EnumType, PrimitiveKind, RecordType, TypeDescriptor};
use crate::value::{Value, Vector2, Vector2Int, Vector3, Vector3Int, Vector4};

// ===========================================================================
// Errors
// ===========================================================================

/// Why a conversion failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConvertReason {
    #[error("{0}")]
    Parse(String),
    #[error("expected a value written as (c1, ..., cN)")]
    MissingParens,
    #[error("expected {expected} components, found {found}")]
    Arity { expected: usize, found: usize },
    #[error("no member with this name")]
    UnknownMember,
    #[error("enum has no members")]
    EmptyEnum,
    #[error("expected a list written as [a, b, ...]")]
    NotAList,
    #[error("list is missing its closing ']'")]
    UnterminatedList,
    #[error("mismatched '{found}' inside list")]
    UnbalancedBracket { found: char },
    #[error("unexpected text after the closing ']'")]
    TrailingText,
    #[error("asset not found")]
    AssetNotFound,
    #[error("type has no text form")]
    Unsupported,
}

/// A cell whose text is incompatible with its target type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot convert '{raw}' to {target}: {reason}")]
pub struct ConvertError {
    pub raw: String,
    pub target: String,
    pub reason: ConvertReason,
}

impl ConvertError {
    fn new(raw: &str, target: &TypeDescriptor, reason: ConvertReason) -> Self {
        Self {
            raw: raw.to_string(),
            target: target.display_name(),
            reason,
        }
    }
}

// ===========================================================================
// Converter
// ===========================================================================

/// Converts cell text according to a [`TypeDescriptor`].
#[derive(Clone, Copy)]
pub struct ValueConverter<'a> {
    assets: &'a dyn AssetResolver,
}

impl ValueConverter<'static> {
    /// A converter whose asset lookups always miss.
    pub fn without_assets() -> Self {
        Self { assets: &NoAssets }
    }
}

impl<'a> ValueConverter<'a> {
    pub fn new(assets: &'a dyn AssetResolver) -> Self {
        Self { assets }
    }

    /// Convert `raw` into a value of type `ty`.
    pub fn convert(&self, raw: &str, ty: &TypeDescriptor) -> Result<Value, ConvertError> {
        let fail = |reason| ConvertError::new(raw, ty, reason);
        match ty {
            TypeDescriptor::AssetReference(kind) => self.convert_asset(raw, kind).map_err(fail),
            TypeDescriptor::Composite(kind) => convert_composite(raw, *kind).map_err(fail),
            TypeDescriptor::Enum(enum_type) => convert_enum(raw, enum_type).map_err(fail),
            TypeDescriptor::Array(element) => self.convert_array(raw, ty, element),
            TypeDescriptor::Primitive(kind) => convert_primitive(raw, *kind).map_err(fail),
            TypeDescriptor::Record(record) => convert_record(raw, record).map_err(fail),
        }
    }

    fn convert_asset(&self, raw: &str, kind: &str) -> Result<Value, ConvertReason> {
        let path = raw.trim();
        if path.is_empty() {
            return Ok(Value::Asset(None));
        }
        self.assets
            .load_asset_reference(path, kind)
            .map(|handle| Value::Asset(Some(handle)))
            .ok_or(ConvertReason::AssetNotFound)
    }

    fn convert_array(
        &self,
        raw: &str,
        ty: &TypeDescriptor,
        element: &TypeDescriptor,
    ) -> Result<Value, ConvertError> {
        let segments = split_list(raw, holds_composites(element))
            .map_err(|reason| ConvertError::new(raw, ty, reason))?;
        segments
            .into_iter()
            .map(|segment| self.convert(segment, element))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }
}

// ===========================================================================
// List scanning
// ===========================================================================

/// Whether list elements of `element` are written in parentheses.
fn holds_composites(element: &TypeDescriptor) -> bool {
    match element {
        TypeDescriptor::Composite(_) => true,
        TypeDescriptor::Array(inner) => holds_composites(inner),
        _ => false,
    }
}

/// Split a bracketed list into its trimmed top-level segments.
///
/// Nesting is always tracked over `[]`, so commas inside sublists never
/// split. With `parens` set, `()` nests too, which keeps composite values
/// whole; otherwise parentheses are plain text. The `]` that closes the outer
/// list ends the scan and only whitespace may follow it.
pub fn split_list(raw: &str, parens: bool) -> Result<Vec<&str>, ConvertReason> {
    let text = raw.trim();
    if text.is_empty() {
        return Ok(Vec::new());
    }
    if !text.starts_with('[') {
        return Err(ConvertReason::NotAList);
    }

    let mut closers = vec![']'];
    let mut segments = Vec::new();
    let mut start = 1;
    let mut end = None;

    for (i, ch) in text.char_indices().skip(1) {
        match ch {
            '[' => closers.push(']'),
            '(' if parens => closers.push(')'),
            ']' | ')' if ch == ']' || parens => {
                if closers.pop() != Some(ch) {
                    return Err(ConvertReason::UnbalancedBracket { found: ch });
                }
                if closers.is_empty() {
                    segments.push(text[start..i].trim());
                    end = Some(i);
                    break;
                }
            }
            ',' if closers.len() == 1 => {
                segments.push(text[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }

    let end = end.ok_or(ConvertReason::UnterminatedList)?;
    if !text[end + 1..].trim().is_empty() {
        return Err(ConvertReason::TrailingText);
    }
    // `[]` and `[   ]` hold one blank segment.
    if segments.len() == 1 && segments[0].is_empty() {
        segments.clear();
    }
    Ok(segments)
}

// ===========================================================================
// Scalar kinds
// ===========================================================================

fn convert_primitive(raw: &str, kind: PrimitiveKind) -> Result<Value, ConvertReason> {
    let text = raw.trim();
    if text.is_empty() && kind != PrimitiveKind::String {
        return Ok(kind.default_value());
    }
    let value = match kind {
        PrimitiveKind::String => Value::String(raw.to_string()),
        PrimitiveKind::I8 => Value::I8(parse_integer(text)?),
        PrimitiveKind::U8 => Value::U8(parse_integer(text)?),
        PrimitiveKind::I16 => Value::I16(parse_integer(text)?),
        PrimitiveKind::U16 => Value::U16(parse_integer(text)?),
        PrimitiveKind::I32 => Value::I32(parse_integer(text)?),
        PrimitiveKind::U32 => Value::U32(parse_integer(text)?),
        PrimitiveKind::I64 => Value::I64(parse_integer(text)?),
        PrimitiveKind::U64 => Value::U64(parse_integer(text)?),
        PrimitiveKind::F32 => Value::F32(parse_with(text)?),
        PrimitiveKind::F64 => Value::F64(parse_with(text)?),
        PrimitiveKind::Decimal => Value::Decimal(parse_decimal(text)?),
        PrimitiveKind::Bool => Value::Bool(parse_bool(text)?),
    };
    Ok(value)
}

fn parse_with<T>(text: &str) -> Result<T, ConvertReason>
where
    T: FromStr,
    T::Err: Display,
{
    text.parse::<T>()
        .map_err(|e| ConvertReason::Parse(e.to_string()))
}

/// Parse an integer, also accepting whole numbers written as floats (`3.0`),
/// which is how workbook numeric cells render.
fn parse_integer<T>(text: &str) -> Result<T, ConvertReason>
where
    T: FromStr + TryFrom<i128>,
    T::Err: Display,
{
    match text.parse::<T>() {
        Ok(v) => Ok(v),
        Err(e) => text
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && f.fract() == 0.0)
            .and_then(|f| T::try_from(f as i128).ok())
            .ok_or_else(|| ConvertReason::Parse(e.to_string())),
    }
}

fn parse_decimal(text: &str) -> Result<Decimal, ConvertReason> {
    Decimal::from_str(text).map_err(|e| ConvertReason::Parse(e.to_string()))
}

fn parse_bool(text: &str) -> Result<bool, ConvertReason> {
    if text.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if text.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(ConvertReason::Parse(
            "expected 'true' or 'false'".to_string(),
        ))
    }
}

fn convert_composite(raw: &str, kind: CompositeKind) -> Result<Value, ConvertReason> {
    let text = raw.trim();
    let inner = text
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .ok_or(ConvertReason::MissingParens)?;
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    if parts.len() != kind.arity() {
        return Err(ConvertReason::Arity {
            expected: kind.arity(),
            found: parts.len(),
        });
    }

    if kind.is_integer() {
        let c = parts
            .iter()
            .map(|p| parse_integer::<i32>(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(match kind {
            CompositeKind::Vector2Int => Value::Vector2Int(Vector2Int { x: c[0], y: c[1] }),
            _ => Value::Vector3Int(Vector3Int {
                x: c[0],
                y: c[1],
                z: c[2],
            }),
        })
    } else {
        let c = parts
            .iter()
            .map(|p| parse_with::<f32>(p))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(match kind {
            CompositeKind::Vector2 => Value::Vector2(Vector2 { x: c[0], y: c[1] }),
            CompositeKind::Vector3 => Value::Vector3(Vector3 {
                x: c[0],
                y: c[1],
                z: c[2],
            }),
            _ => Value::Vector4(Vector4 {
                x: c[0],
                y: c[1],
                z: c[2],
                w: c[3],
            }),
        })
    }
}

fn convert_enum(raw: &str, enum_type: &EnumType) -> Result<Value, ConvertReason> {
    let text = raw.trim();
    let ordinal = if text.is_empty() {
        if enum_type.members.is_empty() {
            return Err(ConvertReason::EmptyEnum);
        }
        0
    } else {
        enum_type
            .ordinal_of(text)
            .ok_or(ConvertReason::UnknownMember)?
    };
    Ok(Value::Enum {
        ordinal,
        member: enum_type.members[ordinal].clone(),
    })
}

fn convert_record(raw: &str, record: &RecordType) -> Result<Value, ConvertReason> {
    if raw.trim().is_empty() {
        return Ok(record.default.clone());
    }
    let parser = record.parser.as_ref().ok_or(ConvertReason::Unsupported)?;
    parser(raw.trim()).map_err(ConvertReason::Parse)
}

// ===========================================================================
// Tests
// ===========================================================================
