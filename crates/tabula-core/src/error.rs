//! Error taxonomy for table compilation.
//!
//! Component errors ([`ResolveError`](crate::resolver::ResolveError),
//! [`ConvertError`](crate::convert::ConvertError)) carry no position. The
//! compiler wraps them in a [`TableError`] together with a [`Location`] before
//! they leave the crate boundary.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::convert::ConvertError;
use crate::raw::RawCell;

// ===========================================================================
// Location
// ===========================================================================

/// Where an error happened: the source file and, when known, the cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub file: PathBuf,
    /// 1-based `(row, column)` of the offending cell.
    pub cell: Option<(usize, usize)>,
}

impl Location {
    /// A location naming only the file.
    pub fn file(file: &Path) -> Self {
        Self {
            file: file.to_path_buf(),
            cell: None,
        }
    }

    /// A location pointing at a raw cell.
    pub fn cell(file: &Path, cell: &RawCell) -> Self {
        Self::at(file, cell.row, cell.column)
    }

    /// A location at an explicit 1-based row and column.
    pub fn at(file: &Path, row: usize, column: usize) -> Self {
        Self {
            file: file.to_path_buf(),
            cell: Some((row, column)),
        }
    }

    pub fn row(&self) -> Option<usize> {
        self.cell.map(|(row, _)| row)
    }

    pub fn column(&self) -> Option<usize> {
        self.cell.map(|(_, column)| column)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cell {
            Some((row, column)) => write!(f, "{}({row}:{column})", self.file.display()),
            None => write!(f, "{}", self.file.display()),
        }
    }
}

// ===========================================================================
// Errors
// ===========================================================================

/// Errors that can occur while loading, validating, or compiling a table.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    /// The source file could not be read.
    #[error("cannot read {file}: {source}")]
    Io {
        file: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file has an extension we don't know how to parse.
    #[error("unsupported sheet format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// The spreadsheet container itself is malformed.
    #[error("malformed spreadsheet at {location}: {detail}")]
    Format { location: Location, detail: String },

    /// The table does not meet the minimum importable shape.
    #[error("invalid table {file}: {detail}")]
    Validation { file: PathBuf, detail: String },

    /// The header or type rows (or the keys) do not form a usable schema.
    #[error("schema error at {location}: {detail}")]
    Schema { location: Location, detail: String },

    /// A cell's text is incompatible with its column type.
    #[error("at {location}: field '{field}': {source}")]
    Conversion {
        location: Location,
        field: String,
        #[source]
        source: ConvertError,
    },

    /// A type token could not be resolved.
    #[error("at {location}: type '{type_name}' not found")]
    UnknownType {
        location: Location,
        type_name: String,
    },

    /// Import settings could not be read or parsed.
    #[error("settings error in {file}: {detail}")]
    Settings { file: PathBuf, detail: String },
}

impl TableError {
    pub(crate) fn io(file: &Path, source: std::io::Error) -> Self {
        Self::Io {
            file: file.to_path_buf(),
            source,
        }
    }

    pub(crate) fn schema(location: Location, detail: impl Into<String>) -> Self {
        Self::Schema {
            location,
            detail: detail.into(),
        }
    }

    /// The location this error points at, if it has one.
    pub fn location(&self) -> Option<&Location> {
        match self {
            Self::Format { location, .. }
            | Self::Schema { location, .. }
            | Self::Conversion { location, .. }
            | Self::UnknownType { location, .. } => Some(location),
            _ => None,
        }
    }

    /// The file this error was raised for.
    pub fn file(&self) -> &Path {
        match self {
            Self::Io { file, .. }
            | Self::UnsupportedFormat { file }
            | Self::Validation { file, .. }
            | Self::Settings { file, .. } => file,
            Self::Format { location, .. }
            | Self::Schema { location, .. }
            | Self::Conversion { location, .. }
            | Self::UnknownType { location, .. } => &location.file,
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
