//! Raw cell grid: reads a sheet file into positioned string cells.
//!
//! CSV files go through the `csv` crate; workbooks (xlsx, xlsm, xlsb, xls,
//! ods) go through `calamine`, first worksheet only. Blank rows and comment
//! rows (first cell starting with `#`) are dropped at load time but still
//! advance the row counter, so every cell keeps its source position.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use calamine::{Data, Reader};
use log::debug;

use crate::error::{Location, TableError};
use crate::types::is_string_spelling;

/// Header text of the column that supplies row keys.
pub const KEY_COLUMN: &str = "Name";

/// Prefix marking a row as a comment.
pub const COMMENT_PREFIX: char = '#';

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported sheet containers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SheetFormat {
    Csv,
    Workbook,
}

/// Detect the sheet format of a file based on its extension.
pub fn detect_sheet_format(path: &Path) -> Result<SheetFormat, TableError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("csv") => Ok(SheetFormat::Csv),
        Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => Ok(SheetFormat::Workbook),
        _ => Err(TableError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

/// Whether `path` looks like a sheet this crate can load.
pub fn is_sheet_file(path: &Path) -> bool {
    detect_sheet_format(path).is_ok()
}

// ===========================================================================
// Cells and table
// ===========================================================================

/// One cell's text plus its 1-based source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCell {
    pub data: String,
    pub row: usize,
    pub column: usize,
}

impl RawCell {
    pub fn new(data: impl Into<String>, row: usize, column: usize) -> Self {
        Self {
            data: data.into(),
            row,
            column,
        }
    }
}

/// An immutable grid of raw cells.
///
/// Row 0 holds field names, row 1 type tokens, rows 2.. data. Rows are ragged:
/// trailing empty cells are trimmed, so callers must bounds-check.
#[derive(Debug, Clone)]
pub struct RawTable {
    path: PathBuf,
    rows: Vec<Vec<RawCell>>,
}

impl RawTable {
    /// Load a sheet file from disk.
    pub fn load(path: &Path) -> Result<Self, TableError> {
        let format = detect_sheet_format(path)?;
        let bytes = std::fs::read(path).map_err(|e| TableError::io(path, e))?;

        let table = match format {
            SheetFormat::Csv => Self::parse_csv(path, &bytes)?,
            SheetFormat::Workbook => Self::parse_workbook(path, bytes)?,
        };
        debug!(
            "loaded {} with {} rows ({:?})",
            path.display(),
            table.row_count(),
            format
        );
        Ok(table)
    }

    /// Build a table from in-memory records. Record `i` gets source row `i + 1`.
    ///
    /// The same skip and trim rules as [`RawTable::load`] apply.
    pub fn from_records<R, S>(
        path: impl Into<PathBuf>,
        records: impl IntoIterator<Item = R>,
    ) -> Self
    where
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut builder = RowCollector::default();
        for (idx, record) in records.into_iter().enumerate() {
            builder.push(idx + 1, record.into_iter().map(Into::into).collect());
        }
        Self {
            path: path.into(),
            rows: builder.rows,
        }
    }

    fn parse_csv(path: &Path, bytes: &[u8]) -> Result<Self, TableError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(bytes);

        let mut builder = RowCollector::default();
        let mut counter = 0usize;
        for record in reader.records() {
            let record = record.map_err(|e| {
                let location = match e.position() {
                    Some(pos) => Location::at(path, pos.line() as usize, 1),
                    None => Location::file(path),
                };
                TableError::Format {
                    location,
                    detail: e.to_string(),
                }
            })?;
            counter += 1;
            // Line numbers survive multi-line quoted fields and blank lines.
            let raw_row = record
                .position()
                .map(|pos| pos.line() as usize)
                .unwrap_or(counter);
            builder.push(raw_row, record.iter().map(str::to_string).collect());
        }

        Ok(Self {
            path: path.to_path_buf(),
            rows: builder.rows,
        })
    }

    fn parse_workbook(path: &Path, bytes: Vec<u8>) -> Result<Self, TableError> {
        let format_err = |detail: String| TableError::Format {
            location: Location::file(path),
            detail,
        };

        let mut workbook = calamine::open_workbook_auto_from_rs(Cursor::new(bytes))
            .map_err(|e| format_err(e.to_string()))?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| format_err("workbook has no worksheets".to_string()))?
            .map_err(|e| format_err(e.to_string()))?;

        // Ranges are anchored at their first used cell, not at A1.
        let (start_row, start_col) = range
            .start()
            .map(|(r, c)| (r as usize, c as usize))
            .unwrap_or((0, 0));

        let mut builder = RowCollector::default();
        for (offset, row) in range.rows().enumerate() {
            let raw_row = start_row + offset + 1;
            let mut cells = vec![String::new(); start_col];
            cells.reserve(row.len());
            for (col_offset, cell) in row.iter().enumerate() {
                let text = match cell {
                    Data::Empty => String::new(),
                    Data::Error(err) => {
                        return Err(TableError::Format {
                            location: Location::at(path, raw_row, start_col + col_offset + 1),
                            detail: format!("cell holds spreadsheet error {err:?}"),
                        });
                    }
                    other => other.to_string(),
                };
                cells.push(text);
            }
            builder.push(raw_row, cells);
        }

        Ok(Self {
            path: path.to_path_buf(),
            rows: builder.rows,
        })
    }

    /// Source path of this table.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Table name: the file stem of the source path.
    pub fn table_name(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Row `idx`, or an empty slice when out of range.
    pub fn row(&self, idx: usize) -> &[RawCell] {
        self.rows.get(idx).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Cell at `(row, column)` (0-based grid indices), if present.
    pub fn cell(&self, row: usize, column: usize) -> Option<&RawCell> {
        self.row(row).get(column)
    }

    /// Number of materialized rows (header and type rows included).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of data rows (everything after the header and type rows).
    pub fn data_row_count(&self) -> usize {
        self.rows.len().saturating_sub(2)
    }

    pub fn rows(&self) -> &[Vec<RawCell>] {
        &self.rows
    }

    /// Index of the first column whose header is [`KEY_COLUMN`].
    pub fn key_column(&self) -> Option<usize> {
        self.row(0).iter().position(|c| c.data == KEY_COLUMN)
    }

    /// True iff some column is headed `Name` and typed as a string.
    pub fn on_valid(&self) -> bool {
        let names = self.row(0);
        let types = self.row(1);
        names.iter().enumerate().any(|(i, cell)| {
            cell.data == KEY_COLUMN && types.get(i).is_some_and(|t| is_string_spelling(&t.data))
        })
    }
}

// ===========================================================================
// Row collection
// ===========================================================================

/// Applies the skip and trim rules while rows stream in.
#[derive(Default)]
struct RowCollector {
    rows: Vec<Vec<RawCell>>,
}

impl RowCollector {
    fn push(&mut self, raw_row: usize, mut cells: Vec<String>) {
        match cells.first() {
            None => return,
            Some(first) if first.is_empty() || first.starts_with(COMMENT_PREFIX) => return,
            Some(_) => {}
        }
        while cells.last().is_some_and(String::is_empty) {
            cells.pop();
        }
        let row = cells
            .into_iter()
            .enumerate()
            .map(|(i, data)| RawCell::new(data, raw_row, i + 1))
            .collect();
        self.rows.push(row);
    }
}

// ===========================================================================
// Tests
// ===========================================================================
