//! Batch compilation of a directory of sheets, with lookup by table name.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::{debug, error, info};

use crate::compiler::{CompileOutcome, TableCompiler};
use crate::error::TableError;
use crate::raw::is_sheet_file;
use crate::table::CompiledTable;

/// Prefix of the lock files office suites leave next to open workbooks.
pub const LOCK_FILE_PREFIX: &str = "~$";

/// Compiled tables keyed by table name.
#[derive(Debug, Default)]
pub struct TableSet {
    tables: BTreeMap<String, CompiledTable>,
    /// Sheets whose compile stopped after regenerating their schema.
    pending: Vec<PathBuf>,
}

impl TableSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sheets in `dir` that would be compiled, in sorted order.
    pub fn sheet_paths(dir: &Path) -> Result<Vec<PathBuf>, TableError> {
        let read_dir = std::fs::read_dir(dir).map_err(|e| TableError::io(dir, e))?;
        let mut paths = Vec::new();
        for entry in read_dir {
            let path = entry.map_err(|e| TableError::io(dir, e))?.path();
            let is_lock_file = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with(LOCK_FILE_PREFIX));
            if path.is_file() && !is_lock_file && is_sheet_file(&path) {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// Compile every sheet in `dir`. The first failing sheet fails the set.
    pub fn compile_dir(dir: &Path, compiler: &TableCompiler<'_>) -> Result<Self, TableError> {
        let mut set = Self::new();
        for path in Self::sheet_paths(dir)? {
            set.compile_file(&path, compiler)?;
        }
        info!(
            "compiled {} tables from {} ({} pending schema rebuild)",
            set.tables.len(),
            dir.display(),
            set.pending.len()
        );
        Ok(set)
    }

    /// Compile one sheet into the set, replacing a table of the same name.
    pub fn compile_file(
        &mut self,
        path: &Path,
        compiler: &TableCompiler<'_>,
    ) -> Result<(), TableError> {
        match compiler.compile(path)? {
            CompileOutcome::Compiled { table, .. } => {
                self.insert(table);
            }
            CompileOutcome::SchemaRegenerated { artifact } => {
                debug!(
                    "{} deferred until {} is rebuilt",
                    path.display(),
                    artifact.display()
                );
                self.pending.push(path.to_path_buf());
            }
        }
        Ok(())
    }

    /// Add a table, returning any table it replaced.
    pub fn insert(&mut self, table: CompiledTable) -> Option<CompiledTable> {
        self.tables.insert(table.name().to_string(), table)
    }

    /// The table called `name`. Logs an error when it is absent.
    pub fn load(&self, name: &str) -> Option<&CompiledTable> {
        let table = self.tables.get(name);
        if table.is_none() {
            error!("table '{name}' has not been compiled");
        }
        table
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompiledTable> {
        self.tables.values()
    }

    pub fn pending(&self) -> &[PathBuf] {
        &self.pending
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{cleanup, make_test_dir, sample_catalog, write_sheet};

    #[test]
    fn compiles_every_sheet_and_skips_lock_files() {
        let dir = make_test_dir("table_set_dir");
        write_sheet(&dir, "Heroes.csv", "Name,Level\nstring,int\nWarrior,10\n");
        write_sheet(&dir, "Items.csv", "Name,Price\nstring,int\nSword,5\nShield,3\n");
        write_sheet(&dir, "~$Heroes.csv", "garbage");
        write_sheet(&dir, "notes.txt", "not a sheet");

        let catalog = sample_catalog();
        let set = TableSet::compile_dir(&dir, &TableCompiler::new(&catalog)).unwrap();

        assert_eq!(set.names().collect::<Vec<_>>(), vec!["Heroes", "Items"]);
        assert_eq!(set.load("Items").unwrap().len(), 2);
        assert!(set.load("Missing").is_none());
        assert!(set.pending().is_empty());

        cleanup(&dir);
    }

    #[test]
    fn first_bad_sheet_fails_the_set() {
        let dir = make_test_dir("table_set_bad");
        write_sheet(&dir, "A.csv", "Name\nstring\nOk\n");
        write_sheet(&dir, "B.csv", "Name,Level\nstring,int\nBad,x\n");

        let catalog = sample_catalog();
        let err = TableSet::compile_dir(&dir, &TableCompiler::new(&catalog)).unwrap_err();
        assert!(err.file().ends_with("B.csv"));

        cleanup(&dir);
    }

    #[test]
    fn missing_dir_is_io_error() {
        let dir = make_test_dir("table_set_missing");
        let catalog = sample_catalog();
        let result = TableSet::compile_dir(&dir.join("nope"), &TableCompiler::new(&catalog));
        assert!(matches!(result, Err(TableError::Io { .. })));
        cleanup(&dir);
    }
}
