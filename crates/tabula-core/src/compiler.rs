//! Table compiler: load, validate, derive the schema, then bind rows.
//!
//! ```text
//! Loaded -> Validated -> SchemaUpToDate | SchemaRegenerated -> Bound -> Compiled
//! ```
//!
//! Binding needs no generated code; the schema's [`TypeDescriptor`]s drive
//! conversion directly. Generated source is only written when the
//! [`SchemaSync`] mode names an artifact. In [`SchemaSync::TwoPass`] mode a
//! rewritten artifact stops the compile before binding, so the host can
//! rebuild against the new types and compile again.
//!
//! [`TypeDescriptor`]: crate::types::TypeDescriptor

use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::asset::{AssetResolver, NoAssets};
use crate::catalog::TypeCatalog;
use crate::convert::ValueConverter;
use crate::error::{Location, TableError};
use crate::raw::{KEY_COLUMN, RawCell, RawTable};
use crate::resolver::TypeResolver;
use crate::schema::{FieldDescriptor, SchemaGenerator, TableSchema, write_artifact};
use crate::table::{CompiledTable, Entry};
use crate::value::Value;

/// Namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "Game.Data";

// ===========================================================================
// Options and outcomes
// ===========================================================================

/// How the compiler keeps a generated schema artifact in step with the sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SchemaSync {
    /// No artifact; always bind.
    #[default]
    Skip,
    /// Rewrite the artifact when its text changed, then bind in the same pass.
    Collapse { artifact: PathBuf },
    /// Rewrite the artifact when its text changed and stop; bind only when
    /// the artifact was already current.
    TwoPass { artifact: PathBuf },
}

impl SchemaSync {
    pub fn artifact(&self) -> Option<&Path> {
        match self {
            Self::Skip => None,
            Self::Collapse { artifact } | Self::TwoPass { artifact } => Some(artifact),
        }
    }
}

/// State of the schema artifact after a compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaStatus {
    /// No artifact is tracked.
    NotTracked,
    UpToDate,
    Regenerated,
}

/// Compile-wide options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    pub namespace: String,
    pub sync: SchemaSync,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            sync: SchemaSync::Skip,
        }
    }
}

/// Result of one compile invocation.
#[derive(Debug, Clone)]
pub enum CompileOutcome {
    Compiled {
        table: CompiledTable,
        schema_status: SchemaStatus,
    },
    /// Two-pass mode rewrote the artifact; nothing was bound.
    SchemaRegenerated { artifact: PathBuf },
}

impl CompileOutcome {
    pub fn table(&self) -> Option<&CompiledTable> {
        match self {
            Self::Compiled { table, .. } => Some(table),
            Self::SchemaRegenerated { .. } => None,
        }
    }

    pub fn into_table(self) -> Option<CompiledTable> {
        match self {
            Self::Compiled { table, .. } => Some(table),
            Self::SchemaRegenerated { .. } => None,
        }
    }
}

// ===========================================================================
// Bind plan
// ===========================================================================

/// Ordered `(column, field)` pairs, built once per schema and reused for
/// every data row.
#[derive(Debug)]
pub struct BindPlan<'s> {
    slots: Vec<(usize, &'s FieldDescriptor)>,
}

impl<'s> BindPlan<'s> {
    pub fn new(schema: &'s TableSchema) -> Self {
        Self {
            slots: schema.fields.iter().map(|f| (f.column, f)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Convert one data row. Missing trailing cells read as empty text.
    pub fn bind_row(
        &self,
        converter: &ValueConverter<'_>,
        file: &Path,
        row: &[RawCell],
    ) -> Result<Vec<Value>, TableError> {
        let row_number = row.first().map(|c| c.row).unwrap_or_default();
        self.slots
            .iter()
            .map(|&(column, field)| {
                let raw = row.get(column).map(|c| c.data.as_str()).unwrap_or("");
                converter
                    .convert(raw, &field.resolved_type)
                    .map_err(|source| TableError::Conversion {
                        location: Location::at(file, row_number, column + 1),
                        field: field.name.clone(),
                        source,
                    })
            })
            .collect()
    }
}

// ===========================================================================
// Compiler
// ===========================================================================

/// Compiles sheets against a type catalog.
pub struct TableCompiler<'a> {
    catalog: &'a TypeCatalog,
    assets: &'a dyn AssetResolver,
    options: CompileOptions,
}

impl<'a> TableCompiler<'a> {
    /// A compiler with default options whose asset lookups always miss.
    pub fn new(catalog: &'a TypeCatalog) -> Self {
        Self {
            catalog,
            assets: &NoAssets,
            options: CompileOptions::default(),
        }
    }

    pub fn with_assets(mut self, assets: &'a dyn AssetResolver) -> Self {
        self.assets = assets;
        self
    }

    pub fn with_options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    pub fn catalog(&self) -> &'a TypeCatalog {
        self.catalog
    }

    /// Compile the sheet at `path` with the configured namespace.
    pub fn compile(&self, path: &Path) -> Result<CompileOutcome, TableError> {
        self.compile_with_namespace(path, &self.options.namespace)
    }

    /// Compile the sheet at `path` under `namespace`.
    pub fn compile_with_namespace(
        &self,
        path: &Path,
        namespace: &str,
    ) -> Result<CompileOutcome, TableError> {
        let raw = RawTable::load(path)?;
        self.compile_raw(&raw, namespace)
    }

    /// Compile an already loaded table.
    pub fn compile_raw(
        &self,
        raw: &RawTable,
        namespace: &str,
    ) -> Result<CompileOutcome, TableError> {
        let file = raw.path();
        debug!("compiling {}", file.display());

        if !raw.on_valid() {
            return Err(TableError::Validation {
                file: file.to_path_buf(),
                detail: format!("table needs a '{KEY_COLUMN}' column of type string"),
            });
        }

        let resolver = TypeResolver::new(self.catalog);
        let schema = SchemaGenerator::build_schema(namespace, raw, &resolver)?;

        let schema_status = match self.options.sync.artifact() {
            None => SchemaStatus::NotTracked,
            Some(artifact) => {
                let text = SchemaGenerator::emit(&schema, raw)?;
                if write_artifact(artifact, &text)? {
                    SchemaStatus::Regenerated
                } else {
                    SchemaStatus::UpToDate
                }
            }
        };
        if schema_status == SchemaStatus::Regenerated {
            if let SchemaSync::TwoPass { artifact } = &self.options.sync {
                info!(
                    "{}: schema regenerated, binding deferred to the next pass",
                    file.display()
                );
                return Ok(CompileOutcome::SchemaRegenerated {
                    artifact: artifact.clone(),
                });
            }
        }

        let table = self.bind(raw, schema)?;
        debug!(
            "compiled {} ({} entries, schema {:?})",
            table.name(),
            table.len(),
            schema_status
        );
        Ok(CompileOutcome::Compiled {
            table,
            schema_status,
        })
    }

    fn bind(&self, raw: &RawTable, schema: TableSchema) -> Result<CompiledTable, TableError> {
        let converter = ValueConverter::new(self.assets);
        let entries = {
            let plan = BindPlan::new(&schema);
            raw.rows()[2..]
                .iter()
                .zip(&schema.keys)
                .enumerate()
                .map(|(id, (row, key))| {
                    Ok(Entry {
                        id,
                        key: key.clone(),
                        values: plan.bind_row(&converter, raw.path(), row)?,
                    })
                })
                .collect::<Result<Vec<_>, TableError>>()?
        };
        Ok(CompiledTable::new(schema, entries))
    }
}

// ===========================================================================
// Tests
// ===========================================================================
