//! Importer settings loaded from RON, TOML, or JSON.
//!
//! The format is picked from the file extension. Relative paths inside the
//! file are resolved against the directory that holds it.

use std::path::{Path, PathBuf};

use convert_case::{Case, Casing};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::asset::FsAssetResolver;
use crate::catalog::{CatalogPartition, TypeCatalog, default_rust_path};
use crate::compiler::{CompileOptions, DEFAULT_NAMESPACE, SchemaSync};
use crate::error::TableError;

/// Name of the catalog partition built from settings.
pub const SETTINGS_PARTITION: &str = "settings";

// ===========================================================================
// Format detection
// ===========================================================================

/// Supported settings file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Ron,
    Toml,
    Json,
}

/// Detect the format of a settings file based on its extension.
pub fn detect_format(path: &Path) -> Result<ConfigFormat, TableError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(ConfigFormat::Ron),
        Some("toml") => Ok(ConfigFormat::Toml),
        Some("json") => Ok(ConfigFormat::Json),
        _ => Err(TableError::Settings {
            file: path.to_path_buf(),
            detail: "expected a .ron, .toml, or .json file".to_string(),
        }),
    }
}

/// Read a file and deserialize it according to its format (detected from extension).
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, TableError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path).map_err(|e| TableError::io(path, e))?;

    let parse_err = |detail: String| TableError::Settings {
        file: path.to_path_buf(),
        detail,
    };
    match format {
        ConfigFormat::Ron => ron::from_str(&content).map_err(|e| parse_err(e.to_string())),
        ConfigFormat::Json => serde_json::from_str(&content).map_err(|e| parse_err(e.to_string())),
        ConfigFormat::Toml => toml::from_str(&content).map_err(|e| parse_err(e.to_string())),
    }
}

// ===========================================================================
// Settings
// ===========================================================================

/// How generated schema artifacts are kept in sync.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    #[default]
    Skip,
    Collapse,
    TwoPass,
}

/// An enum type declared in settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EnumSettings {
    pub name: String,
    /// Path generated code uses for the type. Defaults to the name with `.`
    /// replaced by `::`.
    #[serde(default)]
    pub rust_path: Option<String>,
    pub members: Vec<String>,
}

/// Importer configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImportSettings {
    pub namespace: String,
    /// Directory for generated schema artifacts. Defaults to the directory of
    /// each sheet.
    pub schema_dir: Option<PathBuf>,
    pub sync: SyncMode,
    /// Root for asset-reference cells. Without one, non-empty asset cells fail.
    pub asset_root: Option<PathBuf>,
    pub enums: Vec<EnumSettings>,
    pub asset_kinds: Vec<String>,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            schema_dir: None,
            sync: SyncMode::Skip,
            asset_root: None,
            enums: Vec::new(),
            asset_kinds: Vec::new(),
        }
    }
}

impl ImportSettings {
    /// Load settings from a `.ron`, `.toml`, or `.json` file.
    pub fn load(path: &Path) -> Result<Self, TableError> {
        let mut settings: Self = deserialize_file(path)?;
        if let Some(base) = path.parent() {
            settings.schema_dir = settings.schema_dir.map(|p| base.join(p));
            settings.asset_root = settings.asset_root.map(|p| base.join(p));
        }
        Ok(settings)
    }

    /// Catalog partition holding the declared enums and asset kinds.
    pub fn partition(&self) -> CatalogPartition {
        let mut partition = CatalogPartition::new(SETTINGS_PARTITION);
        for e in &self.enums {
            let rust_path = e
                .rust_path
                .clone()
                .unwrap_or_else(|| default_rust_path(&e.name));
            partition.register_enum_at(&e.name, &rust_path, e.members.iter().cloned());
        }
        for kind in &self.asset_kinds {
            partition.register_asset(kind);
        }
        partition
    }

    /// A catalog holding only [`ImportSettings::partition`].
    pub fn catalog(&self) -> TypeCatalog {
        let mut catalog = TypeCatalog::new();
        catalog.add_partition(self.partition());
        catalog
    }

    /// Where the schema artifact for `sheet` lives, or `None` when sync is off.
    ///
    /// The file is named after the table in snake case: `Heroes.csv` ->
    /// `heroes.rs`.
    pub fn artifact_path(&self, sheet: &Path) -> Option<PathBuf> {
        if self.sync == SyncMode::Skip {
            return None;
        }
        let stem = sheet.file_stem()?.to_string_lossy().to_case(Case::Snake);
        let dir = match &self.schema_dir {
            Some(dir) => dir.clone(),
            None => sheet.parent().map(Path::to_path_buf).unwrap_or_default(),
        };
        Some(dir.join(format!("{stem}.rs")))
    }

    /// Compile options for `sheet`.
    pub fn compile_options(&self, sheet: &Path) -> CompileOptions {
        let sync = match (self.sync, self.artifact_path(sheet)) {
            (SyncMode::Collapse, Some(artifact)) => SchemaSync::Collapse { artifact },
            (SyncMode::TwoPass, Some(artifact)) => SchemaSync::TwoPass { artifact },
            _ => SchemaSync::Skip,
        };
        CompileOptions {
            namespace: self.namespace.clone(),
            sync,
        }
    }

    pub fn asset_resolver(&self) -> Option<FsAssetResolver> {
        self.asset_root.as_ref().map(FsAssetResolver::new)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
