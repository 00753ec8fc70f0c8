//! Registry of named user types that column tokens can refer to.
//!
//! The catalog is an ordered list of partitions (one per module or crate
//! that contributes types). Lookups scan partitions in registration order
//! and the first definition wins.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use log::warn;

use crate::types::{EnumType, RecordParser, RecordType, TypeDescriptor};
use crate::value::Value;

/// A named type definition held by the catalog.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogType {
    Enum(EnumType),
    /// A host asset kind; cells hold resource paths.
    Asset { kind: String },
    Record(RecordType),
}

impl CatalogType {
    pub fn to_descriptor(&self) -> TypeDescriptor {
        match self {
            Self::Enum(e) => TypeDescriptor::Enum(e.clone()),
            Self::Asset { kind } => TypeDescriptor::AssetReference(kind.clone()),
            Self::Record(r) => TypeDescriptor::Record(r.clone()),
        }
    }
}

/// Default path generated code uses for a qualified name: `Game.Rarity` -> `Game::Rarity`.
pub fn default_rust_path(qualified_name: &str) -> String {
    qualified_name.replace('.', "::")
}

// ===========================================================================
// Partition
// ===========================================================================

/// One group of type definitions, e.g. everything a single game module registers.
#[derive(Debug, Clone, Default)]
pub struct CatalogPartition {
    name: String,
    types: HashMap<String, CatalogType>,
}

impl CatalogPartition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            types: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register an enum whose generated path is derived from its name.
    pub fn register_enum<I, S>(&mut self, name: &str, members: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.register_enum_at(name, &default_rust_path(name), members)
    }

    /// Register an enum with an explicit path for generated code.
    pub fn register_enum_at<I, S>(&mut self, name: &str, rust_path: &str, members: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let members: Arc<[String]> = members.into_iter().map(Into::into).collect();
        self.insert(
            name,
            CatalogType::Enum(EnumType {
                name: name.to_string(),
                members,
                rust_path: rust_path.to_string(),
            }),
        )
    }

    /// Register a host asset kind. Cells of this type are resource paths.
    pub fn register_asset(&mut self, kind: &str) -> &mut Self {
        self.insert(
            kind,
            CatalogType::Asset {
                kind: kind.to_string(),
            },
        )
    }

    /// Register a record type that converts from cell text through `parser`.
    pub fn register_record<F>(
        &mut self,
        name: &str,
        rust_path: &str,
        default: Value,
        parser: F,
    ) -> &mut Self
    where
        F: Fn(&str) -> Result<Value, String> + Send + Sync + 'static,
    {
        let parser: RecordParser = Arc::new(parser);
        self.insert(
            name,
            CatalogType::Record(RecordType {
                name: name.to_string(),
                rust_path: rust_path.to_string(),
                default,
                parser: Some(parser),
            }),
        )
    }

    /// Register a record type with no text form; only empty cells convert.
    pub fn register_opaque_record(
        &mut self,
        name: &str,
        rust_path: &str,
        default: Value,
    ) -> &mut Self {
        self.insert(
            name,
            CatalogType::Record(RecordType {
                name: name.to_string(),
                rust_path: rust_path.to_string(),
                default,
                parser: None,
            }),
        )
    }

    fn insert(&mut self, name: &str, ty: CatalogType) -> &mut Self {
        if self.types.insert(name.to_string(), ty).is_some() {
            warn!(
                "type '{name}' registered twice in catalog partition '{}'; keeping the last",
                self.name
            );
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&CatalogType> {
        self.types.get(name)
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

// ===========================================================================
// Catalog
// ===========================================================================

/// Ordered set of partitions searched by the type resolver.
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    partitions: Vec<CatalogPartition>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a partition. Names it shares with earlier partitions stay
    /// resolved to the earlier definition.
    pub fn add_partition(&mut self, partition: CatalogPartition) -> &mut Self {
        for name in partition.types.keys() {
            if let Some(owner) = self.partitions.iter().find(|p| p.types.contains_key(name)) {
                warn!(
                    "type '{name}' in partition '{}' is shadowed by partition '{}'",
                    partition.name, owner.name
                );
            }
        }
        self.partitions.push(partition);
        self
    }

    /// The partition called `name`, created at the end of the search order
    /// if it does not exist yet.
    pub fn partition_mut(&mut self, name: &str) -> &mut CatalogPartition {
        let idx = match self.partitions.iter().position(|p| p.name == name) {
            Some(idx) => idx,
            None => {
                self.partitions.push(CatalogPartition::new(name));
                self.partitions.len() - 1
            }
        };
        &mut self.partitions[idx]
    }

    /// First definition of `name` in partition order.
    pub fn lookup(&self, name: &str) -> Option<&CatalogType> {
        self.partitions.iter().find_map(|p| p.get(name))
    }

    /// Names defined by more than one partition, sorted.
    pub fn shadowed_names(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        let mut shadowed = BTreeSet::new();
        for partition in &self.partitions {
            for name in partition.types.keys() {
                if !seen.insert(name.as_str()) {
                    shadowed.insert(name.clone());
                }
            }
        }
        shadowed.into_iter().collect()
    }

    pub fn partitions(&self) -> &[CatalogPartition] {
        &self.partitions
    }

    pub fn len(&self) -> usize {
        self.partitions.iter().map(CatalogPartition::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.iter().all(CatalogPartition::is_empty)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
