//! Maps textual type tokens to [`TypeDescriptor`]s.
//!
//! Resolution order: array suffix, primitive spellings, engine composite
//! aliases, then the registered [`TypeCatalog`]. Keywords are checked first
//! because they are cheap and unambiguous; the catalog scan is the only way
//! to reach user-defined enums, asset kinds, and records.

use crate::catalog::TypeCatalog;
use crate::types::{CompositeKind, PrimitiveKind, TypeDescriptor};

const ARRAY_SUFFIX: &str = "[]";

/// Errors raised while resolving a type token.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    #[error("empty type name is not allowed")]
    EmptyTypeName,
    #[error("type '{type_name}' not found")]
    UnknownType { type_name: String },
}

/// Resolves type tokens against built-ins and a type catalog.
#[derive(Debug, Clone, Copy)]
pub struct TypeResolver<'c> {
    catalog: &'c TypeCatalog,
}

impl<'c> TypeResolver<'c> {
    pub fn new(catalog: &'c TypeCatalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'c TypeCatalog {
        self.catalog
    }

    /// Resolve `type_name` to a descriptor.
    pub fn resolve(&self, type_name: &str) -> Result<TypeDescriptor, ResolveError> {
        if type_name.is_empty() {
            return Err(ResolveError::EmptyTypeName);
        }

        if let Some(inner) = type_name.strip_suffix(ARRAY_SUFFIX) {
            // `[]` alone strips to an empty token, which fails above.
            return self
                .resolve(inner)
                .map(TypeDescriptor::array_of)
                .map_err(|e| match e {
                    ResolveError::EmptyTypeName => ResolveError::UnknownType {
                        type_name: type_name.to_string(),
                    },
                    other => other,
                });
        }

        if let Some(kind) = PrimitiveKind::from_spelling(type_name) {
            return Ok(TypeDescriptor::Primitive(kind));
        }

        if let Some(kind) = CompositeKind::from_alias(type_name) {
            return Ok(TypeDescriptor::Composite(kind));
        }

        self.catalog
            .lookup(type_name)
            .map(|ty| ty.to_descriptor())
            .ok_or_else(|| ResolveError::UnknownType {
                type_name: type_name.to_string(),
            })
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogPartition;

    fn catalog() -> TypeCatalog {
        let mut catalog = TypeCatalog::new();
        let mut game = CatalogPartition::new("game");
        game.register_enum("Rarity", ["Common", "Rare"])
            .register_asset("Sprite");
        catalog.add_partition(game);
        catalog
    }

    #[test]
    fn resolves_primitives() {
        let catalog = catalog();
        let resolver = TypeResolver::new(&catalog);
        assert_eq!(
            resolver.resolve("int").unwrap(),
            TypeDescriptor::Primitive(PrimitiveKind::I32)
        );
        assert_eq!(
            resolver.resolve("string").unwrap(),
            TypeDescriptor::Primitive(PrimitiveKind::String)
        );
        assert_eq!(
            resolver.resolve("decimal").unwrap(),
            TypeDescriptor::Primitive(PrimitiveKind::Decimal)
        );
    }

    #[test]
    fn resolves_nested_arrays() {
        let catalog = catalog();
        let resolver = TypeResolver::new(&catalog);
        let ty = resolver.resolve("int[][]").unwrap();
        assert_eq!(
            ty,
            TypeDescriptor::array_of(TypeDescriptor::array_of(TypeDescriptor::Primitive(
                PrimitiveKind::I32
            )))
        );
    }

    #[test]
    fn resolves_composites_before_catalog() {
        let mut catalog = catalog();
        catalog.partition_mut("late").register_asset("Vector3");
        let resolver = TypeResolver::new(&catalog);
        assert_eq!(
            resolver.resolve("Vector3").unwrap(),
            TypeDescriptor::Composite(CompositeKind::Vector3)
        );
    }

    #[test]
    fn resolves_catalog_types() {
        let catalog = catalog();
        let resolver = TypeResolver::new(&catalog);
        assert!(matches!(
            resolver.resolve("Rarity").unwrap(),
            TypeDescriptor::Enum(ref e) if e.name == "Rarity"
        ));
        assert_eq!(
            resolver.resolve("Sprite[]").unwrap(),
            TypeDescriptor::array_of(TypeDescriptor::AssetReference("Sprite".into()))
        );
    }

    #[test]
    fn unknown_type_fails() {
        let catalog = catalog();
        let resolver = TypeResolver::new(&catalog);
        assert_eq!(
            resolver.resolve("intt"),
            Err(ResolveError::UnknownType {
                type_name: "intt".into()
            })
        );
    }

    #[test]
    fn unknown_inner_type_propagates_through_array() {
        let catalog = catalog();
        let resolver = TypeResolver::new(&catalog);
        assert_eq!(
            resolver.resolve("intt[]"),
            Err(ResolveError::UnknownType {
                type_name: "intt".into()
            })
        );
    }

    #[test]
    fn empty_and_bare_suffix_fail() {
        let catalog = catalog();
        let resolver = TypeResolver::new(&catalog);
        assert_eq!(resolver.resolve(""), Err(ResolveError::EmptyTypeName));
        assert!(matches!(
            resolver.resolve("[]"),
            Err(ResolveError::UnknownType { .. })
        ));
    }
}
