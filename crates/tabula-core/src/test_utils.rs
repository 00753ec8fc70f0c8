//! Shared test helpers for unit tests, integration tests, and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available everywhere tests run (via the `test-utils` feature).

use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::{CatalogPartition, TypeCatalog};
use crate::value::Value;

// ===========================================================================
// Temp directories
// ===========================================================================

/// Create a temporary directory with a unique name for test isolation.
pub fn make_test_dir(suffix: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "tabula_test_{suffix}_{}",
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Clean up a test directory.
pub fn cleanup(dir: &Path) {
    let _ = fs::remove_dir_all(dir);
}

/// Write a sheet file into `dir` and return its path.
pub fn write_sheet(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

// ===========================================================================
// Catalog
// ===========================================================================

/// Members of the sample `Rarity` enum, in declaration order.
pub const RARITY_MEMBERS: [&str; 3] = ["Common", "Rare", "Epic"];

/// A catalog with one `game` partition:
///
/// - `Rarity`: enum generated as `crate::Rarity`
/// - `Sprite`, `AudioClip`: asset kinds
/// - `Tag`: record type parsed from its text, upper-cased
pub fn sample_catalog() -> TypeCatalog {
    let mut game = CatalogPartition::new("game");
    game.register_enum_at("Rarity", "crate::Rarity", RARITY_MEMBERS)
        .register_asset("Sprite")
        .register_asset("AudioClip")
        .register_record("Tag", "crate::Tag", Value::String(String::new()), |s| {
            Ok(Value::String(s.to_uppercase()))
        });

    let mut catalog = TypeCatalog::new();
    catalog.add_partition(game);
    catalog
}
