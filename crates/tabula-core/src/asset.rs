//! Asset-reference resolution.
//!
//! Asset-typed cells hold resource paths. The converter hands each non-empty
//! path to an [`AssetResolver`], which plays the part of the host's resource
//! loader.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

use crate::value::AssetHandle;

/// Host collaborator that turns a resource path into an asset handle.
pub trait AssetResolver {
    /// Resolve `path` as an asset of `kind`. `None` means no such asset.
    fn load_asset_reference(&self, path: &str, kind: &str) -> Option<AssetHandle>;
}

impl<T: AssetResolver + ?Sized> AssetResolver for &T {
    fn load_asset_reference(&self, path: &str, kind: &str) -> Option<AssetHandle> {
        (**self).load_asset_reference(path, kind)
    }
}

/// Resolver that knows no assets.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAssets;

impl AssetResolver for NoAssets {
    fn load_asset_reference(&self, _path: &str, _kind: &str) -> Option<AssetHandle> {
        None
    }
}

/// In-memory resolver keyed by `(kind, path)`.
#[derive(Debug, Clone, Default)]
pub struct MapAssetResolver {
    assets: HashMap<(String, String), AssetHandle>,
}

impl MapAssetResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `path` resolvable as an asset of `kind`.
    pub fn insert(&mut self, kind: &str, path: &str) -> AssetHandle {
        let handle = AssetHandle {
            kind: kind.to_string(),
            path: path.to_string(),
        };
        self.assets
            .insert((kind.to_string(), path.to_string()), handle.clone());
        handle
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

impl AssetResolver for MapAssetResolver {
    fn load_asset_reference(&self, path: &str, kind: &str) -> Option<AssetHandle> {
        self.assets
            .get(&(kind.to_string(), path.to_string()))
            .cloned()
    }
}

/// Resolves paths to files that exist under a root directory.
///
/// Paths that escape the root (absolute, or containing `..`) never resolve.
#[derive(Debug, Clone)]
pub struct FsAssetResolver {
    root: PathBuf,
}

impl FsAssetResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetResolver for FsAssetResolver {
    fn load_asset_reference(&self, path: &str, kind: &str) -> Option<AssetHandle> {
        let relative = Path::new(path);
        let contained = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !contained || !self.root.join(relative).is_file() {
            return None;
        }
        Some(AssetHandle {
            kind: kind.to_string(),
            path: path.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{cleanup, make_test_dir};
    use std::fs;

    #[test]
    fn no_assets_never_resolves() {
        assert!(NoAssets.load_asset_reference("a.png", "Sprite").is_none());
    }

    #[test]
    fn map_resolver_matches_kind_and_path() {
        let mut assets = MapAssetResolver::new();
        let handle = assets.insert("Sprite", "ui/icon.png");
        assert_eq!(
            assets.load_asset_reference("ui/icon.png", "Sprite"),
            Some(handle)
        );
        assert!(assets.load_asset_reference("ui/icon.png", "AudioClip").is_none());
        assert_eq!(assets.len(), 1);
    }

    #[test]
    fn fs_resolver_finds_files_under_root() {
        let dir = make_test_dir("asset_fs");
        fs::create_dir_all(dir.join("ui")).unwrap();
        fs::write(dir.join("ui/icon.png"), b"png").unwrap();

        let assets = FsAssetResolver::new(&dir);
        let handle = assets.load_asset_reference("ui/icon.png", "Sprite").unwrap();
        assert_eq!(handle.path, "ui/icon.png");
        assert_eq!(handle.kind, "Sprite");
        assert!(assets.load_asset_reference("ui/missing.png", "Sprite").is_none());
        assert!(assets.load_asset_reference("../icon.png", "Sprite").is_none());
        assert!(assets.load_asset_reference("ui", "Sprite").is_none());

        cleanup(&dir);
    }
}
