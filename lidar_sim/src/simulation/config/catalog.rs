// lidar_sim/src/simulation/config/catalog.rs

//! The `PresetCatalog` resource: reusable sensor settings loaded from disk.

use bevy::prelude::*;
use figment::{
    providers::{Format, Toml},
    value::Value,
    Figment,
};
use std::{
    collections::HashMap,
    path::{Path, MAIN_SEPARATOR},
};
use walkdir::WalkDir;

/// Every preset found under the catalog root, keyed by its dotted relative path
/// (`lidars/puck16.toml` becomes `"lidars.puck16"`).
#[derive(Resource, Default, Debug, Clone)]
pub struct PresetCatalog(pub HashMap<String, Value>);

impl PresetCatalog {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Dotted catalog key for `path` relative to `root`. `None` if `path` is outside it.
pub fn catalog_key(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    Some(
        relative
            .with_extension("")
            .to_string_lossy()
            .replace(MAIN_SEPARATOR, "."),
    )
}

/// Walks `root` and parses every `.toml` file into a catalog entry.
///
/// A missing root or a broken file is logged and skipped; scenarios that don't
/// reference presets work without any catalog at all.
pub fn load_catalog(root: &Path) -> PresetCatalog {
    let mut catalog = PresetCatalog::default();
    if !root.exists() {
        warn!(
            "Catalog directory not found at {:?}, no presets will be available.",
            root
        );
        return catalog;
    }

    info!("Loading preset catalog from: {:?}", root);

    for entry in WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file() && e.path().extension().is_some_and(|ext| ext == "toml"))
    {
        let path = entry.path();
        let Some(key) = catalog_key(root, path) else {
            continue;
        };

        match Figment::new().merge(Toml::file(path)).extract::<Value>() {
            Ok(data) => {
                debug!("Loaded catalog preset: '{}'", key);
                catalog.0.insert(key, data);
            }
            Err(e) => {
                error!("Failed to load catalog preset from {:?}: {}", path, e);
            }
        }
    }

    info!("Catalog ready with {} preset(s).", catalog.len());
    catalog
}
