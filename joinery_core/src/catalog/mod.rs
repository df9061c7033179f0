//! # Catalog
//!
//! Reference data for everything that can be assigned to a module: board
//! materials and hardware accessories. The catalog is read-only from the point
//! of view of rules and pricing.
//!
//! Data is validated once, when a catalog is built or loaded. Consumers can
//! then rely on finite, non-negative prices and unique ids without re-checking.
//!
//! ## Example
//!
//! ```rust
//! use joinery_core::catalog::{AccessoryType, Catalog, CatalogProvider};
//! use joinery_core::module::ModuleType;
//!
//! let catalog = Catalog::builtin();
//! let hinges = catalog.accessories_by_type(AccessoryType::Hinge);
//! assert!(!hinges.is_empty());
//!
//! // First compatible item is picked by id, never by insertion order
//! let feet = catalog.compatible_accessories(AccessoryType::Foot, ModuleType::BaseCabinet);
//! assert_eq!(feet[0].id, "foot-adjustable-100");
//! ```

pub mod accessories;
pub mod builtin;
pub mod materials;

pub use accessories::{AccessoryItem, AccessoryType};
pub use materials::{Material, MaterialType};

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{JoineryError, JoineryResult};
use crate::module::ModuleType;

/// Read access to catalog data.
///
/// All listings are ordered by id so that callers picking "the first match"
/// get the same item on every run.
pub trait CatalogProvider {
    fn all_materials(&self) -> Vec<&Material>;
    fn all_accessories(&self) -> Vec<&AccessoryItem>;
    fn accessories_by_type(&self, accessory_type: AccessoryType) -> Vec<&AccessoryItem>;
    fn material(&self, id: &str) -> Option<&Material>;
    fn accessory(&self, id: &str) -> Option<&AccessoryItem>;

    /// Accessories of a type that fit a module type, sorted by id.
    fn compatible_accessories(&self, accessory_type: AccessoryType, module_type: ModuleType) -> Vec<&AccessoryItem> {
        self.accessories_by_type(accessory_type)
            .into_iter()
            .filter(|item| item.fits(module_type))
            .collect()
    }
}

/// On-disk shape of a catalog file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub materials: Vec<Material>,
    #[serde(default)]
    pub accessories: Vec<AccessoryItem>,
}

/// In-memory catalog keyed by id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "CatalogFile", try_from = "CatalogFile")]
pub struct Catalog {
    materials: BTreeMap<String, Material>,
    accessories: BTreeMap<String, AccessoryItem>,
}

impl Catalog {
    /// An empty catalog. Pricing against it yields zero material and
    /// accessory costs.
    pub fn new() -> Self {
        Catalog::default()
    }

    /// The built-in reference catalog.
    pub fn builtin() -> Self {
        let mut catalog = Catalog::new();
        for material in builtin::materials() {
            catalog.materials.insert(material.id.clone(), material);
        }
        for item in builtin::accessories() {
            catalog.accessories.insert(item.id.clone(), item);
        }
        catalog
    }

    /// Build a catalog from lists, validating every entry.
    ///
    /// Rejects empty or duplicate ids and negative or non-finite prices.
    pub fn from_parts(materials: Vec<Material>, accessories: Vec<AccessoryItem>) -> JoineryResult<Self> {
        let mut catalog = Catalog::new();

        for material in materials {
            material.validate()?;
            if catalog.materials.contains_key(&material.id) {
                return Err(JoineryError::invalid_input(
                    "materials.id",
                    material.id,
                    "Duplicate material id",
                ));
            }
            catalog.materials.insert(material.id.clone(), material);
        }

        for item in accessories {
            item.validate()?;
            if catalog.accessories.contains_key(&item.id) {
                return Err(JoineryError::invalid_input(
                    "accessories.id",
                    item.id,
                    "Duplicate accessory id",
                ));
            }
            catalog.accessories.insert(item.id.clone(), item);
        }

        Ok(catalog)
    }

    /// Parse and validate a JSON catalog.
    pub fn from_json(json: &str) -> JoineryResult<Self> {
        let file: CatalogFile = serde_json::from_str(json)
            .map_err(|e| JoineryError::serialization(format!("Invalid catalog JSON: {}", e)))?;
        Catalog::from_parts(file.materials, file.accessories)
    }

    pub fn material_count(&self) -> usize {
        self.materials.len()
    }

    pub fn accessory_count(&self) -> usize {
        self.accessories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty() && self.accessories.is_empty()
    }
}

impl CatalogProvider for Catalog {
    fn all_materials(&self) -> Vec<&Material> {
        self.materials.values().collect()
    }

    fn all_accessories(&self) -> Vec<&AccessoryItem> {
        self.accessories.values().collect()
    }

    fn accessories_by_type(&self, accessory_type: AccessoryType) -> Vec<&AccessoryItem> {
        self.accessories
            .values()
            .filter(|item| item.accessory_type == accessory_type)
            .collect()
    }

    fn material(&self, id: &str) -> Option<&Material> {
        self.materials.get(id)
    }

    fn accessory(&self, id: &str) -> Option<&AccessoryItem> {
        self.accessories.get(id)
    }
}

impl From<Catalog> for CatalogFile {
    fn from(catalog: Catalog) -> Self {
        CatalogFile {
            materials: catalog.materials.into_values().collect(),
            accessories: catalog.accessories.into_values().collect(),
        }
    }
}

impl TryFrom<CatalogFile> for Catalog {
    type Error = JoineryError;

    fn try_from(file: CatalogFile) -> Result<Self, Self::Error> {
        Catalog::from_parts(file.materials, file.accessories)
    }
}

/// Load and validate a catalog from a JSON file.
pub fn load_catalog(path: &Path) -> JoineryResult<Catalog> {
    let contents = fs::read_to_string(path)
        .map_err(|e| JoineryError::file_error("read catalog", path.display().to_string(), e.to_string()))?;
    let catalog = Catalog::from_json(&contents)?;
    tracing::info!(
        path = %path.display(),
        materials = catalog.material_count(),
        accessories = catalog.accessory_count(),
        "loaded catalog"
    );
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = Catalog::builtin();
        let rebuilt = Catalog::from_parts(
            catalog.all_materials().into_iter().cloned().collect(),
            catalog.all_accessories().into_iter().cloned().collect(),
        )
        .unwrap();
        assert_eq!(catalog, rebuilt);
        assert!(catalog.material_count() >= 6);
    }

    #[test]
    fn test_listings_sorted_by_id() {
        let catalog = Catalog::builtin();
        let ids: Vec<&str> = catalog.all_accessories().iter().map(|a| a.id.as_str()).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_compatible_accessories_filters_module_type() {
        let catalog = Catalog::builtin();
        let hinges = catalog.compatible_accessories(AccessoryType::Hinge, ModuleType::WallCabinet);
        assert_eq!(hinges.len(), 1);
        assert_eq!(hinges[0].id, "hinge-blum-clip-110");

        let corner_hinges = catalog.compatible_accessories(AccessoryType::Hinge, ModuleType::CornerCabinet);
        assert_eq!(corner_hinges.len(), 2);

        let feet = catalog.compatible_accessories(AccessoryType::Foot, ModuleType::WallCabinet);
        assert!(feet.is_empty());
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = Catalog::new();
        assert!(catalog.is_empty());
        assert!(catalog.all_materials().is_empty());
        assert!(catalog.accessories_by_type(AccessoryType::Slide).is_empty());
        assert!(catalog.material("pal-white-18").is_none());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let m = Material::new("dup", "A", MaterialType::Pal, 18.0, 10.0);
        let err = Catalog::from_parts(vec![m.clone(), m], vec![]).unwrap_err();
        assert!(err.to_string().contains("Duplicate material id"));
    }

    #[test]
    fn test_json_roundtrip_validates() {
        let json = serde_json::to_string(&Catalog::builtin()).unwrap();
        let parsed = Catalog::from_json(&json).unwrap();
        assert_eq!(parsed, Catalog::builtin());

        let bad = r#"{"materials":[{"id":"x","name":"X","material_type":"PAL","thickness_mm":18,"price_per_sqm":-5}]}"#;
        assert!(Catalog::from_json(bad).is_err());
        assert!(serde_json::from_str::<Catalog>(bad).is_err());
    }

    #[test]
    fn test_load_catalog_from_file() {
        let path = std::env::temp_dir().join("joinery_test_catalog.json");
        fs::write(&path, serde_json::to_string_pretty(&Catalog::builtin()).unwrap()).unwrap();

        let loaded = load_catalog(&path).unwrap();
        assert_eq!(loaded.accessory_count(), Catalog::builtin().accessory_count());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_missing_catalog_is_file_error() {
        let err = load_catalog(Path::new("/nonexistent/joinery/catalog.json")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }
}
