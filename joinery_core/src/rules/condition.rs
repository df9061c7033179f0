//! Rule conditions.
//!
//! Every field is optional; an unset field matches anything. A condition
//! matches when all of its set fields match (conjunction). Material lookups
//! that miss the catalog make the material clauses false rather than failing.

use serde::{Deserialize, Serialize};

use crate::catalog::{AccessoryType, CatalogProvider, MaterialType};
use crate::module::{Module, ModuleType, ProcessingType};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleCondition {
    /// Module types the rule applies to. Empty means any type.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub module_types: Vec<ModuleType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_width_mm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_width_mm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_height_mm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_height_mm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_depth_mm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_depth_mm: Option<f64>,

    /// Strict lower bounds: the dimension must be greater than the value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width_over_mm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_over_mm: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth_over_mm: Option<f64>,

    /// Any material assignment of this type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_type: Option<MaterialType>,

    /// A door or drawer-front assignment of this type
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front_material_type: Option<MaterialType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_accessory: Option<AccessoryType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lacks_accessory: Option<AccessoryType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_type: Option<ProcessingType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_door: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_drawer: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_handle: Option<bool>,
}

impl RuleCondition {
    /// A condition that matches every module
    pub fn any() -> Self {
        RuleCondition::default()
    }

    pub fn for_modules(module_types: &[ModuleType]) -> Self {
        RuleCondition {
            module_types: module_types.to_vec(),
            ..RuleCondition::default()
        }
    }

    pub fn matches<C: CatalogProvider + ?Sized>(&self, module: &Module, catalog: &C) -> bool {
        if !self.module_types.is_empty() && !self.module_types.contains(&module.module_type) {
            return false;
        }

        if !within(module.width_mm, self.min_width_mm, self.max_width_mm)
            || !within(module.height_mm, self.min_height_mm, self.max_height_mm)
            || !within(module.depth_mm, self.min_depth_mm, self.max_depth_mm)
        {
            return false;
        }

        if !above(module.width_mm, self.width_over_mm)
            || !above(module.height_mm, self.height_over_mm)
            || !above(module.depth_mm, self.depth_over_mm)
        {
            return false;
        }

        if let Some(wanted) = self.material_type {
            let found = module
                .materials
                .iter()
                .filter_map(|a| catalog.material(&a.material_id))
                .any(|m| m.material_type == wanted);
            if !found {
                return false;
            }
        }

        if let Some(wanted) = self.front_material_type {
            let found = module
                .front_materials(catalog)
                .iter()
                .any(|m| m.material_type == wanted);
            if !found {
                return false;
            }
        }

        if let Some(accessory_type) = self.has_accessory {
            if !module.has_accessory(accessory_type) {
                return false;
            }
        }

        if let Some(accessory_type) = self.lacks_accessory {
            if module.has_accessory(accessory_type) {
                return false;
            }
        }

        if let Some(processing_type) = self.processing_type {
            if !module.has_processing(processing_type) {
                return false;
            }
        }

        flag_matches(self.has_door, module.has_door())
            && flag_matches(self.has_drawer, module.has_drawer())
            && flag_matches(self.has_handle, module.has_handle())
    }
}

/// Inclusive range check with open ends
fn within(value: f64, min: Option<f64>, max: Option<f64>) -> bool {
    min.map_or(true, |lo| value >= lo) && max.map_or(true, |hi| value <= hi)
}

fn above(value: f64, bound: Option<f64>) -> bool {
    bound.map_or(true, |lo| value > lo)
}

fn flag_matches(expected: Option<bool>, actual: bool) -> bool {
    expected.map_or(true, |e| e == actual)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::module::PartKind;

    fn cabinet() -> Module {
        Module::from_template(ModuleType::BaseCabinet, "B-1")
    }

    #[test]
    fn test_empty_condition_matches_everything() {
        let catalog = Catalog::new();
        assert!(RuleCondition::any().matches(&cabinet(), &catalog));
    }

    #[test]
    fn test_module_type_filter() {
        let catalog = Catalog::new();
        let cond = RuleCondition::for_modules(&[ModuleType::WallCabinet]);
        assert!(!cond.matches(&cabinet(), &catalog));
        assert!(cond.matches(&Module::from_template(ModuleType::WallCabinet, "W"), &catalog));
    }

    #[test]
    fn test_dimension_bounds_are_inclusive() {
        let catalog = Catalog::new();
        let cond = RuleCondition {
            min_width_mm: Some(600.0),
            max_height_mm: Some(720.0),
            ..RuleCondition::default()
        };
        assert!(cond.matches(&cabinet(), &catalog));

        let mut narrow = cabinet();
        narrow.width_mm = 599.0;
        assert!(!cond.matches(&narrow, &catalog));
    }

    #[test]
    fn test_strict_lower_bound() {
        let catalog = Catalog::new();
        let cond = RuleCondition {
            depth_over_mm: Some(400.0),
            ..RuleCondition::default()
        };

        let mut module = cabinet();
        module.depth_mm = 400.0;
        assert!(!cond.matches(&module, &catalog));

        module.depth_mm = 400.5;
        assert!(cond.matches(&module, &catalog));
    }

    #[test]
    fn test_front_material_condition() {
        let catalog = Catalog::builtin();
        let cond = RuleCondition {
            front_material_type: Some(MaterialType::Glass),
            ..RuleCondition::default()
        };

        let mut module = cabinet();
        module.set_material(PartKind::Body, "glass-clear-4", 1.0);
        assert!(!cond.matches(&module, &catalog), "glass on the body is not a glass front");

        module.set_material(PartKind::Door, "glass-clear-4", 0.4);
        assert!(cond.matches(&module, &catalog));
    }

    #[test]
    fn test_missing_material_is_non_matching() {
        let catalog = Catalog::new();
        let cond = RuleCondition {
            material_type: Some(MaterialType::Pal),
            ..RuleCondition::default()
        };
        let mut module = cabinet();
        module.set_material(PartKind::Body, "pal-white-18", 2.0);
        assert!(!cond.matches(&module, &catalog));
    }

    #[test]
    fn test_presence_flags() {
        let catalog = Catalog::new();
        let cond = RuleCondition {
            has_drawer: Some(true),
            has_handle: Some(false),
            ..RuleCondition::default()
        };
        let mut module = cabinet();
        assert!(!cond.matches(&module, &catalog));

        module.add_accessory("slide-blum-tandem-500", AccessoryType::Slide, 2);
        assert!(cond.matches(&module, &catalog));

        module.add_accessory("handle-bar-128", AccessoryType::Handle, 1);
        assert!(!cond.matches(&module, &catalog));
    }

    #[test]
    fn test_processing_and_accessory_clauses() {
        let catalog = Catalog::new();
        let cond = RuleCondition {
            processing_type: Some(ProcessingType::Painting),
            lacks_accessory: Some(AccessoryType::Foot),
            ..RuleCondition::default()
        };
        let mut module = cabinet();
        module.add_processing(ProcessingType::Painting, 0.8, None);
        assert!(cond.matches(&module, &catalog));

        module.add_accessory("foot-adjustable-100", AccessoryType::Foot, 4);
        assert!(!cond.matches(&module, &catalog));
    }
}
