//! # Module Pricing
//!
//! Computes the cost of a single module from its assignments and the catalog.
//!
//! ## Cost Model
//!
//! One canonical formula per cost line (see [`crate::formulas`] for the
//! registry used in reports):
//!
//! - **Materials**: `price_per_sqm × quantity_sqm × (width × height / 10⁶)`.
//!   The area factor is the module's front face; depth is not part of it.
//! - **Accessories**: `unit_price × quantity`
//! - **Processing**: `rate(type) × extent`, extent in m or m² depending on the
//!   processing type
//! - **Labor**: `labor_hours(module_type) × labor_rate_per_hour`
//!
//! `Module::price` holds materials + accessories + processing. Labor only
//! enters at the quote level.
//!
//! Catalog ids that are not found contribute nothing. Values are kept as
//! `f64` throughout; rounding happens only in [`format_money`].
//!
//! ## Example
//!
//! ```rust
//! use joinery_core::catalog::Catalog;
//! use joinery_core::module::{Module, ModuleType, PartKind};
//! use joinery_core::pricing::price_breakdown;
//! use joinery_core::project::PricingSettings;
//!
//! let mut module = Module::new(ModuleType::BaseCabinet, 600.0, 720.0, 560.0);
//! module.set_material(PartKind::Body, "mdf-raw-19", 0.8);
//!
//! let cost = price_breakdown(&module, &Catalog::builtin(), &PricingSettings::default()).unwrap();
//! // 85 × 0.8 × 0.432
//! assert!((cost.materials - 29.376).abs() < 1e-9);
//! ```

use std::ops::AddAssign;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{CatalogProvider, Material};
use crate::errors::JoineryResult;
use crate::module::{AccessoryAssignment, MaterialAssignment, Module, ProcessingAssignment};
use crate::project::{PricingSettings, Project};
use crate::units::{Millimeters, SquareMeters};

/// Cost lines for one module (or a sum of modules).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ModuleCost {
    pub materials: f64,
    pub accessories: f64,
    pub processing: f64,
    pub labor: f64,
}

impl ModuleCost {
    /// Materials + accessories + processing (the module price)
    pub fn total(&self) -> f64 {
        self.materials + self.accessories + self.processing
    }

    /// Module price plus labor
    pub fn total_with_labor(&self) -> f64 {
        self.total() + self.labor
    }
}

impl AddAssign for ModuleCost {
    fn add_assign(&mut self, rhs: Self) {
        self.materials += rhs.materials;
        self.accessories += rhs.accessories;
        self.processing += rhs.processing;
        self.labor += rhs.labor;
    }
}

/// Cost of one material assignment.
pub fn material_line_cost(module: &Module, assignment: &MaterialAssignment, material: &Material) -> f64 {
    let face = SquareMeters::from_rect_mm(Millimeters(module.width_mm), Millimeters(module.height_mm));
    material.price_per_sqm * assignment.quantity_sqm * face.value()
}

/// Cost of one processing assignment.
pub fn processing_line_cost(assignment: &ProcessingAssignment, settings: &PricingSettings) -> f64 {
    settings.processing_rate(assignment.processing_type) * assignment.extent
}

fn accessory_line_cost<C: CatalogProvider + ?Sized>(assignment: &AccessoryAssignment, catalog: &C) -> f64 {
    match catalog.accessory(&assignment.accessory_id) {
        Some(item) => item.unit_price * f64::from(assignment.quantity),
        None => {
            debug!(accessory = %assignment.accessory_id, "accessory not in catalog, priced at zero");
            0.0
        }
    }
}

/// Compute the cost breakdown of a module.
///
/// # Errors
///
/// `InvalidInput` when the module fails [`Module::validate`].
pub fn price_breakdown<C: CatalogProvider + ?Sized>(
    module: &Module,
    catalog: &C,
    settings: &PricingSettings,
) -> JoineryResult<ModuleCost> {
    module.validate()?;

    let materials = module
        .materials
        .iter()
        .map(|assignment| match catalog.material(&assignment.material_id) {
            Some(material) => material_line_cost(module, assignment, material),
            None => {
                debug!(material = %assignment.material_id, "material not in catalog, priced at zero");
                0.0
            }
        })
        .sum();

    let accessories = module
        .accessories
        .iter()
        .map(|assignment| accessory_line_cost(assignment, catalog))
        .sum();

    let processing = module
        .processing
        .iter()
        .map(|assignment| processing_line_cost(assignment, settings))
        .sum();

    let labor = settings.labor_hours_for(module.module_type) * settings.labor_rate_per_hour;

    Ok(ModuleCost {
        materials,
        accessories,
        processing,
        labor,
    })
}

/// Return a copy of the module with `price` set.
pub fn calculate_price<C: CatalogProvider + ?Sized>(
    module: &Module,
    catalog: &C,
    settings: &PricingSettings,
) -> JoineryResult<Module> {
    let cost = price_breakdown(module, catalog, settings)?;
    let mut priced = module.clone();
    priced.price = cost.total();
    Ok(priced)
}

/// Return a copy of the project with every module priced.
pub fn price_project<C: CatalogProvider + ?Sized>(project: &Project, catalog: &C) -> JoineryResult<Project> {
    let settings = &project.settings.pricing;
    let modules = project
        .modules
        .iter()
        .map(|m| calculate_price(m, catalog, settings))
        .collect::<JoineryResult<Vec<_>>>()?;

    let mut priced = project.clone();
    priced.modules = modules;
    priced.touch();
    Ok(priced)
}

/// Round to cents.
pub fn round_money(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Format an amount for display, e.g. `1234.50 RON`.
pub fn format_money(amount: f64, currency: &str) -> String {
    format!("{:.2} {}", round_money(amount), currency)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AccessoryItem, AccessoryType, Catalog, MaterialType};
    use crate::module::{ModuleType, PartKind, ProcessingType};

    fn catalog() -> Catalog {
        Catalog::from_parts(
            vec![Material::new("body-90", "Body board", MaterialType::Pal, 18.0, 90.0)],
            vec![
                AccessoryItem::new("hinge", "Hinge", AccessoryType::Hinge, 12.5),
                AccessoryItem::new("handle", "Handle", AccessoryType::Handle, 20.0),
            ],
        )
        .unwrap()
    }

    fn base_cabinet() -> Module {
        let mut module = Module::new(ModuleType::BaseCabinet, 600.0, 720.0, 560.0);
        module.set_material(PartKind::Body, "body-90", 0.8);
        module
    }

    #[test]
    fn test_single_material_scenario() {
        let cost = price_breakdown(&base_cabinet(), &catalog(), &PricingSettings::default()).unwrap();
        // 90 × 0.8 × (600 × 720 / 1e6) = 90 × 0.8 × 0.432
        assert!((cost.materials - 31.104).abs() < 1e-9);
        assert_eq!(cost.accessories, 0.0);
        assert_eq!(cost.processing, 0.0);
    }

    #[test]
    fn test_depth_does_not_change_material_cost() {
        let settings = PricingSettings::default();
        let shallow = price_breakdown(&base_cabinet(), &catalog(), &settings).unwrap();
        let mut deep_module = base_cabinet();
        deep_module.depth_mm = 900.0;
        let deep = price_breakdown(&deep_module, &catalog(), &settings).unwrap();
        assert_eq!(shallow.materials, deep.materials);
    }

    #[test]
    fn test_accessory_cost() {
        let mut module = base_cabinet();
        module.add_accessory("hinge", AccessoryType::Hinge, 4);
        module.add_accessory("handle", AccessoryType::Handle, 1);

        let cost = price_breakdown(&module, &catalog(), &PricingSettings::default()).unwrap();
        assert!((cost.accessories - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_accessory_cost_monotonic_in_quantity() {
        let settings = PricingSettings::default();
        let mut previous = -1.0;
        for quantity in 0..10 {
            let mut module = base_cabinet();
            module.add_accessory("hinge", AccessoryType::Hinge, quantity);
            let cost = price_breakdown(&module, &catalog(), &settings).unwrap();
            assert!(cost.accessories >= previous);
            previous = cost.accessories;
        }
    }

    #[test]
    fn test_processing_uses_rates() {
        let mut module = base_cabinet();
        module.add_processing(ProcessingType::EdgeBanding, 10.0, Some("body-90".to_string()));
        module.add_processing(ProcessingType::Painting, 0.5, None);

        let mut settings = PricingSettings::default();
        let cost = price_breakdown(&module, &catalog(), &settings).unwrap();
        assert!((cost.processing - (45.0 + 60.0)).abs() < 1e-9);

        settings.processing_rates.insert(ProcessingType::Painting, 200.0);
        let cost = price_breakdown(&module, &catalog(), &settings).unwrap();
        assert!((cost.processing - (45.0 + 100.0)).abs() < 1e-9);
    }

    #[test]
    fn test_labor_from_module_type() {
        let settings = PricingSettings::default();
        let cost = price_breakdown(&base_cabinet(), &catalog(), &settings).unwrap();
        assert!((cost.labor - 1.5 * 25.0).abs() < 1e-9);
        assert!((cost.total_with_labor() - (cost.total() + cost.labor)).abs() < 1e-12);
    }

    #[test]
    fn test_missing_references_cost_nothing() {
        let mut module = base_cabinet();
        module.set_material(PartKind::Door, "unknown-board", 1.0);
        module.add_accessory("unknown-hinge", AccessoryType::Hinge, 3);

        let cost = price_breakdown(&module, &Catalog::new(), &PricingSettings::default()).unwrap();
        assert_eq!(cost.materials, 0.0);
        assert_eq!(cost.accessories, 0.0);
    }

    #[test]
    fn test_calculate_price_returns_new_module() {
        let mut module = base_cabinet();
        module.add_accessory("hinge", AccessoryType::Hinge, 2);

        let priced = calculate_price(&module, &catalog(), &PricingSettings::default()).unwrap();
        assert_eq!(module.price, 0.0);
        assert!((priced.price - (31.104 + 25.0)).abs() < 1e-9);
        assert_eq!(priced.id, module.id);
    }

    #[test]
    fn test_invalid_dimensions_rejected() {
        let module = Module::new(ModuleType::BaseCabinet, 600.0, -1.0, 560.0);
        let err = calculate_price(&module, &catalog(), &PricingSettings::default()).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_price_project() {
        let mut project = Project::new("Kitchen", "Ana");
        project.add_module(base_cabinet());
        project.add_module(base_cabinet());

        let priced = price_project(&project, &catalog()).unwrap();
        assert!((priced.modules_price() - 2.0 * 31.104).abs() < 1e-9);
        assert_eq!(project.modules_price(), 0.0);
    }

    #[test]
    fn test_money_formatting() {
        assert_eq!(format_money(31.104, "RON"), "31.10 RON");
        assert_eq!(format_money(0.005, "EUR"), "0.01 EUR");
        assert_eq!(round_money(1234.5678), 1234.57);
    }
}
