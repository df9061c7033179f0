//! # Project Data Structures
//!
//! The `Project` struct is the root container for a furniture design.
//! Projects serialize to `.jnr` files as human-readable JSON.
//!
//! ## Structure
//!
//! ```text
//! Project
//! ├── meta: ProjectMetadata (version, id, name, designer, status, timestamps)
//! ├── room: RoomDimensions (mm)
//! ├── settings: ProjectSettings (pricing: tax, discount cap, rates)
//! └── modules: Vec<Module> (scene order)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use joinery_core::module::{Module, ModuleType};
//! use joinery_core::project::Project;
//!
//! let mut project = Project::new("Kitchen Popescu", "Ana Designer");
//! let id = project.add_module(Module::from_template(ModuleType::BaseCabinet, "B-1"));
//! assert!(project.get_module(&id).is_some());
//!
//! let json = serde_json::to_string_pretty(&project).unwrap();
//! assert!(json.contains("Kitchen Popescu"));
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{JoineryError, JoineryResult};
use crate::module::{Module, ModuleType, ProcessingType};

/// Current schema version for .jnr files
pub const SCHEMA_VERSION: &str = "0.1.0";

/// Root project container.
///
/// Modules are kept in a `Vec` rather than a map: the order is the scene
/// order the user built, and a fixed iteration order keeps aggregated
/// floating-point totals reproducible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub meta: ProjectMetadata,

    #[serde(default)]
    pub room: RoomDimensions,

    #[serde(default)]
    pub settings: ProjectSettings,

    #[serde(default)]
    pub modules: Vec<Module>,
}

impl Project {
    /// Create a new empty draft project.
    pub fn new(name: impl Into<String>, designer: impl Into<String>) -> Self {
        let now = Utc::now();
        Project {
            meta: ProjectMetadata {
                version: SCHEMA_VERSION.to_string(),
                id: Uuid::new_v4(),
                name: name.into(),
                designer: designer.into(),
                status: ProjectStatus::Draft,
                created: now,
                modified: now,
            },
            room: RoomDimensions::default(),
            settings: ProjectSettings::default(),
            modules: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.meta.id
    }

    /// Add a module to the project. Returns the module's id.
    pub fn add_module(&mut self, module: Module) -> Uuid {
        let id = module.id;
        self.modules.push(module);
        self.touch();
        id
    }

    /// Remove a module by id. Returns the removed module if it existed.
    pub fn remove_module(&mut self, id: &Uuid) -> Option<Module> {
        let index = self.modules.iter().position(|m| &m.id == id)?;
        let module = self.modules.remove(index);
        self.touch();
        Some(module)
    }

    pub fn get_module(&self, id: &Uuid) -> Option<&Module> {
        self.modules.iter().find(|m| &m.id == id)
    }

    /// Get a mutable reference to a module.
    ///
    /// Marks the project as modified when the module exists.
    pub fn get_module_mut(&mut self, id: &Uuid) -> Option<&mut Module> {
        let index = self.modules.iter().position(|m| &m.id == id)?;
        self.meta.modified = Utc::now();
        self.modules.get_mut(index)
    }

    /// Replace a module with an updated value carrying the same id.
    pub fn replace_module(&mut self, module: Module) -> Option<Module> {
        let index = self.modules.iter().position(|m| m.id == module.id)?;
        let old = std::mem::replace(&mut self.modules[index], module);
        self.touch();
        Some(old)
    }

    /// Update the modified timestamp.
    pub fn touch(&mut self) {
        self.meta.modified = Utc::now();
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    /// Sum of the last computed module prices
    pub fn modules_price(&self) -> f64 {
        self.modules.iter().map(|m| m.price).sum()
    }
}

impl Default for Project {
    fn default() -> Self {
        Project::new("", "")
    }
}

/// Project metadata stored in the file header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectMetadata {
    /// Schema version (for migration compatibility)
    pub version: String,

    pub id: Uuid,

    pub name: String,

    #[serde(default)]
    pub designer: String,

    #[serde(default)]
    pub status: ProjectStatus,

    pub created: DateTime<Utc>,

    pub modified: DateTime<Utc>,
}

/// Project lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Draft,
    Saved,
    Completed,
    Archived,
}

/// Room size in millimeters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoomDimensions {
    pub width_mm: f64,
    pub length_mm: f64,
    pub height_mm: f64,
}

impl Default for RoomDimensions {
    fn default() -> Self {
        RoomDimensions {
            width_mm: 4000.0,
            length_mm: 3000.0,
            height_mm: 2600.0,
        }
    }
}

/// Per-project settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ProjectSettings {
    #[serde(default)]
    pub pricing: PricingSettings,
}

/// Pricing configuration: tax, discount cap, quote validity and unit rates.
///
/// Every field has a default, so a settings block in a project file only needs
/// the values it overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingSettings {
    /// Currency code shown on quotes
    pub currency: String,

    /// VAT percentage applied after discount
    pub tax_rate_percent: f64,

    /// Largest discount a quote may carry, percent
    pub max_discount_percent: f64,

    /// Days a quote stays valid
    pub quote_validity_days: u32,

    /// Workshop labor rate per hour
    pub labor_rate_per_hour: f64,

    /// Rate per extent unit (m or m²) for each processing type
    pub processing_rates: BTreeMap<ProcessingType, f64>,

    /// Assembly hours per module type
    pub labor_hours: BTreeMap<ModuleType, f64>,
}

impl PricingSettings {
    /// Unit rate for a processing type, falling back to the default table.
    pub fn processing_rate(&self, processing_type: ProcessingType) -> f64 {
        self.processing_rates
            .get(&processing_type)
            .copied()
            .unwrap_or_else(|| default_processing_rate(processing_type))
    }

    /// Assembly hours for a module type, falling back to the default table.
    pub fn labor_hours_for(&self, module_type: ModuleType) -> f64 {
        self.labor_hours
            .get(&module_type)
            .copied()
            .unwrap_or_else(|| default_labor_hours(module_type))
    }

    /// Check that every rate is finite and non-negative and that the
    /// discount cap is a percentage.
    pub fn validate(&self) -> JoineryResult<()> {
        non_negative("tax_rate_percent", self.tax_rate_percent)?;
        non_negative("labor_rate_per_hour", self.labor_rate_per_hour)?;

        if !self.max_discount_percent.is_finite() || !(0.0..=100.0).contains(&self.max_discount_percent) {
            return Err(JoineryError::invalid_input(
                "max_discount_percent",
                self.max_discount_percent.to_string(),
                "Discount cap must be between 0 and 100",
            ));
        }

        for (processing_type, rate) in &self.processing_rates {
            non_negative(&format!("processing_rates.{}", processing_type.as_str()), *rate)?;
        }
        for (module_type, hours) in &self.labor_hours {
            non_negative(&format!("labor_hours.{}", module_type.as_str()), *hours)?;
        }
        Ok(())
    }
}

fn non_negative(field: &str, value: f64) -> JoineryResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(JoineryError::invalid_input(
            field,
            value.to_string(),
            "Must be a finite, non-negative number",
        ))
    }
}

impl Default for PricingSettings {
    fn default() -> Self {
        PricingSettings {
            currency: "RON".to_string(),
            tax_rate_percent: 19.0,
            max_discount_percent: 25.0,
            quote_validity_days: 30,
            labor_rate_per_hour: 25.0,
            processing_rates: ProcessingType::ALL
                .into_iter()
                .map(|t| (t, default_processing_rate(t)))
                .collect(),
            labor_hours: ModuleType::ALL
                .into_iter()
                .map(|t| (t, default_labor_hours(t)))
                .collect(),
        }
    }
}

fn default_processing_rate(processing_type: ProcessingType) -> f64 {
    match processing_type {
        ProcessingType::EdgeBanding => 4.5,
        ProcessingType::Painting => 120.0,
        ProcessingType::CncRouting => 8.0,
        ProcessingType::GlassCutting => 15.0,
        ProcessingType::GlassTempering => 95.0,
    }
}

fn default_labor_hours(module_type: ModuleType) -> f64 {
    match module_type {
        ModuleType::BaseCabinet => 1.5,
        ModuleType::WallCabinet => 1.0,
        ModuleType::TallCabinet => 2.5,
        ModuleType::DrawerUnit => 2.0,
        ModuleType::CornerCabinet => 2.0,
        ModuleType::SinkCabinet => 1.75,
        ModuleType::OpenShelf => 0.5,
    }
}
