//! Hardware accessories: hinges, slides, handles, feet and friends.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::{JoineryError, JoineryResult};
use crate::module::ModuleType;

/// Accessory family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessoryType {
    Hinge,
    Slide,
    Handle,
    Foot,
    Profile,
    PushSystem,
    ShelfSupport,
    Other,
}

impl AccessoryType {
    /// All accessory types for selection lists
    pub const ALL: [AccessoryType; 8] = [
        AccessoryType::Hinge,
        AccessoryType::Slide,
        AccessoryType::Handle,
        AccessoryType::Foot,
        AccessoryType::Profile,
        AccessoryType::PushSystem,
        AccessoryType::ShelfSupport,
        AccessoryType::Other,
    ];

    /// Serialized tag, also used in log output
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessoryType::Hinge => "hinge",
            AccessoryType::Slide => "slide",
            AccessoryType::Handle => "handle",
            AccessoryType::Foot => "foot",
            AccessoryType::Profile => "profile",
            AccessoryType::PushSystem => "push_system",
            AccessoryType::ShelfSupport => "shelf_support",
            AccessoryType::Other => "other",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AccessoryType::Hinge => "Hinge",
            AccessoryType::Slide => "Drawer slide",
            AccessoryType::Handle => "Handle",
            AccessoryType::Foot => "Adjustable foot",
            AccessoryType::Profile => "Aluminium profile",
            AccessoryType::PushSystem => "Push-to-open system",
            AccessoryType::ShelfSupport => "Shelf support",
            AccessoryType::Other => "Other",
        }
    }
}

impl std::fmt::Display for AccessoryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A catalog accessory. Immutable reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessoryItem {
    pub id: String,
    pub name: String,
    pub accessory_type: AccessoryType,
    #[serde(default)]
    pub manufacturer: String,
    pub unit_price: f64,
    /// Module types this item fits. Empty means it fits every type.
    #[serde(default)]
    pub compatible_modules: Vec<ModuleType>,
    /// Free-form attributes (opening angle, load rating, finish...)
    #[serde(default)]
    pub properties: BTreeMap<String, String>,
}

impl AccessoryItem {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        accessory_type: AccessoryType,
        unit_price: f64,
    ) -> Self {
        AccessoryItem {
            id: id.into(),
            name: name.into(),
            accessory_type,
            manufacturer: String::new(),
            unit_price,
            compatible_modules: Vec::new(),
            properties: BTreeMap::new(),
        }
    }

    /// Restrict the item to the given module types (builder pattern)
    pub fn for_modules(mut self, modules: &[ModuleType]) -> Self {
        self.compatible_modules = modules.to_vec();
        self
    }

    pub fn with_manufacturer(mut self, manufacturer: impl Into<String>) -> Self {
        self.manufacturer = manufacturer.into();
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Whether this item can be mounted on the given module type
    pub fn fits(&self, module_type: ModuleType) -> bool {
        self.compatible_modules.is_empty() || self.compatible_modules.contains(&module_type)
    }

    pub fn validate(&self) -> JoineryResult<()> {
        if self.id.trim().is_empty() {
            return Err(JoineryError::missing_field("accessory.id"));
        }
        if !self.unit_price.is_finite() || self.unit_price < 0.0 {
            return Err(JoineryError::invalid_input(
                format!("accessories[{}].unit_price", self.id),
                self.unit_price.to_string(),
                "Price must be a finite, non-negative number",
            ));
        }
        Ok(())
    }
}
