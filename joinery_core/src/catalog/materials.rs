//! Board and sheet materials.
//!
//! Material types use the trade codes the workshop orders by:
//!
//! | Code       | Meaning                                   |
//! |------------|-------------------------------------------|
//! | PAL        | Melamine-faced particle board             |
//! | MDF        | Raw medium-density fibreboard (paintable) |
//! | MDF-AGT    | High-gloss pre-finished MDF               |
//! | PFL        | Hardboard, used for back panels           |
//! | GLASS      | Float or tempered glass                   |
//! | COUNTERTOP | Worktop slabs                             |

use serde::{Deserialize, Serialize};

use crate::errors::{JoineryError, JoineryResult};

/// Material family, serialized with its trade code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MaterialType {
    #[serde(rename = "PAL")]
    Pal,
    #[serde(rename = "MDF")]
    Mdf,
    #[serde(rename = "MDF-AGT")]
    MdfAgt,
    #[serde(rename = "PFL")]
    Pfl,
    #[serde(rename = "GLASS")]
    Glass,
    #[serde(rename = "COUNTERTOP")]
    Countertop,
}

impl MaterialType {
    /// All material types for selection lists
    pub const ALL: [MaterialType; 6] = [
        MaterialType::Pal,
        MaterialType::Mdf,
        MaterialType::MdfAgt,
        MaterialType::Pfl,
        MaterialType::Glass,
        MaterialType::Countertop,
    ];

    /// Trade code as written on order sheets
    pub fn code(&self) -> &'static str {
        match self {
            MaterialType::Pal => "PAL",
            MaterialType::Mdf => "MDF",
            MaterialType::MdfAgt => "MDF-AGT",
            MaterialType::Pfl => "PFL",
            MaterialType::Glass => "GLASS",
            MaterialType::Countertop => "COUNTERTOP",
        }
    }

    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            MaterialType::Pal => "Melamine particle board",
            MaterialType::Mdf => "MDF",
            MaterialType::MdfAgt => "High-gloss MDF",
            MaterialType::Pfl => "Hardboard",
            MaterialType::Glass => "Glass",
            MaterialType::Countertop => "Countertop",
        }
    }
}

impl std::fmt::Display for MaterialType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A catalog material. Immutable reference data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    /// Catalog id (e.g., "pal-white-18")
    pub id: String,
    pub name: String,
    pub material_type: MaterialType,
    pub thickness_mm: f64,
    /// Price per square meter, catalog currency
    pub price_per_sqm: f64,
    /// Surface accepts paint
    #[serde(default)]
    pub paintable: bool,
    /// Edges accept edge banding
    #[serde(default)]
    pub cantable: bool,
    #[serde(default)]
    pub supplier: String,
    #[serde(default)]
    pub manufacturer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub texture_url: Option<String>,
}

impl Material {
    /// Create a material with the flags and supplier fields left empty.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        material_type: MaterialType,
        thickness_mm: f64,
        price_per_sqm: f64,
    ) -> Self {
        Material {
            id: id.into(),
            name: name.into(),
            material_type,
            thickness_mm,
            price_per_sqm,
            paintable: false,
            cantable: false,
            supplier: String::new(),
            manufacturer: String::new(),
            texture_url: None,
        }
    }

    /// Set the paintable/cantable flags (builder pattern)
    pub fn with_finish(mut self, paintable: bool, cantable: bool) -> Self {
        self.paintable = paintable;
        self.cantable = cantable;
        self
    }

    /// Set supplier and manufacturer (builder pattern)
    pub fn with_source(mut self, supplier: impl Into<String>, manufacturer: impl Into<String>) -> Self {
        self.supplier = supplier.into();
        self.manufacturer = manufacturer.into();
        self
    }

    /// Check the fields the pricing code relies on.
    pub fn validate(&self) -> JoineryResult<()> {
        if self.id.trim().is_empty() {
            return Err(JoineryError::missing_field("material.id"));
        }
        if !self.price_per_sqm.is_finite() || self.price_per_sqm < 0.0 {
            return Err(JoineryError::invalid_input(
                format!("materials[{}].price_per_sqm", self.id),
                self.price_per_sqm.to_string(),
                "Price must be a finite, non-negative number",
            ));
        }
        if !self.thickness_mm.is_finite() || self.thickness_mm <= 0.0 {
            return Err(JoineryError::invalid_input(
                format!("materials[{}].thickness_mm", self.id),
                self.thickness_mm.to_string(),
                "Thickness must be positive",
            ));
        }
        Ok(())
    }
}
