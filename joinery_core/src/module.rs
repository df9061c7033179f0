//! # Furniture Modules
//!
//! A [`Module`] is one furniture unit placed in a project: a base cabinet, a
//! drawer unit, an open shelf... It carries its dimensions (millimeters), its
//! placement in the room, and three assignment lists:
//!
//! - [`MaterialAssignment`] - which board covers which physical part
//! - [`AccessoryAssignment`] - hardware mounted on the module
//! - [`ProcessingAssignment`] - workshop operations (edge banding, painting...)
//!
//! ## JSON Example
//!
//! ```json
//! {
//!   "id": "2f0e6d0a-5d55-4f1b-9d0e-8f8b1b8a2c11",
//!   "label": "Sink base",
//!   "module_type": "sink_cabinet",
//!   "width_mm": 800.0,
//!   "height_mm": 720.0,
//!   "depth_mm": 560.0,
//!   "position": [0.0, 0.0, 0.0],
//!   "rotation": [0.0, 0.0, 0.0],
//!   "materials": [
//!     { "material_id": "pal-white-18", "part": "body", "quantity_sqm": 2.1 }
//!   ],
//!   "accessories": [
//!     { "accessory_id": "hinge-blum-clip-110", "accessory_type": "hinge", "quantity": 4 }
//!   ],
//!   "processing": [
//!     { "processing_type": "edge_banding", "extent": 6.4, "material_id": "pal-white-18" }
//!   ],
//!   "price": 0.0
//! }
//! ```
//!
//! ## Example
//!
//! ```rust
//! use joinery_core::module::{Module, ModuleType, PartKind};
//!
//! let mut module = Module::from_template(ModuleType::BaseCabinet, "B-1");
//! module.set_material(PartKind::Body, "pal-white-18", 2.4);
//! module.set_material(PartKind::Body, "pal-oak-18", 2.4); // replaces, one per part
//! assert_eq!(module.materials.len(), 1);
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{AccessoryType, CatalogProvider, Material};
use crate::errors::{JoineryError, JoineryResult};

// ============================================================================
// Module Types
// ============================================================================

/// Kind of furniture unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModuleType {
    #[default]
    BaseCabinet,
    WallCabinet,
    TallCabinet,
    DrawerUnit,
    CornerCabinet,
    SinkCabinet,
    OpenShelf,
}

impl ModuleType {
    /// All module types for selection lists
    pub const ALL: [ModuleType; 7] = [
        ModuleType::BaseCabinet,
        ModuleType::WallCabinet,
        ModuleType::TallCabinet,
        ModuleType::DrawerUnit,
        ModuleType::CornerCabinet,
        ModuleType::SinkCabinet,
        ModuleType::OpenShelf,
    ];

    /// Serialized tag
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleType::BaseCabinet => "base_cabinet",
            ModuleType::WallCabinet => "wall_cabinet",
            ModuleType::TallCabinet => "tall_cabinet",
            ModuleType::DrawerUnit => "drawer_unit",
            ModuleType::CornerCabinet => "corner_cabinet",
            ModuleType::SinkCabinet => "sink_cabinet",
            ModuleType::OpenShelf => "open_shelf",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ModuleType::BaseCabinet => "Base cabinet",
            ModuleType::WallCabinet => "Wall cabinet",
            ModuleType::TallCabinet => "Tall cabinet",
            ModuleType::DrawerUnit => "Drawer unit",
            ModuleType::CornerCabinet => "Corner cabinet",
            ModuleType::SinkCabinet => "Sink cabinet",
            ModuleType::OpenShelf => "Open shelf",
        }
    }

    /// Standard library dimensions (width, height, depth) in mm
    pub fn default_dimensions_mm(&self) -> (f64, f64, f64) {
        match self {
            ModuleType::BaseCabinet => (600.0, 720.0, 560.0),
            ModuleType::WallCabinet => (600.0, 720.0, 320.0),
            ModuleType::TallCabinet => (600.0, 2100.0, 560.0),
            ModuleType::DrawerUnit => (600.0, 720.0, 560.0),
            ModuleType::CornerCabinet => (900.0, 720.0, 900.0),
            ModuleType::SinkCabinet => (800.0, 720.0, 560.0),
            ModuleType::OpenShelf => (800.0, 360.0, 300.0),
        }
    }
}

impl std::fmt::Display for ModuleType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ModuleType {
    type Err = JoineryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ModuleType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| JoineryError::invalid_input("module_type", s, "Unknown module type"))
    }
}

/// Physical part of a module that a material covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartKind {
    Body,
    Door,
    DrawerFront,
    BackPanel,
    Shelf,
    Countertop,
    Other,
}

impl PartKind {
    pub const ALL: [PartKind; 7] = [
        PartKind::Body,
        PartKind::Door,
        PartKind::DrawerFront,
        PartKind::BackPanel,
        PartKind::Shelf,
        PartKind::Countertop,
        PartKind::Other,
    ];

    /// Doors and drawer fronts make up the visible front of a module
    pub fn is_front(&self) -> bool {
        matches!(self, PartKind::Door | PartKind::DrawerFront)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PartKind::Body => "body",
            PartKind::Door => "door",
            PartKind::DrawerFront => "drawer_front",
            PartKind::BackPanel => "back_panel",
            PartKind::Shelf => "shelf",
            PartKind::Countertop => "countertop",
            PartKind::Other => "other",
        }
    }
}

impl std::str::FromStr for PartKind {
    type Err = JoineryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PartKind::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| JoineryError::invalid_input("part", s, "Unknown part"))
    }
}

// ============================================================================
// Assignments
// ============================================================================

/// A catalog material covering one part of the module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialAssignment {
    pub material_id: String,
    pub part: PartKind,
    /// Quantity in square meters
    pub quantity_sqm: f64,
}

/// A catalog accessory mounted on the module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessoryAssignment {
    pub accessory_id: String,
    pub accessory_type: AccessoryType,
    pub quantity: u32,
}

/// How a processing extent is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtentUnit {
    LinearMeter,
    SquareMeter,
}

impl ExtentUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            ExtentUnit::LinearMeter => "m",
            ExtentUnit::SquareMeter => "m²",
        }
    }
}

/// Workshop operation applied to a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingType {
    EdgeBanding,
    Painting,
    CncRouting,
    GlassCutting,
    GlassTempering,
}

impl ProcessingType {
    pub const ALL: [ProcessingType; 5] = [
        ProcessingType::EdgeBanding,
        ProcessingType::Painting,
        ProcessingType::CncRouting,
        ProcessingType::GlassCutting,
        ProcessingType::GlassTempering,
    ];

    pub fn unit(&self) -> ExtentUnit {
        match self {
            ProcessingType::EdgeBanding | ProcessingType::CncRouting | ProcessingType::GlassCutting => {
                ExtentUnit::LinearMeter
            }
            ProcessingType::Painting | ProcessingType::GlassTempering => ExtentUnit::SquareMeter,
        }
    }

    /// Serialized tag; also the option name used by blocking rules
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingType::EdgeBanding => "edge_banding",
            ProcessingType::Painting => "painting",
            ProcessingType::CncRouting => "cnc_routing",
            ProcessingType::GlassCutting => "glass_cutting",
            ProcessingType::GlassTempering => "glass_tempering",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProcessingType::EdgeBanding => "Edge banding",
            ProcessingType::Painting => "Painting",
            ProcessingType::CncRouting => "CNC routing",
            ProcessingType::GlassCutting => "Glass cutting",
            ProcessingType::GlassTempering => "Glass tempering",
        }
    }
}

impl std::str::FromStr for ProcessingType {
    type Err = JoineryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProcessingType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| JoineryError::invalid_input("processing_type", s, "Unknown processing type"))
    }
}

/// A processing operation with its extent (m or m², see [`ProcessingType::unit`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessingAssignment {
    pub processing_type: ProcessingType,
    pub extent: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub material_id: Option<String>,
}

// ============================================================================
// Module
// ============================================================================

/// A furniture unit placed in a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub id: Uuid,

    /// User label (e.g., "B-1", "Sink base")
    #[serde(default)]
    pub label: String,

    pub module_type: ModuleType,

    pub width_mm: f64,
    pub height_mm: f64,
    pub depth_mm: f64,

    /// Scene position (x, y, z), meters
    #[serde(default)]
    pub position: [f64; 3],

    /// Scene rotation (x, y, z), radians
    #[serde(default)]
    pub rotation: [f64; 3],

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default)]
    pub materials: Vec<MaterialAssignment>,

    #[serde(default)]
    pub accessories: Vec<AccessoryAssignment>,

    #[serde(default)]
    pub processing: Vec<ProcessingAssignment>,

    /// Last computed price (materials + accessories + processing)
    #[serde(default)]
    pub price: f64,
}

impl Module {
    /// Create a bare module with explicit dimensions.
    pub fn new(module_type: ModuleType, width_mm: f64, height_mm: f64, depth_mm: f64) -> Self {
        Module {
            id: Uuid::new_v4(),
            label: String::new(),
            module_type,
            width_mm,
            height_mm,
            depth_mm,
            position: [0.0; 3],
            rotation: [0.0; 3],
            color: None,
            materials: Vec::new(),
            accessories: Vec::new(),
            processing: Vec::new(),
            price: 0.0,
        }
    }

    /// Create a module from the library template for its type.
    pub fn from_template(module_type: ModuleType, label: impl Into<String>) -> Self {
        let (w, h, d) = module_type.default_dimensions_mm();
        let mut module = Module::new(module_type, w, h, d);
        module.label = label.into();
        module
    }

    /// Set the label (builder pattern)
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Assign a material to a part, replacing any existing assignment for
    /// that part.
    pub fn set_material(&mut self, part: PartKind, material_id: impl Into<String>, quantity_sqm: f64) {
        let material_id = material_id.into();
        match self.materials.iter_mut().find(|m| m.part == part) {
            Some(existing) => {
                existing.material_id = material_id;
                existing.quantity_sqm = quantity_sqm;
            }
            None => self.materials.push(MaterialAssignment {
                material_id,
                part,
                quantity_sqm,
            }),
        }
    }

    /// Material assignment for a part, if any
    pub fn material_for(&self, part: PartKind) -> Option<&MaterialAssignment> {
        self.materials.iter().find(|m| m.part == part)
    }

    /// Append an accessory assignment. Several assignments of the same type
    /// are allowed.
    pub fn add_accessory(&mut self, accessory_id: impl Into<String>, accessory_type: AccessoryType, quantity: u32) {
        self.accessories.push(AccessoryAssignment {
            accessory_id: accessory_id.into(),
            accessory_type,
            quantity,
        });
    }

    pub fn add_processing(&mut self, processing_type: ProcessingType, extent: f64, material_id: Option<String>) {
        self.processing.push(ProcessingAssignment {
            processing_type,
            extent,
            material_id,
        });
    }

    pub fn has_accessory(&self, accessory_type: AccessoryType) -> bool {
        self.accessories.iter().any(|a| a.accessory_type == accessory_type)
    }

    /// Total quantity of accessories of one type
    pub fn accessory_count(&self, accessory_type: AccessoryType) -> u32 {
        self.accessories
            .iter()
            .filter(|a| a.accessory_type == accessory_type)
            .map(|a| a.quantity)
            .sum()
    }

    pub fn has_processing(&self, processing_type: ProcessingType) -> bool {
        self.processing.iter().any(|p| p.processing_type == processing_type)
    }

    /// A module has a door when it carries at least one hinge.
    pub fn has_door(&self) -> bool {
        self.has_accessory(AccessoryType::Hinge)
    }

    /// A module has a drawer when it carries at least one slide.
    pub fn has_drawer(&self) -> bool {
        self.has_accessory(AccessoryType::Slide)
    }

    pub fn has_handle(&self) -> bool {
        self.has_accessory(AccessoryType::Handle)
    }

    /// Material assignments on doors and drawer fronts
    pub fn front_assignments(&self) -> impl Iterator<Item = &MaterialAssignment> {
        self.materials.iter().filter(|m| m.part.is_front())
    }

    /// Catalog materials on the front, skipping ids the catalog doesn't know.
    pub fn front_materials<'a, C: CatalogProvider + ?Sized>(&'a self, catalog: &'a C) -> Vec<&'a Material> {
        self.front_assignments()
            .filter_map(|a| catalog.material(&a.material_id))
            .collect()
    }

    /// Validate dimensions and assignment quantities.
    pub fn validate(&self) -> JoineryResult<()> {
        for (field, value) in [
            ("width_mm", self.width_mm),
            ("height_mm", self.height_mm),
            ("depth_mm", self.depth_mm),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(JoineryError::invalid_input(
                    field,
                    value.to_string(),
                    "Dimension must be a positive number of millimeters",
                ));
            }
        }

        for (i, m) in self.materials.iter().enumerate() {
            if !m.quantity_sqm.is_finite() || m.quantity_sqm < 0.0 {
                return Err(JoineryError::invalid_input(
                    format!("materials[{}].quantity_sqm", i),
                    m.quantity_sqm.to_string(),
                    "Quantity must be non-negative",
                ));
            }
        }

        for (i, p) in self.processing.iter().enumerate() {
            if !p.extent.is_finite() || p.extent < 0.0 {
                return Err(JoineryError::invalid_input(
                    format!("processing[{}].extent", i),
                    p.extent.to_string(),
                    "Extent must be non-negative",
                ));
            }
        }

        Ok(())
    }
}
