//! Built-in reference catalog.
//!
//! Used when no catalog file is supplied. Prices are list prices in RON,
//! excluding VAT.

use super::accessories::{AccessoryItem, AccessoryType};
use super::materials::{Material, MaterialType};
use crate::module::ModuleType;

/// Module types that stand on the floor (and therefore take feet)
pub const FLOOR_STANDING: [ModuleType; 5] = [
    ModuleType::BaseCabinet,
    ModuleType::TallCabinet,
    ModuleType::DrawerUnit,
    ModuleType::CornerCabinet,
    ModuleType::SinkCabinet,
];

pub fn materials() -> Vec<Material> {
    vec![
        Material::new("pal-white-18", "PAL White 18mm", MaterialType::Pal, 18.0, 62.0)
            .with_finish(false, true)
            .with_source("Egger Romania", "Egger"),
        Material::new("pal-oak-18", "PAL Halifax Oak 18mm", MaterialType::Pal, 18.0, 78.0)
            .with_finish(false, true)
            .with_source("Egger Romania", "Egger"),
        Material::new("mdf-raw-19", "MDF Raw 19mm", MaterialType::Mdf, 19.0, 85.0)
            .with_finish(true, true)
            .with_source("Kronospan", "Kronospan"),
        Material::new("mdf-agt-white-19", "MDF AGT Gloss White 19mm", MaterialType::MdfAgt, 19.0, 210.0)
            .with_finish(false, false)
            .with_source("AGT Distribution", "AGT"),
        Material::new("pfl-white-3", "PFL White 3mm", MaterialType::Pfl, 3.0, 18.0)
            .with_source("Kronospan", "Kronospan"),
        Material::new("glass-clear-4", "Clear Glass 4mm", MaterialType::Glass, 4.0, 140.0)
            .with_source("Glass Center", "Saint-Gobain"),
        Material::new("glass-satin-4", "Satin Glass 4mm", MaterialType::Glass, 4.0, 175.0)
            .with_source("Glass Center", "Saint-Gobain"),
        Material::new("top-oak-38", "Countertop Oak 38mm", MaterialType::Countertop, 38.0, 240.0)
            .with_finish(false, true)
            .with_source("Egger Romania", "Egger"),
    ]
}

pub fn accessories() -> Vec<AccessoryItem> {
    vec![
        AccessoryItem::new("hinge-blum-clip-110", "Blum Clip Top 110°", AccessoryType::Hinge, 14.5)
            .with_manufacturer("Blum")
            .with_property("opening_angle", "110"),
        AccessoryItem::new("hinge-blum-clip-155", "Blum Clip Top 155°", AccessoryType::Hinge, 24.0)
            .with_manufacturer("Blum")
            .with_property("opening_angle", "155")
            .for_modules(&[ModuleType::CornerCabinet]),
        AccessoryItem::new("slide-blum-tandem-500", "Blum Tandem 500mm", AccessoryType::Slide, 96.0)
            .with_manufacturer("Blum")
            .with_property("length_mm", "500")
            .for_modules(&[
                ModuleType::BaseCabinet,
                ModuleType::DrawerUnit,
                ModuleType::SinkCabinet,
                ModuleType::TallCabinet,
            ]),
        AccessoryItem::new("handle-bar-128", "Bar Handle 128mm", AccessoryType::Handle, 22.0)
            .with_manufacturer("Gamet")
            .with_property("hole_spacing_mm", "128"),
        AccessoryItem::new("foot-adjustable-100", "Adjustable Foot 100mm", AccessoryType::Foot, 3.2)
            .with_manufacturer("Hettich")
            .for_modules(&FLOOR_STANDING),
        AccessoryItem::new("profile-alu-glass", "Aluminium Glass-Door Profile", AccessoryType::Profile, 65.0)
            .with_manufacturer("Vauth-Sagel"),
        AccessoryItem::new("push-blum-tipon", "Blum Tip-On", AccessoryType::PushSystem, 38.0)
            .with_manufacturer("Blum"),
        AccessoryItem::new("shelf-support-5mm", "Shelf Support Pin 5mm", AccessoryType::ShelfSupport, 0.4)
            .with_manufacturer("Hettich"),
    ]
}
