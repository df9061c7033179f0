//! Built-in combo rule table.
//!
//! Priorities are spaced by ten so custom rules can be slotted in between.

use super::condition::RuleCondition;
use super::{ComboRule, RuleAction};
use crate::catalog::builtin::FLOOR_STANDING;
use crate::catalog::{AccessoryType, MaterialType};
use crate::module::{ModuleType, PartKind, ProcessingType};

pub fn builtin_rules() -> Vec<ComboRule> {
    vec![
        ComboRule::new(
            "push-system-for-handleless-drawers",
            "Handleless drawers get a push-to-open system",
            RuleCondition {
                has_drawer: Some(true),
                has_handle: Some(false),
                ..RuleCondition::default()
            },
            RuleAction::add_accessory(AccessoryType::PushSystem)
                .with_message("Drawers without handles need a push-to-open system; one was added."),
            10,
        ),
        ComboRule::new(
            "feet-for-floor-modules",
            "Floor-standing modules stand on adjustable feet",
            RuleCondition::for_modules(&FLOOR_STANDING),
            RuleAction::add_accessory(AccessoryType::Foot)
                .with_message("Adjustable feet were added to a floor-standing module."),
            20,
        ),
        ComboRule::new(
            "glass-front-profile",
            "Glass fronts are framed in aluminium profile",
            RuleCondition {
                front_material_type: Some(MaterialType::Glass),
                ..RuleCondition::default()
            },
            RuleAction::add_accessory(AccessoryType::Profile)
                .with_message("Glass fronts are mounted in an aluminium profile frame."),
            30,
        ),
        ComboRule::new(
            "glass-front-no-painting",
            "Glass fronts cannot be painted",
            RuleCondition {
                front_material_type: Some(MaterialType::Glass),
                ..RuleCondition::default()
            },
            RuleAction::block(ProcessingType::Painting.as_str()).with_message("Glass fronts cannot be painted."),
            31,
        ),
        ComboRule::new(
            "pal-front-no-painting",
            "Melamine fronts cannot be painted",
            RuleCondition {
                front_material_type: Some(MaterialType::Pal),
                ..RuleCondition::default()
            },
            RuleAction::block(ProcessingType::Painting.as_str())
                .with_message("PAL fronts are melamine-faced and cannot be painted."),
            40,
        ),
        ComboRule::new(
            "agt-front-no-edge-banding",
            "High-gloss fronts ship with factory edges",
            RuleCondition {
                front_material_type: Some(MaterialType::MdfAgt),
                ..RuleCondition::default()
            },
            RuleAction::block(ProcessingType::EdgeBanding.as_str())
                .with_message("MDF-AGT fronts come with factory edges; edge banding is not available."),
            41,
        ),
        ComboRule::new(
            "wide-open-shelf-support",
            "Wide shelves need extra supports",
            RuleCondition {
                module_types: vec![ModuleType::OpenShelf],
                min_width_mm: Some(900.0),
                ..RuleCondition::default()
            },
            RuleAction::add_accessory(AccessoryType::ShelfSupport)
                .with_message("Shelves 900 mm or wider need extra shelf supports."),
            50,
        ),
        ComboRule::new(
            "wide-door-split",
            "Wide doors should be split",
            RuleCondition {
                has_door: Some(true),
                min_width_mm: Some(650.0),
                ..RuleCondition::default()
            },
            RuleAction::warn("Doors on modules 650 mm or wider should be split into two leaves."),
            60,
        ),
        ComboRule::new(
            "tall-door-hinges",
            "Tall doors need three hinges",
            RuleCondition {
                has_door: Some(true),
                min_height_mm: Some(1500.0),
                ..RuleCondition::default()
            },
            RuleAction::warn("Doors 1500 mm or taller need at least three hinges."),
            61,
        ),
        ComboRule::new(
            "deep-wall-cabinet",
            "Deep wall cabinets get in the way",
            RuleCondition {
                module_types: vec![ModuleType::WallCabinet],
                depth_over_mm: Some(400.0),
                ..RuleCondition::default()
            },
            RuleAction::warn("Wall cabinets deeper than 400 mm may obstruct the countertop."),
            70,
        ),
        ComboRule::new(
            "sink-no-back-panel",
            "Sink cabinets are open at the back",
            RuleCondition::for_modules(&[ModuleType::SinkCabinet]),
            RuleAction::block(PartKind::BackPanel.as_str())
                .with_message("Sink cabinets are built without a back panel to leave room for plumbing."),
            80,
        ),
        ComboRule::new(
            "painted-fronts-mdf",
            "Painted fronts are made of raw MDF",
            RuleCondition {
                processing_type: Some(ProcessingType::Painting),
                ..RuleCondition::default()
            },
            RuleAction::suggest(PartKind::Door, MaterialType::Mdf)
                .with_message("Painted fronts should be made of raw MDF."),
            90,
        ),
        ComboRule::new(
            "corner-cabinet-wide-hinges",
            "Corner cabinets use 155° hinges",
            RuleCondition {
                module_types: vec![ModuleType::CornerCabinet],
                has_door: Some(true),
                ..RuleCondition::default()
            },
            RuleAction::warn("Corner cabinets need 155° hinges to clear the adjacent module."),
            100,
        )
        .disabled(),
    ]
}

