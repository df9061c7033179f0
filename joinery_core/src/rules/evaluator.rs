//! Single-pass rule evaluation.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{ComboRule, RuleEffect, RuleSet};
use crate::catalog::{CatalogProvider, MaterialType};
use crate::errors::JoineryResult;
use crate::module::{Module, PartKind};

/// A material recommendation emitted by a rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialSuggestion {
    pub part: PartKind,
    pub material_type: MaterialType,
}

/// Result of running a rule set over one module.
///
/// `messages`, `blocked_options` and `suggestions` are deduplicated and keep
/// the order in which they were first produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleOutcome {
    /// The module with rule-added accessories; the input is never modified
    pub module: Module,
    pub messages: Vec<String>,
    pub blocked_options: Vec<String>,
    pub suggestions: Vec<MaterialSuggestion>,
    /// Ids of the rules whose condition matched, in evaluation order
    pub fired_rules: Vec<String>,
}

impl RuleOutcome {
    fn new(module: Module) -> Self {
        RuleOutcome {
            module,
            messages: Vec::new(),
            blocked_options: Vec::new(),
            suggestions: Vec::new(),
            fired_rules: Vec::new(),
        }
    }

    /// Whether an option (e.g. "painting") was blocked
    pub fn is_blocked(&self, option: &str) -> bool {
        self.blocked_options.iter().any(|o| o == option)
    }
}

/// Run the built-in rule table over a module.
///
/// # Errors
///
/// `InvalidInput` when the module has non-positive or non-finite dimensions
/// or negative quantities. Missing catalog entries are not errors.
pub fn apply_rules<C: CatalogProvider + ?Sized>(module: &Module, catalog: &C) -> JoineryResult<RuleOutcome> {
    RuleSet::builtin().apply(module, catalog)
}

impl RuleSet {
    /// Run this rule set over a module. See [`apply_rules`].
    pub fn apply<C: CatalogProvider + ?Sized>(&self, module: &Module, catalog: &C) -> JoineryResult<RuleOutcome> {
        module.validate()?;

        let mut outcome = RuleOutcome::new(module.clone());

        for rule in self.sorted() {
            if !rule.enabled || !rule.condition.matches(&outcome.module, catalog) {
                continue;
            }
            debug!(rule = %rule.id, module = %module.id, "rule matched");
            outcome.fired_rules.push(rule.id.clone());
            apply_action(rule, &mut outcome, catalog);
        }

        Ok(outcome)
    }
}

fn apply_action<C: CatalogProvider + ?Sized>(rule: &ComboRule, outcome: &mut RuleOutcome, catalog: &C) {
    match &rule.action.effect {
        RuleEffect::AddAccessory { accessory_type } => {
            let accessory_type = *accessory_type;
            if !outcome.module.has_accessory(accessory_type) {
                let module_type = outcome.module.module_type;
                match catalog.compatible_accessories(accessory_type, module_type).first() {
                    Some(item) => {
                        debug!(rule = %rule.id, accessory = %item.id, "adding accessory");
                        outcome.module.add_accessory(item.id.clone(), accessory_type, 1);
                    }
                    None => {
                        warn!(
                            rule = %rule.id,
                            accessory_type = %accessory_type,
                            module_type = %module_type,
                            "no compatible accessory in catalog, skipping"
                        );
                    }
                }
            }
        }
        RuleEffect::BlockOption { option } => push_unique(&mut outcome.blocked_options, option.clone()),
        RuleEffect::Warn => {}
        RuleEffect::SuggestMaterial { part, material_type } => push_unique(
            &mut outcome.suggestions,
            MaterialSuggestion {
                part: *part,
                material_type: *material_type,
            },
        ),
    }

    if let Some(message) = &rule.action.message {
        push_unique(&mut outcome.messages, message.clone());
    }
}

fn push_unique<T: PartialEq>(list: &mut Vec<T>, value: T) {
    if !list.contains(&value) {
        list.push(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AccessoryItem, AccessoryType, Catalog};
    use crate::module::{ModuleType, ProcessingType};
    use crate::rules::{ComboRule, RuleAction, RuleCondition};

    fn drawer_without_handle() -> Module {
        let mut module = Module::from_template(ModuleType::DrawerUnit, "D-1");
        module.add_accessory("slide-blum-tandem-500", AccessoryType::Slide, 3);
        module
    }

    const PUSH_MESSAGE: &str = "Drawers without handles need a push-to-open system; one was added.";

    #[test]
    fn test_push_system_rule_fires_once() {
        let catalog = Catalog::builtin();
        let outcome = apply_rules(&drawer_without_handle(), &catalog).unwrap();

        let push: Vec<_> = outcome
            .module
            .accessories
            .iter()
            .filter(|a| a.accessory_type == AccessoryType::PushSystem)
            .collect();
        assert_eq!(push.len(), 1);
        assert_eq!(push[0].quantity, 1);
        assert_eq!(push[0].accessory_id, "push-blum-tipon");
        assert_eq!(outcome.messages.iter().filter(|m| *m == PUSH_MESSAGE).count(), 1);
    }

    #[test]
    fn test_reapplying_is_idempotent() {
        let catalog = Catalog::builtin();
        let first = apply_rules(&drawer_without_handle(), &catalog).unwrap();
        let second = apply_rules(&first.module, &catalog).unwrap();

        assert_eq!(second.module.accessories, first.module.accessories);
        assert_eq!(second.module.accessory_count(AccessoryType::PushSystem), 1);
    }

    #[test]
    fn test_deterministic_output() {
        let catalog = Catalog::builtin();
        let mut module = drawer_without_handle();
        module.set_material(PartKind::DrawerFront, "pal-white-18", 0.5);

        let a = apply_rules(&module, &catalog).unwrap();
        let b = apply_rules(&module, &catalog).unwrap();
        assert_eq!(a.messages, b.messages);
        assert_eq!(a.blocked_options, b.blocked_options);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_handle_suppresses_push_system() {
        let catalog = Catalog::builtin();
        let mut module = drawer_without_handle();
        module.add_accessory("handle-bar-128", AccessoryType::Handle, 3);

        let outcome = apply_rules(&module, &catalog).unwrap();
        assert!(!outcome.module.has_accessory(AccessoryType::PushSystem));
        assert!(!outcome.messages.iter().any(|m| m == PUSH_MESSAGE));
    }

    #[test]
    fn test_glass_front_blocks_painting_and_adds_profile() {
        let catalog = Catalog::builtin();
        let mut module = Module::from_template(ModuleType::WallCabinet, "W-1");
        module.add_accessory("hinge-blum-clip-110", AccessoryType::Hinge, 2);
        module.set_material(PartKind::Door, "glass-satin-4", 0.4);

        let outcome = apply_rules(&module, &catalog).unwrap();
        assert!(outcome.is_blocked("painting"));
        assert!(outcome.module.has_accessory(AccessoryType::Profile));
        // Wall cabinets take no feet
        assert!(!outcome.module.has_accessory(AccessoryType::Foot));
    }

    #[test]
    fn test_blocked_options_deduplicated() {
        let catalog = Catalog::builtin();
        let mut module = Module::from_template(ModuleType::BaseCabinet, "B-1");
        // Glass door and PAL drawer front both block painting
        module.set_material(PartKind::Door, "glass-clear-4", 0.3);
        module.set_material(PartKind::DrawerFront, "pal-white-18", 0.2);

        let outcome = apply_rules(&module, &catalog).unwrap();
        assert_eq!(outcome.blocked_options, vec!["painting".to_string()]);
        assert_eq!(outcome.messages.len(), outcome.fired_rules.len());
    }

    #[test]
    fn test_missing_compatible_accessory_is_skipped() {
        // Catalog without any push system
        let catalog = Catalog::from_parts(
            vec![],
            vec![AccessoryItem::new("slide-1", "Slide", AccessoryType::Slide, 40.0)],
        )
        .unwrap();

        let outcome = apply_rules(&drawer_without_handle(), &catalog).unwrap();
        assert!(!outcome.module.has_accessory(AccessoryType::PushSystem));
        // The message is still reported
        assert!(outcome.messages.iter().any(|m| m == PUSH_MESSAGE));
    }

    #[test]
    fn test_compatible_accessory_picked_by_id() {
        let catalog = Catalog::from_parts(
            vec![],
            vec![
                AccessoryItem::new("foot-z", "Foot Z", AccessoryType::Foot, 1.0),
                AccessoryItem::new("foot-a", "Foot A", AccessoryType::Foot, 9.0),
                AccessoryItem::new("foot-0", "Foot 0", AccessoryType::Foot, 1.0)
                    .for_modules(&[ModuleType::WallCabinet]),
            ],
        )
        .unwrap();

        let module = Module::from_template(ModuleType::BaseCabinet, "B-1");
        let outcome = apply_rules(&module, &catalog).unwrap();
        let foot = outcome
            .module
            .accessories
            .iter()
            .find(|a| a.accessory_type == AccessoryType::Foot)
            .unwrap();
        assert_eq!(foot.accessory_id, "foot-a");
    }

    #[test]
    fn test_single_pass_no_retroactive_match() {
        // Rule "b" (priority 1) needs a foot; rule "a" (priority 2) adds one.
        let rules = RuleSet::new(vec![
            ComboRule::new(
                "needs-foot",
                "Needs foot",
                RuleCondition {
                    has_accessory: Some(AccessoryType::Foot),
                    ..RuleCondition::default()
                },
                RuleAction::warn("has feet"),
                1,
            ),
            ComboRule::new(
                "adds-foot",
                "Adds foot",
                RuleCondition::any(),
                RuleAction::add_accessory(AccessoryType::Foot),
                2,
            ),
        ]);
        let catalog = Catalog::builtin();
        let module = Module::from_template(ModuleType::BaseCabinet, "B-1");

        let outcome = rules.apply(&module, &catalog).unwrap();
        assert!(outcome.module.has_accessory(AccessoryType::Foot));
        assert!(outcome.messages.is_empty());
        assert_eq!(outcome.fired_rules, vec!["adds-foot".to_string()]);
    }

    #[test]
    fn test_disabled_rules_skipped() {
        let catalog = Catalog::builtin();
        let mut module = Module::from_template(ModuleType::CornerCabinet, "C-1");
        module.add_accessory("hinge-blum-clip-155", AccessoryType::Hinge, 4);

        let outcome = apply_rules(&module, &catalog).unwrap();
        assert!(!outcome.fired_rules.iter().any(|id| id == "corner-cabinet-wide-hinges"));

        let mut rules = RuleSet::builtin();
        rules.set_enabled("corner-cabinet-wide-hinges", true).unwrap();
        let outcome = rules.apply(&module, &catalog).unwrap();
        assert!(outcome.fired_rules.iter().any(|id| id == "corner-cabinet-wide-hinges"));
    }

    #[test]
    fn test_suggestion_recorded() {
        let catalog = Catalog::builtin();
        let mut module = Module::from_template(ModuleType::WallCabinet, "W-1");
        module.add_processing(ProcessingType::Painting, 0.4, None);

        let outcome = apply_rules(&module, &catalog).unwrap();
        assert_eq!(
            outcome.suggestions,
            vec![MaterialSuggestion {
                part: PartKind::Door,
                material_type: MaterialType::Mdf,
            }]
        );
    }

    fn fired(outcome: &RuleOutcome, rule_id: &str) -> bool {
        outcome.fired_rules.iter().any(|id| id == rule_id)
    }

    fn with_door(module_type: ModuleType, width: f64, height: f64, depth: f64) -> Module {
        let mut module = Module::new(module_type, width, height, depth);
        module.add_accessory("hinge-blum-clip-110", AccessoryType::Hinge, 2);
        module
    }

    #[test]
    fn test_wide_open_shelf_gets_supports() {
        let catalog = Catalog::builtin();

        let wide = Module::new(ModuleType::OpenShelf, 900.0, 360.0, 300.0);
        let outcome = apply_rules(&wide, &catalog).unwrap();
        assert!(fired(&outcome, "wide-open-shelf-support"));
        assert_eq!(outcome.module.accessory_count(AccessoryType::ShelfSupport), 1);

        let narrow = Module::new(ModuleType::OpenShelf, 899.0, 360.0, 300.0);
        let outcome = apply_rules(&narrow, &catalog).unwrap();
        assert!(!fired(&outcome, "wide-open-shelf-support"));
        assert!(!outcome.module.has_accessory(AccessoryType::ShelfSupport));
    }

    #[test]
    fn test_wide_door_split_warning() {
        let catalog = Catalog::builtin();

        let outcome = apply_rules(&with_door(ModuleType::BaseCabinet, 650.0, 720.0, 560.0), &catalog).unwrap();
        assert!(fired(&outcome, "wide-door-split"));
        assert!(outcome.messages.iter().any(|m| m.contains("split into two leaves")));

        let outcome = apply_rules(&with_door(ModuleType::BaseCabinet, 649.0, 720.0, 560.0), &catalog).unwrap();
        assert!(!fired(&outcome, "wide-door-split"));

        // No hinge, no door
        let bare = Module::new(ModuleType::BaseCabinet, 800.0, 720.0, 560.0);
        assert!(!fired(&apply_rules(&bare, &catalog).unwrap(), "wide-door-split"));
    }

    #[test]
    fn test_tall_door_hinge_warning() {
        let catalog = Catalog::builtin();

        let outcome = apply_rules(&with_door(ModuleType::TallCabinet, 600.0, 1500.0, 560.0), &catalog).unwrap();
        assert!(fired(&outcome, "tall-door-hinges"));

        let outcome = apply_rules(&with_door(ModuleType::TallCabinet, 600.0, 1499.0, 560.0), &catalog).unwrap();
        assert!(!fired(&outcome, "tall-door-hinges"));
    }

    #[test]
    fn test_deep_wall_cabinet_warning() {
        let catalog = Catalog::builtin();

        let at_limit = Module::new(ModuleType::WallCabinet, 600.0, 720.0, 400.0);
        assert!(!fired(&apply_rules(&at_limit, &catalog).unwrap(), "deep-wall-cabinet"));

        let deeper = Module::new(ModuleType::WallCabinet, 600.0, 720.0, 400.5);
        let outcome = apply_rules(&deeper, &catalog).unwrap();
        assert!(fired(&outcome, "deep-wall-cabinet"));
        assert!(outcome.messages.iter().any(|m| m.contains("deeper than 400 mm")));

        // Only wall cabinets are concerned
        let base = Module::new(ModuleType::BaseCabinet, 600.0, 720.0, 560.0);
        assert!(!fired(&apply_rules(&base, &catalog).unwrap(), "deep-wall-cabinet"));
    }

    #[test]
    fn test_sink_cabinet_blocks_back_panel() {
        let catalog = Catalog::builtin();

        let sink = Module::from_template(ModuleType::SinkCabinet, "S-1");
        let outcome = apply_rules(&sink, &catalog).unwrap();
        assert!(fired(&outcome, "sink-no-back-panel"));
        assert!(outcome.is_blocked("back_panel"));

        let base = Module::from_template(ModuleType::BaseCabinet, "B-1");
        let outcome = apply_rules(&base, &catalog).unwrap();
        assert!(!outcome.is_blocked("back_panel"));
    }

    #[test]
    fn test_agt_front_blocks_edge_banding() {
        let catalog = Catalog::builtin();

        let mut gloss = with_door(ModuleType::BaseCabinet, 600.0, 720.0, 560.0);
        gloss.set_material(PartKind::Door, "mdf-agt-white-19", 0.4);
        let outcome = apply_rules(&gloss, &catalog).unwrap();
        assert!(fired(&outcome, "agt-front-no-edge-banding"));
        assert!(outcome.is_blocked("edge_banding"));

        let mut raw = with_door(ModuleType::BaseCabinet, 600.0, 720.0, 560.0);
        raw.set_material(PartKind::Door, "mdf-raw-19", 0.4);
        let outcome = apply_rules(&raw, &catalog).unwrap();
        assert!(!fired(&outcome, "agt-front-no-edge-banding"));
        assert!(!outcome.is_blocked("edge_banding"));
    }

    #[test]
    fn test_invalid_module_rejected() {
        let catalog = Catalog::builtin();
        let module = Module::new(ModuleType::BaseCabinet, 0.0, 720.0, 560.0);
        assert!(apply_rules(&module, &catalog).is_err());
    }
}
