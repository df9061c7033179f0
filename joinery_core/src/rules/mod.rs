//! # Combo Rules
//!
//! Condition → action records that keep a module's configuration coherent:
//! they add hardware a configuration implies (a handleless drawer needs a
//! push-to-open system), block options that cannot be combined (painting a
//! melamine front) and surface warnings.
//!
//! Rules run in a single pass in ascending priority. There is no fixpoint: an
//! accessory added by one rule is visible to rules that come *after* it, never
//! to rules already evaluated.
//!
//! ## Example
//!
//! ```rust
//! use joinery_core::catalog::{AccessoryType, Catalog};
//! use joinery_core::module::{Module, ModuleType};
//! use joinery_core::rules::apply_rules;
//!
//! let catalog = Catalog::builtin();
//! let mut module = Module::from_template(ModuleType::DrawerUnit, "D-1");
//! module.add_accessory("slide-blum-tandem-500", AccessoryType::Slide, 3);
//!
//! let outcome = apply_rules(&module, &catalog).unwrap();
//! assert!(outcome.module.has_accessory(AccessoryType::PushSystem));
//! assert!(!module.has_accessory(AccessoryType::PushSystem)); // input untouched
//! ```

pub mod condition;
pub mod evaluator;
pub mod table;

pub use condition::RuleCondition;
pub use evaluator::{apply_rules, MaterialSuggestion, RuleOutcome};

use serde::{Deserialize, Serialize};

use crate::catalog::{AccessoryType, MaterialType};
use crate::errors::{JoineryError, JoineryResult};
use crate::module::PartKind;

/// What a matching rule does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum RuleEffect {
    /// Add one accessory of this type unless the module already has one
    AddAccessory { accessory_type: AccessoryType },
    /// Mark an option (processing type, part...) as unavailable
    BlockOption { option: String },
    /// Message only
    Warn,
    /// Recommend a material type for a part
    SuggestMaterial { part: PartKind, material_type: MaterialType },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleAction {
    #[serde(flatten)]
    pub effect: RuleEffect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl RuleAction {
    pub fn add_accessory(accessory_type: AccessoryType) -> Self {
        RuleAction {
            effect: RuleEffect::AddAccessory { accessory_type },
            message: None,
        }
    }

    pub fn block(option: impl Into<String>) -> Self {
        RuleAction {
            effect: RuleEffect::BlockOption { option: option.into() },
            message: None,
        }
    }

    pub fn warn(message: impl Into<String>) -> Self {
        RuleAction {
            effect: RuleEffect::Warn,
            message: Some(message.into()),
        }
    }

    pub fn suggest(part: PartKind, material_type: MaterialType) -> Self {
        RuleAction {
            effect: RuleEffect::SuggestMaterial { part, material_type },
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// A combo rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComboRule {
    pub id: String,
    pub name: String,
    pub condition: RuleCondition,
    pub action: RuleAction,
    /// Lower runs first
    pub priority: u32,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl ComboRule {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        condition: RuleCondition,
        action: RuleAction,
        priority: u32,
    ) -> Self {
        ComboRule {
            id: id.into(),
            name: name.into(),
            condition,
            action,
            priority,
            enabled: true,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// An ordered, editable collection of rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleSet {
    rules: Vec<ComboRule>,
}

impl RuleSet {
    pub fn new(rules: Vec<ComboRule>) -> Self {
        RuleSet { rules }
    }

    /// The built-in rule table
    pub fn builtin() -> Self {
        RuleSet::new(table::builtin_rules())
    }

    /// Parse a JSON array of rules. Rule ids must be unique and non-empty.
    pub fn from_json(json: &str) -> JoineryResult<Self> {
        let rules: Vec<ComboRule> = serde_json::from_str(json)
            .map_err(|e| JoineryError::serialization(format!("Invalid rule JSON: {}", e)))?;

        let mut seen = std::collections::HashSet::new();
        for rule in &rules {
            if rule.id.trim().is_empty() {
                return Err(JoineryError::missing_field("rule.id"));
            }
            if !seen.insert(rule.id.as_str()) {
                return Err(JoineryError::invalid_input("rule.id", rule.id.clone(), "Duplicate rule id"));
            }
        }

        Ok(RuleSet::new(rules))
    }

    pub fn rules(&self) -> &[ComboRule] {
        &self.rules
    }

    pub fn get(&self, id: &str) -> Option<&ComboRule> {
        self.rules.iter().find(|r| r.id == id)
    }

    /// Insert a rule, replacing any rule with the same id.
    pub fn upsert(&mut self, rule: ComboRule) {
        match self.rules.iter_mut().find(|r| r.id == rule.id) {
            Some(existing) => *existing = rule,
            None => self.rules.push(rule),
        }
    }

    pub fn set_enabled(&mut self, id: &str, enabled: bool) -> JoineryResult<()> {
        let rule = self
            .rules
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| JoineryError::invalid_input("rule.id", id, "No rule with this id"))?;
        rule.enabled = enabled;
        Ok(())
    }

    /// Rules in evaluation order: ascending priority, table order for ties.
    pub fn sorted(&self) -> Vec<&ComboRule> {
        let mut sorted: Vec<&ComboRule> = self.rules.iter().collect();
        sorted.sort_by_key(|r| r.priority);
        sorted
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
