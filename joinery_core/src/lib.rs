//! # joinery_core - Furniture Pricing Engine
//!
//! `joinery_core` prices parametric furniture modules (cabinets, drawer units,
//! shelves) and turns a project into a client quote. Every input and output is
//! JSON-serializable so the engine can sit behind a 3D configurator, a CLI or
//! a service.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: rule evaluation and pricing take values and return new values
//! - **JSON-First**: all types implement Serialize/Deserialize
//! - **Rich Errors**: structured [`JoineryError`], not strings
//! - **Deterministic**: the same inputs always give the same messages and totals
//!
//! ## Quick Start
//!
//! ```rust
//! use joinery_core::catalog::{AccessoryType, Catalog};
//! use joinery_core::module::{Module, ModuleType, PartKind};
//! use joinery_core::project::Project;
//! use joinery_core::quote::{generate_quote, ClientInfo};
//! use joinery_core::rules::apply_rules;
//!
//! let catalog = Catalog::builtin();
//!
//! let mut drawers = Module::from_template(ModuleType::DrawerUnit, "D-1");
//! drawers.set_material(PartKind::Body, "pal-white-18", 1.4);
//! drawers.add_accessory("slide-blum-tandem-500", AccessoryType::Slide, 3);
//!
//! // Rules complete the configuration (push-to-open, feet, ...)
//! let outcome = apply_rules(&drawers, &catalog).unwrap();
//!
//! let mut project = Project::new("Kitchen Popescu", "Ana");
//! project.add_module(outcome.module);
//!
//! let quote = generate_quote(&project, &catalog, ClientInfo::new("Ion Popescu"), 5.0, "").unwrap();
//! assert!(quote.breakdown.total_price > 0.0);
//! ```
//!
//! ## Modules
//!
//! - [`module`] - Furniture modules and their assignments
//! - [`catalog`] - Materials, accessories and the catalog provider
//! - [`rules`] - Combo rules and their evaluator
//! - [`pricing`] - Per-module cost calculation
//! - [`quote`] - Project breakdown and quote lifecycle
//! - [`project`] - Project container, metadata and pricing settings
//! - [`store`] - Project store abstraction
//! - [`scene`] - Typed command bridge for a 3D front end
//! - [`export`] / [`pdf`] - JSON, CSV and PDF output
//! - [`formulas`] - Registry of the pricing formulas
//! - [`file_io`] - `.jnr` files with atomic saves and locking
//! - [`units`] - Type-safe unit wrappers
//! - [`errors`] - Structured error types

pub mod catalog;
pub mod errors;
pub mod export;
pub mod file_io;
pub mod formulas;
pub mod module;
pub mod pdf;
pub mod pricing;
pub mod project;
pub mod quote;
pub mod rules;
pub mod scene;
pub mod store;
pub mod units;

pub use catalog::{Catalog, CatalogProvider};
pub use errors::{JoineryError, JoineryResult};
pub use file_io::{load_project, save_project, FileLock};
pub use module::{Module, ModuleType};
pub use project::{PricingSettings, Project, ProjectMetadata};
pub use quote::{generate_quote, Quote, QuoteBreakdown};
pub use rules::{apply_rules, RuleOutcome};
