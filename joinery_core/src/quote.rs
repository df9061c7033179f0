//! # Quotes
//!
//! Aggregates module costs into a project-level breakdown and wraps it into a
//! client-facing [`Quote`] with a lifecycle.
//!
//! ## Breakdown
//!
//! ```text
//! subtotal    = materials + accessories + processing + labor
//! discount    = subtotal × discount% / 100
//! tax_amount  = (subtotal − discount) × tax_rate / 100
//! total_price = subtotal − discount + tax_amount
//! ```
//!
//! ## Lifecycle
//!
//! ```text
//! draft ──► sent ──► accepted
//!   │         ├────► rejected
//!   └────────►└────► expired
//! ```
//!
//! ## Example
//!
//! ```rust
//! use joinery_core::catalog::Catalog;
//! use joinery_core::project::Project;
//! use joinery_core::quote::calculate_quote_breakdown;
//!
//! let project = Project::new("Empty", "Ana");
//! let breakdown = calculate_quote_breakdown(&project, &Catalog::builtin(), 0.0).unwrap();
//! assert_eq!(breakdown.total_price, 0.0);
//! ```

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::catalog::CatalogProvider;
use crate::errors::{JoineryError, JoineryResult};
use crate::pricing::{price_breakdown, ModuleCost};
use crate::project::Project;

/// Project-level cost summary.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct QuoteBreakdown {
    pub materials_cost: f64,
    pub accessories_cost: f64,
    pub processing_cost: f64,
    pub labor_cost: f64,
    pub subtotal: f64,
    pub discount_percent: f64,
    pub discount: f64,
    /// VAT percentage
    pub tax_rate: f64,
    pub tax_amount: f64,
    pub total_price: f64,
}

impl QuoteBreakdown {
    /// Subtotal after discount, before tax
    pub fn net(&self) -> f64 {
        self.subtotal - self.discount
    }
}

/// Sum the module costs of a project and apply discount and tax.
///
/// # Errors
///
/// - `InvalidInput` if `discount_percent` is not finite or lies outside
///   `[0, max_discount_percent]`
/// - `InvalidInput` if any module has invalid dimensions or quantities
/// - `InvalidInput` if the project's pricing settings are out of range
pub fn calculate_quote_breakdown<C: CatalogProvider + ?Sized>(
    project: &Project,
    catalog: &C,
    discount_percent: f64,
) -> JoineryResult<QuoteBreakdown> {
    let settings = &project.settings.pricing;
    settings.validate()?;

    if !discount_percent.is_finite() || discount_percent < 0.0 || discount_percent > settings.max_discount_percent {
        return Err(JoineryError::invalid_input(
            "discount_percent",
            discount_percent.to_string(),
            format!("Discount must be between 0 and {}%", settings.max_discount_percent),
        ));
    }

    let mut totals = ModuleCost::default();
    for module in &project.modules {
        totals += price_breakdown(module, catalog, settings)?;
    }

    let subtotal = totals.total_with_labor();
    let discount = subtotal * discount_percent / 100.0;
    let tax_rate = settings.tax_rate_percent;
    let tax_amount = (subtotal - discount) * tax_rate / 100.0;

    Ok(QuoteBreakdown {
        materials_cost: totals.materials,
        accessories_cost: totals.accessories,
        processing_cost: totals.processing,
        labor_cost: totals.labor,
        subtotal,
        discount_percent,
        discount,
        tax_rate,
        tax_amount,
        total_price: subtotal - discount + tax_amount,
    })
}

/// The client a quote is addressed to.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl ClientInfo {
    pub fn new(name: impl Into<String>) -> Self {
        ClientInfo {
            name: name.into(),
            ..ClientInfo::default()
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = Some(address.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    #[default]
    Draft,
    Sent,
    Accepted,
    Rejected,
    Expired,
}

impl QuoteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Draft => "draft",
            QuoteStatus::Sent => "sent",
            QuoteStatus::Accepted => "accepted",
            QuoteStatus::Rejected => "rejected",
            QuoteStatus::Expired => "expired",
        }
    }

    pub fn can_transition(self, to: QuoteStatus) -> bool {
        use QuoteStatus::*;
        matches!(
            (self, to),
            (Draft, Sent) | (Draft, Expired) | (Sent, Accepted) | (Sent, Rejected) | (Sent, Expired)
        )
    }

    /// Accepted, rejected and expired quotes never change again
    pub fn is_final(self) -> bool {
        matches!(self, QuoteStatus::Accepted | QuoteStatus::Rejected | QuoteStatus::Expired)
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A priced offer for a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub id: Uuid,
    /// Human-readable number, `Q-YYYYMMDD-XXXX`
    pub number: String,
    pub project_id: Uuid,
    pub project_name: String,
    pub client: ClientInfo,
    pub breakdown: QuoteBreakdown,
    pub status: QuoteStatus,
    #[serde(default)]
    pub notes: String,
    pub currency: String,
    pub created_at: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
}

impl Quote {
    /// Move the quote to a new status.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` for any move outside the lifecycle graph.
    pub fn transition(&mut self, to: QuoteStatus) -> JoineryResult<()> {
        if !self.status.can_transition(to) {
            return Err(JoineryError::invalid_transition(self.status.as_str(), to.as_str()));
        }
        self.status = to;
        Ok(())
    }

    /// Whether the validity window has passed, regardless of status.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.valid_until
    }

    /// Mark the quote expired if its validity has passed and it is still open.
    /// Returns true when the status changed.
    pub fn expire_if_due(&mut self, now: DateTime<Utc>) -> bool {
        if self.status.is_final() || !self.is_expired(now) {
            return false;
        }
        self.status = QuoteStatus::Expired;
        true
    }
}

/// Price a project and produce a draft quote.
///
/// # Errors
///
/// - `MissingField` if the client name is blank
/// - anything [`calculate_quote_breakdown`] rejects
pub fn generate_quote<C: CatalogProvider + ?Sized>(
    project: &Project,
    catalog: &C,
    client: ClientInfo,
    discount_percent: f64,
    notes: impl Into<String>,
) -> JoineryResult<Quote> {
    if client.name.trim().is_empty() {
        return Err(JoineryError::missing_field("client.name"));
    }

    let breakdown = calculate_quote_breakdown(project, catalog, discount_percent)?;
    let settings = &project.settings.pricing;

    let id = Uuid::new_v4();
    let created_at = Utc::now();
    let valid_until = created_at + Duration::days(i64::from(settings.quote_validity_days));
    let number = quote_number(created_at, &id);

    info!(
        quote = %number,
        project = %project.meta.name,
        modules = project.module_count(),
        total = breakdown.total_price,
        "quote generated"
    );

    Ok(Quote {
        id,
        number,
        project_id: project.id(),
        project_name: project.meta.name.clone(),
        client,
        breakdown,
        status: QuoteStatus::Draft,
        notes: notes.into(),
        currency: settings.currency.clone(),
        created_at,
        valid_until,
    })
}

fn quote_number(created_at: DateTime<Utc>, id: &Uuid) -> String {
    let suffix: String = id.simple().to_string().chars().take(4).collect();
    format!("Q-{}-{}", created_at.format("%Y%m%d"), suffix.to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AccessoryType, Catalog};
    use crate::module::{Module, ModuleType, PartKind, ProcessingType};

    fn kitchen() -> Project {
        let mut project = Project::new("Kitchen", "Ana");

        let mut base = Module::new(ModuleType::BaseCabinet, 600.0, 720.0, 560.0);
        base.set_material(PartKind::Body, "pal-white-18", 1.2);
        base.set_material(PartKind::Door, "mdf-raw-19", 0.4);
        base.add_accessory("hinge-blum-clip-110", AccessoryType::Hinge, 2);
        base.add_processing(ProcessingType::Painting, 0.43, None);
        project.add_module(base);

        let mut wall = Module::new(ModuleType::WallCabinet, 800.0, 720.0, 320.0);
        wall.set_material(PartKind::Body, "pal-oak-18", 1.0);
        wall.add_processing(ProcessingType::EdgeBanding, 6.0, Some("pal-oak-18".to_string()));
        project.add_module(wall);

        project
    }

    #[test]
    fn test_breakdown_conservation() {
        let catalog = Catalog::builtin();
        let b = calculate_quote_breakdown(&kitchen(), &catalog, 10.0).unwrap();

        let parts = b.materials_cost + b.accessories_cost + b.processing_cost + b.labor_cost;
        assert!((b.subtotal - parts).abs() < 1e-9);
        assert!((b.discount - b.subtotal * 0.10).abs() < 1e-9);
        assert!((b.total_price - (b.subtotal - b.discount + b.tax_amount)).abs() < 1e-9);
    }

    #[test]
    fn test_breakdown_values() {
        let catalog = Catalog::builtin();
        let b = calculate_quote_breakdown(&kitchen(), &catalog, 0.0).unwrap();

        // base: 62 × 1.2 × 0.432 + 85 × 0.4 × 0.432; wall: 78 × 1.0 × 0.576
        let materials = 62.0 * 1.2 * 0.432 + 85.0 * 0.4 * 0.432 + 78.0 * 0.576;
        assert!((b.materials_cost - materials).abs() < 1e-9);
        assert!((b.accessories_cost - 29.0).abs() < 1e-9);
        assert!((b.processing_cost - (120.0 * 0.43 + 4.5 * 6.0)).abs() < 1e-9);
        assert!((b.labor_cost - (1.5 + 1.0) * 25.0).abs() < 1e-9);
        assert_eq!(b.tax_rate, 19.0);
    }

    #[test]
    fn test_zero_discount() {
        let catalog = Catalog::builtin();
        let b = calculate_quote_breakdown(&kitchen(), &catalog, 0.0).unwrap();
        assert_eq!(b.discount, 0.0);
        assert!((b.total_price - (b.subtotal + b.tax_amount)).abs() < 1e-9);
    }

    #[test]
    fn test_empty_project_is_all_zero() {
        let b = calculate_quote_breakdown(&Project::new("Empty", ""), &Catalog::builtin(), 0.0).unwrap();
        assert_eq!(b.subtotal, 0.0);
        assert_eq!(b.discount, 0.0);
        assert_eq!(b.tax_amount, 0.0);
        assert_eq!(b.total_price, 0.0);
    }

    #[test]
    fn test_discount_bounds() {
        let catalog = Catalog::builtin();
        let project = kitchen();

        assert!(calculate_quote_breakdown(&project, &catalog, 25.0).is_ok());
        for bad in [-1.0, 25.5, 100.0, f64::NAN, f64::INFINITY] {
            let err = calculate_quote_breakdown(&project, &catalog, bad).unwrap_err();
            assert_eq!(err.error_code(), "INVALID_INPUT");
        }
    }

    #[test]
    fn test_out_of_range_settings_rejected() {
        let catalog = Catalog::builtin();

        let mut project = kitchen();
        project.settings.pricing.max_discount_percent = 150.0;
        let err = calculate_quote_breakdown(&project, &catalog, 120.0).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");

        let mut project = kitchen();
        project.settings.pricing.processing_rates.insert(ProcessingType::Painting, -120.0);
        assert!(calculate_quote_breakdown(&project, &catalog, 0.0).is_err());
    }

    #[test]
    fn test_custom_tax_rate() {
        let mut project = kitchen();
        project.settings.pricing.tax_rate_percent = 9.0;
        let b = calculate_quote_breakdown(&project, &Catalog::builtin(), 0.0).unwrap();
        assert!((b.tax_amount - b.subtotal * 0.09).abs() < 1e-9);
    }

    #[test]
    fn test_generate_quote() {
        let project = kitchen();
        let client = ClientInfo::new("Ion Popescu").with_email("ion@example.com");
        let quote = generate_quote(&project, &Catalog::builtin(), client, 5.0, "Delivery in May").unwrap();

        assert_eq!(quote.status, QuoteStatus::Draft);
        assert_eq!(quote.project_id, project.id());
        assert_eq!(quote.currency, "RON");
        assert_eq!(quote.valid_until - quote.created_at, Duration::days(30));

        assert!(quote.number.starts_with("Q-"));
        let parts: Vec<&str> = quote.number.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[1].len(), 8);
        assert_eq!(parts[2].len(), 4);
    }

    #[test]
    fn test_generate_quote_requires_client_name() {
        let err = generate_quote(&kitchen(), &Catalog::builtin(), ClientInfo::new("  "), 0.0, "").unwrap_err();
        assert_eq!(err.error_code(), "MISSING_FIELD");
    }

    #[test]
    fn test_lifecycle() {
        let mut quote =
            generate_quote(&kitchen(), &Catalog::builtin(), ClientInfo::new("Client"), 0.0, "").unwrap();

        assert!(quote.transition(QuoteStatus::Accepted).is_err());
        quote.transition(QuoteStatus::Sent).unwrap();
        quote.transition(QuoteStatus::Accepted).unwrap();

        let err = quote.transition(QuoteStatus::Rejected).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_TRANSITION");
        assert_eq!(quote.status, QuoteStatus::Accepted);
    }

    #[test]
    fn test_expiry() {
        let mut quote =
            generate_quote(&kitchen(), &Catalog::builtin(), ClientInfo::new("Client"), 0.0, "").unwrap();
        let later = quote.valid_until + Duration::days(1);

        assert!(!quote.expire_if_due(quote.created_at));
        assert!(quote.is_expired(later));
        assert!(quote.expire_if_due(later));
        assert_eq!(quote.status, QuoteStatus::Expired);
        assert!(!quote.expire_if_due(later));
    }

    #[test]
    fn test_accepted_quote_does_not_expire() {
        let mut quote =
            generate_quote(&kitchen(), &Catalog::builtin(), ClientInfo::new("Client"), 0.0, "").unwrap();
        quote.transition(QuoteStatus::Sent).unwrap();
        quote.transition(QuoteStatus::Accepted).unwrap();

        let later = quote.valid_until + Duration::days(1);
        assert!(!quote.expire_if_due(later));
        assert_eq!(quote.status, QuoteStatus::Accepted);
    }

    #[test]
    fn test_quote_json() {
        let quote = generate_quote(&kitchen(), &Catalog::builtin(), ClientInfo::new("Client"), 0.0, "").unwrap();
        let json = serde_json::to_value(&quote).unwrap();
        assert_eq!(json["status"], "draft");
        assert!(json["client"].get("email").is_none());

        let roundtrip: Quote = serde_json::from_value(json).unwrap();
        assert_eq!(roundtrip.number, quote.number);
        assert_eq!(roundtrip.valid_until, quote.valid_until);
    }
}
