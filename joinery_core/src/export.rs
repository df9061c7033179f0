//! Quote and project export.
//!
//! JSON for tooling, CSV for spreadsheets, PDF for the client.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogProvider;
use crate::errors::{JoineryError, JoineryResult};
use crate::pdf::render_quote_pdf;
use crate::pricing::{price_breakdown, round_money};
use crate::project::Project;
use crate::quote::Quote;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
    Pdf,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Pdf => "pdf",
        }
    }

    /// Whether the output is printable text
    pub fn is_text(&self) -> bool {
        !matches!(self, ExportFormat::Pdf)
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = JoineryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(JoineryError::invalid_input(
                "format",
                other,
                "Supported formats are json, csv and pdf",
            )),
        }
    }
}

pub fn export_project_json(project: &Project) -> JoineryResult<String> {
    Ok(serde_json::to_string_pretty(project)?)
}

pub fn export_quote_json(quote: &Quote) -> JoineryResult<String> {
    Ok(serde_json::to_string_pretty(quote)?)
}

const CSV_HEADER: [&str; 11] = [
    "line",
    "label",
    "module_type",
    "width_mm",
    "height_mm",
    "depth_mm",
    "materials",
    "accessories",
    "processing",
    "labor",
    "total",
];

/// One row per module followed by the summary lines of the breakdown.
///
/// Summary rows carry their name in `line` and the amount in `total`.
pub fn export_quote_csv<C: CatalogProvider + ?Sized>(
    project: &Project,
    quote: &Quote,
    catalog: &C,
) -> JoineryResult<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;

    for (i, module) in project.modules.iter().enumerate() {
        let cost = price_breakdown(module, catalog, &project.settings.pricing)?;
        writer.write_record([
            (i + 1).to_string(),
            module.label.clone(),
            module.module_type.as_str().to_string(),
            module.width_mm.to_string(),
            module.height_mm.to_string(),
            module.depth_mm.to_string(),
            money(cost.materials),
            money(cost.accessories),
            money(cost.processing),
            money(cost.labor),
            money(cost.total_with_labor()),
        ])?;
    }

    let b = &quote.breakdown;
    for (name, amount) in [
        ("subtotal", b.subtotal),
        ("discount", b.discount),
        ("tax", b.tax_amount),
        ("total", b.total_price),
    ] {
        let mut record = vec![String::new(); CSV_HEADER.len()];
        record[0] = name.to_string();
        record[CSV_HEADER.len() - 1] = money(amount);
        writer.write_record(&record)?;
    }

    let bytes = writer.into_inner().map_err(JoineryError::serialization)?;
    String::from_utf8(bytes).map_err(JoineryError::serialization)
}

fn money(amount: f64) -> String {
    format!("{:.2}", round_money(amount))
}

/// Export a quote in the requested format.
pub fn export_quote<C: CatalogProvider + ?Sized>(
    format: ExportFormat,
    project: &Project,
    quote: &Quote,
    catalog: &C,
) -> JoineryResult<Vec<u8>> {
    match format {
        ExportFormat::Json => export_quote_json(quote).map(String::into_bytes),
        ExportFormat::Csv => export_quote_csv(project, quote, catalog).map(String::into_bytes),
        ExportFormat::Pdf => render_quote_pdf(project, quote, catalog),
    }
}
