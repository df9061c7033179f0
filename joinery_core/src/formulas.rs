//! # Formula Registry
//!
//! Every formula the pricing engine applies, with the metadata needed to
//! print it in a quote appendix and in `FORMULAS.md`. The implementations
//! live in [`crate::pricing`] and [`crate::quote`]; `source_function` points
//! at them.
//!
//! ```rust
//! use joinery_core::formulas::PricingFormula;
//!
//! let meta = PricingFormula::MaterialCost.metadata();
//! assert_eq!(meta.source_function, "material_line_cost");
//! ```

use serde::{Deserialize, Serialize};

/// Grouping for the appendix and the markdown reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormulaCategory {
    /// Per-module cost lines
    ModuleCost,
    /// Project-level totals
    QuoteTotals,
}

impl FormulaCategory {
    pub const ALL: [FormulaCategory; 2] = [FormulaCategory::ModuleCost, FormulaCategory::QuoteTotals];

    pub fn display_name(&self) -> &'static str {
        match self {
            FormulaCategory::ModuleCost => "Module Cost",
            FormulaCategory::QuoteTotals => "Quote Totals",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Variable {
    pub symbol: &'static str,
    pub description: &'static str,
    pub units: &'static str,
}

impl Variable {
    pub const fn new(symbol: &'static str, description: &'static str, units: &'static str) -> Self {
        Self {
            symbol,
            description,
            units,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FormulaMetadata {
    pub name: &'static str,
    pub description: &'static str,
    /// Typst markup, math in `$...$`
    pub formula_typst: &'static str,
    pub formula_plain: &'static str,
    pub variables: Vec<Variable>,
    pub category: FormulaCategory,
    pub source_module: &'static str,
    pub source_function: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PricingFormula {
    MaterialCost,
    AccessoryCost,
    ProcessingCost,
    LaborCost,
    Subtotal,
    Discount,
    TaxAmount,
    TotalPrice,
}

impl PricingFormula {
    pub const ALL: [PricingFormula; 8] = [
        PricingFormula::MaterialCost,
        PricingFormula::AccessoryCost,
        PricingFormula::ProcessingCost,
        PricingFormula::LaborCost,
        PricingFormula::Subtotal,
        PricingFormula::Discount,
        PricingFormula::TaxAmount,
        PricingFormula::TotalPrice,
    ];

    pub fn metadata(&self) -> FormulaMetadata {
        match self {
            PricingFormula::MaterialCost => FormulaMetadata {
                name: "Material Cost",
                description: "Cost of one material assignment, scaled by the module's front-face area",
                formula_typst: r#"$C_m = p_m dot q dot (W H) / 10^6$"#,
                formula_plain: "C_m = p_m * q * (W * H / 1e6)",
                variables: vec![
                    Variable::new("p_m", "Material price per square meter", "currency/m²"),
                    Variable::new("q", "Assigned quantity", "m²"),
                    Variable::new("W", "Module width", "mm"),
                    Variable::new("H", "Module height", "mm"),
                ],
                category: FormulaCategory::ModuleCost,
                source_module: "pricing.rs",
                source_function: "material_line_cost",
            },
            PricingFormula::AccessoryCost => FormulaMetadata {
                name: "Accessory Cost",
                description: "Cost of one accessory assignment",
                formula_typst: r#"$C_a = p_a dot n$"#,
                formula_plain: "C_a = p_a * n",
                variables: vec![
                    Variable::new("p_a", "Unit price", "currency"),
                    Variable::new("n", "Quantity", "pcs"),
                ],
                category: FormulaCategory::ModuleCost,
                source_module: "pricing.rs",
                source_function: "price_breakdown",
            },
            PricingFormula::ProcessingCost => FormulaMetadata {
                name: "Processing Cost",
                description: "Cost of a processing step, billed per meter or per square meter",
                formula_typst: r#"$C_p = r_p dot e$"#,
                formula_plain: "C_p = r_p * e",
                variables: vec![
                    Variable::new("r_p", "Rate for the processing type", "currency/m or currency/m²"),
                    Variable::new("e", "Extent", "m or m²"),
                ],
                category: FormulaCategory::ModuleCost,
                source_module: "pricing.rs",
                source_function: "processing_line_cost",
            },
            PricingFormula::LaborCost => FormulaMetadata {
                name: "Labor Cost",
                description: "Assembly labor for a module type",
                formula_typst: r#"$C_l = h_t dot r_l$"#,
                formula_plain: "C_l = h_t * r_l",
                variables: vec![
                    Variable::new("h_t", "Assembly hours for the module type", "h"),
                    Variable::new("r_l", "Labor rate", "currency/h"),
                ],
                category: FormulaCategory::ModuleCost,
                source_module: "pricing.rs",
                source_function: "price_breakdown",
            },
            PricingFormula::Subtotal => FormulaMetadata {
                name: "Subtotal",
                description: "Sum of all cost lines over all modules",
                formula_typst: r#"$S = sum C_m + sum C_a + sum C_p + sum C_l$"#,
                formula_plain: "S = sum(C_m) + sum(C_a) + sum(C_p) + sum(C_l)",
                variables: vec![Variable::new("S", "Subtotal", "currency")],
                category: FormulaCategory::QuoteTotals,
                source_module: "quote.rs",
                source_function: "calculate_quote_breakdown",
            },
            PricingFormula::Discount => FormulaMetadata {
                name: "Discount",
                description: "Discount granted on the subtotal, capped by the project settings",
                formula_typst: r#"$D = S dot d / 100$"#,
                formula_plain: "D = S * d / 100",
                variables: vec![Variable::new("d", "Discount percentage", "%")],
                category: FormulaCategory::QuoteTotals,
                source_module: "quote.rs",
                source_function: "calculate_quote_breakdown",
            },
            PricingFormula::TaxAmount => FormulaMetadata {
                name: "Tax Amount",
                description: "VAT on the discounted subtotal",
                formula_typst: r#"$T = (S - D) dot t / 100$"#,
                formula_plain: "T = (S - D) * t / 100",
                variables: vec![Variable::new("t", "Tax rate", "%")],
                category: FormulaCategory::QuoteTotals,
                source_module: "quote.rs",
                source_function: "calculate_quote_breakdown",
            },
            PricingFormula::TotalPrice => FormulaMetadata {
                name: "Total Price",
                description: "Amount due",
                formula_typst: r#"$P = S - D + T$"#,
                formula_plain: "P = S - D + T",
                variables: vec![],
                category: FormulaCategory::QuoteTotals,
                source_module: "quote.rs",
                source_function: "calculate_quote_breakdown",
            },
        }
    }

    pub fn in_category(category: FormulaCategory) -> Vec<PricingFormula> {
        PricingFormula::ALL
            .into_iter()
            .filter(|f| f.metadata().category == category)
            .collect()
    }
}

/// Typst markup for the "Pricing Formulas" appendix of a quote.
pub fn formulas_appendix_typst() -> String {
    let mut output = String::from(
        r##"
#pagebreak()

#align(center)[
  #block(width: 100%, fill: rgb("#f0f0f0"), inset: 12pt, radius: 4pt)[
    #text(size: 16pt, weight: "bold")[Appendix: Pricing Formulas]
  ]
]

#v(12pt)
"##,
    );

    for category in FormulaCategory::ALL {
        output.push_str(&format!("\n== {}\n\n", category.display_name()));

        for formula in PricingFormula::in_category(category) {
            let meta = formula.metadata();
            output.push_str(&format!("=== {}\n\n", meta.name));
            output.push_str(&format!("#text(size: 10pt)[{}]\n\n", meta.description));
            output.push_str(&format!("*Formula:* {}\n\n", meta.formula_typst));

            if !meta.variables.is_empty() {
                output.push_str("#table(\n");
                output.push_str("  columns: (auto, 1fr, auto),\n");
                output.push_str("  inset: 5pt,\n");
                output.push_str("  stroke: 0.5pt,\n");
                output.push_str("  table.header([*Symbol*], [*Description*], [*Units*]),\n");
                for var in &meta.variables {
                    output.push_str(&format!(
                        "  [${}$], [{}], [{}],\n",
                        var.symbol, var.description, var.units
                    ));
                }
                output.push_str(")\n\n");
            }
        }
    }

    output
}

/// Full `FORMULAS.md` reference document.
///
/// ```rust
/// let markdown = joinery_core::formulas::generate_formulas_markdown();
/// assert!(markdown.contains("## Module Cost"));
/// ```
pub fn generate_formulas_markdown() -> String {
    let mut output = String::with_capacity(8_000);

    output.push_str(
        r#"# Joinery Pricing Formulas

> **Auto-generated from source code. Do not edit manually.**
>
> Regenerate with: `cargo run --bin gen-formulas`

All amounts are computed in full precision and rounded to two decimals only
for display. Catalog entries that cannot be found contribute zero.

---

"#,
    );

    for category in FormulaCategory::ALL {
        output.push_str(&format!("## {}\n\n", category.display_name()));

        for formula in PricingFormula::in_category(category) {
            let meta = formula.metadata();
            output.push_str(&format!("### {}\n\n", meta.name));
            output.push_str(&format!("{}\n\n", meta.description));
            output.push_str(&format!("**Formula:** `{}`\n\n", meta.formula_plain));

            if !meta.variables.is_empty() {
                output.push_str("| Symbol | Description | Units |\n");
                output.push_str("|--------|-------------|-------|\n");
                for var in &meta.variables {
                    output.push_str(&format!("| {} | {} | {} |\n", var.symbol, var.description, var.units));
                }
                output.push('\n');
            }

            output.push_str(&format!(
                "**Source:** [`{}`](src/{}) in `{}`\n\n",
                meta.source_function, meta.source_module, meta.source_module
            ));
        }
    }

    output
}
