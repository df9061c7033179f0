//! # Quote PDF
//!
//! Renders a quote to PDF with Typst: a cover block with client and project
//! details, a per-module cost table, the price breakdown and the formulas
//! appendix.
//!
//! The template is a string constant; values are substituted before
//! compilation and user text goes through [`escape_typst`].
//!
//! ```rust,no_run
//! use joinery_core::catalog::Catalog;
//! use joinery_core::pdf::render_quote_pdf;
//! use joinery_core::project::Project;
//! use joinery_core::quote::{generate_quote, ClientInfo};
//!
//! let catalog = Catalog::builtin();
//! let project = Project::new("Kitchen", "Ana");
//! let quote = generate_quote(&project, &catalog, ClientInfo::new("Ion Popescu"), 0.0, "").unwrap();
//! let pdf = render_quote_pdf(&project, &quote, &catalog).unwrap();
//! std::fs::write("quote.pdf", pdf).unwrap();
//! ```

use chrono::{Datelike, Utc};
use tracing::debug;
use typst::diag::{FileError, FileResult};
use typst::foundations::{Bytes, Datetime};
use typst::syntax::{FileId, Source};
use typst::text::{Font, FontBook};
use typst::utils::LazyHash;
use typst::{Library, LibraryExt, World};
use typst_pdf::PdfOptions;

use crate::catalog::CatalogProvider;
use crate::errors::{JoineryError, JoineryResult};
use crate::formulas::formulas_appendix_typst;
use crate::pricing::{format_money, price_breakdown};
use crate::project::Project;
use crate::quote::Quote;

// ============================================================================
// Typst World
// ============================================================================

/// Single-source Typst world with the bundled fonts.
struct QuoteWorld {
    main: Source,
    book: LazyHash<FontBook>,
    fonts: Vec<Font>,
    library: LazyHash<Library>,
}

impl QuoteWorld {
    fn new(source: String) -> Self {
        let fonts: Vec<Font> = typst_assets::fonts()
            .flat_map(|data| Font::iter(Bytes::new(data.to_vec())))
            .collect();
        let book = FontBook::from_fonts(&fonts);

        QuoteWorld {
            main: Source::detached(source),
            book: LazyHash::new(book),
            fonts,
            library: LazyHash::new(Library::default()),
        }
    }
}

impl World for QuoteWorld {
    fn library(&self) -> &LazyHash<Library> {
        &self.library
    }

    fn book(&self) -> &LazyHash<FontBook> {
        &self.book
    }

    fn main(&self) -> FileId {
        self.main.id()
    }

    fn source(&self, id: FileId) -> FileResult<Source> {
        if id == self.main.id() {
            Ok(self.main.clone())
        } else {
            Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
        }
    }

    fn file(&self, id: FileId) -> FileResult<Bytes> {
        Err(FileError::NotFound(id.vpath().as_rootless_path().into()))
    }

    fn font(&self, index: usize) -> Option<Font> {
        self.fonts.get(index).cloned()
    }

    fn today(&self, _offset: Option<i64>) -> Option<Datetime> {
        let now = Utc::now();
        Datetime::from_ymd(now.year(), now.month() as u8, now.day() as u8)
    }
}

// ============================================================================
// Template
// ============================================================================

const QUOTE_TEMPLATE: &str = r##"
#set page(
  paper: "a4",
  margin: (top: 2cm, bottom: 2cm, left: 2cm, right: 2cm),
  header: align(right)[
    #text(size: 9pt, fill: gray)[Furniture Quote {{NUMBER}}]
  ],
  footer: context [
    #line(length: 100%, stroke: 0.5pt + gray)
    #v(4pt)
    #grid(
      columns: (1fr, 1fr, 1fr),
      align(left)[#text(size: 9pt)[{{PROJECT}}]],
      align(center)[#text(size: 9pt)[Page #counter(page).display()]],
      align(right)[#text(size: 9pt)[Valid until {{VALID_UNTIL}}]],
    )
  ]
)

#set text(size: 10pt)

#align(center)[
  #block(width: 100%, fill: rgb("#f0f0f0"), inset: 12pt, radius: 4pt)[
    #text(size: 18pt, weight: "bold")[Quote {{NUMBER}}]
    #v(4pt)
    #text(size: 12pt)[{{PROJECT}}]
  ]
]

#v(12pt)

#grid(
  columns: (1fr, 1fr),
  gutter: 20pt,
  [
    *Client* \
    {{CLIENT_LINES}}
  ],
  [
    *Details* \
    Designer: {{DESIGNER}} \
    Issued: {{DATE}} \
    Valid until: {{VALID_UNTIL}} \
    Status: {{STATUS}}
  ],
)

#v(16pt)

== Modules

#table(
  columns: (auto, 1fr, auto, auto, auto, auto, auto, auto),
  inset: 5pt,
  stroke: 0.5pt,
  align: (left, left, left, right, right, right, right, right),
  table.header([*\#*], [*Module*], [*Size (mm)*], [*Materials*], [*Accessories*], [*Processing*], [*Labor*], [*Total*]),
{{MODULE_ROWS}}
)

#v(16pt)

== Summary

#align(right)[
  #table(
    columns: (auto, auto),
    inset: 6pt,
    stroke: none,
    align: (left, right),
    [Materials], [{{MATERIALS}}],
    [Accessories], [{{ACCESSORIES}}],
    [Processing], [{{PROCESSING}}],
    [Labor], [{{LABOR}}],
    table.hline(stroke: 0.5pt),
    [*Subtotal*], [*{{SUBTOTAL}}*],
    [Discount ({{DISCOUNT_PERCENT}}%)], [-{{DISCOUNT}}],
    [VAT ({{TAX_RATE}}%)], [{{TAX}}],
    table.hline(stroke: 1pt),
    [*Total*], [*{{TOTAL}}*],
  )
]

{{NOTES}}
"##;

/// Render a quote to PDF bytes.
///
/// Module rows are priced against `catalog` so they add up to the breakdown
/// stored on the quote when both use the same catalog.
///
/// # Errors
///
/// - anything [`price_breakdown`] rejects for a module
/// - `Internal` when Typst compilation or PDF export fails
pub fn render_quote_pdf<C: CatalogProvider + ?Sized>(
    project: &Project,
    quote: &Quote,
    catalog: &C,
) -> JoineryResult<Vec<u8>> {
    let source = quote_source(project, quote, catalog)?;
    let bytes = compile_pdf(source)?;
    debug!(quote = %quote.number, bytes = bytes.len(), "quote PDF rendered");
    Ok(bytes)
}

/// Typst source for a quote, appendix included.
fn quote_source<C: CatalogProvider + ?Sized>(project: &Project, quote: &Quote, catalog: &C) -> JoineryResult<String> {
    let currency = quote.currency.as_str();
    let money = |amount: f64| format_money(amount, currency);
    let b = &quote.breakdown;

    let mut rows = Vec::with_capacity(project.module_count());
    for (i, module) in project.modules.iter().enumerate() {
        let cost = price_breakdown(module, catalog, &project.settings.pricing)?;
        let label = if module.label.is_empty() {
            module.module_type.display_name().to_string()
        } else {
            format!("{} ({})", module.label, module.module_type.display_name())
        };
        rows.push(format!(
            "  [{}], [{}], [{:.0}×{:.0}×{:.0}], [{}], [{}], [{}], [{}], [{}],",
            i + 1,
            escape_typst(&label),
            module.width_mm,
            module.height_mm,
            module.depth_mm,
            money(cost.materials),
            money(cost.accessories),
            money(cost.processing),
            money(cost.labor),
            money(cost.total_with_labor()),
        ));
    }
    if rows.is_empty() {
        rows.push("  table.cell(colspan: 8)[_No modules_],".to_string());
    }

    let mut client_lines = vec![escape_typst(&quote.client.name)];
    for line in [&quote.client.address, &quote.client.email, &quote.client.phone]
        .into_iter()
        .flatten()
    {
        client_lines.push(escape_typst(line));
    }

    let notes = if quote.notes.trim().is_empty() {
        String::new()
    } else {
        format!("== Notes\n\n{}\n", escape_typst(&quote.notes))
    };

    let values = [
        ("NUMBER", quote.number.clone()),
        ("PROJECT", escape_typst(&quote.project_name)),
        ("DESIGNER", escape_typst(&project.meta.designer)),
        ("CLIENT_LINES", client_lines.join(" \\\n    ")),
        ("DATE", quote.created_at.format("%Y-%m-%d").to_string()),
        ("VALID_UNTIL", quote.valid_until.format("%Y-%m-%d").to_string()),
        ("STATUS", quote.status.as_str().to_string()),
        ("MODULE_ROWS", rows.join("\n")),
        ("MATERIALS", money(b.materials_cost)),
        ("ACCESSORIES", money(b.accessories_cost)),
        ("PROCESSING", money(b.processing_cost)),
        ("LABOR", money(b.labor_cost)),
        ("SUBTOTAL", money(b.subtotal)),
        ("DISCOUNT_PERCENT", format!("{:.1}", b.discount_percent)),
        ("DISCOUNT", money(b.discount)),
        ("TAX_RATE", format!("{:.1}", b.tax_rate)),
        ("TAX", money(b.tax_amount)),
        ("TOTAL", money(b.total_price)),
        ("NOTES", notes),
    ];

    let mut source = fill_template(QUOTE_TEMPLATE, &values);
    source.push_str(&formulas_appendix_typst());
    Ok(source)
}

/// Replace every `{{KEY}}` in one pass. Substituted text is never rescanned,
/// so placeholders typed by users come out verbatim. Unknown keys are kept.
fn fill_template(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let hit = after.find("}}").and_then(|end| {
            let key = &after[..end];
            values.iter().find(|(k, _)| *k == key).map(|(_, value)| (end, value))
        });
        match hit {
            Some((end, value)) => {
                out.push_str(value);
                rest = &after[end + 2..];
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn compile_pdf(source: String) -> JoineryResult<Vec<u8>> {
    let world = QuoteWorld::new(source);

    let document = typst::compile(&world).output.map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        JoineryError::Internal {
            message: format!("Typst compilation failed: {}", messages.join("; ")),
        }
    })?;

    typst_pdf::pdf(&document, &PdfOptions::default()).map_err(|errors| {
        let messages: Vec<String> = errors.iter().map(|e| e.message.to_string()).collect();
        JoineryError::Internal {
            message: format!("PDF rendering failed: {}", messages.join("; ")),
        }
    })
}

/// Escape characters with markup meaning in user-provided text.
pub fn escape_typst(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '*' | '_' | '#' | '$' | '@' | '<' | '>' | '\\' | '`' | '[' | ']' | '/' | '=' | '~') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AccessoryType, Catalog};
    use crate::module::{Module, ModuleType, PartKind};
    use crate::quote::{generate_quote, ClientInfo};

    #[test]
    fn test_escape_typst() {
        assert_eq!(escape_typst("B-1"), "B-1");
        assert_eq!(escape_typst("#1 [oak]"), "\\#1 \\[oak\\]");
        assert_eq!(escape_typst("a_b*c"), "a\\_b\\*c");
        assert_eq!(escape_typst("http://x"), "http:\\/\\/x");
    }

    #[test]
    fn test_quote_pdf() {
        let catalog = Catalog::builtin();
        let mut project = Project::new("Kitchen #7 [Popescu]", "Ana");

        let mut base = Module::from_template(ModuleType::BaseCabinet, "B_1");
        base.set_material(PartKind::Body, "pal-white-18", 1.2);
        base.add_accessory("hinge-blum-clip-110", AccessoryType::Hinge, 2);
        project.add_module(base);
        project.add_module(Module::from_template(ModuleType::OpenShelf, ""));

        let client = ClientInfo::new("Ion Popescu").with_email("ion@example.com");
        let quote = generate_quote(&project, &catalog, client, 10.0, "Delivery in *May*").unwrap();

        let pdf = render_quote_pdf(&project, &quote, &catalog);
        assert!(pdf.is_ok(), "PDF generation failed: {:?}", pdf.err());

        let bytes = pdf.unwrap();
        assert!(bytes.starts_with(b"%PDF"), "Output is not a valid PDF");
        assert!(bytes.len() > 1000, "PDF seems too small");
    }

    #[test]
    fn test_fill_template_single_pass() {
        let values = [("NAME", "{{TOTAL}}".to_string()), ("TOTAL", "10.00".to_string())];
        assert_eq!(
            fill_template("{{NAME}} = {{TOTAL}} {{OTHER}}", &values),
            "{{TOTAL}} = 10.00 {{OTHER}}"
        );
        assert_eq!(fill_template("open {{ end", &values), "open {{ end");
    }

    #[test]
    fn test_placeholder_in_user_text_kept_verbatim() {
        let catalog = Catalog::builtin();
        let mut project = Project::new("Kitchen {{TOTAL}}", "Ana");
        project.add_module(Module::from_template(ModuleType::WallCabinet, "W-1"));
        let quote = generate_quote(&project, &catalog, ClientInfo::new("{{DISCOUNT}}"), 0.0, "").unwrap();

        let source = quote_source(&project, &quote, &catalog).unwrap();
        assert!(source.contains("Kitchen {{TOTAL}}"));
        assert!(source.contains("{{DISCOUNT}}"));
        assert!(source.contains(&format!("[*{}*]", format_money(quote.breakdown.total_price, &quote.currency))));
    }

    #[test]
    fn test_empty_project_pdf() {
        let catalog = Catalog::builtin();
        let project = Project::new("Empty", "");
        let quote = generate_quote(&project, &catalog, ClientInfo::new("Client"), 0.0, "").unwrap();

        let bytes = render_quote_pdf(&project, &quote, &catalog).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
