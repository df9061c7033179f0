//! # Joinery CLI
//!
//! Command-line front end for the furniture pricing engine: create `.jnr`
//! projects, add modules, run the combo rules and produce quotes.
//!
//! ```bash
//! joinery new kitchen.jnr --name "Kitchen Popescu" --designer Ana
//! joinery add-module kitchen.jnr --type drawer_unit --label D-1 \
//!     --material body:pal-white-18:1.4 --accessory slide-blum-tandem-500:3
//! joinery rules kitchen.jnr --apply
//! joinery quote kitchen.jnr --client "Ion Popescu" --discount 5 --format pdf --out quote.pdf
//! ```

mod telemetry;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use joinery_core::catalog::{load_catalog, Catalog, CatalogProvider};
use joinery_core::export::{export_quote, ExportFormat};
use joinery_core::file_io::{load_project, load_project_with_lock_check, save_project, FileLock};
use joinery_core::module::{Module, ModuleType, PartKind, ProcessingType};
use joinery_core::pricing::{calculate_price, format_money, price_project};
use joinery_core::project::Project;
use joinery_core::quote::{generate_quote, ClientInfo};
use joinery_core::rules::RuleSet;
use joinery_core::{JoineryError, JoineryResult};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "joinery", about = "Price furniture projects and generate client quotes", version)]
struct Cli {
    /// JSON catalog file (defaults to the built-in catalog)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// JSON rule table (defaults to the built-in rules)
    #[arg(long, global = true)]
    rules: Option<PathBuf>,

    /// Log filter used when JOINERY_LOG and RUST_LOG are unset
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an empty project file
    New(NewArgs),
    /// Add a module to a project
    AddModule(AddModuleArgs),
    /// List the modules of a project with their prices
    Show {
        file: PathBuf,
    },
    /// Run the combo rules over every module
    Rules {
        file: PathBuf,
        /// Save the modules with rule-added accessories
        #[arg(long)]
        apply: bool,
    },
    /// Generate a quote
    Quote(QuoteArgs),
    /// Print the active catalog as JSON
    Catalog,
}

#[derive(Args, Debug)]
struct NewArgs {
    file: PathBuf,
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    designer: String,
    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
}

#[derive(Args, Debug)]
struct AddModuleArgs {
    file: PathBuf,
    #[arg(long = "type")]
    module_type: ModuleType,
    /// Width in mm (template default when omitted)
    #[arg(long)]
    width: Option<f64>,
    #[arg(long)]
    height: Option<f64>,
    #[arg(long)]
    depth: Option<f64>,
    #[arg(long, default_value = "")]
    label: String,
    /// PART:MATERIAL_ID:SQM, e.g. body:pal-white-18:1.2
    #[arg(long = "material", value_parser = parse_material)]
    materials: Vec<(PartKind, String, f64)>,
    /// ACCESSORY_ID:QTY, e.g. hinge-blum-clip-110:2
    #[arg(long = "accessory", value_parser = parse_accessory)]
    accessories: Vec<(String, u32)>,
    /// TYPE:EXTENT, e.g. edge_banding:6.5
    #[arg(long = "processing", value_parser = parse_processing)]
    processing: Vec<(ProcessingType, f64)>,
}

#[derive(Args, Debug)]
struct QuoteArgs {
    file: PathBuf,
    #[arg(long)]
    client: String,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    address: Option<String>,
    /// Discount percentage
    #[arg(long, default_value_t = 0.0)]
    discount: f64,
    #[arg(long, default_value = "")]
    notes: String,
    #[arg(long, default_value = "json")]
    format: ExportFormat,
    /// Output file (stdout for text formats when omitted)
    #[arg(long)]
    out: Option<PathBuf>,
}

fn parse_material(value: &str) -> Result<(PartKind, String, f64), String> {
    let parts: Vec<&str> = value.splitn(3, ':').collect();
    let [part, id, sqm] = parts.as_slice() else {
        return Err("expected PART:MATERIAL_ID:SQM".to_string());
    };
    let part: PartKind = part.parse().map_err(|e: JoineryError| e.to_string())?;
    let sqm: f64 = sqm.parse().map_err(|_| format!("invalid quantity '{}'", sqm))?;
    Ok((part, id.to_string(), sqm))
}

fn parse_accessory(value: &str) -> Result<(String, u32), String> {
    let (id, qty) = value.rsplit_once(':').ok_or("expected ACCESSORY_ID:QTY")?;
    let qty: u32 = qty.parse().map_err(|_| format!("invalid quantity '{}'", qty))?;
    Ok((id.to_string(), qty))
}

fn parse_processing(value: &str) -> Result<(ProcessingType, f64), String> {
    let (kind, extent) = value.split_once(':').ok_or("expected TYPE:EXTENT")?;
    let kind: ProcessingType = kind.parse().map_err(|e: JoineryError| e.to_string())?;
    let extent: f64 = extent.parse().map_err(|_| format!("invalid extent '{}'", extent))?;
    Ok((kind, extent))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = telemetry::init(&cli.log_level) {
        eprintln!("{err}");
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            if let Ok(json) = serde_json::to_string_pretty(&err) {
                eprintln!("{}", json);
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> JoineryResult<()> {
    let catalog = match &cli.catalog {
        Some(path) => load_catalog(path)?,
        None => Catalog::builtin(),
    };

    match cli.command {
        Command::New(args) => cmd_new(args),
        Command::AddModule(args) => cmd_add_module(args, &catalog),
        Command::Show { file } => cmd_show(&file, &catalog),
        Command::Rules { file, apply } => {
            let rules = load_rules(cli.rules.as_deref())?;
            cmd_rules(&file, apply, &rules, &catalog)
        }
        Command::Quote(args) => cmd_quote(args, &catalog),
        Command::Catalog => {
            println!("{}", serde_json::to_string_pretty(&catalog)?);
            Ok(())
        }
    }
}

fn load_rules(path: Option<&Path>) -> JoineryResult<RuleSet> {
    match path {
        Some(path) => {
            let json = fs::read_to_string(path)
                .map_err(|e| JoineryError::file_error("read rules", path.display().to_string(), e.to_string()))?;
            let rules = RuleSet::from_json(&json)?;
            info!(path = %path.display(), rules = rules.len(), "rule table loaded");
            Ok(rules)
        }
        None => Ok(RuleSet::builtin()),
    }
}

/// Save while holding the project lock.
fn save_locked(project: &Project, path: &Path) -> JoineryResult<()> {
    let holder = if project.meta.designer.is_empty() {
        "joinery-cli"
    } else {
        project.meta.designer.as_str()
    };
    let _lock = FileLock::acquire(path, holder)?;
    save_project(project, path)
}

fn cmd_new(args: NewArgs) -> JoineryResult<()> {
    if args.file.exists() && !args.force {
        return Err(JoineryError::file_error(
            "create",
            args.file.display().to_string(),
            "file exists (use --force to overwrite)",
        ));
    }
    if args.name.trim().is_empty() {
        return Err(JoineryError::missing_field("name"));
    }

    let project = Project::new(args.name, args.designer);
    save_locked(&project, &args.file)?;
    println!("Created {} ({})", args.file.display(), project.id());
    Ok(())
}

fn cmd_add_module<C: CatalogProvider>(args: AddModuleArgs, catalog: &C) -> JoineryResult<()> {
    let mut project = load_project(&args.file)?;

    let (w, h, d) = args.module_type.default_dimensions_mm();
    let mut module = Module::new(
        args.module_type,
        args.width.unwrap_or(w),
        args.height.unwrap_or(h),
        args.depth.unwrap_or(d),
    )
    .with_label(args.label);

    for (part, material_id, sqm) in args.materials {
        if catalog.material(&material_id).is_none() {
            return Err(JoineryError::material_not_found(material_id));
        }
        module.set_material(part, material_id, sqm);
    }
    for (accessory_id, quantity) in args.accessories {
        let item = catalog
            .accessory(&accessory_id)
            .ok_or_else(|| JoineryError::accessory_not_found(accessory_id.as_str()))?;
        module.add_accessory(accessory_id.as_str(), item.accessory_type, quantity);
    }
    for (processing_type, extent) in args.processing {
        module.add_processing(processing_type, extent, None);
    }

    let module = calculate_price(&module, catalog, &project.settings.pricing)?;
    let price = module.price;
    let id = project.add_module(module);
    save_locked(&project, &args.file)?;

    println!(
        "Added {} {} ({})",
        args.module_type.display_name(),
        id,
        format_money(price, &project.settings.pricing.currency)
    );
    Ok(())
}

fn cmd_show<C: CatalogProvider>(file: &Path, catalog: &C) -> JoineryResult<()> {
    let (project, lock) = load_project_with_lock_check(file)?;
    if let Some(lock) = lock {
        warn!(holder = %lock.user_id, machine = %lock.machine, "project is open elsewhere");
    }

    let priced = price_project(&project, catalog)?;
    let currency = &priced.settings.pricing.currency;

    println!("{} ({})", priced.meta.name, priced.meta.designer);
    println!("{}", "─".repeat(72));
    for (i, module) in priced.modules.iter().enumerate() {
        println!(
            "{:>3}  {:<10} {:<16} {:>5.0}×{:>4.0}×{:>4.0}  {:>16}",
            i + 1,
            module.label,
            module.module_type.display_name(),
            module.width_mm,
            module.height_mm,
            module.depth_mm,
            format_money(module.price, currency)
        );
    }
    println!("{}", "─".repeat(72));
    println!(
        "{} modules, {} before labor and tax",
        priced.module_count(),
        format_money(priced.modules_price(), currency)
    );
    Ok(())
}

fn cmd_rules<C: CatalogProvider>(file: &Path, apply: bool, rules: &RuleSet, catalog: &C) -> JoineryResult<()> {
    let mut project = load_project(file)?;
    let mut changed = false;

    let mut updated = Vec::with_capacity(project.module_count());
    for module in &project.modules {
        let outcome = rules.apply(module, catalog)?;
        let name = if module.label.is_empty() {
            module.id.to_string()
        } else {
            module.label.clone()
        };

        println!("{} ({})", name, module.module_type.display_name());
        for message in &outcome.messages {
            println!("  - {}", message);
        }
        if !outcome.blocked_options.is_empty() {
            println!("  blocked: {}", outcome.blocked_options.join(", "));
        }
        for suggestion in &outcome.suggestions {
            println!(
                "  suggest: {} for {}",
                suggestion.material_type.code(),
                suggestion.part.as_str()
            );
        }

        changed |= outcome.module.accessories != module.accessories;
        updated.push(outcome.module);
    }

    if apply && changed {
        project.modules = updated;
        let project = price_project(&project, catalog)?;
        save_locked(&project, file)?;
        println!("Saved rule changes to {}", file.display());
    }
    Ok(())
}

fn cmd_quote<C: CatalogProvider>(args: QuoteArgs, catalog: &C) -> JoineryResult<()> {
    let project = load_project(&args.file)?;

    let mut client = ClientInfo::new(args.client);
    client.email = args.email;
    client.phone = args.phone;
    client.address = args.address;

    let quote = generate_quote(&project, catalog, client, args.discount, args.notes)?;
    let bytes = export_quote(args.format, &project, &quote, catalog)?;

    match args.out {
        Some(out) => {
            fs::write(&out, &bytes)
                .map_err(|e| JoineryError::file_error("write", out.display().to_string(), e.to_string()))?;
            println!("Quote {} written to {}", quote.number, out.display());
        }
        None if args.format.is_text() => {
            println!("{}", String::from_utf8_lossy(&bytes));
        }
        None => {
            let out = args.file.with_extension(args.format.extension());
            fs::write(&out, &bytes)
                .map_err(|e| JoineryError::file_error("write", out.display().to_string(), e.to_string()))?;
            println!("Quote {} written to {}", quote.number, out.display());
        }
    }
    Ok(())
}
