//! Generate FORMULAS.md from the formula registry.
//!
//! ```bash
//! cargo run --bin gen-formulas
//! ```
//!
//! Run from the workspace root; the file is written to `joinery_core/FORMULAS.md`.

use std::fs;
use std::path::Path;
use std::process::ExitCode;

use joinery_core::formulas::generate_formulas_markdown;

fn main() -> ExitCode {
    let markdown = generate_formulas_markdown();
    let output_path = Path::new("joinery_core/FORMULAS.md");

    match fs::write(output_path, &markdown) {
        Ok(()) => {
            println!("Wrote {} bytes to {}", markdown.len(), output_path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error writing {}: {}", output_path.display(), e);
            ExitCode::FAILURE
        }
    }
}
