//! Check a CCL method file and report diagnostics.
//!
//! Usage: `ccl-check <method.ccl>`

use ccl::SourceFile;
use clap::Parser;
use std::path::PathBuf;
use std::process;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "ccl-check")]
#[command(about = "Analyse a CCL method and report diagnostics")]
struct Args {
    /// Path to the method source file
    method: PathBuf,

    /// Print the global symbol table after a successful analysis
    #[arg(long)]
    symbols: bool,
}

fn main() {
    ccl_tools::init_logging();

    let args = Args::parse();

    let source = match std::fs::read_to_string(&args.method) {
        Ok(source) => source,
        Err(err) => {
            error!("Cannot read '{}': {err}", args.method.display());
            process::exit(1);
        }
    };

    match ccl::analyse_source(&source) {
        Ok(analysed) => {
            match &analysed.name {
                Some(name) => info!("Method {name} is well-formed"),
                None => info!("Method is well-formed"),
            }
            if args.symbols {
                for symbol in analysed.symbols() {
                    info!("  {} : {}", symbol.name, symbol.kind.describe());
                }
            }
        }
        Err(diagnostic) => {
            let file = SourceFile::new(source);
            error!("{}", diagnostic.format_with_location(&file));
            process::exit(1);
        }
    }
}
