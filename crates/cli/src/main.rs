use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use dfn_core::DfnError;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

/// Definition-file toolchain.
#[derive(Parser)]
#[command(name = "dfn", version, about = "Definition file (DFN) toolchain")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a directory of .dfn files to interchange TOML
    Convert {
        /// Directory containing .dfn files
        indir: PathBuf,
        /// Output directory for .toml files (created if missing)
        outdir: PathBuf,
    },

    /// Parse a single .dfn file and report the result
    Check {
        /// Path to the .dfn file
        file: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert { indir, outdir } => {
            cmd_convert(&indir, &outdir, cli.output, cli.quiet);
        }
        Commands::Check { file } => {
            cmd_check(&file, cli.output, cli.quiet);
        }
    }
}

fn cmd_convert(indir: &Path, outdir: &Path, output: OutputFormat, quiet: bool) {
    let entries = match fs::read_dir(indir) {
        Ok(entries) => entries,
        Err(e) => {
            report_error(
                &format!("cannot read input directory '{}': {}", indir.display(), e),
                output,
            );
            process::exit(1);
        }
    };
    let mut paths: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().is_some_and(|ext| ext == "dfn"))
        .collect();
    paths.sort();

    if let Err(e) = fs::create_dir_all(outdir) {
        report_error(
            &format!("cannot create output directory '{}': {}", outdir.display(), e),
            output,
        );
        process::exit(1);
    }

    // One file's failure never aborts the batch; successes are still
    // written and every failure is reported.
    let mut converted = 0usize;
    let mut failures: Vec<DfnError> = Vec::new();
    for path in &paths {
        match convert_one(path, outdir) {
            Ok(()) => converted += 1,
            Err(e) => failures.push(e),
        }
    }

    for err in &failures {
        match output {
            OutputFormat::Json => eprintln!("{}", err.to_json_value()),
            OutputFormat::Text => eprintln!("{}", err),
        }
    }
    if !quiet {
        match output {
            OutputFormat::Text => {
                println!("converted {} of {} files", converted, paths.len());
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "converted": converted,
                        "failed": failures.len(),
                    })
                );
            }
        }
    }
    if !failures.is_empty() {
        process::exit(1);
    }
}

/// Convert one definition file, writing `<stem>.toml` into `outdir`.
/// The output file is written only after the whole definition has been
/// parsed and serialized.
fn convert_one(path: &Path, outdir: &Path) -> Result<(), DfnError> {
    let file = path.display().to_string();
    let def = dfn_core::parse_file(path)?;
    let text = dfn_interchange::to_string(&def)
        .map_err(|e| DfnError::io(&file, format!("cannot serialize definition: {}", e)))?;
    let out_path = outdir.join(format!("{}.toml", def.name));
    fs::write(&out_path, text).map_err(|e| {
        DfnError::io(
            &file,
            format!("cannot write '{}': {}", out_path.display(), e),
        )
    })?;
    Ok(())
}

fn cmd_check(file: &Path, output: OutputFormat, quiet: bool) {
    match dfn_core::parse_file(file) {
        Ok(def) => {
            if !quiet {
                match output {
                    OutputFormat::Text => {
                        println!("ok: {} ({} blocks)", def.name, def.blocks.len());
                    }
                    OutputFormat::Json => {
                        println!(
                            "{}",
                            serde_json::json!({
                                "ok": true,
                                "name": def.name,
                                "blocks": def.blocks.len(),
                            })
                        );
                    }
                }
            }
        }
        Err(e) => {
            match output {
                OutputFormat::Json => eprintln!("{}", e.to_json_value()),
                OutputFormat::Text => eprintln!("{}", e),
            }
            process::exit(1);
        }
    }
}

/// Errors always reach stderr; `--quiet` only gates success output.
fn report_error(msg: &str, output: OutputFormat) {
    match output {
        OutputFormat::Json => {
            eprintln!("{}", serde_json::json!({ "error": msg }));
        }
        OutputFormat::Text => {
            eprintln!("error: {}", msg);
        }
    }
}
