use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

use ori_core::convert::{ConvertOptions, Converter};
use ori_core::parse;
use ori_core::parse::spec::OpenApiSpec;

#[derive(Parser)]
#[command(name = "ori", about = "OpenAPI 3.x to request-collection converter", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an OpenAPI document into grouped request templates
    Convert {
        /// Path to the OpenAPI document (YAML or JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output format
        #[arg(long, default_value = "summary")]
        format: OutputFormat,

        /// Host to use when the document declares no servers
        #[arg(long)]
        fallback_server: Option<String>,

        /// Skip operations that fail to convert instead of aborting
        #[arg(long)]
        skip_failed: bool,
    },

    /// Check that a document parses as a supported OpenAPI version
    Validate {
        /// Path to the OpenAPI document
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        shell: Shell,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Summary,
    Json,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input,
            format,
            fallback_server,
            skip_failed,
        } => cmd_convert(&input, format, fallback_server, skip_failed),

        Commands::Validate { input } => cmd_validate(&input),

        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "ori", &mut io::stdout());
            Ok(())
        }
    }
}

fn cmd_convert(
    input: &Path,
    format: OutputFormat,
    fallback_server: Option<String>,
    skip_failed: bool,
) -> Result<()> {
    let spec = load_spec(input)?;

    let mut converter = Converter::new(ConvertOptions {
        fallback_server_url: fallback_server,
        skip_failed_operations: skip_failed,
    });
    converter
        .convert(&spec)
        .with_context(|| format!("failed to convert {}", input.display()))?;

    let project = converter.into_project();
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&project)?);
        }
        OutputFormat::Summary => {
            let request_count: usize = project.groups.iter().map(|g| g.requests.len()).sum();
            println!(
                "Converted \"{}\": {} groups, {} requests",
                spec.info.title,
                project.groups.len(),
                request_count
            );
            for group in &project.groups {
                println!("  {} ({} requests)", group.name, group.requests.len());
                for request in &group.requests {
                    println!("    {} {}", request.method, request.name);
                }
            }
        }
    }
    Ok(())
}

fn cmd_validate(input: &Path) -> Result<()> {
    let spec = load_spec(input)?;
    println!(
        "OK: {} (OpenAPI {}, {} paths)",
        spec.info.title,
        spec.openapi,
        spec.paths.len()
    );
    Ok(())
}

fn load_spec(path: &Path) -> Result<OpenApiSpec> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let spec = if is_json {
        parse::from_json(&text)
    } else {
        parse::from_yaml(&text)
    };
    let spec = spec.with_context(|| format!("failed to parse {}", path.display()))?;
    log::debug!(
        "loaded {}: OpenAPI {}, {} paths",
        path.display(),
        spec.openapi,
        spec.paths.len()
    );
    Ok(spec)
}
