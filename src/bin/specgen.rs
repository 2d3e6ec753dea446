//! ESCDF Spec Generator CLI
//!
//! Generates the ESCDF identifier and specification headers, checks
//! committed headers for drift, and manages the generator configuration.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use escdf_specgen::{
    check_drift, generate_from_path, DimensionPolicy, DriftStatus, GenerateOptions, Generation,
    SpecgenConfig,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "escdf-specgen")]
#[command(about = "Generate ESCDF specification headers from attribute definitions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate all headers
    Generate {
        #[command(flatten)]
        args: RunArgs,

        /// Resolve and report, but don't write any file
        #[arg(long)]
        dry_run: bool,
    },

    /// Check that the headers on disk match the definitions
    Check {
        #[command(flatten)]
        args: RunArgs,
    },

    /// Print diagnostics and the attribute usage tally
    Report {
        #[command(flatten)]
        args: RunArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View or create the configuration file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show the effective configuration
    Show {
        /// Config file to load (optional)
        #[arg(short, long)]
        config: Option<String>,

        /// Output as TOML
        #[arg(long)]
        toml: bool,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a config file with default values
    Init {
        #[arg(short, long, default_value = "specgen.toml")]
        output: String,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Definitions document (default: attributes_def.json)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Directory holding the headers
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Library prefix for file, type and function names
    #[arg(long)]
    prefix: Option<String>,

    /// Emit Dims_definitions verbatim without checking them
    #[arg(long)]
    legacy_dimension_refs: bool,

    /// Fail when any warning is reported
    #[arg(long)]
    strict: bool,

    /// Config file to load (optional)
    #[arg(short, long)]
    config: Option<String>,
}

impl RunArgs {
    /// Effective configuration: config sources, then command-line flags
    fn resolve_config(&self) -> anyhow::Result<SpecgenConfig> {
        let mut cfg = SpecgenConfig::load_from(self.config.as_deref())
            .context("failed to load configuration")?;

        if let Some(input) = &self.input {
            cfg.input.path = input.clone();
        }
        if let Some(dir) = &self.output_dir {
            cfg.output.directory = dir.clone();
        }
        if let Some(prefix) = &self.prefix {
            cfg.output.prefix = prefix.clone();
        }
        if self.legacy_dimension_refs {
            cfg.generation.dimension_refs = DimensionPolicy::Legacy;
        }
        if self.strict {
            cfg.generation.strict = true;
        }
        Ok(cfg)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .without_time()
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Generate { args, dry_run } => {
            let cfg = args.resolve_config()?;
            let generation = load_and_generate(&cfg)?;

            if dry_run {
                println!("💡 Dry run - no files written");
            } else {
                generation
                    .artifacts
                    .write_to(&cfg.output.directory)
                    .context("failed to write headers")?;
                println!();
                for artifact in &generation.artifacts {
                    println!("  ✅ {} written ({})", artifact.file_name, artifact.checksum().short());
                }
            }

            fail_if_strict(&cfg, &generation)
        }

        Commands::Check { args } => {
            let cfg = args.resolve_config()?;
            let generation = load_and_generate(&cfg)?;

            let report = check_drift(&generation.artifacts, &cfg.output.directory)?;
            println!();
            for entry in &report.entries {
                match &entry.status {
                    DriftStatus::UpToDate => println!("  ✅ {} - up to date", entry.file_name),
                    DriftStatus::Missing => println!("  ❌ {} - MISSING", entry.file_name),
                    DriftStatus::Stale { diff } => {
                        println!("  ❌ {} - STALE ({} changed lines)", entry.file_name, diff.len());
                        for line in diff {
                            println!("    {}", line);
                        }
                    }
                }
            }

            if !report.is_clean() {
                bail!(
                    "{} header(s) out of date - run `escdf-specgen generate`",
                    report.drifted().count()
                );
            }
            println!("\n✅ Headers are in sync with {}", cfg.input.path.display());
            fail_if_strict(&cfg, &generation)
        }

        Commands::Report { args, json } => {
            let cfg = args.resolve_config()?;
            let generation = generate_from_path(&cfg.input.path, &GenerateOptions::from(&cfg))
                .with_context(|| format!("failed to load {}", cfg.input.path.display()))?;

            if json {
                let usage: Vec<_> = generation.model.tally.rows().collect();
                let report = serde_json::json!({
                    "version": generation.model.version,
                    "stats": generation.stats(),
                    "usage": usage,
                    "diagnostics": generation.diagnostics,
                });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_banner(&generation);
                print!("{}", generation.diagnostics);
                println!("\nAttribute usage:");
                for row in generation.model.tally.rows() {
                    println!("  {:<40} {}", row.attribute, row.count);
                }
            }
            fail_if_strict(&cfg, &generation)
        }

        Commands::Config { command } => run_config(command),
    }
}

fn load_and_generate(cfg: &SpecgenConfig) -> anyhow::Result<Generation> {
    let generation = generate_from_path(&cfg.input.path, &GenerateOptions::from(cfg))
        .with_context(|| format!("failed to load {}", cfg.input.path.display()))?;

    print_banner(&generation);
    generation.diagnostics.log();
    Ok(generation)
}

fn print_banner(generation: &Generation) {
    let stats = generation.stats();
    println!("📦 Attribute file version: {}", generation.model.version);
    println!("  Found {} attribute specs definitions.", stats.attributes);
    println!("  Found {} dataset specs definitions.", stats.datasets);
    println!("  Found {} group specs definitions.", stats.groups);
    println!();
}

fn fail_if_strict(cfg: &SpecgenConfig, generation: &Generation) -> anyhow::Result<()> {
    generation.check_strict(cfg.generation.strict)?;
    Ok(())
}

fn run_config(command: ConfigCommands) -> anyhow::Result<()> {
    match command {
        ConfigCommands::Show { config, toml, json } => {
            let cfg = SpecgenConfig::load_from(config.as_deref())?;

            if json {
                println!("{}", serde_json::to_string_pretty(&cfg)?);
            } else if toml {
                println!("{}", ::toml::to_string_pretty(&cfg)?);
            } else {
                println!("📋 Spec Generator Configuration\n");
                println!("Input:");
                println!("  Path: {:?}", cfg.input.path);

                println!("\nOutput:");
                println!("  Directory: {:?}", cfg.output.directory);
                println!("  Prefix: {}", cfg.output.prefix);

                println!("\nGeneration:");
                println!("  Dimension refs: {:?}", cfg.generation.dimension_refs);
                println!("  Strict: {}", cfg.generation.strict);
            }
        }

        ConfigCommands::Init { output } => {
            SpecgenConfig::default().save(&output)?;
            println!("✅ Created config file: {}", output);
        }
    }

    Ok(())
}
