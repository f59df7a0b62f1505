//! nlu-datagen - NLU Training Data Generator
//!
//! CLI entry point for generating, validating and inspecting training data
//! from a DDD directory.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nlu_datagen::config::DatagenConfig;
use nlu_datagen::ddd::{validate_ddd_dir, Ddd, Language};
use nlu_datagen::rasa::{generate_all, GeneratorConfig, IntentGenerator};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;

#[derive(Parser)]
#[command(name = "nlu-datagen")]
#[command(version)]
#[command(about = "Generate NLU training data from dialogue domain descriptions", long_about = None)]
struct Cli {
    /// Verbose logging (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: nlu-datagen.toml in this or a parent directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate RASA training data
    Generate {
        /// DDD directory
        #[arg(long)]
        ddd: PathBuf,

        /// Language to generate (repeatable; default: every grammar in the DDD)
        #[arg(short, long = "language")]
        languages: Vec<Language>,

        /// Output root directory
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Examples kept per template (0 keeps all)
        #[arg(long)]
        max_examples: Option<usize>,

        /// Sampling seed
        #[arg(long)]
        seed: Option<u64>,

        /// Print the data instead of writing files (single language only)
        #[arg(long)]
        stdout: bool,
    },

    /// Check a DDD for inconsistencies
    Validate {
        /// DDD directory
        #[arg(long)]
        ddd: PathBuf,
    },

    /// Show example counts per intent and entity
    Stats {
        /// DDD directory
        #[arg(long)]
        ddd: PathBuf,

        /// Language
        #[arg(short, long, default_value = "eng")]
        language: Language,
    },
}

/// RUST_LOG wins unless `--verbose` is given; the fallback level is warn.
fn init_logging(verbose: bool) {
    let mut filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    if verbose {
        filter = filter.add_directive(tracing::Level::DEBUG.into());
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match &cli.config {
        Some(path) => DatagenConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => DatagenConfig::load_from_cwd().context("Failed to load nlu-datagen.toml")?,
    };

    match cli.command {
        Commands::Generate {
            ddd,
            languages,
            output_dir,
            max_examples,
            seed,
            stdout,
        } => {
            let mut generator_config = config.generator_config();
            if let Some(dir) = output_dir {
                generator_config.output_dir = dir;
            }
            if let Some(max) = max_examples {
                generator_config.max_examples_per_template = max;
            }
            if let Some(seed) = seed {
                generator_config.seed = seed;
            }
            let languages = if languages.is_empty() {
                config.project.languages.clone()
            } else {
                languages
            };
            cmd_generate(&ddd, &languages, generator_config, stdout)
        }
        Commands::Validate { ddd } => cmd_validate(&ddd),
        Commands::Stats { ddd, language } => cmd_stats(&ddd, language, config.generator_config()),
    }
}

fn load_ddd(dir: &Path, languages: &[Language]) -> Result<Ddd> {
    let ddd = if languages.is_empty() {
        Ddd::load(dir)
    } else {
        Ddd::load_languages(dir, languages)
    };
    let ddd = ddd.with_context(|| format!("Failed to load DDD {}", dir.display()))?;
    if ddd.languages().is_empty() {
        anyhow::bail!("DDD {} has no grammar files", dir.display());
    }
    debug!(ddd = %ddd.name, languages = ?ddd.languages(), "loaded DDD");
    Ok(ddd)
}

fn cmd_generate(
    dir: &Path,
    languages: &[Language],
    config: GeneratorConfig,
    stdout: bool,
) -> Result<()> {
    let ddd = load_ddd(dir, languages)?;
    let languages = ddd.languages();

    if stdout {
        let [language] = languages[..] else {
            anyhow::bail!("--stdout needs exactly one language, got {}", languages.len());
        };
        let data = IntentGenerator::new(&ddd, language)
            .with_config(config)
            .generate()
            .with_context(|| format!("Failed to generate {} data", language))?;
        println!("{}", data.to_pretty_json()?);
        return Ok(());
    }

    println!("=== NLU Training Data Generator ===");
    println!("DDD: {}", ddd.name);
    println!();

    let start = Instant::now();
    let written = generate_all(&ddd, &languages, &config).context("Generation failed")?;
    let elapsed = start.elapsed();

    for (language, path) in &written {
        println!("  {} -> {}", language, path.display());
    }
    println!();
    println!(
        "Generated {} language(s) in {:.2}ms",
        written.len(),
        elapsed.as_secs_f64() * 1000.0
    );

    Ok(())
}

fn cmd_validate(dir: &Path) -> Result<()> {
    let result =
        validate_ddd_dir(dir).with_context(|| format!("Failed to load DDD {}", dir.display()))?;

    println!("{}", result.summary());

    if !result.errors.is_empty() {
        println!("\n  Errors ({}):", result.errors.len());
        for error in &result.errors {
            println!("    ✗ {}", error);
        }
    }
    if !result.warnings.is_empty() {
        println!("\n  Warnings ({}):", result.warnings.len());
        for warning in &result.warnings {
            println!("    ⚠ {}", warning);
        }
    }

    if !result.is_valid() {
        anyhow::bail!("DDD '{}' is invalid", result.ddd_name);
    }
    Ok(())
}

fn cmd_stats(dir: &Path, language: Language, config: GeneratorConfig) -> Result<()> {
    let ddd = load_ddd(dir, &[language])?;
    let data = IntentGenerator::new(&ddd, language)
        .with_config(config)
        .generate()
        .with_context(|| format!("Failed to generate {} data", language))?;
    let stats = data.stats();

    println!("=== {} ({}) ===", ddd.name, language);
    println!("Total examples: {}", stats.total_examples);
    println!();
    println!("By intent:");
    for (intent, count) in &stats.by_intent {
        println!("  {:<50} {:>6}", intent, count);
    }
    println!();
    println!("By entity:");
    for (entity, count) in &stats.by_entity {
        println!("  {:<50} {:>6}", entity, count);
    }

    Ok(())
}
