//! Lode CLI binary.
//!
//! Provides command-line interface for the Lode forecasting pipeline.

mod integration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use integration::pipeline::{DataSources, load_panel};
use integration::runner::{BenchmarkPlan, run_plan};
use lode_data::minerals::TICKER_TABLE;
use lode_data::{MacroSource, Mineral, ProductionLayout};
use lode_features::FeatureConfig;
use lode_models::{BenchmarkConfig, available_models};
use lode_output::{BenchmarkReport, ExportFormat, Exporter};
use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lode")]
#[command(about = "Lode: mining production forecasting benchmarks", long_about = None)]
#[command(version = lode::VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Input files shared by every data-reading command.
#[derive(Args)]
struct SourceArgs {
    /// Directory holding the source spreadsheets
    #[arg(long)]
    data_dir: PathBuf,

    /// Production workbook (default: <data-dir>/production_sales.xlsx)
    #[arg(long)]
    production: Option<PathBuf>,

    /// Price workbook (default: <data-dir>/prices.xls)
    #[arg(long)]
    prices: Option<PathBuf>,

    /// Macro series to include, as NAME=PATH (repeatable)
    #[arg(long = "macro", value_name = "NAME=PATH")]
    macros: Vec<MacroSource>,
}

impl SourceArgs {
    fn into_sources(self) -> DataSources {
        DataSources::from_data_dir(&self.data_dir, self.production, self.prices, self.macros)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Terminal table
    Text,
    /// Markdown report
    Markdown,
    /// Pretty-printed JSON
    Json,
    /// One CSV row per (mineral, horizon, model)
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Benchmark forecasting models on a chronological hold-out
    Benchmark {
        #[command(flatten)]
        sources: SourceArgs,

        /// Mineral to forecast, by name or slug (repeatable; default: all)
        #[arg(long = "mineral")]
        minerals: Vec<String>,

        /// Forecast horizon in months (repeatable)
        #[arg(long = "horizon", default_values_t = vec![1, 3, 6])]
        horizons: Vec<usize>,

        /// Model to evaluate (repeatable; default: all registered models)
        #[arg(long = "model")]
        models: Vec<String>,

        /// Share of rows, oldest first, used for training
        #[arg(long, default_value_t = 0.8)]
        train_fraction: f64,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Write the report to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Assemble the monthly panel and dump it as CSV
    Panel {
        #[command(flatten)]
        sources: SourceArgs,

        /// Write to a file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// List supported minerals and their source identifiers
    Minerals,

    /// List available models
    Models,
}

fn main() {
    init_tracing();
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Benchmark {
            sources,
            minerals,
            horizons,
            models,
            train_fraction,
            format,
            output,
        } => {
            let plan = BenchmarkPlan {
                strict: !minerals.is_empty(),
                minerals: parse_minerals(&minerals)?,
                horizons,
                models,
                features: FeatureConfig::default(),
                benchmark: BenchmarkConfig { train_fraction },
            };
            benchmark(sources.into_sources(), plan, format, output)?;
        }
        Commands::Panel { sources, output } => {
            let panel = load_panel(&sources.into_sources(), &ProductionLayout::default())?;
            match output {
                Some(path) => panel.write_csv(File::create(path)?)?,
                None => panel.write_csv(io::stdout().lock())?,
            }
        }
        Commands::Minerals => list_minerals(),
        Commands::Models => list_models(),
    }

    Ok(())
}

fn parse_minerals(names: &[String]) -> Result<Vec<Mineral>, String> {
    if names.is_empty() {
        return Ok(Mineral::all());
    }
    names
        .iter()
        .map(|name| {
            Mineral::from_name(name).ok_or_else(|| {
                let known: Vec<&str> = Mineral::all().iter().map(|m| m.slug()).collect();
                format!("Unknown mineral '{}' (expected one of: {})", name, known.join(", "))
            })
        })
        .collect()
}

fn benchmark(
    sources: DataSources,
    mut plan: BenchmarkPlan,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    if plan.horizons.is_empty() {
        return Err("at least one --horizon is required".into());
    }
    plan.features = plan.features.with_exogenous(sources.macro_names());

    let panel = load_panel(&sources, &ProductionLayout::default())?;

    let pb = ProgressBar::new(plan.job_count() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("█▓░"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));

    let runs = match run_plan(&panel, &plan, Some(&pb)) {
        Ok(runs) => {
            pb.finish_with_message(format!("{} benchmark runs", runs.len()));
            runs
        }
        Err(e) => {
            pb.finish_with_message("Failed!");
            return Err(e.into());
        }
    };
    if runs.is_empty() {
        return Err("no mineral had enough history to benchmark".into());
    }

    let report = BenchmarkReport::new(plan.benchmark.train_fraction, runs);
    let content = match format {
        OutputFormat::Text => report.to_ascii_table(),
        OutputFormat::Markdown => report.to_markdown(),
        OutputFormat::Json => report.export_to_string(ExportFormat::PrettyJson)?,
        OutputFormat::Csv => report.export_to_string(ExportFormat::Csv)?,
    };

    match output {
        Some(path) => {
            File::create(&path)?.write_all(content.as_bytes())?;
            println!("Report written to {}", path.display());
        }
        None => print!("{}", content),
    }
    Ok(())
}

fn list_minerals() {
    println!(
        "{:<10} {:<10} {:<16} {:<16} {:<14}",
        "Mineral", "Slug", "Production", "Price", "Ticker"
    );
    println!("{}", "-".repeat(70));
    for mineral in Mineral::all() {
        let ticker = TICKER_TABLE
            .iter()
            .find(|(_, m)| *m == mineral)
            .map_or("-", |(code, _)| *code);
        println!(
            "{:<10} {:<10} {:<16} {:<16} {:<14}",
            mineral.label(),
            mineral.slug(),
            mineral.production_column(),
            mineral.price_column(),
            ticker
        );
    }
}

fn list_models() {
    for info in available_models() {
        println!("{:<20} {}", info.name, info.description);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use rstest::rstest;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[rstest]
    #[case("gold", Mineral::Gold)]
    #[case("iron_ore", Mineral::IronOre)]
    #[case("Iron ore", Mineral::IronOre)]
    fn test_parse_minerals(#[case] name: &str, #[case] expected: Mineral) {
        assert_eq!(parse_minerals(&[name.to_string()]).unwrap(), vec![expected]);
    }

    #[test]
    fn test_parse_minerals_defaults_and_errors() {
        assert_eq!(parse_minerals(&[]).unwrap(), Mineral::all());
        assert!(parse_minerals(&["zinc".to_string()]).is_err());
    }

    #[test]
    fn test_benchmark_arguments() {
        let cli = Cli::try_parse_from([
            "lode",
            "benchmark",
            "--data-dir",
            "data",
            "--mineral",
            "gold",
            "--horizon",
            "12",
            "--macro",
            "cpi=data/cpi.xlsx",
            "--format",
            "csv",
        ])
        .unwrap();

        match cli.command {
            Commands::Benchmark {
                sources,
                minerals,
                horizons,
                train_fraction,
                format,
                ..
            } => {
                assert_eq!(minerals, vec!["gold"]);
                assert_eq!(horizons, vec![12]);
                assert_eq!(train_fraction, 0.8);
                assert_eq!(format, OutputFormat::Csv);
                assert_eq!(sources.macros, vec![MacroSource::new("cpi", "data/cpi.xlsx")]);
            }
            _ => panic!("expected benchmark command"),
        }
    }

    #[test]
    fn test_default_horizons() {
        let cli = Cli::try_parse_from(["lode", "benchmark", "--data-dir", "data"]).unwrap();
        match cli.command {
            Commands::Benchmark { horizons, .. } => assert_eq!(horizons, vec![1, 3, 6]),
            _ => panic!("expected benchmark command"),
        }
    }
}
