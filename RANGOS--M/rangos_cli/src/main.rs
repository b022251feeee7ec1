use std::{
    io::{self, Write},
    path::PathBuf,
};

use anyhow::{bail, ensure, Context, Result};
use clap::{Args, Parser, Subcommand};
use rangos_rank_engine::{
    generator::random_seed, parse_point_list, render_results, Console, EngineConfig,
    PointGenerator, PointSet, RankReport, RankRuntime, RankStrategy, RankTelemetry, Workbench,
};
use serde_json::json;
use shared_logging::LogLevel;

/// Span of the coordinates drawn for random point sets.
const RANDOM_RANGE: std::ops::Range<f64> = -1_000.0..1_000.0;

#[derive(Parser, Debug)]
#[command(
    name = "rangos",
    version,
    about = "Ranks 2-D query points against a reference set by their y coordinate"
)]
struct Cli {
    /// TOML engine configuration.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive menu on stdin/stdout.
    Menu,
    /// Ranks a query set against a reference set.
    Rank(RankArgs),
    /// Runs both strategies and checks that they agree.
    Compare(CompareArgs),
    /// Ranks the built-in example sets.
    Example {
        /// Strategy to use instead of the configured default.
        #[arg(long)]
        strategy: Option<RankStrategy>,
        /// Print the report as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct RankArgs {
    /// Reference set A, e.g. "0.5,3.0; 0.1,1.0".
    #[arg(long)]
    reference: String,
    /// Query set B, same format.
    #[arg(long)]
    query: String,
    /// Strategy to use instead of the configured default (brute-force or sorted).
    #[arg(long)]
    strategy: Option<RankStrategy>,
    /// Print the report as JSON.
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct CompareArgs {
    /// Reference set A, e.g. "0.5,3.0; 0.1,1.0".
    #[arg(long, conflicts_with = "random_reference")]
    reference: Option<String>,
    /// Query set B, same format.
    #[arg(long, conflicts_with = "random_query")]
    query: Option<String>,
    /// Size of a generated reference set.
    #[arg(long)]
    random_reference: Option<usize>,
    /// Size of a generated query set.
    #[arg(long)]
    random_query: Option<usize>,
    /// Seed for generated sets; random when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Snap generated y values to this step so ties occur.
    #[arg(long)]
    quantize: Option<f64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = EngineConfig::load_or_default(cli.config.as_deref())?;
    let runtime = build_runtime(config)?;
    match cli.command {
        Commands::Menu => {
            let mut console = Console::new(io::stdin().lock(), io::stdout().lock(), &runtime);
            console.run()
        }
        Commands::Rank(args) => handle_rank(&runtime, args),
        Commands::Compare(args) => handle_compare(&runtime, args),
        Commands::Example { strategy, json } => {
            let strategy = strategy.unwrap_or(runtime.config().default_strategy);
            let workbench = Workbench::new();
            let report = workbench.compute(&runtime, strategy)?;
            print_report(&workbench, &report, json)
        }
    }
}

fn build_runtime(config: EngineConfig) -> Result<RankRuntime> {
    let telemetry = RankTelemetry::builder("rangos")
        .logging_config(&config.logging)
        .build()
        .context("opening log sink")?;
    RankRuntime::builder()
        .config(config)
        .telemetry(telemetry)
        .build()
}

fn handle_rank(runtime: &RankRuntime, args: RankArgs) -> Result<()> {
    let reference = parse_point_list(&args.reference).context("parsing --reference")?;
    let query = parse_point_list(&args.query).context("parsing --query")?;
    let strategy = args.strategy.unwrap_or(runtime.config().default_strategy);
    let workbench = Workbench::with_sets(reference, query);
    let report = workbench.compute(runtime, strategy)?;
    print_report(&workbench, &report, args.json)
}

fn handle_compare(runtime: &RankRuntime, args: CompareArgs) -> Result<()> {
    let seed = args.seed.unwrap_or_else(random_seed);
    let reference = resolve_set(
        "reference",
        args.reference.as_deref(),
        args.random_reference,
        seed,
        args.quantize,
    )?;
    let query = resolve_set(
        "query",
        args.query.as_deref(),
        args.random_query,
        seed.wrapping_add(1),
        args.quantize,
    )?;
    let comparison = runtime.compare(&reference, &query)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "seed": seed,
            "reference": reference.len(),
            "query": query.len(),
            "agrees": comparison.agrees(),
            "first_mismatch": comparison.first_mismatch,
            "timings_ms": comparison.timings_ms,
        }))?
    );
    if let Some(index) = comparison.first_mismatch {
        if let Some(tel) = runtime.telemetry() {
            let _ = tel.log(
                LogLevel::Error,
                "rangos.compare.mismatch",
                json!({ "seed": seed, "index": index }),
            );
        }
        bail!(
            "strategies disagree at query index {index}: brute force {} vs sorted {}",
            comparison.brute_force[index],
            comparison.sorted[index]
        );
    }
    Ok(())
}

fn resolve_set(
    name: &str,
    text: Option<&str>,
    random_len: Option<usize>,
    seed: u64,
    quantize: Option<f64>,
) -> Result<PointSet> {
    if let Some(step) = quantize {
        ensure!(
            step.is_finite() && step > 0.0,
            "--quantize must be a positive finite number, got {step}"
        );
    }
    match (text, random_len) {
        (Some(text), _) => parse_point_list(text).with_context(|| format!("parsing --{name}")),
        (None, Some(len)) => {
            let mut generator = PointGenerator::new(seed);
            if let Some(step) = quantize {
                generator = generator.with_quantization(step);
            }
            Ok(generator.generate(len, RANDOM_RANGE))
        }
        (None, None) => bail!("provide --{name} or --random-{name}"),
    }
}

fn print_report(workbench: &Workbench, report: &RankReport, as_json: bool) -> Result<()> {
    let mut out = io::stdout().lock();
    if as_json {
        serde_json::to_writer_pretty(&mut out, report)?;
        writeln!(out)?;
    } else {
        write!(
            out,
            "{}\n{}",
            workbench.render_sets("Set A (reference)", "Set B (to rank)"),
            render_results(report)
        )?;
    }
    Ok(())
}
