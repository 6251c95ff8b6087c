use std::fs::File;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueHint};

use rill::evaluation::{
    ClassificationEvaluator, CurveFormat, PerformanceEvaluator, RegressionEvaluator,
};
use rill::learners::Learner;
use rill::learners::adaptive_tree::{
    AdaptiveHoeffdingTree, ExportFormat, TaskType, TreeConfig,
};
use rill::streams::{ExampleStream, LinearGenerator, SeaFunction, SeaGenerator};
use rill::tasks::PrequentialRunner;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Prequential evaluation of the adaptive Hoeffding tree"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run a prequential (test-then-train) evaluation
    Run(RunArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    /// Stream to consume: sea, sea-drift or linear
    #[arg(long, default_value = "sea", value_name = "STREAM")]
    stream: String,

    /// Label noise percentage for the SEA generator
    #[arg(long, default_value_t = 0, value_name = "PCT")]
    noise: u32,

    /// Concept switch point for sea-drift
    #[arg(long, default_value_t = 50_000, value_name = "N")]
    drift_after: usize,

    /// PRNG seed for generators
    #[arg(long, default_value_t = 1, value_name = "SEED")]
    seed: u64,

    /// Tree configuration file (JSON); defaults apply when omitted
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Stop after this many examples
    #[arg(long, default_value_t = 100_000, value_name = "N")]
    max_examples: u64,

    /// Stop after this many seconds (omit for unlimited)
    #[arg(long, value_name = "SECONDS")]
    max_seconds: Option<u64>,

    /// Emit metrics every N examples
    #[arg(long, default_value_t = 10_000, value_name = "N",
          value_parser = clap::value_parser!(u64).range(1..))]
    sample_frequency: u64,

    /// Probe memory every N examples
    #[arg(long, default_value_t = 10_000, value_name = "N",
          value_parser = clap::value_parser!(u64).range(1..))]
    mem_check_frequency: u64,

    /// Save the learning curve as CSV
    #[arg(long, value_name = "FILE", value_hint = ValueHint::FilePath)]
    curve: Option<PathBuf>,

    /// Export the final model: xml, json or dot
    #[arg(long, value_name = "FORMAT")]
    export: Option<String>,

    /// Where the exported model goes
    #[arg(long, default_value = "model.out", value_name = "FILE", value_hint = ValueHint::FilePath)]
    export_path: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run(args),
    }
}

fn run(args: RunArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => TreeConfig::from_path(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => TreeConfig::default(),
    };

    let stream: Box<dyn ExampleStream> = match args.stream.as_str() {
        "sea" => {
            config.task = TaskType::Classification;
            Box::new(
                SeaGenerator::new(SeaFunction::F2, false, args.noise, None, args.seed)
                    .context("failed to build SEA generator")?,
            )
        }
        "sea-drift" => {
            config.task = TaskType::Classification;
            Box::new(
                SeaGenerator::new(SeaFunction::F2, false, args.noise, None, args.seed)
                    .context("failed to build SEA generator")?
                    .with_drift(args.drift_after, SeaFunction::F4),
            )
        }
        "linear" => {
            config.task = TaskType::Regression;
            Box::new(
                LinearGenerator::new(3.0, 0.0, 0.1, (0.0, 10.0), None, args.seed)
                    .context("failed to build linear generator")?,
            )
        }
        other => bail!("unknown stream `{other}` (expected sea, sea-drift or linear)"),
    };

    let export = args
        .export
        .as_deref()
        .map(|raw| {
            ExportFormat::from_str(raw)
                .map_err(|_| anyhow::anyhow!("unknown export format `{raw}`"))
        })
        .transpose()?;

    let schema = stream.schema().clone();
    let tree = AdaptiveHoeffdingTree::new(schema.clone(), config.clone())
        .context("failed to build tree")?;
    let evaluator: Box<dyn PerformanceEvaluator> = match config.task {
        TaskType::Classification => Box::new(ClassificationEvaluator::new(schema.n_classes())),
        TaskType::Regression => Box::new(RegressionEvaluator::new()),
    };

    println!(
        "rill prequential run  stream={}  task={}  started={}",
        args.stream,
        config.task,
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    let mut runner = PrequentialRunner::new(
        Box::new(tree),
        stream,
        evaluator,
        Some(args.max_examples),
        args.max_seconds,
        args.sample_frequency,
        args.mem_check_frequency,
    )
    .context("failed to set up the prequential runner")?;

    runner.run().context("evaluation run failed")?;

    for snapshot in runner.curve().entries() {
        println!("{snapshot}");
    }

    if let Some(path) = &args.curve {
        runner
            .curve()
            .export(path, CurveFormat::Csv)
            .with_context(|| format!("failed to write curve to {}", path.display()))?;
        println!("learning curve written to {}", path.display());
    }

    if let Some(format) = export {
        let tree = runner
            .learner()
            .as_any()
            .downcast_ref::<AdaptiveHoeffdingTree>()
            .expect("the runner was built with an adaptive tree");
        let mut file = File::create(&args.export_path)
            .with_context(|| format!("failed to create {}", args.export_path.display()))?;
        tree.export(&mut file, format)
            .context("failed to export the model")?;
        println!("model written to {}", args.export_path.display());
    }

    Ok(())
}
