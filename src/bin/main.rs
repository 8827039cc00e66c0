//! ksvm Command Line Interface
//!
//! Trains one-vs-rest SVMs on a text corpus and appends per-class evaluation
//! lines to a report file, or precomputes Gram matrices.

use clap::{Args, Parser, Subcommand};
use env_logger::Env;
use log::{error, info};
use ksvm::api::{append_report, CorpusEvaluation};
use ksvm::core::{Result, SVMError};
use ksvm::data::{Corpus, TfIdfVectorizer};
use ksvm::gram::GramMatrixCache;
use ksvm::kernel::{Kernel, KernelFunction};
use ksvm::svm::Variant;
use ksvm::RunConfig;
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "ksvm")]
#[command(about = "Hard- and soft-margin kernel SVMs for text classification")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "ksvm contributors")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Train one model per training class and evaluate it on the test corpus
    Evaluate(EvaluateArgs),
    /// Compute and persist the Gram matrix of the training corpus
    Gram(GramArgs),
}

#[derive(Args)]
struct ProblemArgs {
    /// Problem name; reads <data-dir>/<problem>-train.txt and -test.txt
    #[arg(short, long)]
    problem: String,

    /// Kernel: polynomial or gauss
    #[arg(short, long)]
    kernel: String,

    /// Kernel arguments: dimension and offset for polynomial, sigma for gauss
    #[arg(short = 'a', long, num_args = 1.., allow_negative_numbers = true)]
    kernel_args: Vec<f64>,

    /// Directory holding the corpora and the report files
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Directory for Gram matrix and solution files (defaults to the data directory)
    #[arg(long)]
    cache_dir: Option<PathBuf>,

    /// JSON run configuration
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl ProblemArgs {
    fn cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(|| self.data_dir.clone())
    }

    fn run_config(&self) -> Result<RunConfig> {
        match &self.config {
            Some(path) => {
                info!("Loading configuration from {path:?}");
                RunConfig::from_file(path)
            }
            None => Ok(RunConfig::default()),
        }
    }
}

#[derive(Args)]
struct EvaluateArgs {
    #[command(flatten)]
    problem: ProblemArgs,

    /// SVM variant: hard or soft
    #[arg(short = 't', long)]
    variant: String,

    /// Fixed nu for the soft margin (skips the nu search)
    #[arg(long)]
    nu: Option<f64>,

    /// Print the class reports as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct GramArgs {
    #[command(flatten)]
    problem: ProblemArgs,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };

    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    let result = match cli.command {
        Commands::Evaluate(args) => evaluate_command(args),
        Commands::Gram(args) => gram_command(args),
    };

    if let Err(e) = result {
        error!("Error: {e}");
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn evaluate_command(args: EvaluateArgs) -> Result<()> {
    let variant: Variant = args.variant.parse()?;
    let kernel = KernelFunction::from_name(&args.problem.kernel, &args.problem.kernel_args)?;
    let config = args.problem.run_config()?;
    let nu = args.nu.or(config.nu);

    info!(
        "Evaluating {} with the {variant} margin and kernel {}",
        args.problem.problem,
        kernel.name()
    );

    let mut evaluation = CorpusEvaluation::from_data_dir(
        &args.problem.data_dir,
        &args.problem.problem,
        kernel,
        variant,
        nu,
        config.trainer_config(args.problem.cache_dir()),
    )?;

    let report_path = args.problem.data_dir.join(evaluation.report_file_name());
    let mut reports = Vec::new();

    for class in evaluation.classes() {
        let report = evaluation.evaluate_class(&class)?;

        println!("=============={class}==============");
        println!("=============={}==============", report.started_at.to_rfc3339());
        println!("nu {}", report.nu);
        let m = &report.metrics;
        println!(
            "tp tn fp fn : {} {} {} {}",
            m.true_positives, m.true_negatives, m.false_positives, m.false_negatives
        );
        println!("Precision/recall: {} {}", m.precision(), m.recall());
        println!(
            "Accuracy: {} || F1: {}",
            m.accuracy() * 100.0,
            m.f1_score()
        );

        append_report(&report_path, &report)?;
        reports.push(report);
    }

    info!("Report appended to {report_path:?}");

    if args.json {
        let json = serde_json::to_string_pretty(&reports)
            .map_err(|e| SVMError::SerializationError(e.to_string()))?;
        println!("{json}");
    }

    Ok(())
}

fn gram_command(args: GramArgs) -> Result<()> {
    let args = args.problem;
    let kernel = KernelFunction::from_name(&args.kernel, &args.kernel_args)?;
    let config = args.run_config()?;

    let training =
        Corpus::from_file(args.data_dir.join(format!("{}-train.txt", args.problem)))?;
    let values = TfIdfVectorizer::fit(&training).vectorize(&training);

    let mut cache = GramMatrixCache::new(args.cache_dir(), config.memory_cache_capacity);
    let matrix = cache.get_or_compute(&args.problem, &kernel, &values)?;

    println!(
        "Gram matrix {}x{} at {}",
        matrix.size(),
        matrix.size(),
        cache.path_for(&args.problem, &kernel.name()).display()
    );

    Ok(())
}
