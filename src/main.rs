//! Kolosal House Prices - Main Entry Point
//!
//! Downloads the Kaggle house price tables, cross-validates a linear model and
//! writes a submission file.

use clap::Parser;
use kolosal_house_prices::dataset::{DataHub, DatasetCache, DEFAULT_CACHE_DIR};
use kolosal_house_prices::optimizer::SearchSpace;
use kolosal_house_prices::pipeline::HousePricePipeline;
use kolosal_house_prices::training::TrainingConfig;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "kolosal-house")]
#[command(author = "KolosalAI")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "K-fold linear regression for the Kaggle house price data")]
#[command(long_about = None)]
struct Cli {
    /// Directory where downloaded datasets are cached
    #[arg(long, default_value = DEFAULT_CACHE_DIR)]
    cache_dir: PathBuf,

    /// Training configuration (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Submission output file
    #[arg(short, long, default_value = "submission.csv")]
    output: PathBuf,

    /// Grid search learning rate, weight decay and batch size first
    #[arg(long)]
    search: bool,

    /// Write the run report (JSON)
    #[arg(long)]
    report: Option<PathBuf>,

    /// Write the per-fold cross-validation curves (JSON)
    #[arg(long)]
    cv_report: Option<PathBuf>,

    /// Download attempts per dataset
    #[arg(long, default_value = "1")]
    max_attempts: usize,

    /// Download timeout in seconds
    #[arg(long, default_value = "60")]
    timeout: u64,
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kolosal_house_prices=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => TrainingConfig::from_json_file(path)?,
        None => TrainingConfig::default(),
    };

    let cache = DatasetCache::new(DataHub::kaggle_house(), &cli.cache_dir)
        .with_max_attempts(cli.max_attempts)
        .with_timeout(Duration::from_secs(cli.timeout));

    let mut pipeline = HousePricePipeline::new(cache, config);
    if cli.search {
        pipeline = pipeline.with_search(SearchSpace::default());
    }
    if let Some(path) = &cli.cv_report {
        pipeline = pipeline.with_cv_report(path);
    }

    let report = pipeline.run(&cli.output)?;

    println!(
        "{}-fold validation: avg train log rmse: {:.6}, avg valid log rmse: {:.6}",
        report.config.k, report.cv.mean_train_log_rmse, report.cv.mean_valid_log_rmse
    );
    if let Some(search) = &report.search {
        println!(
            "best of {} trials: lr {}, weight decay {}, batch size {}",
            search.trials.len(),
            search.best.params.learning_rate,
            search.best.params.weight_decay,
            search.best.params.batch_size
        );
    }
    println!("train log rmse: {:.6}", report.final_train_log_rmse);
    println!("submission written to {}", report.submission_path.display());

    if let Some(path) = &cli.report {
        report.to_json_file(path)?;
    }

    Ok(())
}
