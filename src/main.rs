//! qbench command-line interface
//!
//! ```bash
//! qbench cais/mmlu --sample-size 10
//! qbench MMMU/MMMU --layout multimodal --data-dir ./data -j 4
//! ```
//!
//! Ctrl+C stops scheduling new work; answers collected so far are still saved.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use qbench::{
    Adapter, BenchConfig, BenchRunner, ConfigLoader, DatasetProvider, FieldAdapter,
    HttpBackendFactory, HubDatasetProvider, LocalDatasetProvider, RunProgress,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Default configuration file name
const DEFAULT_CONFIG_FILE: &str = "qbench.toml";

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Layout {
    /// `question` + `choices`
    MultipleChoice,
    /// `question` + `options` + `image_1`..`image_7`
    Multimodal,
    /// `question` only
    OpenEnded,
}

#[derive(Parser)]
#[command(name = "qbench")]
#[command(about = "Ask a benchmark dataset to a language model and save the answers")]
#[command(version)]
struct Cli {
    /// Dataset name, e.g. cais/mmlu
    dataset: String,

    /// Label for the artifact (defaults to the configured text model)
    #[arg(long)]
    model: Option<String>,

    /// Items sampled per partition (all when omitted)
    #[arg(long, short = 'n')]
    sample_size: Option<usize>,

    /// Partitions processed at once
    #[arg(long, short = 'j')]
    concurrency: Option<usize>,

    /// Seed for reproducible sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Read datasets from this directory instead of the Hugging Face hub
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Record layout of the dataset
    #[arg(long, value_enum, default_value = "multiple-choice")]
    layout: Layout,

    /// Override the question field
    #[arg(long)]
    question_field: Option<String>,

    /// Use tes/tra/val in question ids
    #[arg(long)]
    short_splits: bool,

    /// Keep question text and choices in the artifact
    #[arg(long)]
    include_inputs: bool,

    /// Path to configuration file
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    config_file: PathBuf,

    /// Directory for result artifacts
    #[arg(long)]
    results_dir: Option<PathBuf>,
}

impl Cli {
    fn config(&self) -> Result<BenchConfig> {
        let mut config = ConfigLoader::new()
            .with_defaults()
            .with_file(&self.config_file)
            .with_env()
            .load()
            .context("loading configuration")?;

        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(dir) = &self.results_dir {
            config = config.with_results_dir(dir);
        }
        if self.short_splits {
            config = config.with_split_aliases(BenchConfig::short_split_aliases());
        }
        if self.include_inputs {
            config = config.with_inputs();
        }
        config.validate()?;
        Ok(config)
    }

    fn adapter(&self) -> Arc<dyn Adapter> {
        let adapter = FieldAdapter::new(self.question_field.as_deref().unwrap_or("question"));
        Arc::new(match self.layout {
            Layout::MultipleChoice => adapter.with_choices("choices"),
            Layout::Multimodal => adapter
                .with_choices("options")
                .with_images((1..=7).map(|i| format!("image_{}", i))),
            Layout::OpenEnded => adapter,
        })
    }

    fn provider(&self) -> Result<Arc<dyn DatasetProvider>> {
        Ok(match &self.data_dir {
            Some(dir) => Arc::new(LocalDatasetProvider::new(dir)),
            None => Arc::new(HubDatasetProvider::new()?),
        })
    }
}

fn progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(0);
    bar.set_style(
        ProgressStyle::with_template("{spinner} [{elapsed_precise}] {bar:30} {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    bar
}

#[tokio::main]
async fn main() -> Result<()> {
    // Set RUST_LOG=qbench=debug for verbose logging
    qbench::init_tracing();

    let cli = Cli::parse();
    let config = cli.config()?;
    let model = cli.model.clone().unwrap_or_else(|| config.text_model.clone());

    let factory = Arc::new(HttpBackendFactory::new(config.clone())?);
    let bar = progress_bar();
    let events = bar.clone();
    let runner = BenchRunner::new(config, cli.provider()?, factory)?.with_progress(move |event| {
        match event {
            RunProgress::PartitionStarted { partition, total, .. } => {
                events.set_length(total as u64);
                events.set_message(partition.to_string());
            }
            RunProgress::PartitionFinished { .. } => events.inc(1),
            RunProgress::PartitionSkipped { partition, reason } => {
                events.println(format!("skipped {}: {}", partition, reason));
                events.inc(1);
            }
        }
    });

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received; finishing in-flight items");
            on_interrupt.cancel();
        }
    });

    let report = runner
        .run_with_cancel(
            &cli.dataset,
            &model,
            cli.sample_size,
            cli.concurrency,
            cli.adapter(),
            cancel,
        )
        .await
        .with_context(|| format!("running {}", cli.dataset))?;
    bar.finish_and_clear();

    let summary = &report.summary;
    println!(
        "{} results ({} failed) from {}/{} partitions in {:.1}s{}",
        report.results_len,
        summary.items_failed,
        summary.partitions_attempted - summary.partitions_skipped,
        summary.partitions_attempted,
        summary.elapsed_secs,
        if summary.cancelled { ", cancelled" } else { "" }
    );
    println!("saved to {}", report.artifact_path.display());
    Ok(())
}
