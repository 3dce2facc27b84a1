//! Common types and utilities shared across fetch commands.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, ValueEnum};
use console::style;
use egms::address::{Channel, YearRange};
use egms::aggregate::aggregate;
use egms::batch::{BatchOrchestrator, BatchPlan, BatchResult};
use egms::config::ConfigFile;
use egms::identity::ArchiveEndpoint;
use indicatif::{ProgressBar, ProgressStyle};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Flags shared by `grid` and `orbit`.
#[derive(Debug, Clone, Args)]
pub struct FetchArgs {
    /// Processing run: 2018_2022, 2019_2023 or 2020_2024
    #[arg(long)]
    pub year: Option<YearRange>,

    /// Archive access token
    #[arg(long)]
    pub token: Option<String>,

    /// Minimum delay between requests in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Directory to write the result into
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Add failed_tiles.csv listing failed tiles to batch archives
    #[arg(long)]
    pub failure_manifest: bool,
}

impl FetchArgs {
    /// Year range: CLI, then config.
    pub fn year(&self, config: &ConfigFile) -> YearRange {
        self.year.unwrap_or(config.batch.year)
    }

    fn endpoint(&self, config: &ConfigFile) -> ArchiveEndpoint {
        match &self.token {
            Some(token) => ArchiveEndpoint::new(&config.api.base_url, token),
            None => config.endpoint(),
        }
    }

    fn pacing_delay(&self, config: &ConfigFile) -> Duration {
        self.delay_ms
            .map(Duration::from_millis)
            .unwrap_or_else(|| config.pacing_delay())
    }

    fn output_dir(&self, config: &ConfigFile) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| config.output.directory.clone())
    }

    fn failure_manifest(&self, config: &ConfigFile) -> bool {
        self.failure_manifest || config.batch.failure_manifest
    }
}

/// Displacement channel selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum ChannelChoice {
    /// East-west component
    E,
    /// Vertical component
    U,
    /// Both components
    Both,
}

impl ChannelChoice {
    pub fn channels(self) -> Vec<Channel> {
        match self {
            ChannelChoice::E => vec![Channel::East],
            ChannelChoice::U => vec![Channel::Up],
            ChannelChoice::Both => Channel::ALL.to_vec(),
        }
    }
}

/// Runs `plan`, packages the result and writes it to the output directory.
pub fn run_plan(runner: &CliRunner, plan: BatchPlan, args: &FetchArgs) -> Result<(), CliError> {
    let config = runner.config();
    let output_dir = args.output_dir(config);
    let delay = args.pacing_delay(config);

    println!(
        "Fetching {} tile(s) for {} ({} ms between requests)",
        plan.task_count(),
        plan.year(),
        delay.as_millis()
    );

    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_clone = Arc::clone(&cancel);
    ctrlc::set_handler(move || {
        eprintln!();
        eprintln!("Received interrupt, stopping after the current tile...");
        cancel_clone.store(true, Ordering::SeqCst);
    })
    .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    let orchestrator = BatchOrchestrator::new(runner.create_fetcher()?, args.endpoint(config), delay)
        .with_cancel_flag(cancel);

    let progress = progress_bar(plan.task_count());
    let result = orchestrator.run_plan(&plan, |completed, _, label| {
        progress.set_position(completed as u64);
        progress.set_message(label.to_string());
    });
    progress.finish_and_clear();

    print_summary(&result);

    let output = aggregate(result, &plan.output_request(args.failure_manifest(config)))?;
    let path = output
        .write_to_dir(&output_dir)
        .map_err(|source| CliError::Output {
            path: output_dir.join(&output.name),
            source,
        })?;

    println!("Saved {} ({})", path.display(), output.mime_type());
    Ok(())
}

fn progress_bar(total: usize) -> ProgressBar {
    let style = ProgressStyle::with_template(
        "  {spinner:.dim} [{elapsed_precise}] [{bar:30.bright.yellow/dim.white}] {pos:>4}/{len:4} {wide_msg:.dim}",
    )
    .map(|style| style.progress_chars("━━╾─"))
    .unwrap_or_else(|_| ProgressStyle::default_bar());

    let bar = ProgressBar::new(total as u64).with_style(style);
    bar.enable_steady_tick(Duration::from_millis(100));
    bar
}

fn print_summary(result: &BatchResult) {
    println!("{}", result.summary());
    for (label, reason) in result.failures() {
        println!("  {} {}: {}", style("✗").red(), label, style(reason).dim());
    }
    if result.cancelled() {
        println!(
            "{}",
            style(format!(
                "Cancelled after {} of {} tiles",
                result.attempted(),
                result.planned()
            ))
            .yellow()
        );
    }
}
