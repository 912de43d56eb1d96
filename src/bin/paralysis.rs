use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use log::{error, info};

use paralysis_pool::{run_simulation, QueueOrder, Result, SimulationConfig, SimulationReport};

#[derive(Parser)]
#[command(
    name = "paralysis",
    version,
    about = "Simulate paralysis battles on a worker pool and report the luckiest one"
)]
struct Cli {
    /// Number of battles to simulate
    #[arg(long, default_value_t = 1_000_000_000)]
    battles: u64,

    /// Worker threads in the pool
    #[arg(long, default_value_t = 100)]
    workers: usize,

    /// Seed the worker RNGs for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Pop the most recently submitted battle first
    #[arg(long)]
    lifo: bool,

    /// Jobs submitted before waiting for the pool to catch up
    #[arg(long, default_value_t = 1_000_000)]
    batch_size: u64,

    /// Progress bar refresh interval in milliseconds
    #[arg(long, default_value_t = 100, value_name = "MS")]
    progress_interval: u64,

    /// Do not draw the progress bar
    #[arg(long)]
    no_progress: bool,

    /// Print the full report as JSON instead of the summary line
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn config(&self) -> SimulationConfig {
        let order = if self.lifo {
            QueueOrder::Lifo
        } else {
            QueueOrder::Fifo
        };
        let config = SimulationConfig::new(self.battles, self.workers)
            .with_queue_order(order)
            .with_batch_size(self.batch_size)
            .with_progress(!self.no_progress)
            .with_progress_interval(Duration::from_millis(self.progress_interval));
        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }
}

fn main() -> ExitCode {
    env_logger::builder()
        .filter_level(log::LevelFilter::Warn)
        .target(env_logger::Target::Stderr)
        .parse_default_env()
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = cli.config();
    info!("paralysis {}", env!("CARGO_PKG_VERSION"));

    // Keep stdout clean for the JSON document
    let report = if cli.json {
        run_simulation(&config, std::io::stderr())?
    } else {
        run_simulation(&config, std::io::stdout())?
    };

    print_report(&report, cli.json)
}

fn print_report(report: &SimulationReport, json: bool) -> Result<()> {
    if json {
        let doc = serde_json::to_string_pretty(report)
            .map_err(|e| paralysis_pool::ThreadError::other(e.to_string()))?;
        println!("{}", doc);
    } else {
        println!("{}", report.summary_line());
    }
    info!(
        "{} battles on {} workers in {} ms",
        report.battles, report.workers, report.elapsed_ms
    );
    Ok(())
}
