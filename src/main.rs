use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use xcpc_board::services::config_loader::{ScoreboardConfig, load_scoreboard_config};
use xcpc_board::services::contest_loader::FsContestSource;
use xcpc_board::{ScoreboardError, ScoreboardService, TeamFilter};

#[derive(Parser, Debug)]
#[command(name = "xcpc-board")]
#[command(about = "ICPC/CCPC style standings, statistics and submission listings")]
struct Args {
    /// TOML config file; defaults apply when it does not exist
    #[arg(short, long, env = "XCPC_BOARD_CONFIG", default_value = "board.toml")]
    config: PathBuf,

    /// Overrides `data_dir` from the config file
    #[arg(long)]
    data_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List known contests, most recent first
    Contests,

    /// Ranked standings
    Standings {
        contest_id: String,
        /// all, official, unofficial, girls, undergraduate, special or a group key
        #[arg(short, long, default_value = "all")]
        filter: String,
    },

    /// Submission statistics and heat map
    Stats {
        contest_id: String,
        #[arg(short, long, default_value = "all")]
        filter: String,
    },

    /// Paginated submission log, newest first
    Submissions {
        contest_id: String,
        #[arg(short, long, default_value = "all")]
        filter: String,
        #[arg(long, default_value = "1")]
        page: usize,
        #[arg(long)]
        page_size: Option<usize>,
    },

    /// Contest phase and clock relative to now
    Status { contest_id: String },
}

fn init_tracing(log_dir: &str) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    let _ = fs::create_dir_all(log_dir);
    let file_appender = tracing_appender::rolling::daily(log_dir, "xcpc-board.log");
    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
    let file_layer = tracing_subscriber::fmt::layer()
        .with_ansi(false)
        .with_writer(file_writer)
        .with_target(true);

    let init_result = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    if let Err(err) = init_result {
        eprintln!("tracing init failed: {err}");
        return None;
    }

    Some(file_guard)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render output")?;
    println!("{rendered}");
    Ok(())
}

fn run(command: Commands, service: &ScoreboardService<FsContestSource>) -> Result<()> {
    match command {
        Commands::Contests => print_json(&service.list_contests()?),
        Commands::Standings { contest_id, filter } => {
            print_json(&service.scoreboard(&contest_id, &TeamFilter::parse(&filter))?)
        }
        Commands::Stats { contest_id, filter } => {
            print_json(&service.statistics(&contest_id, &TeamFilter::parse(&filter))?)
        }
        Commands::Submissions {
            contest_id,
            filter,
            page,
            page_size,
        } => print_json(&service.submissions(
            &contest_id,
            &TeamFilter::parse(&filter),
            Some(page),
            page_size,
        )?),
        Commands::Status { contest_id } => {
            let now = chrono::Utc::now().timestamp();
            print_json(&service.time_info(&contest_id, now)?)
        }
    }
}

fn load_config(args: &Args) -> Result<ScoreboardConfig> {
    let mut config = load_scoreboard_config(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    if let Some(data_dir) = &args.data_dir {
        config.data_dir = data_dir.clone();
    }
    Ok(config)
}

fn main() -> ExitCode {
    let args = Args::parse();
    let config = match load_config(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err:#}");
            return ExitCode::FAILURE;
        }
    };

    let _log_guard = init_tracing(&config.log_dir);
    info!("Starting xcpc-board with data dir {}", config.data_dir);

    let service = ScoreboardService::new(FsContestSource::new(&config.data_dir), config);
    match run(args.command, &service) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            if let Some(ScoreboardError::NotFound(contest_id)) = err.downcast_ref::<ScoreboardError>() {
                eprintln!("not found: {contest_id}");
            } else {
                error!("Request failed: {err:#}");
                eprintln!("failed to build the requested view");
            }
            ExitCode::FAILURE
        }
    }
}
