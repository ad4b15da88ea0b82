mod app;
mod cli;
mod compiler;
mod files;
mod install;
mod model;
mod ui;
mod version;

use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use app::App;
use cli::Cli;
use model::config::AppConfig;
use model::layout::Layout;
use ui::Logger;

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging to file (never stdout)
    let _guard = match init_logging() {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("protob: logging disabled: {err}");
            None
        }
    };

    tracing::info!(command = ?cli.command, "protob starting");

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            if !app::already_reported(&err) {
                Logger::stderr().error(&format!("{err:#}"));
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let layout = Layout::from_home_dir()?;
    let config = AppConfig::load(&layout.config_file())?;
    App::new(config, layout).run(cli.command)
}

fn init_logging() -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let log_dir = directories::ProjectDirs::from("", "", "protob")
        .map(|d| d.data_dir().to_path_buf())
        .unwrap_or_else(|| std::env::temp_dir().join("protob"));
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "protob.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let filter = EnvFilter::try_from_env("PROTOB_LOG").unwrap_or_else(|_| EnvFilter::new("protob=info"));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_env_filter(filter)
        .init();

    Ok(guard)
}
