use std::process::ExitCode;

use cardos::{App, CardStore, Cli, Config};
use clap::Parser;
use log::{debug, error, info};

pub fn initialize_logger(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp_secs()
        .format_module_path(true)
        .init();

    debug!("Logger initialized");
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    initialize_logger(cli.verbose);

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(&config_path);
    if let Some(data_dir) = cli.data_dir.clone() {
        config.data_dir = data_dir;
    }
    info!("Using data directory {}", config.data_dir.display());

    let store = CardStore::new(config.data_dir.clone());
    let mut app = App::new(store, config, config_path, cli.verbose);

    match app.run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
