use clap::Parser;
use std::process;
use tracing::{debug, error, info, warn};
use jupman::{
    cli::Cli,
    guard::{self, ACTIVE_ENV_VAR},
    host::HostFacts,
    notebook_config,
    secret::Credentials,
    Config, Context, JupyterManager, SystemRunner,
};

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt().with_env_filter(level).init();

    // Load configuration
    let config_path = cli.get_config_path();
    let config = match Config::load_or_default(&config_path) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load config from {:?}: {}", config_path, e);
            process::exit(1);
        }
    };
    debug!("Using configuration: {:?}", config);

    let active_environment = std::env::var(ACTIVE_ENV_VAR).ok();
    if let Err(e) =
        guard::check_active_environment(active_environment.as_deref(), &config.baseline_environment)
    {
        error!("{}", e);
        process::exit(1);
    }

    if cli.dry_run {
        info!("Dry run mode - no changes will be made");
    }

    // Children share the terminal's process group and receive the interrupt
    // themselves; their failure is reported once they exit.
    if let Err(e) = ctrlc::set_handler(|| {
        warn!("Interrupted, waiting for the running command to exit");
    }) {
        warn!("Failed to install interrupt handler: {}", e);
    }

    let jupyter_config_dir = config
        .jupyter_config_dir
        .clone()
        .unwrap_or_else(notebook_config::default_config_dir);
    let context = Context {
        active_environment,
        credentials: Credentials::from_env(),
        host: HostFacts::probe(),
        jupyter_config_dir,
    };

    let manager = JupyterManager::with_dry_run(config, SystemRunner::new(), cli.dry_run);
    if let Err(e) = manager.execute(&cli.command, &context) {
        error!("{} failed: {}", cli.command.name(), e);
        process::exit(e.exit_code());
    }
}
