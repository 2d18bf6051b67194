//! ADE resolver CLI
//!
//! Resolves the iCalendar feed URL of a timetable class from the command line.

use std::path::PathBuf;
use std::sync::Arc;

use ade_resolver::{
    config::{class_id_from_arg, load_config},
    error::Result,
    services::CalendarUrlService,
    storage::{KeyValueStore, LocalStorage},
};
use clap::{Parser, Subcommand};

/// ADE calendar feed URL resolver
#[derive(Parser, Debug)]
#[command(
    name = "ade-resolver",
    version,
    about = "Resolve ADE timetable iCalendar feed URLs"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Directory holding the URL cache and the log (overrides [storage].dir)
    #[arg(short, long)]
    storage_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve the feed URL of a class (numeric id or YEAR/GROUP)
    Resolve {
        class: String,

        /// Ignore the cached URL and regenerate
        #[arg(long)]
        force: bool,
    },

    /// List the configured groups
    Groups,

    /// Print the persisted diagnostic log
    Logs,

    /// Clear the persisted diagnostic log
    ClearLogs,

    /// Validate the configuration
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = load_config(&cli.config);
    if let Some(dir) = cli.storage_dir {
        config.storage.dir = dir;
    }

    if let Command::Validate = cli.command {
        log::info!("Validating configuration...");
        if let Err(e) = config.validate() {
            log::error!("Config validation failed: {}", e);
            return Err(e);
        }
        log::info!("Config OK ({} groups)", config.groups.len());
        return Ok(());
    }

    if let Command::Groups = cli.command {
        for entry in &config.groups {
            println!("{}/{}\t{}", entry.year, entry.group, entry.class_id);
        }
        return Ok(());
    }

    let config = Arc::new(config);
    let store: Arc<dyn KeyValueStore> = Arc::new(LocalStorage::new(&config.storage.dir));
    let service = CalendarUrlService::from_config(Arc::clone(&config), store)?;

    match cli.command {
        Command::Resolve { class, force } => {
            let class_id = class_id_from_arg(&config, &class)?;
            if !config.credentials.is_complete() {
                log::warn!("No credentials configured; only cached URLs can be served");
            }

            let result = if force {
                service.force_refresh(&class_id).await
            } else {
                service.resolve(&class_id).await
            };
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Command::Logs => {
            println!("{}", service.get_logs().await.trim_end());
        }

        Command::ClearLogs => {
            service.clear_logs().await;
            log::info!("Logs cleared");
        }

        Command::Groups | Command::Validate => {}
    }

    Ok(())
}
