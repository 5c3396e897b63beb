//! bundle-cache - Cache installed Ruby bundles in S3
//!
//! CLI entry point that dispatches to subcommands.

use bundle_cache::cli::{Cli, Commands};
use bundle_cache::config::{ConfigManager, Settings};
use bundle_cache::error::{exit_code, CacheError, CacheResult};
use bundle_cache::transport::{S3Store, Transport};
use clap::Parser;
use console::style;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Help and version go to stdout with success, usage errors to stderr
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            e.print().ok();
            let code = if e.use_stderr() {
                exit_code::WRONG_USAGE
            } else {
                exit_code::SUCCESS
            };
            return ExitCode::from(code);
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::from(exit_code::SUCCESS),
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli) -> CacheResult<()> {
    // Initialize logging: 0 = warn (spinners only), 1 = info, 2+ = debug
    let filter = match cli.verbose {
        0 => EnvFilter::new("bundle_cache=warn"),
        1 => EnvFilter::new("bundle_cache=info"),
        _ => EnvFilter::new("bundle_cache=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    debug!("Using config file {}", config_manager.path().display());
    let file = config_manager.load().await?;

    let cwd = std::env::current_dir()
        .map_err(|e| CacheError::io("getting current directory", e))?;
    let settings = Settings::resolve(cli.options.overrides(), file, &cwd)?;
    debug!(
        "Project {} (prefix {}, arch {})",
        settings.path.display(),
        settings.prefix,
        settings.arch
    );

    let transport = Transport::new(S3Store::new(settings.credentials()));

    match cli.command {
        Commands::Upload => bundle_cache::cli::commands::upload(&settings, &transport).await,
        Commands::Download => bundle_cache::cli::commands::download(&settings, &transport).await,
        Commands::Info(args) => bundle_cache::cli::commands::info(args, &settings).await,
    }
}
