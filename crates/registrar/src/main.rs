//! # Registrar CLI
//!
//! The command-line interface for the registrar course catalog service.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "registrar")]
#[command(version)]
#[command(about = "Course catalog web service", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// Enable JSON logging
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the catalog web server
    Serve {
        /// Host to bind to
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Path to the course catalog JSON file
        #[arg(long)]
        course_file: Option<PathBuf>,

        /// Path to the JSON event log file
        #[arg(long)]
        log_file: Option<PathBuf>,

        /// OTLP endpoint for trace export
        #[arg(long)]
        otlp_endpoint: Option<String>,
    },

    /// Show recent event log entries
    Logs {
        /// Number of entries to show, oldest first
        #[arg(short, long, default_value = "20")]
        tail: usize,

        /// Path to the JSON event log file
        #[arg(long)]
        log_file: Option<PathBuf>,
    },

    /// Display version and build info
    Version,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    // Load configuration for default values
    let cfg = config::Config::load();

    // Initialize logging
    let telemetry_config = registrar_telemetry::TelemetryConfig::new(&cfg.service_name)
        .with_log_level(&cli.log_level);

    let telemetry_config = if cli.json_logs {
        telemetry_config.with_json_logs()
    } else {
        telemetry_config
    };

    registrar_telemetry::init_logging(&telemetry_config);

    match cli.command {
        Commands::Serve {
            host,
            port,
            course_file,
            log_file,
            otlp_endpoint,
        } => {
            // Fall back to configuration when flags are not given
            let host = host.unwrap_or_else(|| cfg.host.clone());
            let port = port.unwrap_or(cfg.port);
            let course_file = course_file.unwrap_or_else(|| cfg.course_file.clone());
            let log_file = log_file.unwrap_or_else(|| cfg.log_file.clone());
            let otlp_endpoint = otlp_endpoint.or_else(|| cfg.otlp_endpoint.clone());

            let telemetry_config = match otlp_endpoint {
                Some(endpoint) => telemetry_config.with_otlp(endpoint),
                None => telemetry_config,
            };

            // Held for the process lifetime; flushes spans on shutdown.
            let _tracing_guard = registrar_telemetry::init_tracing(&telemetry_config)
                .map_err(|e| eyre!("failed to initialize tracing: {e}"))?;

            commands::serve(host, port, course_file, log_file).await?;
        }

        Commands::Logs { tail, log_file } => {
            let log_file = log_file.unwrap_or_else(|| cfg.log_file.clone());
            commands::logs(log_file, tail)?;
        }

        Commands::Version => {
            commands::version();
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                config::show_config();
            }
            ConfigAction::Path => {
                println!("{}", config::Config::config_path().display());
            }
        },
    }

    Ok(())
}
