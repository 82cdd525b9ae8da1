use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::info;

use crate::handlers::{build, routes, Variant};
use crate::logging::init_logging;
use crate::router::Router;
use crate::runtime_config::{AppConfig, Overrides};
use crate::server::{AppService, HttpServer, ServerHandle};

#[derive(Parser)]
#[command(name = "schemaroute")]
#[command(about = "Schema-validated request router serving the demo route tables", long_about = None)]
pub struct Cli {
    /// Configuration file (YAML, TOML or JSON)
    #[arg(long, global = true, env = "SROUTE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve a route table over HTTP
    Serve {
        /// Address to bind, e.g. 0.0.0.0:8080 (port 0 picks a free port)
        #[arg(long)]
        addr: Option<String>,

        /// Route table to serve
        #[arg(long, value_enum)]
        variant: Option<Variant>,

        /// Default log level (trace, debug, info, warn, error)
        #[arg(long)]
        log_level: Option<String>,
    },
    /// Print the route table of a variant
    Routes {
        /// Route table to print
        #[arg(long, value_enum, default_value_t = Variant::Full)]
        variant: Variant,

        /// Output format
        #[arg(long, value_enum, default_value_t = RouteFormat::Text)]
        format: RouteFormat,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RouteFormat {
    /// `METHOD /path -> handler`, one route per line
    Text,
    Json,
    Yaml,
}

/// Render a variant's route table.
///
/// # Errors
///
/// If the table is invalid or cannot be serialized.
pub fn render_routes(variant: Variant, format: RouteFormat) -> Result<String> {
    let router = Router::from_routes(routes(variant))
        .with_context(|| format!("invalid route table for variant '{variant}'"))?;
    let rendered = match format {
        RouteFormat::Text => router.dump_routes().join("\n"),
        RouteFormat::Json => serde_json::to_string_pretty(router.routes())?,
        RouteFormat::Yaml => serde_yaml::to_string(router.routes())?,
    };
    Ok(rendered)
}

/// Run a parsed command line.
///
/// # Errors
///
/// If configuration, logging or the server fails to start.
pub fn run_cli(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Serve {
            addr,
            variant,
            log_level,
        } => {
            let overrides = Overrides {
                addr,
                variant,
                log_level,
            };
            let config = AppConfig::load(cli.config.as_deref(), &overrides)?;
            serve(&config)
        }
        Commands::Routes { variant, format } => {
            println!("{}", render_routes(variant, format)?);
            Ok(())
        }
    }
}

fn serve(config: &AppConfig) -> Result<()> {
    // held until exit so buffered log lines are flushed
    let _guard = init_logging(&config.logging)?;

    may::config().set_stack_size(config.server.stack_size);
    let variant = config.routes.variant;
    let (router, dispatcher) = build(variant, config.server.stack_size)?;

    let handle = HttpServer(AppService::new(router, dispatcher))
        .start(config.server.addr.as_str())
        .with_context(|| format!("failed to bind {}", config.server.addr))?;
    info!(
        addr = %handle.addr(),
        variant = %variant,
        stack_size = config.server.stack_size,
        "schemaroute started"
    );

    wait_for_shutdown(handle)
}

#[cfg(unix)]
fn wait_for_shutdown(handle: ServerHandle) -> Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals =
        Signals::new([SIGINT, SIGTERM]).context("failed to install signal handlers")?;
    if let Some(signal) = signals.forever().next() {
        info!(signal, "Shutdown signal received");
    }
    handle.stop();
    Ok(())
}

#[cfg(not(unix))]
fn wait_for_shutdown(handle: ServerHandle) -> Result<()> {
    handle
        .join()
        .map_err(|_| anyhow::anyhow!("server coroutine panicked"))
}
