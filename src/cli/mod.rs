//! # CLI Module
//!
//! Command-line entry points of the `schemaroute` binary.
//!
//! ## Commands
//!
//! ### `serve`
//!
//! Serve a route table over HTTP until SIGINT or SIGTERM:
//!
//! ```bash
//! schemaroute serve --variant basics --addr 0.0.0.0:8080
//! ```
//!
//! Options:
//! - `--addr <ADDR>` - Bind address (default from config, `127.0.0.1:8000`)
//! - `--variant <VARIANT>` - `full`, `basics` or `exercises`
//! - `--log-level <LEVEL>` - Default log level; `RUST_LOG` still wins
//! - `--config <FILE>` - Configuration file, see [`crate::runtime_config`]
//!
//! ### `routes`
//!
//! Print a route table without starting anything:
//!
//! ```bash
//! schemaroute routes --variant exercises --format yaml
//! ```
//!
//! ## Usage from Code
//!
//! ```rust,ignore
//! use schemaroute::cli::{run_cli, Cli};
//! use clap::Parser;
//!
//! run_cli(Cli::parse())?;
//! ```

mod commands;


pub use commands::{render_routes, run_cli, Cli, Commands, RouteFormat};
