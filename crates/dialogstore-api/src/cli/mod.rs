//! CLI command definitions for the `dialogstore` binary.
//!
//! Global flags override the config file; each override can also come from a
//! `DIALOGSTORE_*` environment variable.

pub mod migrate;
pub mod serve;
pub mod status;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use dialogstore_types::config::{AppConfig, Driver};

/// Store and answer chat dialogs.
#[derive(Parser)]
#[command(name = "dialogstore", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the TOML config file.
    #[arg(
        long,
        global = true,
        env = "DIALOGSTORE_CONFIG",
        default_value = "dialogstore.toml"
    )]
    pub config: PathBuf,

    /// Storage engine (sqlite or memory).
    #[arg(long, global = true, env = "DIALOGSTORE_DRIVER")]
    pub driver: Option<Driver>,

    /// Driver-specific data source, e.g. `sqlite://dialogs.db?mode=rwc`.
    #[arg(long, global = true, env = "DIALOGSTORE_DATABASE_URL")]
    pub database_url: Option<String>,

    /// Directory holding `{version}_{title}.up.sql` files.
    #[arg(long, global = true, env = "DIALOGSTORE_MIGRATIONS")]
    pub migrations: Option<PathBuf>,

    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export spans to stdout through OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Apply pending schema migrations and exit.
    Migrate,

    /// Show the schema version and whether the store answers.
    Status,

    /// Start the RPC server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, env = "DIALOGSTORE_PORT")]
        port: Option<u16>,

        /// Host to bind to.
        #[arg(long, env = "DIALOGSTORE_HOST")]
        host: Option<String>,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

impl Cli {
    /// Layer command-line and environment overrides on top of `config`.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(driver) = self.driver {
            config.database.driver = driver;
        }
        if let Some(url) = &self.database_url {
            config.database.data_source = url.clone();
        }
        if let Some(path) = &self.migrations {
            config.database.migrations_path = path.clone();
        }
        if let Commands::Serve { port, host } = &self.command {
            if let Some(port) = port {
                config.server.port = *port;
            }
            if let Some(host) = host {
                config.server.host = host.clone();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_replace_config_values() {
        let cli = Cli::try_parse_from([
            "dialogstore",
            "--driver",
            "memory",
            "--database-url",
            "sqlite://x.db",
            "serve",
            "--port",
            "7000",
        ])
        .unwrap();

        let mut config = AppConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(config.database.driver, Driver::Memory);
        assert_eq!(config.database.data_source, "sqlite://x.db");
        assert_eq!(config.server.port, 7000);
        assert_eq!(config.server.host, AppConfig::default().server.host);
    }

    #[test]
    fn test_no_overrides_keeps_config() {
        let cli = Cli::try_parse_from(["dialogstore", "migrate"]).unwrap();
        let mut config = AppConfig::default();
        config.database.data_source = "sqlite://from-file.db".to_string();

        cli.apply_overrides(&mut config);
        assert_eq!(config.database.data_source, "sqlite://from-file.db");
    }

    #[test]
    fn test_unknown_driver_is_rejected() {
        assert!(Cli::try_parse_from(["dialogstore", "--driver", "oracle", "status"]).is_err());
    }
}
