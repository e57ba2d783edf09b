//! CLI argument parsing

use crate::config::ProjectConfig;
use crate::export::write_export;
use crate::logging::init_logging;
use anyhow::Context;
use clap::{Parser, Subcommand};
use routeforge_core::Api;
use std::path::PathBuf;
use tracing::info;

/// Serve, check or export a routeforge API
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding routeforge.json and .env
    #[arg(long, global = true, default_value = ".")]
    pub project_dir: PathBuf,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Serve the API (the default)
    Serve {
        /// Listen address, overriding the configuration
        #[arg(short, long)]
        address: Option<String>,
    },

    /// Write the API description as JSON
    Export {
        /// Output file, overriding the configured export path
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Validate the API definition and list its routes
    Check,
}

impl Cli {
    /// Execute the CLI command against `api`
    pub async fn execute(self, api: Api) -> anyhow::Result<()> {
        let config = ProjectConfig::load(&self.project_dir)
            .with_context(|| format!("loading configuration from {}", self.project_dir.display()))?;
        init_logging(&config.log);

        match self.command.unwrap_or(Command::Serve { address: None }) {
            Command::Serve { address } => {
                let address = address.unwrap_or(config.address);
                let app = api.build().await?;
                app.run(&address)
                    .await
                    .map_err(|err| anyhow::anyhow!("server error on {address}: {err}"))?;
            }
            Command::Export { out } => {
                let path = out.unwrap_or_else(|| self.project_dir.join(&config.export_path));
                write_export(&api, &path).await?;
            }
            Command::Check => {
                let app = api.build().await?;
                for route in app.routes() {
                    println!("{:<7} {}  ({})", route.method.as_str(), route.path, route.name);
                }
                info!(routes = app.routes().len(), "api definition is valid");
            }
        }
        Ok(())
    }
}
