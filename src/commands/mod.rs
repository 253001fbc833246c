//! CLI command definitions and dispatch.

pub mod act;
pub mod watch;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use openspots_core::config::AppConfig;
use openspots_core::error::AppError;
use openspots_sync::{DashboardSession, HttpActionTransport};

/// OpenSpots venue dashboard synchronization client
#[derive(Debug, Parser)]
#[command(name = "openspots-dashboard", version, about, long_about = None)]
pub struct Cli {
    /// Configuration overlay (`config/{env}.toml`)
    #[arg(short, long, global = true, default_value = "development")]
    pub env: String,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Follow the venue's push feed and log table changes
    Watch(watch::WatchArgs),
    /// Trigger one reservation action
    Act(act::ActArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Watch(args) => watch::execute(args, &config).await,
            Commands::Act(args) => act::execute(args, &config).await,
        }
    }
}

/// Helper: build a session posting actions over HTTP
pub fn create_session(config: &AppConfig) -> Result<DashboardSession, AppError> {
    let transport = HttpActionTransport::new(config.server.clone())?;
    Ok(DashboardSession::new(&config.sync, Arc::new(transport)))
}
