//! `act` command: run one reservation action against the server.

use clap::Args;

use openspots_core::config::AppConfig;
use openspots_core::error::AppError;
use openspots_core::types::ReservationId;
use openspots_sync::{ActionKind, TriggerControl};

/// Arguments for `act`
#[derive(Debug, Args)]
pub struct ActArgs {
    /// accept, reject, check-in, no-show, or move-back
    pub action: ActionKind,
    /// Reservation id
    pub id: ReservationId,
    /// Endpoint to post to instead of the default route
    #[arg(long)]
    pub url: Option<String>,
}

/// Execute the act command
pub async fn execute(args: &ActArgs, config: &AppConfig) -> Result<(), AppError> {
    let session = super::create_session(config)?;

    let url = args
        .url
        .clone()
        .unwrap_or_else(|| args.action.fallback_url(&args.id));
    let control = TriggerControl::new(Some(args.id.clone()), Some(url));

    let snapshot = session.dispatch(args.action, &control).await?;
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}
