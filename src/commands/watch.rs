//! `watch` command: follow the push feed until it closes or Ctrl+C.

use std::time::Duration;

use clap::Args;
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use openspots_core::config::AppConfig;
use openspots_core::error::AppError;
use openspots_core::types::TableKind;
use openspots_sync::table::TableChange;

/// Arguments for `watch`
#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Feed URL; defaults to the configured venue's notification feed
    #[arg(long)]
    pub url: Option<String>,
    /// Seconds between suppression cleanups
    #[arg(long, default_value_t = 30)]
    pub maintenance_interval: u64,
}

/// Execute the watch command
pub async fn execute(args: &WatchArgs, config: &AppConfig) -> Result<(), AppError> {
    if args.url.is_none() && config.server.venue_id.is_empty() {
        return Err(AppError::configuration(
            "server.venue_id is required to follow the notification feed",
        ));
    }
    let url = args
        .url
        .clone()
        .unwrap_or_else(|| config.server.feed_url());

    let session = super::create_session(config)?;

    for kind in TableKind::ALL {
        let mut rx = session.reconciler.subscribe(kind);
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(change) => log_change(&change),
                    Err(RecvError::Lagged(n)) => {
                        warn!(table = %kind, skipped = n, "Table change log lagging")
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }

    let mut badge = session.notifications.subscribe();
    tokio::spawn(async move {
        while badge.changed().await.is_ok() {
            let state = *badge.borrow();
            info!(count = state.count, visible = state.visible, "Notification badge");
        }
    });

    let maintenance =
        session.spawn_maintenance(Duration::from_secs(args.maintenance_interval.max(1)));
    let feed = session.feed_client(url);
    info!(url = %feed.url(), "Following notification feed");

    let result = tokio::select! {
        res = feed.run() => res,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted");
            Ok(())
        }
    };

    session.shutdown();
    let _ = maintenance.await;
    result
}

fn log_change(change: &TableChange) {
    match change {
        TableChange::Inserted { table, row } => info!(
            table = %table,
            reservation_id = %row.id,
            customer = %row.customer,
            date = %row.date_display,
            time = %row.time_display,
            status = %row.badge.label,
            "Row rendered"
        ),
        TableChange::Removed { table, id } => {
            info!(table = %table, reservation_id = %id, "Row removed")
        }
        TableChange::HighlightCleared { table, id } => {
            info!(table = %table, reservation_id = %id, "Row highlight cleared")
        }
    }
}
