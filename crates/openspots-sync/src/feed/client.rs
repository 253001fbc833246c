//! WebSocket client for the venue notification feed.
//!
//! One connection per dashboard. The feed does not reconnect: once the
//! socket closes or fails the state stays terminal until the process is
//! restarted.

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::watch;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, error, info, trace, warn};

use openspots_core::error::ErrorKind;
use openspots_core::{AppError, AppResult};

use super::processor::FeedProcessor;
use super::state::FeedState;

#[derive(Debug)]
pub struct RealtimeFeedClient {
    /// `ws(s)://host/ws/notifications/{venue_id}/`
    url: String,
    processor: Arc<FeedProcessor>,
    state: watch::Sender<FeedState>,
}

impl RealtimeFeedClient {
    pub fn new(url: impl Into<String>, processor: Arc<FeedProcessor>) -> Self {
        let (state, _) = watch::channel(FeedState::Connecting);
        Self {
            url: url.into(),
            processor,
            state,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> FeedState {
        *self.state.borrow()
    }

    /// Watch connection state changes.
    pub fn subscribe_state(&self) -> watch::Receiver<FeedState> {
        self.state.subscribe()
    }

    /// Connect and process frames until the server closes the socket.
    ///
    /// A clean close returns `Ok(())`. Connection and transport failures
    /// return a `Realtime` error. Malformed frames are dropped without
    /// closing the connection.
    pub async fn run(&self) -> AppResult<()> {
        if self.state().is_terminal() {
            return Err(AppError::realtime("Feed already terminated"));
        }
        self.set_state(FeedState::Connecting);

        let (mut socket, _) = match connect_async(self.url.as_str()).await {
            Ok(conn) => conn,
            Err(e) => {
                error!(url = %self.url, error = %e, "WS connection failed");
                self.set_state(FeedState::Errored);
                return Err(AppError::with_source(
                    ErrorKind::Realtime,
                    format!("Failed to connect to {}", self.url),
                    e,
                ));
            }
        };
        self.set_state(FeedState::Open);
        info!(url = %self.url, "WS connected");

        while let Some(frame) = socket.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    let outcome = self.processor.handle_text(text.as_str());
                    trace!(?outcome, "Processed push message");
                }
                Ok(Message::Binary(bytes)) => match std::str::from_utf8(&bytes) {
                    Ok(text) => {
                        self.processor.handle_text(text);
                    }
                    Err(e) => warn!(error = %e, "Dropping non-UTF-8 binary frame"),
                },
                // tungstenite queues the pong itself and flushes it on the next read.
                Ok(Message::Ping(_)) => trace!("WS ping"),
                Ok(Message::Pong(_)) | Ok(Message::Frame(_)) => {}
                Ok(Message::Close(close)) => {
                    info!(url = %self.url, frame = ?close, "WS closed");
                    self.set_state(FeedState::Closed);
                    return Ok(());
                }
                Err(e) => {
                    error!(url = %self.url, error = %e, "WS error");
                    self.set_state(FeedState::Errored);
                    return Err(AppError::with_source(
                        ErrorKind::Realtime,
                        "Push feed connection failed",
                        e,
                    ));
                }
            }
        }

        debug!(url = %self.url, "WS stream ended");
        self.set_state(FeedState::Closed);
        Ok(())
    }

    fn set_state(&self, state: FeedState) {
        self.state.send_replace(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::freshness::FreshnessTracker;
    use crate::notification::NotificationCenter;
    use crate::suppression::SuppressionRegistry;
    use crate::table::{RoutingPolicy, RowReconciler};
    use futures::SinkExt;
    use openspots_core::traits::ManualClock;
    use openspots_core::types::{ReservationId, ReservationStatus, TableKind};
    use tokio::net::TcpListener;

    fn client(url: &str) -> (Arc<RowReconciler>, RealtimeFeedClient) {
        let clock = Arc::new(ManualClock::new(0));
        let suppression = Arc::new(SuppressionRegistry::new(clock.clone()));
        let reconciler = Arc::new(RowReconciler::new(RoutingPolicy::default(), 2000, 16, clock));
        let processor = FeedProcessor::new(
            suppression.clone(),
            Arc::new(FreshnessTracker::new(suppression)),
            reconciler.clone(),
            Arc::new(NotificationCenter::new()),
            vec![ReservationStatus::Pending],
        );
        (reconciler, RealtimeFeedClient::new(url, Arc::new(processor)))
    }

    #[tokio::test]
    async fn test_processes_frames_until_close() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            ws.send(Message::text("{broken")).await.unwrap();
            ws.send(Message::text(
                r#"[{"event":"created","reservation":{"id":21,"status":"pending"}}]"#,
            ))
            .await
            .unwrap();
            ws.close(None).await.unwrap();
        });

        let (reconciler, feed) = client(&format!("ws://{addr}/ws/notifications/1/"));
        feed.run().await.unwrap();
        server.await.unwrap();

        assert_eq!(feed.state(), FeedState::Closed);
        assert_eq!(
            reconciler.locate(&ReservationId::from(21)),
            Some(TableKind::Upcoming)
        );
    }

    #[tokio::test]
    async fn test_connect_failure_is_terminal() {
        // Port 9 (discard) on loopback refuses connections.
        let (_, feed) = client("ws://127.0.0.1:9/ws/notifications/1/");
        assert_eq!(feed.state(), FeedState::Connecting);

        let err = feed.run().await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Realtime);
        assert_eq!(feed.state(), FeedState::Errored);

        // No reconnect.
        assert!(feed.run().await.is_err());
        assert_eq!(feed.state(), FeedState::Errored);
    }

    #[tokio::test]
    async fn test_invalid_url_errors() {
        let (_, feed) = client("not a url");
        assert!(feed.run().await.is_err());
        assert!(feed.state().is_terminal());
    }
}
