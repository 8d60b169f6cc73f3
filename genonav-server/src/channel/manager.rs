//! Correlated navigation command delivery for one connection

use std::sync::Arc;
use std::time::Duration;

use genonav_protocol::{
    DeliveryStatus, GenomicLocation, NavigationAck, NavigationAction, NavigationCommand,
    ServerMessage,
};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::SendTimeoutError;
use tracing::{debug, info, warn};

use crate::config::ChannelConfig;
use crate::tools::ToolInvocationResult;

use super::error::ChannelError;
use super::indicates_failure;
use super::pending::{CommandResolution, PendingRegistry};

/// Sends navigation commands and tracks their acknowledgements
///
/// Cheap to clone; clones share the outbound queue and pending registry.
#[derive(Clone)]
pub struct CommandChannel {
    outbound: mpsc::Sender<ServerMessage>,
    pending: Arc<PendingRegistry>,
    ack_timeout: Duration,
    wait_for_ack: bool,
}

impl CommandChannel {
    pub fn new(outbound: mpsc::Sender<ServerMessage>, config: &ChannelConfig) -> Self {
        Self {
            outbound,
            pending: Arc::new(PendingRegistry::new()),
            ack_timeout: Duration::from_millis(config.ack_timeout_ms),
            wait_for_ack: config.wait_for_ack,
        }
    }

    pub fn pending(&self) -> &Arc<PendingRegistry> {
        &self.pending
    }

    /// Emit the command for a tool result, if it produced one
    ///
    /// Returns `None` for tools that do not navigate. Results whose text
    /// reads as a failure are suppressed even when a location is present.
    pub async fn deliver(&self, result: &ToolInvocationResult) -> Option<DeliveryStatus> {
        let target = result.navigation.as_ref()?;

        if indicates_failure(&result.result_text) {
            info!(
                tool = %result.tool_name,
                "Navigation command suppressed, tool result reads as a failure"
            );
            return Some(DeliveryStatus::Suppressed);
        }

        let status = match self.send_command(target.action, target.location.clone()).await {
            Ok(status) => status,
            Err(e) => DeliveryStatus::Failed {
                reason: e.to_string(),
            },
        };
        Some(status)
    }

    /// Register and transmit one command
    ///
    /// With `wait_for_ack` set, resolves once the client acknowledges, the
    /// timeout fires or the connection closes. Otherwise returns as soon as
    /// the envelope is queued. Fails with `ConnectionClosed` after
    /// [`close`](Self::close).
    pub async fn send_command(
        &self,
        action: NavigationAction,
        location: GenomicLocation,
    ) -> Result<DeliveryStatus, ChannelError> {
        let command = NavigationCommand::new(action, location);
        let correlation_id = command.correlation_id;

        // registered before transmit so an immediate ack finds it
        let Some(waiter) = self.pending.register(&command) else {
            debug!(%correlation_id, "Channel closed, navigation command dropped");
            return Err(ChannelError::ConnectionClosed);
        };
        self.spawn_expiry(correlation_id);

        let sent = self
            .outbound
            .send_timeout(ServerMessage::Navigation(command), self.ack_timeout)
            .await;
        if let Err(e) = sent {
            self.pending.expire(&correlation_id);
            let err = match e {
                SendTimeoutError::Closed(_) => ChannelError::ConnectionClosed,
                SendTimeoutError::Timeout(_) => {
                    ChannelError::SendFailed("outbound queue is full".into())
                }
            };
            warn!(%correlation_id, error = %err, "Navigation command not delivered");
            return Err(err);
        }

        debug!(%correlation_id, "Navigation command sent");

        if !self.wait_for_ack {
            return Ok(DeliveryStatus::Sent { correlation_id });
        }

        let status = match waiter.await {
            Ok(CommandResolution::Acknowledged { status, message }) => {
                DeliveryStatus::Acknowledged {
                    correlation_id,
                    client_status: status,
                    message,
                }
            }
            Ok(CommandResolution::TimedOut) => DeliveryStatus::TimedOut { correlation_id },
            Ok(CommandResolution::Cancelled) | Err(_) => {
                DeliveryStatus::Cancelled { correlation_id }
            }
        };
        Ok(status)
    }

    /// Route a client acknowledgement to its pending command
    pub fn acknowledge(&self, ack: &NavigationAck) -> bool {
        let matched = self.pending.acknowledge(ack);
        if matched {
            info!(
                correlation_id = %ack.correlation_id,
                status = %ack.status,
                "Navigation acknowledged"
            );
        }
        matched
    }

    /// Cancel everything still pending and refuse further commands
    ///
    /// Called when the connection closes.
    pub fn close(&self) -> usize {
        let cancelled = self.pending.close();
        if cancelled > 0 {
            debug!(cancelled, "Pending navigation commands cancelled");
        }
        cancelled
    }

    fn spawn_expiry(&self, correlation_id: genonav_protocol::CorrelationId) {
        let pending = Arc::clone(&self.pending);
        let timeout = self.ack_timeout;
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            if pending.expire(&correlation_id) {
                warn!(%correlation_id, "Navigation command timed out");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::CommandState;
    use crate::tools::NavigationTarget;

    fn location() -> GenomicLocation {
        GenomicLocation {
            chromosome: "chr17".into(),
            chromosome_ucsc: "chr17".into(),
            chromosome_ensembl: "17".into(),
            start: 43044295,
            end: 43125483,
            gene_name: Some("BRCA1".into()),
        }
    }

    fn config(wait_for_ack: bool) -> ChannelConfig {
        ChannelConfig {
            ack_timeout_ms: 200,
            wait_for_ack,
            outbound_buffer: 8,
        }
    }

    fn result(text: &str, navigates: bool) -> ToolInvocationResult {
        ToolInvocationResult {
            tool_name: "navigate_by_gene".into(),
            arguments: serde_json::json!({"gene_name": "BRCA1"}),
            result_text: text.into(),
            navigation: navigates.then(|| NavigationTarget {
                action: NavigationAction::NavigateToGene,
                location: location(),
            }),
        }
    }

    fn sent_command(msg: ServerMessage) -> NavigationCommand {
        match msg {
            ServerMessage::Navigation(cmd) => cmd,
            other => panic!("expected navigation, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_deliver_sends_correlated_envelope() {
        let (tx, mut rx) = mpsc::channel(8);
        let channel = CommandChannel::new(tx, &config(false));

        let status = channel
            .deliver(&result("Successfully navigated to BRCA1 gene", true))
            .await
            .unwrap();

        let cmd = sent_command(rx.recv().await.unwrap());
        assert_eq!(cmd.action, NavigationAction::NavigateToGene);
        assert_eq!(cmd.payload, location());
        assert_eq!(
            status,
            DeliveryStatus::Sent {
                correlation_id: cmd.correlation_id
            }
        );
        assert_eq!(
            channel.pending().state(&cmd.correlation_id),
            Some(CommandState::Pending)
        );
    }

    #[tokio::test]
    async fn test_failure_text_suppresses_envelope() {
        let (tx, mut rx) = mpsc::channel(8);
        let channel = CommandChannel::new(tx, &config(false));

        let status = channel
            .deliver(&result("Gene navigation FAILED: odd", true))
            .await;
        assert_eq!(status, Some(DeliveryStatus::Suppressed));
        assert!(rx.try_recv().is_err());
        assert!(channel.pending().is_empty());
    }

    #[tokio::test]
    async fn test_non_navigation_result_sends_nothing() {
        let (tx, mut rx) = mpsc::channel(8);
        let channel = CommandChannel::new(tx, &config(false));

        assert_eq!(channel.deliver(&result("No navigation history available.", false)).await, None);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_correlation_ids_unique() {
        let (tx, mut rx) = mpsc::channel(8);
        let channel = CommandChannel::new(tx, &config(false));

        for _ in 0..3 {
            channel
                .send_command(NavigationAction::NavigateToLocation, location())
                .await
                .unwrap();
        }
        let mut ids = Vec::new();
        for _ in 0..3 {
            ids.push(sent_command(rx.recv().await.unwrap()).correlation_id);
        }
        ids.sort_by_key(|id| id.to_string());
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }

    #[tokio::test]
    async fn test_wait_for_ack_acknowledged() {
        let (tx, mut rx) = mpsc::channel(8);
        let channel = CommandChannel::new(tx, &config(true));

        let acker = channel.clone();
        let client = tokio::spawn(async move {
            let cmd = sent_command(rx.recv().await.unwrap());
            assert!(acker.acknowledge(&NavigationAck::new(cmd.correlation_id, "success")));
            cmd.correlation_id
        });

        let status = channel
            .send_command(NavigationAction::NavigateToLocation, location())
            .await
            .unwrap();
        let id = client.await.unwrap();
        assert_eq!(
            status,
            DeliveryStatus::Acknowledged {
                correlation_id: id,
                client_status: "success".into(),
                message: None,
            }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_for_ack_times_out_and_purges() {
        let (tx, mut rx) = mpsc::channel(8);
        let channel = CommandChannel::new(tx, &config(true));

        let status = channel
            .send_command(NavigationAction::NavigateToLocation, location())
            .await
            .unwrap();
        let cmd = sent_command(rx.recv().await.unwrap());

        assert_eq!(
            status,
            DeliveryStatus::TimedOut {
                correlation_id: cmd.correlation_id
            }
        );
        assert!(channel.pending().is_empty());

        // a late ack matches nothing
        assert!(!channel.acknowledge(&NavigationAck::new(cmd.correlation_id, "success")));
    }

    #[tokio::test]
    async fn test_close_cancels_waiters() {
        let (tx, mut rx) = mpsc::channel(8);
        let channel = CommandChannel::new(tx, &config(true));

        let closer = channel.clone();
        tokio::spawn(async move {
            rx.recv().await.unwrap();
            closer.close();
        });

        let status = channel
            .send_command(NavigationAction::NavigateToLocation, location())
            .await
            .unwrap();
        assert!(matches!(status, DeliveryStatus::Cancelled { .. }));
        assert!(channel.pending().is_empty());
    }

    #[tokio::test]
    async fn test_send_after_close_is_refused() {
        let (tx, mut rx) = mpsc::channel(8);
        let channel = CommandChannel::new(tx, &config(false));
        channel.close();

        let result = channel
            .send_command(NavigationAction::NavigateToLocation, location())
            .await;
        assert_eq!(result, Err(ChannelError::ConnectionClosed));
        assert!(rx.try_recv().is_err());
        assert!(channel.pending().is_empty());

        let status = channel
            .deliver(&self::result("Successfully navigated to BRCA1 gene", true))
            .await
            .unwrap();
        assert_eq!(
            status,
            DeliveryStatus::Failed {
                reason: "Connection closed".into()
            }
        );
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_closed_connection_is_delivery_failure() {
        let (tx, rx) = mpsc::channel(8);
        drop(rx);
        let channel = CommandChannel::new(tx, &config(false));

        let status = channel
            .deliver(&result("Successfully navigated to BRCA1 gene", true))
            .await
            .unwrap();
        assert_eq!(
            status,
            DeliveryStatus::Failed {
                reason: "Connection closed".into()
            }
        );
        assert!(channel.pending().is_empty());
    }
}
