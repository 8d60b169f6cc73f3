//! Per-connection message handling
//!
//! Each connection gets three tasks: the reader (this function's loop), a
//! writer draining the outbound queue, and a query worker that answers
//! `ai_query` and `test_connection` one at a time in arrival order.
//! Acknowledgements and pings are handled directly by the reader so they
//! are never stuck behind a running query.

use std::sync::Arc;

use chrono::Utc;
use futures::{SinkExt, StreamExt};
use genonav_protocol::{
    AiResponse, ClientMessage, CodecError, ConversationTurn, Decoded, ModelConfig, ServerCodec,
    ServerMessage,
};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, error, info, warn};

use crate::channel::{CommandChannel, PendingRegistry};
use crate::llm::{ChatMessage, LlmError, ModelProvider};
use crate::navigation::NavigationOrchestrator;
use crate::query::QueryProcessor;
use crate::tools::ToolDispatcher;
use crate::SharedState;

/// Queries waiting behind the one being answered
const QUERY_QUEUE_DEPTH: usize = 16;

const MISSING_KEY_TEXT: &str =
    "Please set an API key in the model configuration, or use 'test-key' for testing.";

/// Work handed from the reader to the query worker
enum QueryJob {
    Ask {
        query: String,
        messages: Vec<ConversationTurn>,
        model_config: Option<ModelConfig>,
    },
    TestConnection {
        config: ModelConfig,
    },
}

/// Serve one client until it disconnects or the daemon shuts down
pub async fn handle_client<R, W>(reader: R, writer: W, state: SharedState)
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    serve_client(reader, writer, state).await;
}

/// Returns the connection's pending registry, closed and drained
async fn serve_client<R, W>(reader: R, writer: W, state: SharedState) -> Arc<PendingRegistry>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let max_frame = state.config.server.max_frame_bytes;
    let mut stream = FramedRead::new(reader, ServerCodec::with_max_frame(max_frame));
    let sink = FramedWrite::new(writer, ServerCodec::with_max_frame(max_frame));

    let (out_tx, out_rx) = mpsc::channel(state.config.channel.outbound_buffer);
    let writer_task = tokio::spawn(run_writer(sink, out_rx));

    let channel = CommandChannel::new(out_tx.clone(), &state.config.channel);
    let (job_tx, job_rx) = mpsc::channel(QUERY_QUEUE_DEPTH);
    let worker = tokio::spawn(run_query_worker(
        job_rx,
        out_tx.clone(),
        channel.clone(),
        state.clone(),
    ));

    let mut shutdown_rx = state.subscribe_shutdown();

    info!("Client connected");

    loop {
        tokio::select! {
            frame = stream.next() => {
                match frame {
                    Some(Ok(Decoded::Message(msg))) => {
                        if !route_message(msg, &out_tx, &job_tx, &channel).await {
                            break;
                        }
                    }
                    Some(Ok(Decoded::Malformed { error, frame })) => {
                        warn!(%error, len = frame.len(), "Malformed frame from client");
                        let reply = ServerMessage::error(format!("Invalid message: {}", error));
                        if out_tx.send(reply).await.is_err() {
                            break;
                        }
                    }
                    Some(Err(CodecError::FrameTooLarge { max })) => {
                        warn!(max, "Client frame too large, closing connection");
                        let _ = out_tx
                            .send(ServerMessage::error(format!(
                                "Frame too large (max {} bytes)",
                                max
                            )))
                            .await;
                        break;
                    }
                    Some(Err(e)) => {
                        error!("Failed to receive from client: {}", e);
                        break;
                    }
                    None => {
                        debug!("Client closed connection");
                        break;
                    }
                }
            }
            _ = shutdown_rx.recv() => {
                debug!("Shutdown signal received, closing client connection");
                break;
            }
        }
    }

    // Stop the worker first so nothing registers behind close()
    drop(job_tx);
    worker.abort();
    let _ = worker.await;

    // Pending commands die with the connection
    let cancelled = channel.close();
    let pending = Arc::clone(channel.pending());
    drop(channel);
    drop(out_tx);
    let _ = writer_task.await;

    info!(cancelled, "Client disconnected");
    pending
}

/// Returns `false` once the connection should close
async fn route_message(
    msg: ClientMessage,
    out_tx: &mpsc::Sender<ServerMessage>,
    job_tx: &mpsc::Sender<QueryJob>,
    channel: &CommandChannel,
) -> bool {
    let job = match msg {
        ClientMessage::NavigationResponse(ack) => {
            if !channel.acknowledge(&ack) {
                debug!(correlation_id = %ack.correlation_id, "Acknowledgement matched nothing");
            }
            return true;
        }
        ClientMessage::Ping => return out_tx.send(ServerMessage::Pong).await.is_ok(),
        ClientMessage::AiQuery {
            query,
            messages,
            ai_model_config,
        } => {
            debug!(query_len = query.len(), turns = messages.len(), "AI query received");
            QueryJob::Ask {
                query,
                messages,
                model_config: ai_model_config,
            }
        }
        ClientMessage::TestConnection { config } => QueryJob::TestConnection { config },
    };

    match job_tx.try_send(job) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            warn!("Query queue full, rejecting request");
            out_tx
                .send(ServerMessage::error(
                    "Too many queries in flight, try again shortly",
                ))
                .await
                .is_ok()
        }
        Err(TrySendError::Closed(_)) => false,
    }
}

async fn run_writer<W>(
    mut sink: FramedWrite<W, ServerCodec>,
    mut out_rx: mpsc::Receiver<ServerMessage>,
) where
    W: AsyncWrite + Unpin,
{
    while let Some(msg) = out_rx.recv().await {
        match sink.send(msg).await {
            Ok(()) => {}
            Err(CodecError::FrameTooLarge { max }) => {
                warn!(max, "Outbound message too large, dropped");
                let notice = ServerMessage::error("Response exceeded the maximum frame size");
                if sink.send(notice).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                error!("Failed to send to client: {}", e);
                break;
            }
        }
    }
}

async fn run_query_worker(
    mut job_rx: mpsc::Receiver<QueryJob>,
    out_tx: mpsc::Sender<ServerMessage>,
    channel: CommandChannel,
    state: SharedState,
) {
    let nav = &state.config.navigation;
    let orchestrator = NavigationOrchestrator::new(state.normalizer.clone(), state.genes.clone())
        .with_default_window(nav.default_window);
    let dispatcher = ToolDispatcher::new(orchestrator)
        .with_default_convention(nav.default_genome_format)
        .with_history_limit(nav.history_default_limit);
    let mut processor = QueryProcessor::new(dispatcher, channel);
    if let Some(prompt) = &state.config.llm.system_prompt {
        processor = processor.with_system_prompt(prompt.clone());
    }

    while let Some(job) = job_rx.recv().await {
        let reply = match job {
            QueryJob::Ask {
                query,
                messages,
                model_config,
            } => {
                let response = answer_query(
                    &mut processor,
                    state.models.as_ref(),
                    &query,
                    &messages,
                    model_config.as_ref(),
                )
                .await;
                ServerMessage::AiResponse {
                    response,
                    timestamp: Utc::now(),
                }
            }
            QueryJob::TestConnection { config } => {
                test_connection(state.models.as_ref(), &config).await
            }
        };

        if out_tx.send(reply).await.is_err() {
            break;
        }
    }
}

async fn answer_query(
    processor: &mut QueryProcessor,
    models: &dyn ModelProvider,
    query: &str,
    messages: &[ConversationTurn],
    model_config: Option<&ModelConfig>,
) -> AiResponse {
    let model = match models.resolve(model_config) {
        Ok(model) => model,
        Err(LlmError::MissingApiKey) => {
            warn!("Query rejected, no API key configured");
            return AiResponse {
                content: MISSING_KEY_TEXT.into(),
                error: Some(LlmError::MissingApiKey.to_string()),
                ..Default::default()
            };
        }
        Err(e) => {
            error!(error = %e, "Could not set up model");
            return AiResponse {
                content: format!("Error processing query: {}", e),
                error: Some(e.to_string()),
                ..Default::default()
            };
        }
    };

    processor.process(model.as_ref(), query, messages).await
}

async fn test_connection(models: &dyn ModelProvider, config: &ModelConfig) -> ServerMessage {
    let result = match models.resolve(Some(config)) {
        Ok(model) => model
            .invoke("", &[ChatMessage::user("hello")], &[])
            .await
            .map(|_| model.model_used()),
        Err(e) => Err(e),
    };

    match result {
        Ok(model_used) => {
            info!(model = %model_used, "Model connection test succeeded");
            ServerMessage::TestConnectionResult {
                success: true,
                message: format!("Connection succeeded ({})", model_used),
            }
        }
        Err(e) => {
            warn!(error = %e, "Model connection test failed");
            ServerMessage::TestConnectionResult {
                success: false,
                message: format!("Connection failed: {}", e),
            }
        }
    }
}
