//! One natural-language query, end to end
//!
//! The first model round sees the declared tools. If it asks for tool
//! calls they run in order, each successful navigation is sent to the
//! browser, and a second round turns the tool results into the answer.

use chrono::Utc;
use genonav_protocol::{AiResponse, ConversationTurn, TurnRole};
use tracing::{debug, error, info, warn};

use crate::channel::CommandChannel;
use crate::llm::{ChatMessage, LanguageModel};
use crate::tools::{get_tool_definitions, Tool, ToolDispatcher, ToolInvocationResult};

/// Built-in system prompt
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a genomics assistant connected to a genome \
browser. Answer questions about genes, variants and genomic concepts clearly and accurately.

When the user wants to look at a region, use the navigation tools instead of describing \
coordinates:
- navigate_by_coordinate: jump to a chromosome and position range
- navigate_by_gene: jump to a gene by its symbol
- get_navigation_history: list recently viewed locations

After a navigation, tell the user where the browser now points.";

/// Runs queries for one connection
pub struct QueryProcessor {
    dispatcher: ToolDispatcher,
    channel: CommandChannel,
    system_prompt: String,
    tools: Vec<Tool>,
}

impl QueryProcessor {
    pub fn new(dispatcher: ToolDispatcher, channel: CommandChannel) -> Self {
        Self {
            dispatcher,
            channel,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            tools: get_tool_definitions(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn dispatcher(&self) -> &ToolDispatcher {
        &self.dispatcher
    }

    /// Answer `query` given the prior turns of the conversation
    ///
    /// Never fails: model errors are reported in the response's `error`.
    pub async fn process(
        &mut self,
        model: &dyn LanguageModel,
        query: &str,
        history: &[ConversationTurn],
    ) -> AiResponse {
        let mut response = AiResponse {
            model_used: model.model_used(),
            test_mode: model.is_test_mode(),
            ..Default::default()
        };

        let mut conversation: Vec<ChatMessage> = history
            .iter()
            .map(|turn| match turn.role {
                TurnRole::User => ChatMessage::user(turn.content.clone()),
                TurnRole::Assistant => ChatMessage::assistant(turn.content.clone()),
            })
            .collect();
        conversation.push(ChatMessage::user(query));

        let started = Utc::now();
        let first = match model
            .invoke(&self.system_prompt, &conversation, &self.tools)
            .await
        {
            Ok(reply) => reply,
            Err(e) => {
                error!(error = %e, "Model call failed");
                response.content = format!("Error processing query: {}", e);
                response.error = Some(e.to_string());
                return response;
            }
        };

        if first.tool_calls.is_empty() {
            response.content = first.text;
            return response;
        }

        let calls: Vec<_> = first
            .tool_calls
            .into_iter()
            .enumerate()
            .map(|(i, call)| match call.id {
                Some(_) => call,
                None => call.with_id(format!("call_{}", i)),
            })
            .collect();
        info!(count = calls.len(), "Executing tool calls");

        let mut results = Vec::with_capacity(calls.len());
        for call in &calls {
            let result = self.dispatcher.dispatch(call);
            let delivery = self.channel.deliver(&result).await;
            response.tool_results.push(result.to_entry(delivery));
            results.push(result);
        }

        conversation.push(ChatMessage::assistant_with_calls(first.text, calls.clone()));
        for (call, result) in calls.iter().zip(&results) {
            conversation.push(ChatMessage::tool_result(
                call.id.clone().unwrap_or_default(),
                result.result_text.clone(),
            ));
        }

        match model
            .invoke(&self.system_prompt, &conversation, &self.tools)
            .await
        {
            Ok(reply) => {
                if !reply.tool_calls.is_empty() {
                    debug!(
                        count = reply.tool_calls.len(),
                        "Ignoring tool calls requested in the final round"
                    );
                }
                response.content = if reply.text.trim().is_empty() {
                    summarize(&results)
                } else {
                    reply.text
                };
            }
            Err(e) => {
                warn!(error = %e, "Final model round failed, answering with tool results");
                response.content = summarize(&results);
                response.error = Some(e.to_string());
            }
        }

        debug!(
            elapsed_ms = (Utc::now() - started).num_milliseconds(),
            "Query processed"
        );
        response
    }
}

fn summarize(results: &[ToolInvocationResult]) -> String {
    results
        .iter()
        .map(|r| r.result_text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use genonav_protocol::{DeliveryStatus, ServerMessage};
    use serde_json::json;
    use tokio::sync::mpsc;

    use super::*;
    use crate::config::ChannelConfig;
    use crate::genome::{LocusNormalizer, StaticGeneTable};
    use crate::llm::{ChatRole, LlmError, ModelReply};
    use crate::navigation::NavigationOrchestrator;
    use crate::tools::ToolInvocationRequest;

    /// Replays queued replies and records every conversation it saw
    struct ScriptedModel {
        replies: Mutex<VecDeque<Result<ModelReply, LlmError>>>,
        seen: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl ScriptedModel {
        fn new(replies: Vec<Result<ModelReply, LlmError>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl LanguageModel for ScriptedModel {
        fn model_used(&self) -> String {
            "scripted".into()
        }

        async fn invoke(
            &self,
            _system_prompt: &str,
            conversation: &[ChatMessage],
            _tools: &[Tool],
        ) -> Result<ModelReply, LlmError> {
            self.seen.lock().unwrap().push(conversation.to_vec());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(ModelReply::text("done")))
        }
    }

    fn processor() -> (QueryProcessor, mpsc::Receiver<ServerMessage>) {
        let (tx, rx) = mpsc::channel(16);
        let channel = CommandChannel::new(
            tx,
            &ChannelConfig {
                ack_timeout_ms: 1_000,
                wait_for_ack: false,
                outbound_buffer: 16,
            },
        );
        let dispatcher = ToolDispatcher::new(NavigationOrchestrator::new(
            Arc::new(LocusNormalizer::human()),
            Arc::new(StaticGeneTable::seeded()),
        ));
        (QueryProcessor::new(dispatcher, channel), rx)
    }

    #[tokio::test]
    async fn test_plain_text_reply() {
        let (mut p, mut rx) = processor();
        let model = ScriptedModel::new(vec![Ok(ModelReply::text("BRCA1 is a tumour suppressor."))]);

        let response = p.process(&model, "what is BRCA1?", &[]).await;
        assert_eq!(response.content, "BRCA1 is a tumour suppressor.");
        assert_eq!(response.model_used, "scripted");
        assert!(response.tool_results.is_empty());
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_two_round_flow_sends_commands() {
        let (mut p, mut rx) = processor();
        let model = ScriptedModel::new(vec![
            Ok(ModelReply::tool_calls(vec![
                ToolInvocationRequest::new("navigate_by_gene", json!({"gene_name": "BRCA1"}))
                    .with_id("a"),
                ToolInvocationRequest::new("navigate_by_gene", json!({"gene_name": "FAKEGENE"})),
            ])),
            Ok(ModelReply::text("The browser now shows BRCA1.")),
        ]);

        let history = [
            ConversationTurn::user("hi"),
            ConversationTurn::assistant("hello"),
        ];
        let response = p.process(&model, "show BRCA1 and FAKEGENE", &history).await;

        assert_eq!(response.content, "The browser now shows BRCA1.");
        assert_eq!(response.tool_results.len(), 2);
        assert!(matches!(
            response.tool_results[0].delivery,
            Some(DeliveryStatus::Sent { .. })
        ));
        assert_eq!(response.tool_results[1].delivery, None);
        assert!(response.tool_results[1].result.contains("Gene not found"));

        // exactly one envelope, for the successful call
        let cmd = match rx.recv().await.unwrap() {
            ServerMessage::Navigation(cmd) => cmd,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(cmd.payload.gene_name.as_deref(), Some("BRCA1"));
        assert!(rx.try_recv().is_err());

        let seen = model.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].len(), 3);
        let second = &seen[1];
        assert_eq!(second[3].role, ChatRole::Assistant);
        assert_eq!(second[3].tool_calls[1].id.as_deref(), Some("call_1"));
        assert_eq!(second[4].tool_call_id.as_deref(), Some("a"));
        assert_eq!(second[5].role, ChatRole::Tool);
        assert_eq!(second[5].tool_call_id.as_deref(), Some("call_1"));
    }

    #[tokio::test]
    async fn test_first_round_error() {
        let (mut p, _rx) = processor();
        let model = ScriptedModel::new(vec![Err(LlmError::request_failed("openai", 401, "bad key"))]);

        let response = p.process(&model, "hi", &[]).await;
        assert!(response.content.starts_with("Error processing query:"));
        assert!(response.error.unwrap().contains("bad key"));
    }

    #[tokio::test]
    async fn test_second_round_error_falls_back_to_tool_text() {
        let (mut p, _rx) = processor();
        let model = ScriptedModel::new(vec![
            Ok(ModelReply::tool_calls(vec![ToolInvocationRequest::new(
                "get_navigation_history",
                json!({}),
            )])),
            Err(LlmError::invalid_response("openai", "empty")),
        ]);

        let response = p.process(&model, "history?", &[]).await;
        assert_eq!(response.content, "No navigation history available.");
        assert!(response.error.is_some());
        assert_eq!(response.tool_results.len(), 1);
    }

    #[tokio::test]
    async fn test_history_persists_across_queries() {
        let (mut p, _rx) = processor();
        let model = ScriptedModel::new(vec![
            Ok(ModelReply::tool_calls(vec![ToolInvocationRequest::new(
                "navigate_by_coordinate",
                json!({"chromosome": "chr1", "start": 1000000, "end": 2000000}),
            )])),
            Ok(ModelReply::text("")),
        ]);

        let response = p.process(&model, "go to chr1", &[]).await;
        assert!(response
            .content
            .starts_with("Successfully navigated to chr1:1000000-2000000."));
        assert_eq!(p.dispatcher().orchestrator().history_len(), 1);
    }
}
