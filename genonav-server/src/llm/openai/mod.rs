//! OpenAI-compatible chat model with function calling

mod client;
mod types;

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::tools::{Tool, ToolInvocationRequest};

use super::{ChatMessage, ChatRole, LanguageModel, LlmError, ModelReply};
pub use client::OpenAiClient;
use types::{
    ChatCompletionRequest, ChatCompletionResponse, WireFunction, WireFunctionCall, WireMessage,
    WireTool, WireToolCall,
};

/// Chat-completions model reached over HTTP
#[derive(Debug)]
pub struct OpenAiChatModel {
    client: OpenAiClient,
    model_name: String,
    temperature: f32,
}

impl OpenAiChatModel {
    pub fn new(
        base_url: &str,
        api_key: &str,
        model_name: &str,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        Ok(Self {
            client: OpenAiClient::new(base_url, api_key, timeout)?,
            model_name: model_name.to_string(),
            temperature,
        })
    }

    fn build_request(
        &self,
        system_prompt: &str,
        conversation: &[ChatMessage],
        tools: &[Tool],
    ) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(conversation.len() + 1);
        if !system_prompt.is_empty() {
            messages.push(WireMessage {
                role: "system".into(),
                content: Some(system_prompt.to_string()),
                tool_calls: None,
                tool_call_id: None,
            });
        }
        messages.extend(conversation.iter().map(to_wire_message));

        ChatCompletionRequest {
            model: self.model_name.clone(),
            messages,
            tools: tools.iter().map(to_wire_tool).collect(),
            temperature: Some(self.temperature),
        }
    }
}

#[async_trait]
impl LanguageModel for OpenAiChatModel {
    fn model_used(&self) -> String {
        self.model_name.clone()
    }

    async fn invoke(
        &self,
        system_prompt: &str,
        conversation: &[ChatMessage],
        tools: &[Tool],
    ) -> Result<ModelReply, LlmError> {
        let request = self.build_request(system_prompt, conversation, tools);
        let response: ChatCompletionResponse =
            self.client.request("chat/completions", &request).await?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::invalid_response("openai", "response has no choices"))?;
        debug!(finish_reason = ?choice.finish_reason, "Model replied");

        Ok(from_wire_message(choice.message))
    }
}

fn role_name(role: ChatRole) -> &'static str {
    match role {
        ChatRole::User => "user",
        ChatRole::Assistant => "assistant",
        ChatRole::Tool => "tool",
    }
}

fn to_wire_message(message: &ChatMessage) -> WireMessage {
    let tool_calls = (!message.tool_calls.is_empty()).then(|| {
        message
            .tool_calls
            .iter()
            .enumerate()
            .map(|(i, call)| WireToolCall {
                id: call.id.clone().unwrap_or_else(|| format!("call_{}", i)),
                kind: "function".into(),
                function: WireFunctionCall {
                    name: call.tool_name.clone(),
                    arguments: call.arguments.to_string(),
                },
            })
            .collect()
    });

    WireMessage {
        role: role_name(message.role).into(),
        content: Some(message.content.clone()),
        tool_calls,
        tool_call_id: message.tool_call_id.clone(),
    }
}

fn to_wire_tool(tool: &Tool) -> WireTool {
    WireTool {
        kind: "function",
        function: WireFunction {
            name: tool.name.clone(),
            description: tool.description.clone(),
            parameters: tool.input_schema.clone(),
        },
    }
}

fn from_wire_message(message: WireMessage) -> ModelReply {
    let tool_calls = message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(|call| {
            let raw = call.function.arguments;
            // unparseable arguments reach the dispatcher as a string and
            // come back to the model as a parameter error
            let arguments = if raw.trim().is_empty() {
                serde_json::json!({})
            } else {
                serde_json::from_str(&raw).unwrap_or(serde_json::Value::String(raw))
            };
            ToolInvocationRequest::new(call.function.name, arguments).with_id(call.id)
        })
        .collect();

    ModelReply {
        text: message.content.unwrap_or_default(),
        tool_calls,
    }
}
