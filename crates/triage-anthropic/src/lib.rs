// SPDX-FileCopyrightText: 2026 Triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic Claude completion adapter for Triage.
//!
//! This crate implements [`CompletionAdapter`] for the Anthropic Messages API.
//! Schema-constrained requests are served through a single forced tool call,
//! so classification results arrive as structured tool input rather than text.

pub mod client;
pub mod types;

use async_trait::async_trait;
use triage_config::model::TriageConfig;
use triage_core::types::AdapterType;
use triage_core::{
    CompletionAdapter, CompletionContent, CompletionRequest, CompletionResponse, HealthStatus,
    PluginAdapter, ResponseSchema, Role, TokenUsage, TriageError,
};
use tracing::{debug, info};

use crate::client::AnthropicClient;
use crate::types::{ApiMessage, MessageRequest, ResponseContentBlock, ToolChoice, ToolDefinition};

/// Anthropic Claude provider implementing [`CompletionAdapter`].
///
/// API key resolution order: config -> `ANTHROPIC_API_KEY` env var -> error.
pub struct AnthropicProvider {
    client: AnthropicClient,
    default_max_tokens: u32,
}

impl AnthropicProvider {
    /// Creates a new Anthropic provider from the given configuration.
    ///
    /// # API Key Resolution
    /// 1. `config.anthropic.api_key` if set
    /// 2. `ANTHROPIC_API_KEY` environment variable
    /// 3. Returns error if neither is available
    pub fn new(config: &TriageConfig) -> Result<Self, TriageError> {
        let api_key = resolve_api_key(&config.anthropic.api_key)?;
        let client = AnthropicClient::new(
            api_key,
            config.anthropic.api_version.clone(),
            config.anthropic.default_model.clone(),
            config.anthropic.base_url.clone(),
        )?;

        info!(
            model = config.anthropic.default_model,
            "Anthropic provider initialized"
        );

        Ok(Self::with_client(client, config.anthropic.max_tokens))
    }

    /// Creates a provider around an existing client.
    pub fn with_client(client: AnthropicClient, default_max_tokens: u32) -> Self {
        Self {
            client,
            default_max_tokens,
        }
    }

    /// Converts a [`CompletionRequest`] to an Anthropic [`MessageRequest`].
    ///
    /// System-role messages are folded into the system prompt, and adjacent
    /// messages with the same role are merged so the API sees strict
    /// user/assistant alternation.
    fn to_message_request(&self, request: &CompletionRequest) -> MessageRequest {
        let mut system_parts: Vec<&str> = request.system_prompt.iter().map(String::as_str).collect();
        let mut messages: Vec<ApiMessage> = Vec::with_capacity(request.messages.len());

        for message in &request.messages {
            let role = match message.role {
                Role::System => {
                    system_parts.push(&message.content);
                    continue;
                }
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            match messages.last_mut() {
                Some(last) if last.role == role => {
                    last.content.push_str("\n\n");
                    last.content.push_str(&message.content);
                }
                _ => messages.push(ApiMessage {
                    role: role.to_string(),
                    content: message.content.clone(),
                }),
            }
        }

        let system = (!system_parts.is_empty()).then(|| system_parts.join("\n\n"));

        let (tools, tool_choice) = match &request.response_schema {
            Some(schema) => {
                let (tool, choice) = schema_tool(schema);
                (Some(vec![tool]), Some(choice))
            }
            None => (None, None),
        };

        MessageRequest {
            model: request
                .model
                .clone()
                .unwrap_or_else(|| self.client.default_model().to_string()),
            messages,
            system,
            max_tokens: request.max_tokens.unwrap_or(self.default_max_tokens),
            tools,
            tool_choice,
        }
    }
}

/// The tool definition and forced tool choice expressing `schema`.
fn schema_tool(schema: &ResponseSchema) -> (ToolDefinition, ToolChoice) {
    match schema {
        ResponseSchema::ClosedEnum {
            name, description, ..
        } => (
            ToolDefinition {
                name: name.clone(),
                description: description.clone(),
                input_schema: schema.to_json_schema(),
            },
            ToolChoice::Tool { name: name.clone() },
        ),
    }
}

fn schema_name(schema: &ResponseSchema) -> &str {
    match schema {
        ResponseSchema::ClosedEnum { name, .. } => name,
    }
}

/// Extracts the completion body from response blocks.
///
/// With a schema, the input of the matching tool call is the result. Without
/// one, or if the model answered in text anyway, text blocks are joined.
fn extract_content(
    blocks: Vec<ResponseContentBlock>,
    schema: Option<&ResponseSchema>,
) -> CompletionContent {
    if let Some(schema) = schema {
        let expected = schema_name(schema);
        let structured = blocks.iter().find_map(|block| match block {
            ResponseContentBlock::ToolUse { name, input, .. } if name == expected => {
                Some(input.clone())
            }
            _ => None,
        });
        if let Some(input) = structured {
            return CompletionContent::Structured(input);
        }
        debug!(tool = expected, "no matching tool call in response, using text");
    }

    let text = blocks
        .iter()
        .filter_map(|block| match block {
            ResponseContentBlock::Text { text } => Some(text.as_str()),
            ResponseContentBlock::ToolUse { .. } => None,
        })
        .collect::<Vec<_>>()
        .join("");
    CompletionContent::Text(text)
}

#[async_trait]
impl PluginAdapter for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Completion
    }

    async fn health_check(&self) -> Result<HealthStatus, TriageError> {
        // No API call: health checks must not consume tokens.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TriageError> {
        debug!("Anthropic provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl CompletionAdapter for AnthropicProvider {
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, TriageError> {
        let api_request = self.to_message_request(&request);
        let response = self.client.complete_message(&api_request).await?;

        debug!(
            id = response.id.as_str(),
            stop_reason = response.stop_reason.as_deref().unwrap_or("none"),
            "completion finished"
        );

        Ok(CompletionResponse {
            content: extract_content(response.content, request.response_schema.as_ref()),
            model: response.model,
            usage: TokenUsage {
                input_tokens: response.usage.input_tokens,
                output_tokens: response.usage.output_tokens,
            },
        })
    }
}

/// Resolves the API key from config or environment.
fn resolve_api_key(config_key: &Option<String>) -> Result<String, TriageError> {
    resolve_api_key_with(config_key, |name| std::env::var(name).ok())
}

fn resolve_api_key_with(
    config_key: &Option<String>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<String, TriageError> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Ok(key.clone());
    }
    env("ANTHROPIC_API_KEY")
        .filter(|key| !key.is_empty())
        .ok_or_else(|| {
            TriageError::Config(
                "Anthropic API key not found. Set anthropic.api_key in config or ANTHROPIC_API_KEY environment variable.".into(),
            )
        })
}
