// SPDX-FileCopyrightText: 2026 Triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use triage_core::Intent;

/// Top-level Triage configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TriageConfig {
    /// Process identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Anthropic API settings.
    #[serde(default)]
    pub anthropic: AnthropicConfig,

    /// Intent classifier settings.
    #[serde(default)]
    pub classifier: ClassifierConfig,

    /// Completion deadlines for a single request.
    #[serde(default)]
    pub orchestrator: OrchestratorConfig,

    /// Per-intent persona prompt overrides.
    #[serde(default)]
    pub personas: PersonasConfig,
}

/// Process identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name used in logs and the REPL prompt.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "triage".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Anthropic API configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AnthropicConfig {
    /// Anthropic API key. `None` requires the `ANTHROPIC_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Model used for reply generation (and classification unless overridden).
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Maximum tokens to generate per reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Anthropic API version string.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Messages endpoint URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_model: default_model(),
            max_tokens: default_max_tokens(),
            api_version: default_api_version(),
            base_url: default_base_url(),
        }
    }
}

fn default_model() -> String {
    "claude-3-5-sonnet-latest".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

fn default_base_url() -> String {
    "https://api.anthropic.com/v1/messages".to_string()
}

/// Intent classifier configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ClassifierConfig {
    /// Model override for classification calls. Falls back to `anthropic.default_model`.
    #[serde(default)]
    pub model: Option<String>,

    /// Token cap for the classification call; the answer is a single label.
    #[serde(default = "default_classifier_max_tokens")]
    pub max_tokens: u32,

    /// Replaces the built-in classification instruction when set.
    #[serde(default)]
    pub instruction: Option<String>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model: None,
            max_tokens: default_classifier_max_tokens(),
            instruction: None,
        }
    }
}

fn default_classifier_max_tokens() -> u32 {
    64
}

/// Deadlines for the two completion calls of a request.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OrchestratorConfig {
    #[serde(default = "default_classification_timeout_secs")]
    pub classification_timeout_secs: u64,

    #[serde(default = "default_generation_timeout_secs")]
    pub generation_timeout_secs: u64,
}

impl OrchestratorConfig {
    pub fn classification_timeout(&self) -> Duration {
        Duration::from_secs(self.classification_timeout_secs)
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            classification_timeout_secs: default_classification_timeout_secs(),
            generation_timeout_secs: default_generation_timeout_secs(),
        }
    }
}

fn default_classification_timeout_secs() -> u64 {
    30
}

fn default_generation_timeout_secs() -> u64 {
    120
}

/// Per-intent persona overrides. Only the five intent keys are accepted.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PersonasConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotional: Option<PersonaConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logical: Option<PersonaConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study: Option<PersonaConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creative: Option<PersonaConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub planning: Option<PersonaConfig>,
}

impl PersonasConfig {
    /// The override configured for `intent`, if any.
    pub fn for_intent(&self, intent: Intent) -> Option<&PersonaConfig> {
        match intent {
            Intent::Emotional => self.emotional.as_ref(),
            Intent::Logical => self.logical.as_ref(),
            Intent::Study => self.study.as_ref(),
            Intent::Creative => self.creative.as_ref(),
            Intent::Planning => self.planning.as_ref(),
        }
    }
}

/// A persona prompt override.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PersonaConfig {
    /// Inline system prompt. Overridden by `system_prompt_file` if both set.
    #[serde(default)]
    pub system_prompt: Option<String>,

    /// Path to a markdown file containing the system prompt.
    #[serde(default)]
    pub system_prompt_file: Option<String>,
}
