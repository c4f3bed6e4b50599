// SPDX-FileCopyrightText: 2026 Triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as positive timeouts and non-empty persona prompts.

use triage_core::Intent;

use crate::diagnostic::ConfigError;
use crate::model::TriageConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &TriageConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut invalid = |message: String| errors.push(ConfigError::Validation { message });

    if !LOG_LEVELS.contains(&config.agent.log_level.as_str()) {
        invalid(format!(
            "agent.log_level must be one of {}, got `{}`",
            LOG_LEVELS.join(", "),
            config.agent.log_level
        ));
    }

    if config.anthropic.max_tokens == 0 {
        invalid("anthropic.max_tokens must be greater than 0".to_string());
    }

    if config.anthropic.default_model.trim().is_empty() {
        invalid("anthropic.default_model must not be empty".to_string());
    }

    if config.classifier.max_tokens == 0 {
        invalid("classifier.max_tokens must be greater than 0".to_string());
    }

    if let Some(instruction) = &config.classifier.instruction
        && instruction.trim().is_empty()
    {
        invalid("classifier.instruction must not be empty when set".to_string());
    }

    if config.orchestrator.classification_timeout_secs == 0 {
        invalid("orchestrator.classification_timeout_secs must be greater than 0".to_string());
    }

    if config.orchestrator.generation_timeout_secs == 0 {
        invalid("orchestrator.generation_timeout_secs must be greater than 0".to_string());
    }

    for intent in Intent::ALL {
        let Some(persona) = config.personas.for_intent(intent) else {
            continue;
        };
        match (&persona.system_prompt, &persona.system_prompt_file) {
            (None, None) => invalid(format!(
                "personas.{intent} must set system_prompt or system_prompt_file"
            )),
            (Some(prompt), None) if prompt.trim().is_empty() => {
                invalid(format!("personas.{intent}.system_prompt must not be empty"))
            }
            (_, Some(path)) if path.trim().is_empty() => invalid(format!(
                "personas.{intent}.system_prompt_file must not be empty"
            )),
            _ => {}
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
