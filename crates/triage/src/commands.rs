// SPDX-FileCopyrightText: 2026 Triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot subcommands: `ask`, `classify`, `personas`, `config`.

use std::sync::Arc;

use colored::Colorize;
use triage_agent::{persona_name, AgentRegistry, Orchestrator};
use triage_anthropic::AnthropicProvider;
use triage_config::TriageConfig;
use triage_core::{CompletionAdapter, IntentSource, Reply, TriageError, Turn};
use triage_router::RoutingDecision;

/// Characters of each persona prompt shown by `triage personas`.
const PROMPT_PREVIEW_CHARS: usize = 72;

/// Wires the Anthropic provider and configured personas into an orchestrator.
pub async fn build_orchestrator(config: &TriageConfig) -> Result<Orchestrator, TriageError> {
    let provider: Arc<dyn CompletionAdapter> =
        Arc::new(AnthropicProvider::new(config).inspect_err(|_| {
            eprintln!(
                "error: Anthropic API key required. Set anthropic.api_key in config or the ANTHROPIC_API_KEY env var"
            );
        })?);
    let registry = Arc::new(AgentRegistry::from_config(&config.personas).await);
    Ok(Orchestrator::from_config(provider, registry, config))
}

/// Runs `triage ask`.
pub async fn run_ask(config: &TriageConfig, text: &str) -> Result<(), TriageError> {
    let orchestrator = build_orchestrator(config).await?;
    let reply = orchestrator.handle_message(Vec::new(), text).await?;
    println!("{}", reply_header(&reply).dimmed());
    println!("{}", reply.text);
    Ok(())
}

/// Runs `triage classify`.
pub async fn run_classify(config: &TriageConfig, text: &str) -> Result<(), TriageError> {
    if text.trim().is_empty() {
        return Err(TriageError::InvalidInput("message text is empty".to_string()));
    }
    let orchestrator = build_orchestrator(config).await?;
    let decision = orchestrator.route_only(&[Turn::user(text)]).await?;
    println!("{}", decision_line(&decision));
    Ok(())
}

/// Runs `triage personas`. Needs no API key.
pub async fn run_personas(config: &TriageConfig) -> Result<(), TriageError> {
    let registry = AgentRegistry::from_config(&config.personas).await;
    for line in persona_lines(&registry) {
        println!("{line}");
    }
    Ok(())
}

/// Runs `triage config`.
pub fn run_config(config: &TriageConfig) -> Result<(), TriageError> {
    print!("{}", redacted_config(config)?);
    Ok(())
}

/// `<intent> (<persona>)`, with a fallback marker when classification failed.
pub fn reply_header(reply: &Reply) -> String {
    let mut header = format!("{} ({})", reply.intent, persona_name(reply.intent));
    if reply.intent_source == IntentSource::Fallback {
        header.push_str(" [fallback]");
    }
    header
}

/// `<intent>\t<source>` as printed by `triage classify`.
pub fn decision_line(decision: &RoutingDecision) -> String {
    format!("{}\t{}", decision.intent, decision.source)
}

/// One line per registered agent: intent, persona name and a prompt preview.
pub fn persona_lines(registry: &AgentRegistry) -> Vec<String> {
    registry
        .iter()
        .map(|spec| {
            let first_line = spec.system_prompt.lines().next().unwrap_or_default();
            let mut preview: String = first_line.chars().take(PROMPT_PREVIEW_CHARS).collect();
            if first_line.chars().count() > PROMPT_PREVIEW_CHARS {
                preview.push_str("...");
            }
            format!("{:<10} {:<17} {preview}", spec.id.as_str(), persona_name(spec.id))
        })
        .collect()
}

/// The effective configuration as TOML, with the API key masked.
pub fn redacted_config(config: &TriageConfig) -> Result<String, TriageError> {
    let mut shown = config.clone();
    if shown.anthropic.api_key.is_some() {
        shown.anthropic.api_key = Some("********".to_string());
    }
    toml::to_string_pretty(&shown)
        .map_err(|e| TriageError::Internal(format!("failed to render config: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_core::Intent;
    use triage_test_utils::{MockProvider, MockReply};

    #[test]
    fn reply_header_marks_fallback() {
        let mut reply = Reply {
            text: "ok".into(),
            intent: Intent::Emotional,
            intent_source: IntentSource::Classified,
        };
        assert_eq!(reply_header(&reply), "emotional (therapist)");

        reply.intent = Intent::Logical;
        reply.intent_source = IntentSource::Fallback;
        assert_eq!(reply_header(&reply), "logical (analyst) [fallback]");
    }

    #[test]
    fn persona_lines_cover_every_intent() {
        let lines = persona_lines(&AgentRegistry::builtin());
        assert_eq!(lines.len(), 5);
        assert!(lines[0].starts_with("emotional"));
        assert!(lines[0].contains("therapist"));
        assert!(lines[4].starts_with("planning"));
    }

    #[test]
    fn redacted_config_masks_api_key() {
        let mut config = TriageConfig::default();
        config.anthropic.api_key = Some("sk-ant-secret".into());
        let rendered = redacted_config(&config).unwrap();
        assert!(!rendered.contains("sk-ant-secret"));
        assert!(rendered.contains("********"));
        assert!(rendered.contains("classification_timeout_secs = 30"));
    }

    #[tokio::test]
    async fn classify_line_reports_source() {
        let provider = Arc::new(MockProvider::with_script(vec![MockReply::intent(
            Intent::Creative,
        )]));
        let orchestrator = Orchestrator::new(provider, Arc::new(AgentRegistry::builtin()));
        let decision = orchestrator
            .route_only(&[Turn::user("Write me a story")])
            .await
            .unwrap();
        assert_eq!(decision_line(&decision), "creative\tclassified");
    }

    #[tokio::test]
    async fn classify_line_reports_fallback() {
        let provider = Arc::new(MockProvider::with_script(vec![MockReply::text("humor")]));
        let orchestrator = Orchestrator::new(provider, Arc::new(AgentRegistry::builtin()));
        let decision = orchestrator.route_only(&[Turn::user("lol")]).await.unwrap();
        assert_eq!(decision_line(&decision), "logical\tfallback");
    }
}
