// SPDX-FileCopyrightText: 2026 Triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persona registry: one immutable system prompt per intent.
//!
//! The registry is built once at startup and only read afterwards, so it can
//! be shared across concurrent requests behind an `Arc` without locking.

use tracing::{info, warn};
use triage_config::model::{PersonaConfig, PersonasConfig};
use triage_core::Intent;

const EMOTIONAL_PROMPT: &str = "\
You are a compassionate therapist and emotional support specialist.
Focus on the emotional aspects of the user's message. Show empathy, validate their feelings,
and help them process their emotions. Ask thoughtful questions to help them explore their
feelings more deeply. Provide gentle guidance and coping strategies when appropriate.
Avoid giving medical advice - suggest professional help for serious concerns.";

const LOGICAL_PROMPT: &str = "\
You are a logical analysis expert. Focus on facts, data, and rational reasoning.
Provide clear, structured answers based on logic and evidence. Break down complex problems
into manageable parts. Be direct, methodical, and thorough in your analysis.
Use examples and step-by-step reasoning when helpful.";

const STUDY_PROMPT: &str = "\
You are an expert tutor and study buddy who makes complex topics simple and engaging.

Your approach:
- Break down concepts into digestible, easy-to-understand parts
- Use analogies, examples, and real-world connections
- Ask questions to check understanding and encourage active learning
- Adapt your explanation level to match the user's background
- Provide study tips, memory techniques, and learning strategies
- Be encouraging and patient, celebrating progress
- Suggest practice problems or follow-up questions when appropriate

Make learning enjoyable and build the user's confidence.";

const CREATIVE_PROMPT: &str = "\
You are a creative writing partner, brainstorming expert, and artistic collaborator.

Your specialties:
- Generate original ideas, stories, and creative content
- Help overcome creative blocks and writer's block
- Brainstorm innovative solutions and out-of-the-box thinking
- Provide feedback on creative work with constructive suggestions
- Explore different creative techniques and styles
- Inspire imagination and artistic expression
- Collaborate on creative projects as an enthusiastic partner

Be imaginative, inspiring, and supportive. Encourage experimentation and creative risk-taking.
Ask engaging questions that spark new ideas.";

const PLANNING_PROMPT: &str = "\
You are a productivity coach and planning expert who helps people achieve their goals.

Your expertise includes:
- Breaking down large goals into actionable, manageable steps
- Creating realistic timelines and schedules
- Suggesting effective time management and productivity techniques
- Helping prioritize tasks and identify what matters most
- Providing accountability and motivation strategies
- Designing systems and habits for long-term success
- Troubleshooting planning challenges and obstacles

Be practical, structured, and motivating. Focus on creating concrete, achievable plans.
Ask clarifying questions to understand their specific situation and constraints.";

/// The built-in system prompt for `intent`.
pub fn builtin_prompt(intent: Intent) -> &'static str {
    match intent {
        Intent::Emotional => EMOTIONAL_PROMPT,
        Intent::Logical => LOGICAL_PROMPT,
        Intent::Study => STUDY_PROMPT,
        Intent::Creative => CREATIVE_PROMPT,
        Intent::Planning => PLANNING_PROMPT,
    }
}

/// Human-readable persona name for `intent`.
pub fn persona_name(intent: Intent) -> &'static str {
    match intent {
        Intent::Emotional => "therapist",
        Intent::Logical => "analyst",
        Intent::Study => "study buddy",
        Intent::Creative => "creative partner",
        Intent::Planning => "planning coach",
    }
}

/// A registry entry: the agent serving one intent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSpec {
    pub id: Intent,
    /// Prepended to every generation call of this agent.
    pub system_prompt: String,
}

/// The fixed set of agents, exactly one per intent.
#[derive(Debug, Clone)]
pub struct AgentRegistry {
    specs: [AgentSpec; 5],
}

impl AgentRegistry {
    /// Registry using the built-in persona prompts.
    pub fn builtin() -> Self {
        Self {
            specs: Intent::ALL.map(|id| AgentSpec {
                id,
                system_prompt: builtin_prompt(id).to_string(),
            }),
        }
    }

    /// Registry with `[personas.<intent>]` overrides applied.
    ///
    /// Per persona: `system_prompt_file` > `system_prompt` > built-in. An
    /// unreadable or empty prompt file is logged and skipped.
    pub async fn from_config(personas: &PersonasConfig) -> Self {
        let mut registry = Self::builtin();
        for intent in Intent::ALL {
            if let Some(persona) = personas.for_intent(intent)
                && let Some(prompt) = load_override(intent, persona).await
            {
                registry.specs[intent.index()].system_prompt = prompt;
            }
        }
        registry
    }

    /// The agent registered under `intent`. Total over all intents.
    pub fn get(&self, intent: Intent) -> &AgentSpec {
        &self.specs[intent.index()]
    }

    /// All agents, in [`Intent::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = &AgentSpec> {
        self.specs.iter()
    }
}

impl Default for AgentRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

async fn load_override(intent: Intent, persona: &PersonaConfig) -> Option<String> {
    if let Some(path) = &persona.system_prompt_file {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => {
                let trimmed = content.trim();
                if !trimmed.is_empty() {
                    info!(
                        intent = intent.as_str(),
                        path = path.as_str(),
                        "loaded persona prompt from file"
                    );
                    return Some(trimmed.to_string());
                }
                warn!(
                    intent = intent.as_str(),
                    path = path.as_str(),
                    "persona prompt file is empty, ignoring"
                );
            }
            Err(e) => {
                warn!(
                    intent = intent.as_str(),
                    path = path.as_str(),
                    error = %e,
                    "failed to read persona prompt file, falling back"
                );
            }
        }
    }

    persona
        .system_prompt
        .as_ref()
        .filter(|p| !p.trim().is_empty())
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_registry_has_one_agent_per_intent() {
        let registry = AgentRegistry::builtin();
        for intent in Intent::ALL {
            let spec = registry.get(intent);
            assert_eq!(spec.id, intent);
            assert_eq!(spec.system_prompt, builtin_prompt(intent));
        }
        assert_eq!(registry.iter().count(), 5);
    }

    #[test]
    fn lookups_are_stable() {
        let registry = AgentRegistry::builtin();
        let first = registry.get(Intent::Study).clone();
        for _ in 0..3 {
            assert_eq!(registry.get(Intent::Study), &first);
        }
        assert!(std::ptr::eq(registry.get(Intent::Study), registry.get(Intent::Study)));
    }

    #[test]
    fn builtin_prompts_are_distinct() {
        let prompts: std::collections::HashSet<_> =
            Intent::ALL.iter().map(|i| builtin_prompt(*i)).collect();
        assert_eq!(prompts.len(), 5);
        assert!(builtin_prompt(Intent::Emotional).contains("compassionate therapist"));
        assert!(builtin_prompt(Intent::Planning).contains("productivity coach"));
    }

    #[tokio::test]
    async fn inline_override_replaces_builtin() {
        let personas = PersonasConfig {
            creative: Some(PersonaConfig {
                system_prompt: Some("You write haiku only.".into()),
                system_prompt_file: None,
            }),
            ..PersonasConfig::default()
        };
        let registry = AgentRegistry::from_config(&personas).await;
        assert_eq!(registry.get(Intent::Creative).system_prompt, "You write haiku only.");
        assert_eq!(registry.get(Intent::Logical).system_prompt, builtin_prompt(Intent::Logical));
    }

    #[tokio::test]
    async fn file_override_beats_inline() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "  You are a strict tutor.  ").unwrap();
        let personas = PersonasConfig {
            study: Some(PersonaConfig {
                system_prompt: Some("inline".into()),
                system_prompt_file: Some(file.path().display().to_string()),
            }),
            ..PersonasConfig::default()
        };
        let registry = AgentRegistry::from_config(&personas).await;
        assert_eq!(registry.get(Intent::Study).system_prompt, "You are a strict tutor.");
    }

    #[tokio::test]
    async fn missing_file_falls_back_to_inline() {
        let personas = PersonasConfig {
            planning: Some(PersonaConfig {
                system_prompt: Some("Plan in bullet points.".into()),
                system_prompt_file: Some("/nonexistent/triage/planning.md".into()),
            }),
            ..PersonasConfig::default()
        };
        let registry = AgentRegistry::from_config(&personas).await;
        assert_eq!(registry.get(Intent::Planning).system_prompt, "Plan in bullet points.");
    }

    #[tokio::test]
    async fn missing_file_without_inline_keeps_builtin() {
        let personas = PersonasConfig {
            emotional: Some(PersonaConfig {
                system_prompt: None,
                system_prompt_file: Some("/nonexistent/triage/emotional.md".into()),
            }),
            ..PersonasConfig::default()
        };
        let registry = AgentRegistry::from_config(&personas).await;
        assert_eq!(
            registry.get(Intent::Emotional).system_prompt,
            builtin_prompt(Intent::Emotional)
        );
    }
}
