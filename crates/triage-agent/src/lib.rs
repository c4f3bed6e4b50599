// SPDX-FileCopyrightText: 2026 Triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persona agents, orchestration and conversation handling for Triage.
//!
//! The [`Orchestrator`] is the central coordinator that:
//! - Classifies the latest user turn through the completion port
//! - Routes the resolved intent to exactly one persona from the [`AgentRegistry`]
//! - Generates the reply from the full conversation history
//! - Reports the reply together with the intent that selected its agent
//!
//! [`ChatService`] wraps it with conversation persistence.

pub mod agent;
pub mod conversation;
pub mod orchestrator;
pub mod registry;
pub mod service;

pub use agent::{GenerationSettings, PersonaAgent};
pub use conversation::InMemoryConversationStore;
pub use orchestrator::{Orchestrator, OrchestratorState, RunOutcome};
pub use registry::{builtin_prompt, persona_name, AgentRegistry, AgentSpec};
pub use service::{auto_title, ChatResponse, ChatService, DEFAULT_TITLE};
