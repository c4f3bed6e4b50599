// SPDX-FileCopyrightText: 2026 Triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Intent classification and agent routing for Triage.
//!
//! This crate provides:
//! - [`IntentClassifier`]: Schema-constrained classification of the latest user turn
//! - [`route`]: Total mapping from an (optional) intent to the agent that serves it
//! - [`FALLBACK_INTENT`]: The single fallback used wherever intent resolution fails
//!
//! The classifier runs before generation; the router turns its outcome
//! (or its failure) into exactly one agent selection.

pub mod classifier;
pub mod router;

pub use classifier::{IntentClassifier, CLASSIFY_FIELD, CLASSIFY_TOOL_NAME, DEFAULT_INSTRUCTION};
pub use router::{resolve, route, route_label, RoutingDecision, FALLBACK_INTENT};
