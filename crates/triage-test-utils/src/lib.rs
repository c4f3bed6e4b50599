// SPDX-FileCopyrightText: 2026 Triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Triage integration tests.
//!
//! Provides a scripted completion port and a harness assembling the full
//! classification, routing and generation stack without network access.
//!
//! # Components
//!
//! - [`MockProvider`] - Completion port replaying a script of answers, failures and hangs
//! - [`TestHarness`] - Orchestrator, registry and chat service wired to a `MockProvider`

pub mod harness;
pub mod mock_provider;

pub use harness::TestHarness;
pub use mock_provider::{MockProvider, MockReply};
