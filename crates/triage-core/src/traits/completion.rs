// SPDX-FileCopyrightText: 2026 Triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Completion port: the external text-generation capability the core depends on.

use async_trait::async_trait;

use crate::error::TriageError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{CompletionRequest, CompletionResponse};

/// Adapter for LLM completion providers.
///
/// Implementations must be safe for concurrent use by simultaneously
/// in-flight requests (pooled or stateless clients).
///
/// When [`CompletionRequest::response_schema`] is set, the returned content
/// must already satisfy it. Providers without native structured output must
/// validate and reject out-of-schema results rather than coercing them.
#[async_trait]
pub trait CompletionAdapter: PluginAdapter {
    /// Sends a completion request and returns the full response.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, TriageError>;
}
