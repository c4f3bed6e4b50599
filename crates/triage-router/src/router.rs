// SPDX-FileCopyrightText: 2026 Triage Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Intent-to-agent routing and the classification fallback policy.
//!
//! Agents are registered under the intent they serve, so routing resolves an
//! intent (or its absence) to the intent whose agent will generate the reply.

use tracing::warn;
use triage_core::{ClassificationFailure, Intent, IntentSource, TriageError};

/// Intent used whenever classification cannot produce one.
pub const FALLBACK_INTENT: Intent = Intent::Logical;

/// Resolve an optional intent to the agent that serves it. Never fails.
pub fn route(intent: Option<Intent>) -> Intent {
    intent.unwrap_or(FALLBACK_INTENT)
}

/// Resolve a raw label. Unrecognized labels route like an absent intent.
pub fn route_label(label: Option<&str>) -> Intent {
    route(label.and_then(Intent::parse_label))
}

/// The agent selection for one request, with where its intent came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutingDecision {
    pub intent: Intent,
    pub source: IntentSource,
}

/// Turn a classification outcome into a routing decision.
///
/// Port failures, timeouts and out-of-schema answers fall back to
/// [`FALLBACK_INTENT`]. A history with no user turn is a caller error and
/// is returned unchanged, as is any non-classification error.
pub fn resolve(classified: Result<Intent, TriageError>) -> Result<RoutingDecision, TriageError> {
    match classified {
        Ok(intent) => Ok(RoutingDecision {
            intent: route(Some(intent)),
            source: IntentSource::Classified,
        }),
        Err(err) => match err.classification_kind() {
            Some(
                kind @ (ClassificationFailure::Provider
                | ClassificationFailure::Timeout
                | ClassificationFailure::OutOfSchema),
            ) => {
                let intent = route(None);
                warn!(
                    failure = %kind,
                    error = %err,
                    intent = intent.as_str(),
                    "classification failed, falling back"
                );
                Ok(RoutingDecision {
                    intent,
                    source: IntentSource::Fallback,
                })
            }
            Some(ClassificationFailure::NoUserTurn) | None => Err(err),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tracing_test::traced_test;

    fn classification_error(kind: ClassificationFailure) -> TriageError {
        TriageError::Classification {
            kind,
            message: "boom".into(),
        }
    }

    #[test]
    fn every_intent_routes_to_itself() {
        for intent in Intent::ALL {
            assert_eq!(route(Some(intent)), intent);
        }
    }

    #[test]
    fn absent_intent_routes_to_logical() {
        assert_eq!(route(None), Intent::Logical);
        assert_eq!(route(None), FALLBACK_INTENT);
    }

    #[test]
    fn unrecognized_label_routes_to_logical() {
        assert_eq!(route_label(Some("humor")), Intent::Logical);
        assert_eq!(route_label(Some("")), Intent::Logical);
        assert_eq!(route_label(None), Intent::Logical);
        assert_eq!(route_label(Some("study")), Intent::Study);
    }

    #[test]
    fn resolve_keeps_classified_intent() {
        let decision = resolve(Ok(Intent::Creative)).unwrap();
        assert_eq!(decision.intent, Intent::Creative);
        assert_eq!(decision.source, IntentSource::Classified);
    }

    #[traced_test]
    #[test]
    fn resolve_falls_back_on_recoverable_failures() {
        for kind in [
            ClassificationFailure::Provider,
            ClassificationFailure::Timeout,
            ClassificationFailure::OutOfSchema,
        ] {
            let decision = resolve(Err(classification_error(kind))).unwrap();
            assert_eq!(decision.intent, FALLBACK_INTENT);
            assert_eq!(decision.source, IntentSource::Fallback);
        }
        assert!(logs_contain("classification failed, falling back"));
    }

    #[test]
    fn resolve_propagates_missing_user_turn() {
        let err = resolve(Err(classification_error(ClassificationFailure::NoUserTurn)))
            .unwrap_err();
        assert_eq!(err.classification_kind(), Some(ClassificationFailure::NoUserTurn));
    }

    #[test]
    fn resolve_propagates_other_errors() {
        let err = resolve(Err(TriageError::Internal("x".into()))).unwrap_err();
        assert!(matches!(err, TriageError::Internal(_)));
    }

    proptest! {
        #[test]
        fn route_label_is_total(label in ".*") {
            let routed = route_label(Some(&label));
            match Intent::parse_label(&label) {
                Some(intent) => prop_assert_eq!(routed, intent),
                None => prop_assert_eq!(routed, FALLBACK_INTENT),
            }
        }

        #[test]
        fn route_is_identity_on_intents(idx in 0usize..5) {
            let intent = Intent::ALL[idx];
            prop_assert_eq!(route(Some(intent)), intent);
        }
    }
}
