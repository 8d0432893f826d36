//! AI-context layer: priority 3, base confidence 85.
//!
//! Bridges the deterministic pipeline and the semantic adapter: one bounded
//! attempt per ingestion, answer mapped into candidates with the service's
//! self-reported confidence capped at the layer base. Any failure (network,
//! timeout, unparseable answer) makes the whole layer abstain; there is no
//! partial trust in a degraded answer.

use std::sync::Arc;

use tracing::debug;

use crate::email::EmailMessage;
use crate::rules::RuleTable;
use crate::semantic::{SemanticAnswer, SemanticExtractor};

use super::{parse_date_loose, ExtractionField, FieldCandidate, SourceLayer};

/// Drives the semantic adapter and converts its answer into candidates.
pub struct ContextExtractor {
    adapter: Arc<dyn SemanticExtractor>,
}

impl ContextExtractor {
    /// Wrap a semantic adapter.
    pub fn new(adapter: Arc<dyn SemanticExtractor>) -> Self {
        Self { adapter }
    }

    /// Run one bounded semantic attempt; failures become an empty list.
    pub async fn extract(&self, email: &EmailMessage, rules: &RuleTable) -> Vec<FieldCandidate> {
        match self.adapter.attempt(email).await {
            Ok(answer) => {
                debug!(
                    adapter = self.adapter.name(),
                    confidence = answer.confidence,
                    "semantic answer received"
                );
                candidates_from_answer(&answer, rules)
            }
            Err(e) => {
                debug!(adapter = self.adapter.name(), error = %e, "semantic layer abstains");
                Vec::new()
            }
        }
    }
}

/// Map a semantic answer into per-field candidates.
///
/// The answer's confidence applies to every field it populated, capped at
/// the layer base; values still pass the same validity filter as pattern
/// captures so a hallucinated pronoun cannot sneak through.
fn candidates_from_answer(answer: &SemanticAnswer, rules: &RuleTable) -> Vec<FieldCandidate> {
    let confidence = answer
        .confidence
        .min(SourceLayer::AiContext.base_confidence());
    if confidence == 0 {
        return Vec::new();
    }
    let mut out = Vec::new();
    if let Some(company) = answer.company.as_deref().and_then(|v| rules.validate_capture(v)) {
        out.push(FieldCandidate {
            field: ExtractionField::Company,
            value: company,
            confidence,
            source: SourceLayer::AiContext,
        });
    }
    if let Some(position) = answer.position.as_deref().and_then(|v| rules.validate_capture(v)) {
        out.push(FieldCandidate {
            field: ExtractionField::Position,
            value: position,
            confidence,
            source: SourceLayer::AiContext,
        });
    }
    if let Some(date) = answer.applied_date.as_deref().and_then(parse_date_loose) {
        out.push(FieldCandidate {
            field: ExtractionField::AppliedDate,
            value: date.to_string(),
            confidence,
            source: SourceLayer::AiContext,
        });
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantic::SemanticError;
    use async_trait::async_trait;
    use std::time::Duration;

    struct FixedAnswer(SemanticAnswer);

    #[async_trait]
    impl SemanticExtractor for FixedAnswer {
        async fn attempt(&self, _email: &EmailMessage) -> Result<SemanticAnswer, SemanticError> {
            Ok(self.0.clone())
        }
        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct AlwaysFails;

    #[async_trait]
    impl SemanticExtractor for AlwaysFails {
        async fn attempt(&self, _email: &EmailMessage) -> Result<SemanticAnswer, SemanticError> {
            Err(SemanticError::Timeout(Duration::from_secs(5)))
        }
        fn name(&self) -> &str {
            "failing"
        }
    }

    fn test_email() -> EmailMessage {
        EmailMessage {
            subject: "Update".to_owned(),
            sender: "hr@acme.com".to_owned(),
            html_body: None,
            text_body: Some("body".to_owned()),
            received_at: None,
        }
    }

    #[tokio::test]
    async fn answer_maps_to_candidates_with_capped_confidence() {
        let answer = SemanticAnswer {
            company: Some("Acme".to_owned()),
            position: Some("Staff Engineer".to_owned()),
            applied_date: Some("June 1, 2025".to_owned()),
            confidence: 99,
            reasoning: None,
        };
        let rules = RuleTable::builtin();
        let extractor = ContextExtractor::new(Arc::new(FixedAnswer(answer)));
        let candidates = extractor.extract(&test_email(), &rules).await;
        assert_eq!(candidates.len(), 3);
        assert!(candidates
            .iter()
            .all(|c| c.confidence == SourceLayer::AiContext.base_confidence()));
        assert!(candidates
            .iter()
            .any(|c| c.field == ExtractionField::AppliedDate && c.value == "2025-06-01"));
    }

    #[tokio::test]
    async fn zero_confidence_answer_abstains() {
        let answer = SemanticAnswer {
            company: Some("Acme".to_owned()),
            position: None,
            applied_date: None,
            confidence: 0,
            reasoning: None,
        };
        let rules = RuleTable::builtin();
        let extractor = ContextExtractor::new(Arc::new(FixedAnswer(answer)));
        assert!(extractor.extract(&test_email(), &rules).await.is_empty());
    }

    #[tokio::test]
    async fn adapter_failure_abstains() {
        let rules = RuleTable::builtin();
        let extractor = ContextExtractor::new(Arc::new(AlwaysFails));
        assert!(extractor.extract(&test_email(), &rules).await.is_empty());
    }

    #[tokio::test]
    async fn hallucinated_pronoun_is_filtered() {
        let answer = SemanticAnswer {
            company: Some("our team".to_owned()),
            position: None,
            applied_date: None,
            confidence: 80,
            reasoning: None,
        };
        let rules = RuleTable::builtin();
        let extractor = ContextExtractor::new(Arc::new(FixedAnswer(answer)));
        assert!(extractor.extract(&test_email(), &rules).await.is_empty());
    }
}
