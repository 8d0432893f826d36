//! The layered fallback pipeline.
//!
//! For each field independently, layers are consulted in priority order and
//! the first acceptable candidate wins: subject-line candidates are
//! auto-accepted, lower layers must clear the acceptance floor. The semantic
//! layer is only invoked when the two pattern layers above it left a field
//! unresolved, and at most once per ingestion.

use std::sync::Arc;

use tracing::debug;

use crate::email::EmailMessage;
use crate::rules::RuleTable;
use crate::semantic::SemanticExtractor;

use super::basic::BasicFallbackExtractor;
use super::context::ContextExtractor;
use super::lexical::LexicalExtractor;
use super::structural::StructuralExtractor;
use super::subject::SubjectLineExtractor;
use super::{
    ExtractionField, ExtractionResult, FieldCandidate, FieldExtractor, FieldOutcome, SourceLayer,
};

/// Everything one pipeline run produced: the accepted result plus the full
/// candidate list for the aggregator's agreement check.
#[derive(Debug)]
pub struct PipelineOutput {
    /// The accepted per-field outcome.
    pub result: ExtractionResult,
    /// Every candidate any layer emitted, accepted or not.
    pub candidates: Vec<FieldCandidate>,
}

/// The ordered extraction pipeline.
pub struct ExtractionPipeline {
    acceptance_floor: u8,
    deterministic: Vec<Box<dyn FieldExtractor>>,
    semantic: Option<ContextExtractor>,
}

impl ExtractionPipeline {
    /// Build the pipeline with the default layer ordering.
    ///
    /// `semantic` is optional: without it the AI-context layer simply never
    /// produces candidates and the chain falls through to the lexical layer.
    pub fn new(acceptance_floor: u8, semantic: Option<Arc<dyn SemanticExtractor>>) -> Self {
        Self {
            acceptance_floor,
            deterministic: vec![
                Box::new(SubjectLineExtractor),
                Box::new(StructuralExtractor),
                Box::new(LexicalExtractor),
                Box::new(BasicFallbackExtractor),
            ],
            semantic: semantic.map(ContextExtractor::new),
        }
    }

    /// Run the full chain over one email.
    ///
    /// Never fails: a malformed or empty email yields absent fields with
    /// confidence 0.
    pub async fn extract(&self, email: &EmailMessage, rules: &RuleTable) -> PipelineOutput {
        let mut candidates: Vec<FieldCandidate> = Vec::new();
        if email.has_content() {
            for extractor in &self.deterministic {
                candidates.extend(extractor.extract(email, rules));
            }

            // The semantic call is network-bound; skip it when the pattern
            // layers above it already resolved every field.
            if let Some(semantic) = &self.semantic {
                if !pattern_layers_resolved(&candidates, self.acceptance_floor) {
                    candidates.extend(semantic.extract(email, rules).await);
                }
            }
        }

        let result = ExtractionResult {
            company: self.accept_text(&candidates, ExtractionField::Company),
            position: self.accept_text(&candidates, ExtractionField::Position),
            applied_date: self.accept_date(&candidates),
        };
        PipelineOutput { result, candidates }
    }

    fn accept_text(
        &self,
        candidates: &[FieldCandidate],
        field: ExtractionField,
    ) -> FieldOutcome<String> {
        match self.accept(candidates, field) {
            Some(c) => FieldOutcome {
                value: Some(c.value.clone()),
                confidence: c.confidence,
                source: Some(c.source),
            },
            None => FieldOutcome::absent(),
        }
    }

    fn accept_date(&self, candidates: &[FieldCandidate]) -> FieldOutcome<chrono::NaiveDate> {
        let accepted = self.accept(candidates, ExtractionField::AppliedDate);
        // Candidate dates are already ISO-normalized; a value that fails to
        // round-trip is dropped rather than guessed at.
        match accepted.and_then(|c| {
            chrono::NaiveDate::parse_from_str(&c.value, "%Y-%m-%d")
                .ok()
                .map(|date| (c, date))
        }) {
            Some((c, date)) => FieldOutcome {
                value: Some(date),
                confidence: c.confidence,
                source: Some(c.source),
            },
            None => FieldOutcome::absent(),
        }
    }

    /// The precedence/merge policy: first acceptable candidate in layer
    /// priority order; within a layer the most confident candidate wins.
    fn accept<'a>(
        &self,
        candidates: &'a [FieldCandidate],
        field: ExtractionField,
    ) -> Option<&'a FieldCandidate> {
        for layer in SourceLayer::ALL {
            let best = candidates
                .iter()
                .filter(|c| c.source == layer && c.field == field)
                .fold(None::<&FieldCandidate>, |best, c| match best {
                    Some(b) if b.confidence >= c.confidence => Some(b),
                    _ => Some(c),
                });
            let Some(candidate) = best else {
                continue;
            };
            let accepted = layer == SourceLayer::SubjectLine
                || candidate.confidence >= self.acceptance_floor;
            if accepted {
                debug!(
                    field = ?field,
                    layer = layer.as_str(),
                    confidence = candidate.confidence,
                    "field candidate accepted"
                );
                return Some(candidate);
            }
        }
        None
    }
}

/// Whether the subject-line and structural layers already produced an
/// acceptable candidate for all three fields.
fn pattern_layers_resolved(candidates: &[FieldCandidate], floor: u8) -> bool {
    [
        ExtractionField::Company,
        ExtractionField::Position,
        ExtractionField::AppliedDate,
    ]
    .iter()
    .all(|field| {
        candidates.iter().any(|c| {
            c.field == *field
                && (c.source == SourceLayer::SubjectLine
                    || (c.source == SourceLayer::Structural && c.confidence >= floor))
        })
    })
}
