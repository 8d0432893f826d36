//! Parse engine: ties extraction, classification, and aggregation together
//! and assembles the response object handed to the ingestion caller.
//!
//! The engine does no inference of its own: it runs the pipeline, runs the
//! classifier (which is independent and always runs), folds the signals
//! through the confidence aggregator, and records provenance.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::aggregate::overall_confidence;
use crate::classify::{ClassifierThresholds, StatusClassification, StatusClassifier};
use crate::config::TrackmailConfig;
use crate::email::EmailMessage;
use crate::extract::{ExtractionPipeline, ExtractionResult, SourceLayer};
use crate::rules::RuleTable;
use crate::semantic::SemanticExtractor;

/// The complete answer for one ingested email.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailParse {
    /// Extracted application facts with per-field provenance.
    pub extraction: ExtractionResult,
    /// Lifecycle status decision with its indicator trail.
    pub classification: StatusClassification,
    /// Overall confidence in [0,100].
    pub confidence: u8,
    /// The highest-priority layer that supplied an accepted field.
    pub dominant_layer: Option<SourceLayer>,
    /// Rule table version the answer was produced with.
    pub rules_version: String,
}

/// The parsing core: stateless across calls, shareable across tasks.
pub struct ParseEngine {
    rules: Arc<RuleTable>,
    pipeline: ExtractionPipeline,
    classifier: StatusClassifier,
}

impl ParseEngine {
    /// Build an engine from configuration and an optional semantic adapter.
    pub fn new(config: &TrackmailConfig, semantic: Option<Arc<dyn SemanticExtractor>>) -> Self {
        Self {
            rules: Arc::new(RuleTable::builtin()),
            pipeline: ExtractionPipeline::new(config.pipeline.acceptance_floor, semantic),
            classifier: StatusClassifier::new(ClassifierThresholds {
                status_threshold: config.classifier.status_threshold,
                rejection_threshold: config.classifier.rejection_threshold,
            }),
        }
    }

    /// Engine with all defaults and no semantic adapter, for callers that
    /// only need the deterministic layers.
    pub fn deterministic() -> Self {
        Self::new(&TrackmailConfig::default(), None)
    }

    /// Process one email. Guaranteed to return: the worst case is absent
    /// fields, confidence 0, and `not_job_related`.
    pub async fn process(&self, email: &EmailMessage) -> EmailParse {
        let output = self.pipeline.extract(email, &self.rules).await;
        let classification = self.classifier.classify(email, &self.rules);
        let confidence = overall_confidence(&output.result, &classification, &output.candidates);
        let dominant_layer = output.result.dominant_layer();

        info!(
            company = output.result.company.value.as_deref().unwrap_or("-"),
            position = output.result.position.value.as_deref().unwrap_or("-"),
            status = classification.status.as_str(),
            confidence,
            layer = dominant_layer.map(SourceLayer::as_str).unwrap_or("-"),
            "email parsed"
        );

        EmailParse {
            extraction: output.result,
            classification,
            confidence,
            dominant_layer,
            rules_version: self.rules.version.to_owned(),
        }
    }
}
