//! Field extraction: candidate types, the layer trait, and the fallback
//! pipeline.
//!
//! Five layers are tried in decreasing reliability order:
//! subject-line templates, structural cues, semantic (AI) context, lexical
//! heuristics, and a basic sweep. Each layer is a pure function from
//! `(EmailMessage, RuleTable)` to zero or more [`FieldCandidate`]s and never
//! fails; an unmatched email yields an empty list.

pub mod basic;
pub mod context;
pub mod lexical;
pub mod pipeline;
pub mod structural;
pub mod subject;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::email::EmailMessage;
use crate::rules::{FieldRule, RuleTable};

pub use pipeline::ExtractionPipeline;

/// The structured fields the pipeline extracts from an email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionField {
    /// Hiring company name.
    Company,
    /// Job title / role.
    Position,
    /// Date the application was submitted.
    AppliedDate,
}

/// One extraction layer, ordered by decreasing reliability.
///
/// The declaration order is the pipeline's priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceLayer {
    /// High-precision subject-line templates.
    SubjectLine,
    /// HTML/text structural cues and sender heuristics.
    Structural,
    /// Whole-email semantic extraction via the remote adapter.
    AiContext,
    /// Keyword/co-occurrence heuristics.
    Lexical,
    /// Last-resort regex sweep.
    Basic,
}

impl SourceLayer {
    /// All layers in priority order.
    pub const ALL: [SourceLayer; 5] = [
        SourceLayer::SubjectLine,
        SourceLayer::Structural,
        SourceLayer::AiContext,
        SourceLayer::Lexical,
        SourceLayer::Basic,
    ];

    /// The base confidence of the layer; no candidate it emits exceeds this.
    pub fn base_confidence(self) -> u8 {
        match self {
            SourceLayer::SubjectLine => 98,
            SourceLayer::Structural => 90,
            SourceLayer::AiContext => 85,
            SourceLayer::Lexical => 80,
            SourceLayer::Basic => 70,
        }
    }

    /// Stable name for logs and provenance output.
    pub fn as_str(self) -> &'static str {
        match self {
            SourceLayer::SubjectLine => "subject_line",
            SourceLayer::Structural => "structural",
            SourceLayer::AiContext => "ai_context",
            SourceLayer::Lexical => "lexical",
            SourceLayer::Basic => "basic",
        }
    }
}

/// A single candidate value for one field, produced by one layer.
///
/// Immutable once created; the pipeline copies accepted candidates into the
/// result rather than mutating them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCandidate {
    /// The field this candidate populates.
    pub field: ExtractionField,
    /// The extracted value, already cleaned. Dates are ISO `YYYY-MM-DD`.
    pub value: String,
    /// Local confidence in [0,100].
    pub confidence: u8,
    /// The layer that produced the candidate.
    pub source: SourceLayer,
}

/// The accepted outcome for one field: value, confidence, and provenance.
///
/// All-layers-abstain is represented as `value: None` with confidence 0 and
/// no source, never a fabricated placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldOutcome<T> {
    /// The accepted value, if any layer produced one.
    pub value: Option<T>,
    /// Confidence of the accepted candidate, 0 when absent.
    pub confidence: u8,
    /// The layer whose candidate was accepted.
    pub source: Option<SourceLayer>,
}

impl<T> FieldOutcome<T> {
    /// The all-abstained outcome.
    pub fn absent() -> Self {
        Self {
            value: None,
            confidence: 0,
            source: None,
        }
    }
}

/// The full extraction result handed to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Hiring company.
    pub company: FieldOutcome<String>,
    /// Job title.
    pub position: FieldOutcome<String>,
    /// Application date.
    pub applied_date: FieldOutcome<NaiveDate>,
}

impl ExtractionResult {
    /// Fraction of the three fields that are present, as 0, 33, 67, or 100.
    pub fn completeness_pct(&self) -> u8 {
        let present = [
            self.company.value.is_some(),
            self.position.value.is_some(),
            self.applied_date.value.is_some(),
        ]
        .iter()
        .filter(|p| **p)
        .count();
        match present {
            0 => 0,
            1 => 33,
            2 => 67,
            _ => 100,
        }
    }

    /// The highest-priority layer that supplied an accepted field, if any.
    pub fn dominant_layer(&self) -> Option<SourceLayer> {
        [
            self.company.source,
            self.position.source,
            self.applied_date.source,
        ]
        .into_iter()
        .flatten()
        .min()
    }
}

/// A deterministic extraction layer: pure, synchronous, never panics.
///
/// The semantic (AI) layer is not a `FieldExtractor`; it suspends on the
/// network and is driven by the pipeline through the adapter boundary
/// instead.
pub trait FieldExtractor: Send + Sync {
    /// Which layer this extractor implements.
    fn layer(&self) -> SourceLayer;

    /// Produce zero or more candidates for the email.
    fn extract(&self, email: &EmailMessage, rules: &RuleTable) -> Vec<FieldCandidate>;
}

/// Run a rule list over a text, emitting the first valid capture per rule.
///
/// Company/position captures go through the rule table's validity filter;
/// date captures are normalized to ISO instead and dropped when unparseable.
pub(crate) fn apply_rules(
    text: &str,
    rules_list: &[FieldRule],
    table: &RuleTable,
    layer: SourceLayer,
) -> Vec<FieldCandidate> {
    let mut out = Vec::new();
    for rule in rules_list {
        // A rule's first match can be junk that fails validation while a
        // later match is fine; keep scanning until one passes.
        let value = rule.pattern.captures_iter(text).find_map(|captures| {
            let raw = captures.get(1)?.as_str();
            match rule.field {
                ExtractionField::AppliedDate => parse_date_loose(raw).map(|d| d.to_string()),
                _ => table.validate_capture(raw),
            }
        });
        if let Some(value) = value {
            out.push(FieldCandidate {
                field: rule.field,
                value,
                confidence: rule.confidence.min(layer.base_confidence()),
                source: layer,
            });
        }
    }
    out
}

/// Parse a human-written date into a [`NaiveDate`], trying the formats that
/// show up in application emails.
pub fn parse_date_loose(raw: &str) -> Option<NaiveDate> {
    let cleaned = raw.trim().trim_end_matches(['.', ',']).replace(',', "");
    const FORMATS: &[&str] = &[
        "%Y-%m-%d",
        "%B %d %Y",
        "%b %d %Y",
        "%d %B %Y",
        "%m/%d/%Y",
    ];
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&cleaned, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layer_priority_order_matches_reliability() {
        let confidences: Vec<u8> = SourceLayer::ALL
            .iter()
            .map(|l| l.base_confidence())
            .collect();
        let mut sorted = confidences.clone();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(confidences, sorted);
        assert!(SourceLayer::SubjectLine < SourceLayer::Basic);
    }

    #[test]
    fn parse_date_loose_accepts_common_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 3, 14);
        assert_eq!(parse_date_loose("2025-03-14"), expected);
        assert_eq!(parse_date_loose("March 14, 2025"), expected);
        assert_eq!(parse_date_loose("Mar 14 2025"), expected);
        assert_eq!(parse_date_loose("03/14/2025"), expected);
        assert_eq!(parse_date_loose("yesterday"), None);
    }

    #[test]
    fn rule_scan_skips_invalid_matches() {
        // The first date-shaped token is not a real date; the scan must
        // move on to the one that parses.
        let table = crate::rules::RuleTable::builtin();
        let candidates = apply_rules(
            "Reference 2025-77-99, submitted 2025-03-14.",
            &table.structural_rules,
            &table,
            SourceLayer::Structural,
        );
        let date = candidates
            .iter()
            .find(|c| c.field == ExtractionField::AppliedDate)
            .map(|c| c.value.as_str());
        assert_eq!(date, Some("2025-03-14"));
    }

    #[test]
    fn completeness_buckets() {
        let mut result = ExtractionResult {
            company: FieldOutcome::absent(),
            position: FieldOutcome::absent(),
            applied_date: FieldOutcome::absent(),
        };
        assert_eq!(result.completeness_pct(), 0);
        result.company = FieldOutcome {
            value: Some("Acme".to_owned()),
            confidence: 90,
            source: Some(SourceLayer::SubjectLine),
        };
        assert_eq!(result.completeness_pct(), 33);
    }

    #[test]
    fn dominant_layer_is_highest_priority_source() {
        let result = ExtractionResult {
            company: FieldOutcome {
                value: Some("Acme".to_owned()),
                confidence: 90,
                source: Some(SourceLayer::Structural),
            },
            position: FieldOutcome {
                value: Some("Engineer".to_owned()),
                confidence: 70,
                source: Some(SourceLayer::Basic),
            },
            applied_date: FieldOutcome::absent(),
        };
        assert_eq!(result.dominant_layer(), Some(SourceLayer::Structural));
    }
}
