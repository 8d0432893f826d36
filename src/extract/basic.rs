//! Basic fallback extractor: priority 5, base confidence 70.
//!
//! Last-resort sweep guaranteeing the pipeline always has a final layer to
//! consult: broad "at {Name}" patterns, a bare long-form date scan, and the
//! delivery timestamp as the applied-date guess of last resort. Anything it
//! emits is low confidence by construction.

use crate::email::EmailMessage;
use crate::rules::RuleTable;

use super::{apply_rules, ExtractionField, FieldCandidate, FieldExtractor, SourceLayer};

/// Confidence for the delivery-timestamp applied-date guess.
const RECEIVED_AT_CONFIDENCE: u8 = 60;

/// Last-resort sweep extractor.
pub struct BasicFallbackExtractor;

impl FieldExtractor for BasicFallbackExtractor {
    fn layer(&self) -> SourceLayer {
        SourceLayer::Basic
    }

    fn extract(&self, email: &EmailMessage, rules: &RuleTable) -> Vec<FieldCandidate> {
        let mut text = email.subject.clone();
        let body = email.body_text();
        if !body.is_empty() {
            text.push('\n');
            text.push_str(&body);
        }

        let mut candidates = if text.trim().is_empty() {
            Vec::new()
        } else {
            apply_rules(&text, &rules.basic_rules, rules, self.layer())
        };

        // Application-confirmation emails usually arrive the day the
        // application was submitted, so the delivery timestamp is a usable
        // last-resort date.
        let has_date = candidates
            .iter()
            .any(|c| c.field == ExtractionField::AppliedDate);
        if !has_date {
            if let Some(received) = email.received_at {
                candidates.push(FieldCandidate {
                    field: ExtractionField::AppliedDate,
                    value: received.date_naive().to_string(),
                    confidence: RECEIVED_AT_CONFIDENCE,
                    source: SourceLayer::Basic,
                });
            }
        }

        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn email(subject: &str, body: Option<&str>, received: bool) -> EmailMessage {
        EmailMessage {
            subject: subject.to_owned(),
            sender: "noreply@example.com".to_owned(),
            html_body: None,
            text_body: body.map(str::to_owned),
            received_at: received
                .then(|| Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).single().expect("valid ts")),
        }
    }

    fn value_of(candidates: &[FieldCandidate], field: ExtractionField) -> Option<&str> {
        candidates
            .iter()
            .find(|c| c.field == field)
            .map(|c| c.value.as_str())
    }

    #[test]
    fn broad_at_pattern_catches_company() {
        let rules = RuleTable::builtin();
        let candidates = BasicFallbackExtractor.extract(
            &email("Hello", Some("Good luck with Hooli going forward."), false),
            &rules,
        );
        assert_eq!(value_of(&candidates, ExtractionField::Company), Some("Hooli"));
        assert!(candidates
            .iter()
            .all(|c| c.confidence <= SourceLayer::Basic.base_confidence()));
    }

    #[test]
    fn received_at_becomes_last_resort_date() {
        let rules = RuleTable::builtin();
        let candidates =
            BasicFallbackExtractor.extract(&email("Hello", Some("No dates here."), true), &rules);
        assert_eq!(
            value_of(&candidates, ExtractionField::AppliedDate),
            Some("2025-06-02")
        );
    }

    #[test]
    fn explicit_date_beats_received_at() {
        let rules = RuleTable::builtin();
        let candidates = BasicFallbackExtractor.extract(
            &email("Hello", Some("You applied on June 1, 2025 via our portal."), true),
            &rules,
        );
        assert_eq!(
            value_of(&candidates, ExtractionField::AppliedDate),
            Some("2025-06-01")
        );
    }

    #[test]
    fn empty_email_abstains_completely() {
        let rules = RuleTable::builtin();
        assert!(BasicFallbackExtractor
            .extract(&email("", None, false), &rules)
            .is_empty());
    }
}
