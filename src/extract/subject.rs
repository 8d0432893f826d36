//! Subject-line extractor: priority 1, base confidence 98.
//!
//! Matches high-precision subject templates ("Thank you for applying to
//! {Company}!"). Captures go through the validity filter; on failure the
//! layer abstains for that field rather than emitting a low-quality guess,
//! which is what lets the pipeline auto-accept anything it does emit.

use crate::email::EmailMessage;
use crate::rules::RuleTable;

use super::{apply_rules, FieldCandidate, FieldExtractor, SourceLayer};

/// Subject-line template extractor.
pub struct SubjectLineExtractor;

impl FieldExtractor for SubjectLineExtractor {
    fn layer(&self) -> SourceLayer {
        SourceLayer::SubjectLine
    }

    fn extract(&self, email: &EmailMessage, rules: &RuleTable) -> Vec<FieldCandidate> {
        if email.subject.trim().is_empty() {
            return Vec::new();
        }
        apply_rules(&email.subject, &rules.subject_rules, rules, self.layer())
    }
}
