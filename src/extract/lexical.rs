//! Lexical-statistical extractor: priority 4, base confidence 80.
//!
//! Keyword/co-occurrence heuristics for when no structural or semantic
//! signal exists: a capitalized phrase directly before "team"/"recruiting"
//! reads as a company; a capitalized phrase ending in a title word
//! ("Engineer", "Analyst", …) reads as a position.

use crate::email::EmailMessage;
use crate::rules::RuleTable;

use super::{apply_rules, FieldCandidate, FieldExtractor, SourceLayer};

/// Keyword co-occurrence extractor.
pub struct LexicalExtractor;

impl FieldExtractor for LexicalExtractor {
    fn layer(&self) -> SourceLayer {
        SourceLayer::Lexical
    }

    fn extract(&self, email: &EmailMessage, rules: &RuleTable) -> Vec<FieldCandidate> {
        let mut text = email.subject.clone();
        let body = email.body_text();
        if !body.is_empty() {
            text.push('\n');
            text.push_str(&body);
        }
        if text.trim().is_empty() {
            return Vec::new();
        }
        apply_rules(&text, &rules.lexical_rules, rules, self.layer())
    }
}
