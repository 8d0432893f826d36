//! Structural extractor: priority 2, base confidence 90.
//!
//! Reads the cues an email's structure exposes: body phrasing around the
//! company and role, emphasized HTML fragments (headings, bold spans), the
//! sender display name, and the sender domain. The domain heuristic skips
//! recruiting platforms and mail providers, which identify the pipe the mail
//! came through rather than the hiring company.

use crate::email::{strip_html_tags, EmailMessage};
use crate::rules::RuleTable;

use super::{apply_rules, ExtractionField, FieldCandidate, FieldExtractor, SourceLayer};

/// Confidence for a company taken from the sender display name.
const DISPLAY_NAME_CONFIDENCE: u8 = 88;
/// Confidence for a company read out of an emphasized HTML fragment.
const EMPHASIS_CONFIDENCE: u8 = 82;
/// Confidence for a company derived from the sender domain.
const SENDER_DOMAIN_CONFIDENCE: u8 = 72;
/// Emphasized fragments longer than this are prose, not a name.
const MAX_EMPHASIS_WORDS: usize = 4;

/// Structural cue extractor.
pub struct StructuralExtractor;

impl FieldExtractor for StructuralExtractor {
    fn layer(&self) -> SourceLayer {
        SourceLayer::Structural
    }

    fn extract(&self, email: &EmailMessage, rules: &RuleTable) -> Vec<FieldCandidate> {
        let mut candidates = Vec::new();

        // Sender display name, cleaned of recruiting boilerplate, is the
        // strongest structural company signal.
        if let Some(name) = email
            .sender_display_name()
            .and_then(|name| rules.clean_display_name(&name))
        {
            candidates.push(company(name, DISPLAY_NAME_CONFIDENCE));
        }

        // Body phrasing cues.
        let body = email.body_text();
        if !body.is_empty() {
            candidates.extend(apply_rules(&body, &rules.structural_rules, rules, self.layer()));
        }

        // Emphasized HTML fragments: run the same cues over them, and accept
        // a short name-like fragment as a company on its own.
        if let (Some(html), Some(emphasis)) = (email.html_body.as_deref(), &rules.html_emphasis) {
            for captures in emphasis.captures_iter(html) {
                let Some(fragment) = captures.get(1).map(|m| strip_html_tags(m.as_str())) else {
                    continue;
                };
                candidates.extend(apply_rules(
                    &fragment,
                    &rules.structural_rules,
                    rules,
                    self.layer(),
                ));
                if let Some(name) = name_like_fragment(&fragment, rules) {
                    candidates.push(company(name, EMPHASIS_CONFIDENCE));
                }
            }
        }

        // Sender domain, lowest-trust structural signal.
        if let Some(domain) = email.sender_domain() {
            if !rules.is_ignored_sender_domain(&domain) {
                if let Some(name) = company_from_domain(&domain) {
                    candidates.push(company(name, SENDER_DOMAIN_CONFIDENCE));
                }
            }
        }

        candidates
    }
}

fn company(value: String, confidence: u8) -> FieldCandidate {
    FieldCandidate {
        field: ExtractionField::Company,
        value,
        confidence,
        source: SourceLayer::Structural,
    }
}

/// Accept an emphasized fragment as a company name only when it reads like
/// one: short, every word capitalized, no digits, and past the stop filter.
fn name_like_fragment(fragment: &str, rules: &RuleTable) -> Option<String> {
    let cleaned = rules.validate_capture(fragment)?;
    let words: Vec<&str> = cleaned.split_whitespace().collect();
    if words.is_empty() || words.len() > MAX_EMPHASIS_WORDS {
        return None;
    }
    let name_like = words.iter().all(|w| {
        w.chars().next().is_some_and(|c| c.is_uppercase() || c == '&')
            && !w.chars().any(|c| c.is_ascii_digit())
    });
    if name_like {
        Some(cleaned)
    } else {
        None
    }
}

/// Capitalize the first label of a sender domain: `janestreet.com` -> `Janestreet`.
fn company_from_domain(domain: &str) -> Option<String> {
    let label = domain.split('.').next()?;
    if label.len() < 3 || !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
        return None;
    }
    let mut chars = label.chars();
    let first = chars.next()?;
    Some(first.to_uppercase().chain(chars).collect())
}
