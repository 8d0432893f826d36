//! Static, versioned rule tables.
//!
//! Pure data, no control flow: per-field extraction patterns for each layer
//! of the fallback chain, the capture validity filter, sender-domain ignore
//! lists, and the per-status indicator sets used by the classifier. Compiled
//! once via [`RuleTable::builtin`] and shared read-only across ingestion
//! calls (typically behind an `Arc`).

pub mod status;

use regex::Regex;
use tracing::warn;

use crate::extract::ExtractionField;

/// Version tag reported alongside parse results, bumped when rules change.
pub const RULES_VERSION: &str = "2025.08";

/// Longest capture accepted as a company or position value.
const MAX_CAPTURE_CHARS: usize = 60;

/// One compiled extraction pattern for a single field.
///
/// `confidence` is the local confidence a match at this rule earns; it never
/// exceeds the base confidence of the layer the rule belongs to.
#[derive(Debug)]
pub struct FieldRule {
    /// Stable rule name for logging and per-rule tests.
    pub name: &'static str,
    /// Compiled pattern with exactly one capture group.
    pub pattern: Regex,
    /// The field a match populates.
    pub field: ExtractionField,
    /// Local confidence of a match, in [0,100].
    pub confidence: u8,
}

/// Captures that are grammatical filler rather than a real company/position.
///
/// Compared against the cleaned, lowercased capture as a whole value.
const STOP_PHRASES: &[&str] = &[
    "our",
    "our team",
    "our company",
    "us",
    "you",
    "your",
    "me",
    "them",
    "it",
    "everyone",
    "the team",
    "the company",
    "the position",
    "the role",
    "this role",
    "this position",
    "this email",
    "the following",
    // Generic headings that show up emphasized in HTML bodies.
    "next steps",
    "thank you",
    "what's next",
    "what happens next",
    "application received",
    "application update",
    "important update",
    "interview invitation",
    "dear candidate",
];

/// Leading words that mark a capture as a pronoun phrase, not a name.
const STOP_LEAD_WORDS: &[&str] = &["our", "your", "my", "their", "his", "her", "its"];

/// Sender domains that identify recruiting platforms or mail providers,
/// never the hiring company itself.
const IGNORED_SENDER_DOMAINS: &[&str] = &[
    "greenhouse",
    "lever",
    "workday",
    "myworkday",
    "taleo",
    "smartrecruiters",
    "icims",
    "jobvite",
    "ashbyhq",
    "bamboohr",
    "indeed",
    "linkedin",
    "glassdoor",
    "monster",
    "gmail",
    "googlemail",
    "outlook",
    "hotmail",
    "yahoo",
    "icloud",
    "proton",
];

/// Suffix words trimmed off a sender display name before treating the
/// remainder as a company name ("Riot Games Recruiting" -> "Riot Games").
const DISPLAY_NAME_SUFFIXES: &[&str] = &[
    "recruiting",
    "recruitment",
    "careers",
    "talent",
    "talent acquisition",
    "hiring",
    "team",
    "hr",
    "people",
    "jobs",
    "notifications",
    "no reply",
    "noreply",
];

/// The full read-only rule set injected into extractors and the classifier.
#[derive(Debug)]
pub struct RuleTable {
    /// Rules version tag.
    pub version: &'static str,
    /// High-precision subject-line templates (layer 1).
    pub subject_rules: Vec<FieldRule>,
    /// Body/structural cue patterns (layer 2).
    pub structural_rules: Vec<FieldRule>,
    /// Keyword/co-occurrence heuristics (layer 4).
    pub lexical_rules: Vec<FieldRule>,
    /// Last-resort sweep patterns (layer 5).
    pub basic_rules: Vec<FieldRule>,
    /// Matches emphasized HTML fragments (headings, bold spans) whose inner
    /// text the structural layer inspects.
    pub html_emphasis: Option<Regex>,
    /// Per-status indicator sets for the classifier.
    pub indicators: Vec<status::IndicatorSet>,
}

impl RuleTable {
    /// Build the builtin rule set, compiling every pattern.
    ///
    /// A pattern that fails to compile is skipped with a warning rather than
    /// aborting; the layer it belonged to simply matches less. A unit test
    /// pins the expected rule counts so a regression cannot slip in silently.
    pub fn builtin() -> Self {
        Self {
            version: RULES_VERSION,
            subject_rules: compile(SUBJECT_RULES),
            structural_rules: compile(STRUCTURAL_RULES),
            lexical_rules: compile(LEXICAL_RULES),
            basic_rules: compile(BASIC_RULES),
            html_emphasis: match Regex::new(r"(?is)<(?:h1|h2|h3|strong|b)\b[^>]*>(.*?)<") {
                Ok(regex) => Some(regex),
                Err(e) => {
                    warn!(error = %e, "skipping html emphasis pattern");
                    None
                }
            },
            indicators: status::builtin_indicator_sets(),
        }
    }

    /// Clean and validate a captured company/position value.
    ///
    /// Returns the cleaned value, or `None` when the capture is a pronoun
    /// phrase, stop phrase, over-long, or does not start with an uppercase
    /// letter, in which case the rule abstains rather than emitting a
    /// low-quality guess.
    pub fn validate_capture(&self, raw: &str) -> Option<String> {
        let cleaned = raw
            .trim()
            .trim_end_matches(['.', ',', '!', '?', ';', ':'])
            .trim()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");
        if cleaned.is_empty() || cleaned.chars().count() > MAX_CAPTURE_CHARS {
            return None;
        }
        if !cleaned.chars().next().is_some_and(|c| c.is_uppercase()) {
            return None;
        }
        let lower = cleaned.to_lowercase();
        if STOP_PHRASES.contains(&lower.as_str()) {
            return None;
        }
        let first_word = lower.split_whitespace().next().unwrap_or_default();
        if STOP_LEAD_WORDS.contains(&first_word) {
            return None;
        }
        Some(cleaned)
    }

    /// Whether a sender domain belongs to a recruiting platform or generic
    /// mail provider (and so says nothing about the hiring company).
    pub fn is_ignored_sender_domain(&self, domain: &str) -> bool {
        let first_label = domain.split('.').next().unwrap_or(domain);
        IGNORED_SENDER_DOMAINS.contains(&first_label)
    }

    /// Strip recruiting boilerplate suffixes from a sender display name.
    ///
    /// Returns `None` when nothing usable remains.
    pub fn clean_display_name(&self, name: &str) -> Option<String> {
        let mut cleaned = name.trim().to_owned();
        loop {
            let lower = cleaned.to_lowercase();
            let Some(suffix) = DISPLAY_NAME_SUFFIXES
                .iter()
                .find(|s| lower.ends_with(*s) && lower.len() > s.len())
            else {
                break;
            };
            let cut = cleaned.len().saturating_sub(suffix.len());
            cleaned = cleaned[..cut].trim().trim_end_matches(['-', '|', ',']).trim().to_owned();
        }
        let lower = cleaned.to_lowercase();
        if DISPLAY_NAME_SUFFIXES.contains(&lower.as_str()) {
            return None;
        }
        self.validate_capture(&cleaned)
    }
}

/// Source tuple for a [`FieldRule`]: (name, pattern, field, confidence).
type RuleSpec = (&'static str, &'static str, ExtractionField, u8);

fn compile(specs: &[RuleSpec]) -> Vec<FieldRule> {
    specs
        .iter()
        .copied()
        .filter_map(|(name, pattern, field, confidence)| match Regex::new(pattern) {
            Ok(regex) => Some(FieldRule {
                name,
                pattern: regex,
                field,
                confidence,
            }),
            Err(e) => {
                warn!(rule = name, error = %e, "skipping rule with invalid pattern");
                None
            }
        })
        .collect()
}

// Patterns that must respect capitalization avoid `(?i)` and spell out the
// keyword cases instead; `[A-Z]` under `(?i)` would match lowercase too.

const SUBJECT_RULES: &[RuleSpec] = &[
    (
        "subject:thanks-for-applying",
        r"(?i)thank you for applying (?:to|at|for|with) ([^!.,;\r\n]+)",
        ExtractionField::Company,
        98,
    ),
    (
        "subject:here-at",
        r"(?i)here at ([^!.,;\r\n]+)",
        ExtractionField::Company,
        98,
    ),
    (
        "subject:your-application-to",
        r"(?i)your application (?:to|at|with) ([^!.,;\r\n]+)",
        ExtractionField::Company,
        96,
    ),
    (
        "subject:interest-in",
        r"(?i)your interest in (?:joining )?([^!.,;\r\n]+)",
        ExtractionField::Company,
        95,
    ),
    (
        "subject:received-dash-position",
        r"(?i)application (?:received|confirmed|submitted|update)\s*[-:\u{2013}\u{2014}]\s*([^!.,;\r\n]+)",
        ExtractionField::Position,
        96,
    ),
    (
        "subject:for-the-position",
        r"[Ff]or (?:the )?([A-Z][^!.,;\r\n]*?) (?:[Pp]osition|[Rr]ole|[Oo]pening)",
        ExtractionField::Position,
        95,
    ),
];

const STRUCTURAL_RULES: &[RuleSpec] = &[
    (
        "structural:here-at",
        r"[Hh]ere at ([A-Z][\w&.'-]*(?: [A-Z][\w&.'-]*){0,3})",
        ExtractionField::Company,
        90,
    ),
    (
        "structural:joining",
        r"[Jj]oin(?:ing)? ([A-Z][\w&.'-]*(?: [A-Z][\w&.'-]*){0,3})",
        ExtractionField::Company,
        88,
    ),
    (
        "structural:the-x-team",
        r"[Tt]he ([A-Z][\w&.'-]*(?: [A-Z][\w&.'-]*){0,3}) (?:team|recruiting team|talent team)",
        ExtractionField::Company,
        86,
    ),
    (
        "structural:position-of",
        r"(?:[Pp]osition|[Rr]ole) of (?:the )?([A-Z][A-Za-z /&-]{2,50}?)(?:[.,!;]|$)",
        ExtractionField::Position,
        88,
    ),
    (
        "structural:for-the-position",
        r"[Ff]or the ([A-Z][A-Za-z /&-]{2,50}?) (?:position|role|opening)",
        ExtractionField::Position,
        88,
    ),
    (
        "structural:your-x-application",
        r"[Yy]our ([A-Z][A-Za-z /&-]{2,50}?) application",
        ExtractionField::Position,
        84,
    ),
    (
        "structural:submitted-on-date",
        r"(?i)(?:applied|submitted|received)(?: your application)?(?: on| at)? (\w+ \d{1,2},? \d{4})",
        ExtractionField::AppliedDate,
        88,
    ),
    (
        "structural:iso-date",
        r"\b(\d{4}-\d{2}-\d{2})\b",
        ExtractionField::AppliedDate,
        80,
    ),
];

const LEXICAL_RULES: &[RuleSpec] = &[
    (
        "lexical:name-before-team",
        r"\b(?:[Tt]he )?([A-Z][\w&.']*(?: [A-Z][\w&.']*){0,3}) (?:team|recruiting|careers|talent acquisition|hiring team)\b",
        ExtractionField::Company,
        78,
    ),
    (
        "lexical:title-phrase",
        r"\b((?:[A-Z][\w+#]*[ /-]){0,4}(?:Engineer|Engineering|Developer|Programmer|Manager|Analyst|Designer|Scientist|Intern|Internship|Consultant|Architect|Specialist|Coordinator|Director|Researcher)(?:[ /-][A-Z]\w*){0,2})\b",
        ExtractionField::Position,
        76,
    ),
];

const BASIC_RULES: &[RuleSpec] = &[
    (
        "basic:at-with-join",
        r"\b(?:[Aa]t|[Ww]ith|[Ff]rom) ([A-Z][\w&.']+(?: [A-Z][\w&.']+){0,2})",
        ExtractionField::Company,
        70,
    ),
    (
        "basic:as-a",
        r"\b[Aa]s an? ([A-Z][A-Za-z /&-]{2,40}?)(?:[.,!;]|$)",
        ExtractionField::Position,
        68,
    ),
    (
        "basic:long-date",
        r"\b(\w+ \d{1,2}, \d{4})\b",
        ExtractionField::AppliedDate,
        64,
    ),
];
