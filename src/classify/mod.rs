//! Lifecycle status classifier.
//!
//! Scores the email against each status's weighted indicator set and picks a
//! single terminal status per email. Rejection evidence dominates: a false
//! "still in process" answer silently ghosts the user, while a false
//! rejection is visible and correctable, so any rejection score above its
//! threshold wins outright. Both thresholds are tunable rather than
//! hardcoded.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::email::EmailMessage;
use crate::rules::status::IndicatorSet;
use crate::rules::RuleTable;

/// The closed set of terminal lifecycle statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    /// Application submitted and acknowledged.
    Applied,
    /// Interview or assessment in progress.
    Interview,
    /// An offer was extended.
    Offer,
    /// The application was declined.
    Rejected,
    /// The email is not about a job application.
    NotJobRelated,
}

impl ApplicationStatus {
    /// Stable name for logs and output.
    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::Offer => "offer",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::NotJobRelated => "not_job_related",
        }
    }
}

/// Tie-break preference among statuses with equal evidence: `Applied` is the
/// most conservative claim, so it wins exact ties. `Rejected` sits last here
/// but also dominates outright once it clears its own threshold.
const TIE_PREFERENCE: [ApplicationStatus; 4] = [
    ApplicationStatus::Applied,
    ApplicationStatus::Interview,
    ApplicationStatus::Offer,
    ApplicationStatus::Rejected,
];

/// Confidence reported for `NotJobRelated` when the email carries zero job
/// signals anywhere.
const SILENT_EMAIL_CONFIDENCE: u8 = 90;

/// The classifier's decision with its explainability trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusClassification {
    /// The winning status.
    pub status: ApplicationStatus,
    /// Confidence in [0,100], derived from matched vs. saturating weight.
    pub confidence: u8,
    /// The phrases that drove the decision.
    pub indicators: Vec<String>,
}

/// Score thresholds; see the crate config for the tunable surface.
#[derive(Debug, Clone, Copy)]
pub struct ClassifierThresholds {
    /// Minimum matched weight for any status to beat `NotJobRelated`.
    pub status_threshold: u32,
    /// Matched rejection weight at which rejection dominates everything.
    pub rejection_threshold: u32,
}

impl Default for ClassifierThresholds {
    fn default() -> Self {
        Self {
            status_threshold: 2,
            rejection_threshold: 2,
        }
    }
}

/// Single-shot status classifier over the rule table's indicator sets.
#[derive(Debug, Clone, Default)]
pub struct StatusClassifier {
    thresholds: ClassifierThresholds,
}

/// Matched evidence for one status.
struct StatusScore<'a> {
    set: &'a IndicatorSet,
    matched: Vec<&'static str>,
    score: u32,
}

impl StatusClassifier {
    /// Create a classifier with the given thresholds.
    pub fn new(thresholds: ClassifierThresholds) -> Self {
        Self { thresholds }
    }

    /// Classify one email. Never fails; no signal means `NotJobRelated`.
    pub fn classify(&self, email: &EmailMessage, rules: &RuleTable) -> StatusClassification {
        let text = email.searchable_text();
        let scores: Vec<StatusScore<'_>> = rules
            .indicators
            .iter()
            .map(|set| score_set(set, &text))
            .collect();

        // Rejection dominates once it clears its own threshold, regardless
        // of what else matched. Below that it still competes on score like
        // any other status.
        if let Some(rejected) = scores
            .iter()
            .find(|s| s.set.status == ApplicationStatus::Rejected)
            .filter(|s| s.score >= self.thresholds.rejection_threshold)
        {
            return decision(rejected);
        }

        let winner = TIE_PREFERENCE
            .iter()
            .filter_map(|status| scores.iter().find(|s| s.set.status == *status))
            .filter(|s| s.score >= self.thresholds.status_threshold)
            // max_by picks the last of equal elements; reversed comparison
            // plus min_by would too. Scan manually to keep the preference
            // order authoritative on exact ties.
            .fold(None::<&StatusScore<'_>>, |best, s| match best {
                None => Some(s),
                Some(b)
                    if s.score > b.score
                        || (s.score == b.score && s.matched.len() > b.matched.len()) =>
                {
                    Some(s)
                }
                Some(b) => Some(b),
            });

        match winner {
            Some(score) => decision(score),
            None => {
                let total: u32 = scores.iter().map(|s| s.score).sum();
                debug!(total_signal = total, "no status cleared its threshold");
                StatusClassification {
                    status: ApplicationStatus::NotJobRelated,
                    confidence: SILENT_EMAIL_CONFIDENCE
                        .saturating_sub(u8::try_from(total.saturating_mul(15).min(60)).unwrap_or(60)),
                    indicators: Vec::new(),
                }
            }
        }
    }
}

fn score_set<'a>(set: &'a IndicatorSet, text: &str) -> StatusScore<'a> {
    let mut matched = Vec::new();
    let mut score: u32 = 0;
    for indicator in set.indicators {
        if text.contains(indicator.phrase) {
            matched.push(indicator.phrase);
            score = score.saturating_add(indicator.weight);
        }
    }
    StatusScore { set, matched, score }
}

fn decision(score: &StatusScore<'_>) -> StatusClassification {
    let pct = score
        .score
        .saturating_mul(100)
        .checked_div(score.set.saturation_weight)
        .unwrap_or(0)
        .min(100);
    StatusClassification {
        status: score.set.status,
        confidence: u8::try_from(pct).unwrap_or(100),
        indicators: score.matched.iter().map(|p| (*p).to_owned()).collect(),
    }
}
