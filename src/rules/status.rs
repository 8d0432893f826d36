//! Per-status indicator sets for the lifecycle classifier.
//!
//! Each set pairs a lifecycle status with a curated phrase list. Phrases are
//! stored lowercase and matched by substring against the lowercased
//! subject+body. Weights express specificity: 1 for suggestive phrases, 2 for
//! strong ones, 3 for near-certain ones.

use crate::classify::ApplicationStatus;

/// A weighted phrase contributing evidence toward one status.
#[derive(Debug, Clone, Copy)]
pub struct Indicator {
    /// Lowercase phrase matched by substring.
    pub phrase: &'static str,
    /// Evidence weight (1 = suggestive, 3 = near-certain).
    pub weight: u32,
}

/// All indicators for one lifecycle status.
#[derive(Debug)]
pub struct IndicatorSet {
    /// The status this set scores.
    pub status: ApplicationStatus,
    /// Weighted phrases.
    pub indicators: &'static [Indicator],
    /// Matched weight at which the status confidence saturates at 100.
    ///
    /// Confidence is `matched_weight / saturation_weight`, capped; a set
    /// never needs every phrase to match before it is fully trusted.
    pub saturation_weight: u32,
}

macro_rules! indicators {
    ($(($phrase:literal, $weight:literal)),* $(,)?) => {
        &[$(Indicator { phrase: $phrase, weight: $weight }),*]
    };
}

const APPLIED: &[Indicator] = indicators![
    ("thank you for applying", 2),
    ("thank you for your application", 2),
    ("thank you for submitting", 2),
    ("application received", 2),
    ("application has been received", 2),
    ("we have received your application", 2),
    ("application has been submitted", 2),
    ("successfully submitted", 2),
    ("your application to", 1),
    ("thank you for your interest", 1),
    ("will review your application", 1),
    ("under review", 1),
    ("will be in touch", 1),
];

const INTERVIEW: &[Indicator] = indicators![
    ("schedule your interview", 3),
    ("interview invitation", 3),
    ("invite you to interview", 3),
    ("phone screen", 2),
    ("schedule a call", 2),
    ("interview", 2),
    ("technical assessment", 2),
    ("online assessment", 2),
    ("coding challenge", 2),
    ("hiring manager would like", 2),
    ("your availability", 1),
    ("meet with", 1),
    ("next steps", 1),
];

const OFFER: &[Indicator] = indicators![
    ("pleased to offer", 3),
    ("offer letter", 3),
    ("job offer", 3),
    ("extend an offer", 3),
    ("offer of employment", 3),
    ("accept the position", 2),
    ("congratulations", 2),
    ("welcome to the team", 2),
    ("compensation package", 1),
    ("start date", 1),
];

const REJECTED: &[Indicator] = indicators![
    ("not been selected", 3),
    ("pursue another candidate", 3),
    ("pursue other candidates", 3),
    ("regret to inform", 3),
    ("no longer under consideration", 3),
    ("unfortunately", 2),
    ("not move forward", 2),
    ("not moving forward", 2),
    ("not to move forward", 2),
    ("decided not to", 2),
    ("other candidates", 2),
    ("not the right fit", 2),
    ("position has been filled", 2),
    ("wish you the best", 1),
    ("future opportunities", 1),
    ("keep your resume on file", 1),
];

/// The builtin indicator sets, one per terminal status.
///
/// `NotJobRelated` has no set: it is the default when nothing clears its
/// threshold, not a status that accumulates evidence.
pub fn builtin_indicator_sets() -> Vec<IndicatorSet> {
    vec![
        IndicatorSet {
            status: ApplicationStatus::Rejected,
            indicators: REJECTED,
            saturation_weight: 5,
        },
        IndicatorSet {
            status: ApplicationStatus::Offer,
            indicators: OFFER,
            saturation_weight: 5,
        },
        IndicatorSet {
            status: ApplicationStatus::Interview,
            indicators: INTERVIEW,
            saturation_weight: 4,
        },
        IndicatorSet {
            status: ApplicationStatus::Applied,
            indicators: APPLIED,
            saturation_weight: 4,
        },
    ]
}
