//! Overall-confidence aggregation.
//!
//! Combines field-level and classifier-level signals into the single number
//! reported to the caller: 25% each for the company and position fields,
//! 20% for the status classification, 15% for completeness, and a 15%
//! agreement bonus when two independent layers produced the same company.

use crate::classify::StatusClassification;
use crate::extract::{ExtractionField, ExtractionResult, FieldCandidate};

const COMPANY_WEIGHT: u32 = 25;
const POSITION_WEIGHT: u32 = 25;
const STATUS_WEIGHT: u32 = 20;
const COMPLETENESS_WEIGHT: u32 = 15;
const AGREEMENT_WEIGHT: u32 = 15;

/// Compute the overall confidence in [0,100].
///
/// `candidates` is the full candidate list the pipeline gathered, used to
/// detect cross-layer agreement on the company value.
pub fn overall_confidence(
    extraction: &ExtractionResult,
    classification: &StatusClassification,
    candidates: &[FieldCandidate],
) -> u8 {
    let agreement: u32 = if layers_agree_on_company(candidates) { 100 } else { 0 };
    let weighted = u32::from(extraction.company.confidence)
        .saturating_mul(COMPANY_WEIGHT)
        .saturating_add(u32::from(extraction.position.confidence).saturating_mul(POSITION_WEIGHT))
        .saturating_add(u32::from(classification.confidence).saturating_mul(STATUS_WEIGHT))
        .saturating_add(
            u32::from(extraction.completeness_pct()).saturating_mul(COMPLETENESS_WEIGHT),
        )
        .saturating_add(agreement.saturating_mul(AGREEMENT_WEIGHT));
    let pct = weighted.checked_div(100).unwrap_or(0).min(100);
    u8::try_from(pct).unwrap_or(100)
}

/// Whether two distinct layers produced the same company value
/// (case-insensitive comparison of cleaned candidates).
fn layers_agree_on_company(candidates: &[FieldCandidate]) -> bool {
    let companies: Vec<(&FieldCandidate, String)> = candidates
        .iter()
        .filter(|c| c.field == ExtractionField::Company)
        .map(|c| (c, c.value.to_lowercase()))
        .collect();
    for (i, (a, a_value)) in companies.iter().enumerate() {
        for (b, b_value) in companies.iter().skip(i.saturating_add(1)) {
            if a.source != b.source && a_value == b_value {
                return true;
            }
        }
    }
    false
}
