//! Profile ring score
//!
//! A 0-100 display score. Each activity category is dampened
//! logarithmically so early contributions move the ring quickly and large
//! counts flatten out. It is never used for ranking or rewards.

use super::activity::ActivityCounts;

/// Highest ring value
pub const RING_MAX: u8 = 100;

const PAGE_FACTOR: f64 = 15.0;
const PAGE_BASE: f64 = 10.0;
const EDIT_FACTOR: f64 = 8.0;
const EDIT_BASE: f64 = 5.0;
const CONTRIBUTION_FACTOR: f64 = 8.0;
const CONTRIBUTION_BASE: f64 = 5.0;
const COMMENT_FACTOR: f64 = 7.0;
const COMMENT_BASE: f64 = 8.0;
const TENURE_FACTOR: f64 = 10.0;
const TENURE_BASE: f64 = 50.0;

/// `ln(value + 1) / ln(base)`, or 0 for a zero value
pub fn dampen(value: u64, base: f64) -> f64 {
    if value == 0 {
        return 0.0;
    }
    (value as f64 + 1.0).ln() / base.ln()
}

/// Ring score for a set of counts, clamped to `[0, 100]`
///
/// Tenure only contributes once the user has at least one edit or comment
/// slot, so dormant accounts do not fill their ring by ageing.
pub fn ring_score(counts: &ActivityCounts) -> u8 {
    let has_activity = counts.edit_slots > 0 || counts.comment_slots > 0;

    let mut raw = PAGE_FACTOR * dampen(counts.pages_created, PAGE_BASE)
        + EDIT_FACTOR * dampen(counts.edit_slots, EDIT_BASE)
        + CONTRIBUTION_FACTOR * dampen(counts.unique_edited_pages, CONTRIBUTION_BASE)
        + COMMENT_FACTOR * dampen(counts.comment_slots, COMMENT_BASE);

    if has_activity {
        raw += TENURE_FACTOR * dampen(counts.account_age_days, TENURE_BASE);
    }

    raw.round().clamp(0.0, RING_MAX as f64) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counts(pages: u64, edits: u64, unique: u64, comments: u64, age: u64) -> ActivityCounts {
        ActivityCounts {
            pages_created: pages,
            edit_slots: edits,
            unique_edited_pages: unique,
            comment_slots: comments,
            account_age_days: age,
        }
    }

    #[test]
    fn test_dampen() {
        assert_eq!(dampen(0, 10.0), 0.0);
        assert!((dampen(9, 10.0) - 1.0).abs() < 1e-12);
        assert!((dampen(4, 5.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_activity_is_zero() {
        assert_eq!(ring_score(&ActivityCounts::default()), 0);
        assert_eq!(ring_score(&counts(0, 0, 0, 0, 29)), 0);
    }

    #[test]
    fn test_dormant_account_gets_no_tenure() {
        assert_eq!(ring_score(&counts(0, 0, 0, 0, 2000)), 0);
        // Authored pages alone do not unlock tenure either
        assert_eq!(ring_score(&counts(9, 0, 0, 0, 2000)), 15);
    }

    #[test]
    fn test_reference_user() {
        // 15*log10(3) + 8*log5(4) + 8*log5(3) + 7*log8(2) + 10*log50(66)
        // = 7.157 + 6.892 + 5.461 + 2.333 + 10.710 = 32.55
        assert_eq!(ring_score(&counts(2, 3, 2, 1, 65)), 33);
    }

    #[test]
    fn test_clamped_to_max() {
        let heavy = counts(1_000_000, 1_000_000, 1_000_000, 1_000_000, 100_000);
        assert_eq!(ring_score(&heavy), RING_MAX);
    }

    #[test]
    fn test_always_in_range() {
        for pages in [0, 1, 10, 500] {
            for edits in [0, 1, 50, 5000] {
                for age in [0, 10, 365, 3650] {
                    let score = ring_score(&counts(pages, edits, edits, edits, age));
                    assert!(score <= RING_MAX);
                }
            }
        }

        let saturated = counts(u64::MAX, u64::MAX, u64::MAX, 1, u64::MAX);
        assert_eq!(ring_score(&saturated), RING_MAX);
        assert!(ring_score(&counts(0, u64::MAX, 0, u64::MAX, 0)) <= RING_MAX);
    }
}
