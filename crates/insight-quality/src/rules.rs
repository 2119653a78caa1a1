//! The risk classification decision list. Evaluated strictly in order,
//! first match wins:
//!
//! 1. negative > positive AND avg_rating < high_risk_max  → HIGH_RISK
//! 2. negative > medium_min AND avg_rating < medium_max   → MEDIUM_RISK
//! 3. avg_rating < monitor_max AND negative > 0           → MONITOR
//! 4. otherwise                                           → OK
//!
//! Later rules are broader than earlier ones; reordering would let them
//! shadow the narrower tiers. All comparisons are strict.

use insight_core::config::QualityConfig;
use insight_core::models::{QualityEvidence, RiskLevel};

/// Classify review evidence into a risk tier.
///
/// Total (every input maps to exactly one tier), deterministic, and
/// side-effect-free: the alert feed can always be rebuilt from evidence.
pub fn classify(evidence: &QualityEvidence, thresholds: &QualityConfig) -> RiskLevel {
    if evidence.negative_reviews > evidence.positive_reviews
        && evidence.avg_rating < thresholds.high_risk_max_rating
    {
        return RiskLevel::HighRisk;
    }
    if evidence.negative_reviews > thresholds.medium_risk_min_negative
        && evidence.avg_rating < thresholds.medium_risk_max_rating
    {
        return RiskLevel::MediumRisk;
    }
    if evidence.avg_rating < thresholds.monitor_max_rating && evidence.negative_reviews > 0 {
        return RiskLevel::Monitor;
    }
    RiskLevel::Ok
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evidence(positive: u64, negative: u64, avg_rating: f64) -> QualityEvidence {
        QualityEvidence {
            item_id: "prod-1".to_string(),
            positive_reviews: positive,
            negative_reviews: negative,
            avg_rating,
        }
    }

    fn thresholds() -> QualityConfig {
        QualityConfig::default()
    }

    #[test]
    fn high_risk_when_negatives_dominate_and_rating_low() {
        assert_eq!(
            classify(&evidence(3, 8, 2.4), &thresholds()),
            RiskLevel::HighRisk
        );
    }

    #[test]
    fn boundary_rating_does_not_trigger_high_risk() {
        // avg_rating == 3.0 fails the strict `< 3.0` of rule 1; rule 2
        // matches instead: 6 negatives, rating under 3.5.
        assert_eq!(
            classify(&evidence(2, 6, 3.0), &thresholds()),
            RiskLevel::MediumRisk
        );
    }

    #[test]
    fn medium_risk_needs_more_than_five_negatives() {
        assert_eq!(
            classify(&evidence(10, 6, 3.2), &thresholds()),
            RiskLevel::MediumRisk
        );
        // Exactly five negatives fails rule 2's strict `> 5`; falls to
        // rule 3.
        assert_eq!(
            classify(&evidence(10, 5, 3.2), &thresholds()),
            RiskLevel::Monitor
        );
    }

    #[test]
    fn monitor_requires_at_least_one_negative() {
        assert_eq!(
            classify(&evidence(4, 1, 3.8), &thresholds()),
            RiskLevel::Monitor
        );
        assert_eq!(classify(&evidence(4, 0, 3.8), &thresholds()), RiskLevel::Ok);
    }

    #[test]
    fn healthy_items_are_ok() {
        assert_eq!(
            classify(&evidence(40, 2, 4.6), &thresholds()),
            RiskLevel::Ok
        );
        assert_eq!(classify(&evidence(0, 0, 0.0), &thresholds()), RiskLevel::Ok);
    }

    #[test]
    fn rule_one_outranks_rule_two() {
        // Matches both rule 1 and rule 2; rule 1 wins by order.
        assert_eq!(
            classify(&evidence(1, 9, 2.0), &thresholds()),
            RiskLevel::HighRisk
        );
    }

    #[test]
    fn custom_thresholds_shift_the_tiers() {
        let strict = QualityConfig {
            high_risk_max_rating: 4.0,
            medium_risk_min_negative: 1,
            medium_risk_max_rating: 4.2,
            monitor_max_rating: 4.8,
            explain_risky: false,
        };
        assert_eq!(classify(&evidence(2, 3, 3.9), &strict), RiskLevel::HighRisk);
        assert_eq!(
            classify(&evidence(9, 2, 4.1), &strict),
            RiskLevel::MediumRisk
        );
    }
}
