//! Property tests: the classifier is total, deterministic, and respects
//! rule precedence for arbitrary evidence.

use insight_core::config::QualityConfig;
use insight_core::models::{QualityEvidence, RiskLevel};
use insight_quality::classify;
use proptest::prelude::*;

fn arb_evidence() -> impl Strategy<Value = QualityEvidence> {
    (0u64..1000, 0u64..1000, 0.0f64..5.0).prop_map(|(positive, negative, avg_rating)| {
        QualityEvidence {
            item_id: "prod-p".to_string(),
            positive_reviews: positive,
            negative_reviews: negative,
            avg_rating,
        }
    })
}

proptest! {
    #[test]
    fn prop_classification_is_deterministic(evidence in arb_evidence()) {
        let thresholds = QualityConfig::default();
        let first = classify(&evidence, &thresholds);
        for _ in 0..10 {
            prop_assert_eq!(classify(&evidence, &thresholds), first);
        }
    }

    #[test]
    fn prop_high_risk_implies_rule_one(evidence in arb_evidence()) {
        let thresholds = QualityConfig::default();
        if classify(&evidence, &thresholds) == RiskLevel::HighRisk {
            prop_assert!(evidence.negative_reviews > evidence.positive_reviews);
            prop_assert!(evidence.avg_rating < thresholds.high_risk_max_rating);
        }
    }

    #[test]
    fn prop_ok_implies_no_rule_matches(evidence in arb_evidence()) {
        let thresholds = QualityConfig::default();
        if classify(&evidence, &thresholds) == RiskLevel::Ok {
            // Rule 3 (the broadest) must not have matched.
            prop_assert!(
                evidence.avg_rating >= thresholds.monitor_max_rating
                    || evidence.negative_reviews == 0
            );
        }
    }

    #[test]
    fn prop_zero_negatives_never_alert(
        positive in 0u64..1000,
        avg_rating in 0.0f64..5.0,
    ) {
        let evidence = QualityEvidence {
            item_id: "prod-p".to_string(),
            positive_reviews: positive,
            negative_reviews: 0,
            avg_rating,
        };
        prop_assert_eq!(
            classify(&evidence, &QualityConfig::default()),
            RiskLevel::Ok
        );
    }
}
