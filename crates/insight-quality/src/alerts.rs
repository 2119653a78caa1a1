//! Wholesale alert generation: classify every item's evidence and attach
//! best-effort explanations for the risky tiers.

use chrono::Utc;
use tracing::debug;

use insight_core::config::QualityConfig;
use insight_core::models::{QualityAlert, QualityEvidence, RiskLevel};
use insight_core::traits::{ExplainContext, TextGenerator};

use crate::rules;

/// Regenerate the full alert set from evidence.
///
/// Explanations are requested only for `MediumRisk` and `HighRisk` items,
/// and only when a generator is supplied. A generator failure leaves the
/// explanation absent; it never fails alert generation.
pub fn generate_alerts(
    evidence: &[QualityEvidence],
    thresholds: &QualityConfig,
    text_gen: Option<&dyn TextGenerator>,
) -> Vec<QualityAlert> {
    let generated_at = Utc::now();

    evidence
        .iter()
        .map(|e| {
            let risk_level = rules::classify(e, thresholds);
            let explanation = match (risk_level, text_gen) {
                (RiskLevel::MediumRisk | RiskLevel::HighRisk, Some(gen))
                    if thresholds.explain_risky =>
                {
                    explain_risk(gen, e, risk_level)
                }
                _ => None,
            };
            QualityAlert {
                item_id: e.item_id.clone(),
                risk_level,
                evidence: e.clone(),
                explanation,
                generated_at,
            }
        })
        .collect()
}

fn explain_risk(
    gen: &dyn TextGenerator,
    evidence: &QualityEvidence,
    risk_level: RiskLevel,
) -> Option<String> {
    let context = ExplainContext::QualityRisk {
        item_id: evidence.item_id.clone(),
        risk_level,
        evidence: evidence.clone(),
    };
    match gen.explain(&context) {
        Ok(text) => Some(text),
        Err(e) => {
            debug!(
                item_id = %evidence.item_id,
                generator = gen.name(),
                error = %e,
                "risk explanation unavailable"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insight_core::errors::AdapterError;

    struct CannedGenerator;

    impl TextGenerator for CannedGenerator {
        fn explain(&self, _context: &ExplainContext) -> Result<String, AdapterError> {
            Ok("review sentiment trending negative".to_string())
        }

        fn name(&self) -> &str {
            "canned"
        }
    }

    struct BrokenGenerator;

    impl TextGenerator for BrokenGenerator {
        fn explain(&self, _context: &ExplainContext) -> Result<String, AdapterError> {
            Err(AdapterError::Failed {
                provider: "broken".to_string(),
                reason: "unavailable".to_string(),
            })
        }

        fn name(&self) -> &str {
            "broken"
        }
    }

    fn evidence(item_id: &str, positive: u64, negative: u64, avg_rating: f64) -> QualityEvidence {
        QualityEvidence {
            item_id: item_id.to_string(),
            positive_reviews: positive,
            negative_reviews: negative,
            avg_rating,
        }
    }

    #[test]
    fn alerts_cover_every_item() {
        let evidence = vec![
            evidence("prod-1", 10, 0, 4.8),
            evidence("prod-2", 1, 9, 2.0),
        ];
        let alerts = generate_alerts(&evidence, &QualityConfig::default(), None);
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].risk_level, RiskLevel::Ok);
        assert_eq!(alerts[1].risk_level, RiskLevel::HighRisk);
    }

    #[test]
    fn only_risky_tiers_get_explanations() {
        let evidence = vec![
            evidence("prod-ok", 10, 1, 3.9),  // Monitor
            evidence("prod-bad", 1, 9, 2.0),  // HighRisk
        ];
        let alerts = generate_alerts(&evidence, &QualityConfig::default(), Some(&CannedGenerator));
        assert!(alerts[0].explanation.is_none());
        assert_eq!(
            alerts[1].explanation.as_deref(),
            Some("review sentiment trending negative")
        );
    }

    #[test]
    fn generator_failure_omits_explanation_only() {
        let evidence = vec![evidence("prod-bad", 1, 9, 2.0)];
        let alerts = generate_alerts(&evidence, &QualityConfig::default(), Some(&BrokenGenerator));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].risk_level, RiskLevel::HighRisk);
        assert!(alerts[0].explanation.is_none());
    }

    #[test]
    fn explain_risky_flag_disables_explanations() {
        let thresholds = QualityConfig {
            explain_risky: false,
            ..QualityConfig::default()
        };
        let evidence = vec![evidence("prod-bad", 1, 9, 2.0)];
        let alerts = generate_alerts(&evidence, &thresholds, Some(&CannedGenerator));
        assert!(alerts[0].explanation.is_none());
    }
}
