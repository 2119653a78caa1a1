use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Risk tier produced by the quality classifier, ordered benign to severe.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Ok,
    Monitor,
    MediumRisk,
    HighRisk,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Ok => "OK",
            RiskLevel::Monitor => "MONITOR",
            RiskLevel::MediumRisk => "MEDIUM_RISK",
            RiskLevel::HighRisk => "HIGH_RISK",
        };
        write!(f, "{s}")
    }
}

impl FromStr for RiskLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "OK" => Ok(RiskLevel::Ok),
            "MONITOR" => Ok(RiskLevel::Monitor),
            "MEDIUM_RISK" => Ok(RiskLevel::MediumRisk),
            "HIGH_RISK" => Ok(RiskLevel::HighRisk),
            other => Err(format!("unknown risk level: {other}")),
        }
    }
}

/// Review-derived evidence for one item.
///
/// Rederived from raw review aggregates on every refresh cycle; the
/// classifier's output is reproducible from this alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityEvidence {
    pub item_id: String,
    pub positive_reviews: u64,
    pub negative_reviews: u64,
    pub avg_rating: f64,
}

/// Current quality alert for an item. Regenerated wholesale each cycle,
/// superseding the prior alert for that item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityAlert {
    pub item_id: String,
    pub risk_level: RiskLevel,
    pub evidence: QualityEvidence,
    pub explanation: Option<String>,
    pub generated_at: DateTime<Utc>,
}
