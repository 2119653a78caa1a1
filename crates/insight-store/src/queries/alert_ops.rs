//! Quality-alert feed: latest classification per item, replaced wholesale
//! on each refresh cycle.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use insight_core::errors::InsightResult;
use insight_core::models::{QualityAlert, QualityEvidence, RiskLevel};

use crate::to_store_err;

/// Replace the stored alert set for the given items.
pub fn put_alerts(conn: &Connection, alerts: &[QualityAlert]) -> InsightResult<()> {
    conn.execute_batch("SAVEPOINT put_alerts")
        .map_err(|e| to_store_err(format!("put_alerts savepoint: {e}")))?;

    let result = (|| {
        for alert in alerts {
            conn.execute(
                "INSERT INTO quality_alerts
                    (item_id, risk_level, positive_reviews, negative_reviews,
                     avg_rating, explanation, generated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                 ON CONFLICT(item_id) DO UPDATE SET
                    risk_level = excluded.risk_level,
                    positive_reviews = excluded.positive_reviews,
                    negative_reviews = excluded.negative_reviews,
                    avg_rating = excluded.avg_rating,
                    explanation = excluded.explanation,
                    generated_at = excluded.generated_at",
                params![
                    alert.item_id,
                    alert.risk_level.to_string(),
                    alert.evidence.positive_reviews as i64,
                    alert.evidence.negative_reviews as i64,
                    alert.evidence.avg_rating,
                    alert.explanation,
                    alert.generated_at.to_rfc3339(),
                ],
            )
            .map_err(|e| to_store_err(e.to_string()))?;
        }
        Ok(())
    })();

    match result {
        Ok(()) => {
            conn.execute_batch("RELEASE put_alerts")
                .map_err(|e| to_store_err(format!("put_alerts release: {e}")))?;
            Ok(())
        }
        Err(e) => {
            let _ = conn.execute_batch("ROLLBACK TO put_alerts");
            let _ = conn.execute_batch("RELEASE put_alerts");
            Err(e)
        }
    }
}

/// All current alerts, ordered by item id.
pub fn all_alerts(conn: &Connection) -> InsightResult<Vec<QualityAlert>> {
    query_alerts(
        conn,
        "SELECT item_id, risk_level, positive_reviews, negative_reviews,
                avg_rating, explanation, generated_at
         FROM quality_alerts
         ORDER BY item_id",
        params![],
    )
}

/// Alerts at one risk level, worst offenders (most negative reviews) first.
pub fn alerts_by_level(conn: &Connection, level: RiskLevel) -> InsightResult<Vec<QualityAlert>> {
    query_alerts(
        conn,
        "SELECT item_id, risk_level, positive_reviews, negative_reviews,
                avg_rating, explanation, generated_at
         FROM quality_alerts
         WHERE risk_level = ?1
         ORDER BY negative_reviews DESC, item_id",
        params![level.to_string()],
    )
}

fn query_alerts(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> InsightResult<Vec<QualityAlert>> {
    let mut stmt = conn.prepare(sql).map_err(|e| to_store_err(e.to_string()))?;
    let mut rows = stmt.query(params).map_err(|e| to_store_err(e.to_string()))?;

    let mut out = Vec::new();
    while let Some(row) = rows.next().map_err(|e| to_store_err(e.to_string()))? {
        let item_id: String = row.get(0).map_err(|e| to_store_err(e.to_string()))?;
        let risk_level: String = row.get(1).map_err(|e| to_store_err(e.to_string()))?;
        let positive_reviews: i64 = row.get(2).map_err(|e| to_store_err(e.to_string()))?;
        let negative_reviews: i64 = row.get(3).map_err(|e| to_store_err(e.to_string()))?;
        let avg_rating: f64 = row.get(4).map_err(|e| to_store_err(e.to_string()))?;
        let explanation: Option<String> = row.get(5).map_err(|e| to_store_err(e.to_string()))?;
        let generated_at: String = row.get(6).map_err(|e| to_store_err(e.to_string()))?;

        let risk_level: RiskLevel = risk_level.parse().map_err(|e: String| to_store_err(e))?;
        let generated_at: DateTime<Utc> = DateTime::parse_from_rfc3339(&generated_at)
            .map_err(|e| to_store_err(format!("bad generated_at: {e}")))?
            .with_timezone(&Utc);

        out.push(QualityAlert {
            evidence: QualityEvidence {
                item_id: item_id.clone(),
                positive_reviews: positive_reviews as u64,
                negative_reviews: negative_reviews as u64,
                avg_rating,
            },
            item_id,
            risk_level,
            explanation,
            generated_at,
        });
    }
    Ok(out)
}
