use insight_core::config::*;
use insight_core::models::Modality;
use insight_core::InsightError;

#[test]
fn config_loads_from_empty_toml_with_all_defaults() {
    let config = InsightConfig::from_toml("").unwrap();

    // Store defaults
    assert_eq!(config.store.db_path, "insight.db");
    assert!(config.store.wal_mode);
    assert_eq!(config.store.busy_timeout_ms, 5_000);
    assert_eq!(config.store.version_retention, 3);

    // Embedding defaults
    assert_eq!(config.embedding.text_dims, 768);
    assert_eq!(config.embedding.image_dims, 1408);
    assert_eq!(config.embedding.dim_for(Modality::Text), 768);
    assert_eq!(config.embedding.dim_for(Modality::Image), 1408);

    // Index defaults
    assert_eq!(config.index.modality, Modality::Text);
    assert_eq!(config.index.num_lists, 16);
    assert_eq!(config.index.probe_lists, 4);
    assert_eq!(config.index.seed, 42);
    assert_eq!(config.index.stale_snapshot_age_secs, 86_400);

    // Recommendation defaults
    assert_eq!(config.recommend.distance_cutoff, Some(0.35));
    assert!(config.recommend.explain);

    // Quality defaults (the rule table)
    assert_eq!(config.quality.high_risk_max_rating, 3.0);
    assert_eq!(config.quality.medium_risk_min_negative, 5);
    assert_eq!(config.quality.medium_risk_max_rating, 3.5);
    assert_eq!(config.quality.monitor_max_rating, 4.0);

    // Refresh defaults
    assert_eq!(config.refresh.max_concurrent_embeds, 8);
    assert_eq!(config.refresh.embed_timeout_ms, 10_000);
    assert_eq!(config.refresh.max_retries, 3);
    assert_eq!(config.refresh.drift_rebuild_fraction, 0.25);
}

#[test]
fn config_loads_partial_toml_with_overrides() {
    let toml = r#"
[store]
db_path = "/custom/insight.db"
version_retention = 10

[index]
num_lists = 64
probe_lists = 8

[recommend]
distance_cutoff = 0.5
"#;
    let config = InsightConfig::from_toml(toml).unwrap();
    assert_eq!(config.store.db_path, "/custom/insight.db");
    assert_eq!(config.store.version_retention, 10);
    assert_eq!(config.index.num_lists, 64);
    assert_eq!(config.index.probe_lists, 8);
    assert_eq!(config.recommend.distance_cutoff, Some(0.5));
    // Non-overridden fields keep defaults
    assert!(config.store.wal_mode);
    assert_eq!(config.embedding.text_dims, 768);
}

#[test]
fn index_modality_can_be_image() {
    let config = InsightConfig::from_toml("[index]\nmodality = \"image\"\n").unwrap();
    assert_eq!(config.index.modality, Modality::Image);
}

#[test]
fn zero_dimensions_are_fatal() {
    let err = InsightConfig::from_toml("[embedding]\ntext_dims = 0\n").unwrap_err();
    assert!(matches!(err, InsightError::InvalidConfig(_)));
}

#[test]
fn probe_lists_above_num_lists_is_fatal() {
    let toml = "[index]\nnum_lists = 4\nprobe_lists = 8\n";
    let err = InsightConfig::from_toml(toml).unwrap_err();
    assert!(matches!(err, InsightError::InvalidConfig(_)));
}

#[test]
fn drift_fraction_must_be_a_fraction() {
    let err =
        InsightConfig::from_toml("[refresh]\ndrift_rebuild_fraction = 1.5\n").unwrap_err();
    assert!(matches!(err, InsightError::InvalidConfig(_)));
}

#[test]
fn quality_thresholds_must_be_ordered() {
    // medium_risk_max_rating below high_risk_max_rating would let rule 2
    // shadow rule 1.
    let toml = "[quality]\nmedium_risk_max_rating = 2.0\n";
    let err = InsightConfig::from_toml(toml).unwrap_err();
    assert!(matches!(err, InsightError::InvalidConfig(_)));
}

#[test]
fn malformed_toml_is_invalid_config() {
    let err = InsightConfig::from_toml("[index\nnum_lists = ").unwrap_err();
    assert!(matches!(err, InsightError::InvalidConfig(_)));
}
