//! Property tests: upsert→get roundtrip and last-write-wins under
//! arbitrary vectors.

use insight_core::config::{EmbeddingConfig, StoreConfig};
use insight_core::models::Modality;
use insight_store::EmbeddingStore;
use proptest::prelude::*;

const DIMS: usize = 8;

fn open_store() -> EmbeddingStore {
    EmbeddingStore::open_in_memory(
        &StoreConfig::default(),
        EmbeddingConfig {
            text_dims: DIMS,
            image_dims: DIMS,
        },
    )
    .unwrap()
}

proptest! {
    #[test]
    fn prop_upsert_get_roundtrip(
        vector in proptest::collection::vec(-100.0f32..100.0, DIMS)
    ) {
        let store = open_store();
        store
            .upsert("prod-p", Modality::Text, vector.clone(), "m1", "h1")
            .unwrap();

        let stored = store.get("prod-p", Modality::Text).unwrap().unwrap();
        prop_assert_eq!(stored.vector, vector);
        prop_assert_eq!(stored.dim, DIMS);
    }

    #[test]
    fn prop_latest_upsert_wins(
        first in proptest::collection::vec(-10.0f32..10.0, DIMS),
        second in proptest::collection::vec(-10.0f32..10.0, DIMS),
    ) {
        let store = open_store();
        store
            .upsert("prod-p", Modality::Text, first, "m1", "h1")
            .unwrap();
        store
            .upsert("prod-p", Modality::Text, second.clone(), "m2", "h2")
            .unwrap();

        let stored = store.get("prod-p", Modality::Text).unwrap().unwrap();
        prop_assert_eq!(stored.vector, second);
        prop_assert_eq!(stored.source_version, "m2");
    }

    #[test]
    fn prop_wrong_dims_never_change_state(
        good in proptest::collection::vec(-10.0f32..10.0, DIMS),
        bad_len in (0usize..32).prop_filter("must mismatch", |n| *n != DIMS),
    ) {
        let store = open_store();
        store
            .upsert("prod-p", Modality::Text, good.clone(), "m1", "h1")
            .unwrap();

        let bad = vec![0.0f32; bad_len];
        prop_assert!(store.upsert("prod-p", Modality::Text, bad, "m2", "h2").is_err());

        let stored = store.get("prod-p", Modality::Text).unwrap().unwrap();
        prop_assert_eq!(stored.vector, good);
    }
}
