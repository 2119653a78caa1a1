/// Storage-layer errors for SQLite operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQLite error: {message}")]
    Sqlite { message: String },

    #[error("migration failed at version {version}: {reason}")]
    MigrationFailed { version: u32, reason: String },

    #[error("no version {version} for embedding ({item_id}, {modality})")]
    VersionNotFound {
        item_id: String,
        modality: String,
        version: i64,
    },
}
