//! SQL operations, grouped by table.

pub mod alert_ops;
pub mod embedding_ops;
