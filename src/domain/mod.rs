//! Domain-level structures shared across the triage pipeline.
//!
//! This module groups the input data model (image records and the ordered
//! record set), the per-record prediction, and the store that materializes
//! records from disk.

pub mod prediction;
pub mod record;
pub mod store;

pub use prediction::PredictionResult;
pub use record::{ImageRecord, RecordSet};
pub use store::RecordStore;
