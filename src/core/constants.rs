//! Constants used throughout the triage pipeline.

/// The default number of rows sent to a classifier in one inference call.
pub const DEFAULT_BATCH_SIZE: usize = 32;

/// The largest accepted per-call batch size.
pub const MAX_BATCH_SIZE: usize = 4096;

/// Column of the stage-one output holding the positive-class probability.
pub const DEFAULT_POSITIVE_CLASS_INDEX: usize = 1;

/// Ground-truth / predicted value of the negative class.
pub const NEGATIVE_LABEL: i64 = 0;

/// Ground-truth / predicted value of the positive class.
pub const POSITIVE_LABEL: i64 = 1;

/// The minimum number of images decoded from disk before decoding goes parallel.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4;

/// The maximum number of elements allowed in a single tensor.
pub const MAX_TENSOR_SIZE: usize = 1_000_000_000;

/// Report cell written in place of a label when relocation failed.
pub const RELOCATION_FAILED_MARKER: &str = "relocation_failed";
