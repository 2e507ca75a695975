//! Data-shape processors for the triage pipeline.
//!
//! # Modules
//!
//! * `tensor_adapter` - Record set to image tensor / histogram matrix / labels / filenames
//! * `fusion` - Stage-one probability and histogram column fusion

pub mod fusion;
pub mod tensor_adapter;

pub use fusion::fuse;
pub use tensor_adapter::{
    extract_filenames, extract_labels, to_histogram_matrix, to_image_tensor,
};
