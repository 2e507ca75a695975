//! Utility functions for the triage pipeline.
//!
//! This module provides image decoding helpers used by the record store.

pub mod image;

pub use image::{dynamic_to_gray, gray_to_array, load_gray_image, load_pixels};
