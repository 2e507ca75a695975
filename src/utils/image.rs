//! Utility functions for image loading.
//!
//! This module provides functions for decoding single-channel images from
//! files and turning them into the `f32` pixel matrices carried by
//! [`ImageRecord`](crate::domain::ImageRecord). It covers single files and
//! batches, optionally resizing every image to a fixed shape.

use crate::core::TriageError;
use image::imageops::FilterType;
use image::{DynamicImage, GrayImage};
use ndarray::Array2;
use std::path::Path;

/// Converts a DynamicImage to a GrayImage.
///
/// This function takes a DynamicImage (which can be in any format) and converts
/// it to a GrayImage (8-bit grayscale format).
pub fn dynamic_to_gray(img: DynamicImage) -> GrayImage {
    img.to_luma8()
}

/// Loads an image from a file path and converts it to a GrayImage.
///
/// When `shape` is `Some((height, width))` the image is resized to exactly
/// that shape (aspect ratio is not preserved).
///
/// # Errors
///
/// Returns [`TriageError::ImageLoad`] naming `path` if the file cannot be
/// opened or decoded.
pub fn load_gray_image(path: &Path, shape: Option<(u32, u32)>) -> Result<GrayImage, TriageError> {
    let img = image::open(path).map_err(|source| TriageError::ImageLoad {
        path: path.to_path_buf(),
        source,
    })?;
    let img = match shape {
        Some((height, width)) if img.height() != height || img.width() != width => {
            img.resize_exact(width, height, FilterType::Triangle)
        }
        _ => img,
    };
    Ok(dynamic_to_gray(img))
}

/// Converts a GrayImage to an `[H, W]` matrix of raw intensities (0..=255).
pub fn gray_to_array(img: &GrayImage) -> Result<Array2<f32>, TriageError> {
    let (width, height) = img.dimensions();
    let data: Vec<f32> = img.as_raw().iter().map(|&p| f32::from(p)).collect();
    Array2::from_shape_vec((height as usize, width as usize), data).map_err(TriageError::Tensor)
}

/// Loads an image file as an `[H, W]` intensity matrix.
pub fn load_pixels(path: &Path, shape: Option<(u32, u32)>) -> Result<Array2<f32>, TriageError> {
    gray_to_array(&load_gray_image(path, shape)?)
}

/// Loads a batch of images as intensity matrices with a custom parallel threshold.
///
/// Decoding runs on the rayon pool when the number of images exceeds the
/// threshold (`DEFAULT_PARALLEL_THRESHOLD` when `None`). Output order always
/// matches `paths`.
///
/// # Errors
///
/// Returns the first error encountered if any image cannot be loaded.
pub fn load_pixels_batch_with_threshold<P: AsRef<Path> + Send + Sync>(
    paths: &[P],
    shape: Option<(u32, u32)>,
    parallel_threshold: Option<usize>,
) -> Result<Vec<Array2<f32>>, TriageError> {
    use crate::core::constants::DEFAULT_PARALLEL_THRESHOLD;

    let threshold = parallel_threshold.unwrap_or(DEFAULT_PARALLEL_THRESHOLD);

    if paths.len() > threshold {
        use rayon::prelude::*;
        paths
            .par_iter()
            .map(|p| load_pixels(p.as_ref(), shape))
            .collect()
    } else {
        paths.iter().map(|p| load_pixels(p.as_ref(), shape)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn write_gray(dir: &Path, name: &str, width: u32, height: u32) -> std::path::PathBuf {
        let img = GrayImage::from_fn(width, height, |x, y| Luma([(x + y * width) as u8]));
        let path = dir.join(name);
        img.save(&path).unwrap();
        path
    }

    #[test]
    fn test_gray_to_array_is_row_major() {
        let img = GrayImage::from_raw(3, 2, vec![0, 1, 2, 3, 4, 5]).unwrap();
        let arr = gray_to_array(&img).unwrap();
        assert_eq!(arr.shape(), &[2, 3]);
        assert_eq!(arr[[1, 0]], 3.0);
        assert_eq!(arr[[0, 2]], 2.0);
    }

    #[test]
    fn test_load_pixels_resizes_to_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_gray(dir.path(), "a.png", 8, 4);
        let arr = load_pixels(&path, Some((2, 2))).unwrap();
        assert_eq!(arr.shape(), &[2, 2]);

        let native = load_pixels(&path, None).unwrap();
        assert_eq!(native.shape(), &[4, 8]);
    }

    #[test]
    fn test_load_missing_image_names_file() {
        let missing = Path::new("does/not/exist.png");
        let err = load_pixels(missing, None).unwrap_err();
        assert!(matches!(&err, TriageError::ImageLoad { path, .. } if path == missing));
        assert!(err.to_string().contains("does/not/exist.png"));
    }

    #[test]
    fn test_pixels_keep_raw_intensities() {
        let img = GrayImage::from_raw(2, 1, vec![0, 255]).unwrap();
        let arr = gray_to_array(&img).unwrap();
        assert_eq!(arr[[0, 0]], 0.0);
        assert_eq!(arr[[0, 1]], 255.0);
    }

    #[test]
    fn test_batch_preserves_order_in_parallel() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<_> = (0..6)
            .map(|i| write_gray(dir.path(), &format!("{i}.png"), i + 1, 1))
            .collect();
        let arrays = load_pixels_batch_with_threshold(&paths, None, Some(1)).unwrap();
        for (i, arr) in arrays.iter().enumerate() {
            assert_eq!(arr.shape(), &[1, i + 1]);
        }
    }
}
