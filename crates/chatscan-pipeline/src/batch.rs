//! Parallel preprocessing of independent screenshots.
//!
//! Each image runs through its own pipeline instance on the rayon
//! thread pool. Images share nothing but the read-only configuration,
//! so one failure never affects the others and results come back in
//! input order.

use rayon::prelude::*;

use crate::raster::RasterImage;
use crate::types::{EncodedImage, PipelineConfig, PreprocessError};

/// Preprocess every image in `images`, in parallel.
///
/// The returned vector has one entry per input, in the same order.
#[must_use]
pub fn process_batch(
    images: Vec<RasterImage>,
    config: &PipelineConfig,
) -> Vec<Result<EncodedImage, PreprocessError>> {
    let _span = tracing::debug_span!("batch", count = images.len()).entered();
    images
        .into_par_iter()
        .enumerate()
        .map(|(index, image)| {
            let result = crate::process(image, config);
            if let Err(ref e) = result {
                tracing::warn!(index, error = %e, "screenshot preprocessing failed");
            }
            result
        })
        .collect()
}
