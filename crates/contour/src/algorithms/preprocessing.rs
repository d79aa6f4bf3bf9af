//! Stages that turn a grayscale frame into the binary mask tracing expects.

use image::GrayImage;
use tracing::trace;

use crate::{
    error::{ContourError, Result},
    traits::ImagePreprocessor,
};

/// Foreground mask: pixels brighter than `threshold` become 255, the rest 0.
/// Tracing treats every nonzero pixel as foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdPreprocessor {
    pub threshold: u8,
}

impl ThresholdPreprocessor {
    pub fn new(threshold: u8) -> Self {
        Self { threshold }
    }
}

impl Default for ThresholdPreprocessor {
    fn default() -> Self {
        Self::new(127)
    }
}

impl ImagePreprocessor for ThresholdPreprocessor {
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage> {
        trace!(threshold = self.threshold, "thresholding frame");
        Ok(imageproc::contrast::threshold(image, self.threshold))
    }
}

/// Smooths ragged mask edges before thresholding, so the traced borders
/// carry fewer single-pixel spurs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussianBlurPreprocessor {
    pub sigma: f32,
}

impl GaussianBlurPreprocessor {
    pub fn new(sigma: f32) -> Self {
        Self { sigma }
    }
}

impl Default for GaussianBlurPreprocessor {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl ImagePreprocessor for GaussianBlurPreprocessor {
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage> {
        if !(self.sigma.is_finite() && self.sigma > 0.0) {
            return Err(ContourError::InvalidBlurSigma(self.sigma));
        }
        trace!(sigma = self.sigma, "blurring frame");
        Ok(imageproc::filter::gaussian_blur_f32(image, self.sigma))
    }
}
