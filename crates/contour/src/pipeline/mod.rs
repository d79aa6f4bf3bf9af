pub mod builder;

use image::GrayImage;
use tracing::debug;

use crate::{
    analysis::ContourAnalyzer,
    config::{ApproxOptions, TraceOptions},
    error::Result,
    hierarchy::Hierarchy,
    trace::find_contours_with,
    traits::{ImagePreprocessor, VisionBackend},
};

/// Preprocess a grayscale image, trace it, and optionally approximate the
/// traced hierarchy
pub struct TracePipeline {
    preprocessors: Vec<Box<dyn ImagePreprocessor>>,
    backend: Box<dyn VisionBackend>,
    trace: TraceOptions,
    approx: Option<ApproxOptions>,
}

impl TracePipeline {
    /// Create a new pipeline builder
    pub fn builder() -> builder::TracePipelineBuilder {
        builder::TracePipelineBuilder::new()
    }

    pub fn new(
        preprocessors: Vec<Box<dyn ImagePreprocessor>>,
        backend: Box<dyn VisionBackend>,
        trace: TraceOptions,
        approx: Option<ApproxOptions>,
    ) -> Self {
        Self {
            preprocessors,
            backend,
            trace,
            approx,
        }
    }

    pub fn trace_options(&self) -> &TraceOptions {
        &self.trace
    }

    /// Run every stage on `image`
    pub fn process(&self, image: &GrayImage) -> Result<Hierarchy> {
        let mut processed = image.clone();
        for preprocessor in &self.preprocessors {
            processed = preprocessor.preprocess(&processed)?;
        }

        let traced = find_contours_with(self.backend.as_ref(), &processed, &self.trace)?;

        let Some(approx) = &self.approx else {
            return Ok(traced);
        };

        // Keep the traced layout: approximate every root chain at once
        let approx = approx.with_recursive(true);
        let hierarchy = match traced.head() {
            Some(head) => ContourAnalyzer::new(self.backend.as_ref()).approx_poly(head, &approx)?,
            None => Hierarchy::new(),
        };
        debug!(contours = hierarchy.len(), "pipeline finished");
        Ok(hierarchy)
    }

    /// Get information about the pipeline configuration
    pub fn info(&self) -> String {
        format!(
            "TracePipeline: {} preprocessors, mode {}, chain {}, approximation {}",
            self.preprocessors.len(),
            self.trace.mode,
            self.trace.method,
            self.approx
                .map(|a| format!("{} @ {}", a.method, a.accuracy))
                .unwrap_or_else(|| "off".to_string()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApproxMethod, RetrievalMode};
    use crate::pipeline::builder::TracePipelineBuilder;
    use image::Luma;

    // Gray square with a darker hole on a black background
    fn create_test_image() -> GrayImage {
        GrayImage::from_fn(100, 100, |x, y| {
            let outer = (20..80).contains(&x) && (20..80).contains(&y);
            let hole = (40..60).contains(&x) && (40..60).contains(&y);
            match (outer, hole) {
                (true, false) => Luma([200u8]),
                (true, true) => Luma([60u8]),
                _ => Luma([0u8]),
            }
        })
    }

    #[test]
    fn test_pipeline_threshold_and_trace() {
        let pipeline = TracePipeline::builder()
            .with_threshold(127)
            .with_mode(RetrievalMode::Tree)
            .build();
        let hierarchy = pipeline.process(&create_test_image()).expect("Should process successfully");
        assert_eq!(hierarchy.len(), 2);
        let head = hierarchy.head().expect("Should find the square");
        assert_eq!(head.children().count(), 1);
    }

    #[test]
    fn test_low_threshold_fills_hole() {
        let pipeline = TracePipelineBuilder::build_external(10);
        let hierarchy = pipeline.process(&create_test_image()).expect("Should process successfully");
        assert_eq!(hierarchy.len(), 1);
    }

    #[test]
    fn test_pipeline_with_approximation_keeps_layout() {
        let approx = ApproxOptions::new(ApproxMethod::Dp, 2.0, false).expect("Valid options");
        let pipeline = TracePipeline::builder()
            .with_blur(1.0)
            .with_threshold(127)
            .with_mode(RetrievalMode::CComp)
            .with_approximation(approx)
            .build();
        let hierarchy = pipeline.process(&create_test_image()).expect("Should process successfully");
        assert_eq!(hierarchy.len(), 2);
        assert!(hierarchy.iter().all(|c| !c.is_empty()));
        assert!(pipeline.info().contains("dp"));
    }
}
