use crate::{
    algorithms::{GaussianBlurPreprocessor, ThresholdPreprocessor},
    backend::ImageprocBackend,
    config::{ApproxOptions, RetrievalMode, TraceOptions},
    pipeline::TracePipeline,
    traits::{ImagePreprocessor, VisionBackend},
};

/// Builder for creating trace pipelines with a fluent API
pub struct TracePipelineBuilder {
    preprocessors: Vec<Box<dyn ImagePreprocessor>>,
    backend: Option<Box<dyn VisionBackend>>,
    trace: TraceOptions,
    approx: Option<ApproxOptions>,
}

impl TracePipelineBuilder {
    pub fn new() -> Self {
        Self {
            preprocessors: Vec::new(),
            backend: None,
            trace: TraceOptions::default(),
            approx: None,
        }
    }

    /// Add a preprocessor; preprocessors run in insertion order
    pub fn add_preprocessor<P>(mut self, preprocessor: P) -> Self
    where
        P: ImagePreprocessor + 'static,
    {
        self.preprocessors.push(Box::new(preprocessor));
        self
    }

    pub fn with_threshold(self, threshold: u8) -> Self {
        self.add_preprocessor(ThresholdPreprocessor { threshold })
    }

    pub fn with_blur(self, sigma: f32) -> Self {
        self.add_preprocessor(GaussianBlurPreprocessor { sigma })
    }

    /// Set the backend (replaces any existing one)
    pub fn set_backend<B>(mut self, backend: B) -> Self
    where
        B: VisionBackend + 'static,
    {
        self.backend = Some(Box::new(backend));
        self
    }

    pub fn with_trace_options(mut self, trace: TraceOptions) -> Self {
        self.trace = trace;
        self
    }

    pub fn with_mode(mut self, mode: RetrievalMode) -> Self {
        self.trace.mode = mode;
        self
    }

    /// Approximate every traced contour as a final stage
    pub fn with_approximation(mut self, approx: ApproxOptions) -> Self {
        self.approx = Some(approx);
        self
    }

    /// Build the pipeline, using the imageproc backend if none was set
    pub fn build(self) -> TracePipeline {
        let backend = self.backend.unwrap_or_else(|| Box::new(ImageprocBackend));
        TracePipeline::new(self.preprocessors, backend, self.trace, self.approx)
    }

    /// Threshold then trace outermost borders only
    pub fn build_external(threshold: u8) -> TracePipeline {
        Self::new()
            .with_threshold(threshold)
            .with_mode(RetrievalMode::External)
            .build()
    }
}

impl Default for TracePipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
