use thiserror::Error;

#[derive(Error, Debug)]
pub enum ContourError {
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: &'static str, found: String },

    #[error("Unsupported approximation method: {0}")]
    UnsupportedApproxMethod(String),

    #[error("Invalid approximation accuracy {0}: must be finite and greater than zero")]
    InvalidAccuracy(f64),

    #[error("Invalid blur sigma {0}: must be finite and greater than zero")]
    InvalidBlurSigma(f32),

    #[error("Operation requires a non-empty contour")]
    EmptyContour,

    #[error("Failed to load image: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] geojson::Error),
}

impl ContourError {
    pub(crate) fn type_mismatch(expected: &'static str, found: impl ToString) -> Self {
        Self::TypeMismatch {
            expected,
            found: found.to_string(),
        }
    }

    /// True for argument type errors, as opposed to invalid options or
    /// computation failures.
    pub fn is_type_error(&self) -> bool {
        matches!(self, Self::TypeMismatch { .. })
    }
}

pub type Result<T> = std::result::Result<T, ContourError>;
