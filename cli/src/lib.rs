use contour::{
    ApproxOptions, ContourError, Hierarchy, NodeId, Rect, TraceOptions, TracePipeline,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    SerdeError(#[from] serde_json::Error),
    #[error(transparent)]
    TomlDeError(#[from] toml::de::Error),
    #[error(transparent)]
    TomlSerError(#[from] toml::ser::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    ContourError(#[from] ContourError),
    #[error("Unsupported file format. Please use .toml or .json files")]
    UnsupportedFileFormat,
}

/// Settings for one analysis run, loadable from TOML or JSON
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Pixels above this value are foreground
    pub threshold: u8,
    /// Gaussian blur applied before thresholding
    pub blur_sigma: Option<f32>,
    pub trace: TraceOptions,
    pub approx: ApproxOptions,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            threshold: 127,
            blur_sigma: None,
            trace: TraceOptions::default(),
            approx: ApproxOptions::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, CliError> {
        Ok(toml::from_str(content)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, CliError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Load from a file, picking the format by extension
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CliError> {
        let path = path.as_ref();
        match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => Self::from_toml_file(path),
            Some("json") => Self::from_json_file(path),
            _ => Err(CliError::UnsupportedFileFormat),
        }
    }

    pub fn to_toml(&self) -> Result<String, CliError> {
        Ok(toml::to_string_pretty(&self)?)
    }

    pub fn to_json(&self) -> Result<String, CliError> {
        Ok(serde_json::to_string_pretty(&self)?)
    }

    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CliError> {
        let path = path.as_ref();
        let content = match path.extension().and_then(|s| s.to_str()) {
            Some("toml") => self.to_toml()?,
            Some("json") => self.to_json()?,
            _ => return Err(CliError::UnsupportedFileFormat),
        };
        fs::write(path, content)?;
        Ok(())
    }

    /// Get the JSON schema for the configuration file
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(AnalysisConfig)
    }

    /// Pipeline that blurs (optionally), thresholds and traces
    pub fn pipeline(&self) -> TracePipeline {
        let mut builder = TracePipeline::builder();
        if let Some(sigma) = self.blur_sigma {
            builder = builder.with_blur(sigma);
        }
        builder
            .with_threshold(self.threshold)
            .with_trace_options(self.trace)
            .build()
    }
}

/// Printable description of one traced contour
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ContourSummary {
    pub id: usize,
    pub parent: Option<usize>,
    pub depth: usize,
    pub rect: Rect,
    pub points: usize,
    pub approx_points: usize,
}

/// Summarize every contour, approximating each with `approx`
pub fn summarize(hierarchy: &Hierarchy, approx: &ApproxOptions) -> Result<Vec<ContourSummary>, CliError> {
    hierarchy
        .iter()
        .map(|node| -> Result<ContourSummary, CliError> {
            let approx_points = node.contour().approx_poly(approx)?.len();
            Ok(ContourSummary {
                id: node.id().0,
                parent: node.parent().map(|p| p.id().0),
                depth: node.depth(),
                rect: node.rect(),
                points: node.len(),
                approx_points,
            })
        })
        .collect()
}

/// First contour of a hierarchy, or the node with the given id
pub fn select(hierarchy: &Hierarchy, id: Option<usize>) -> Option<contour::ContourRef<'_>> {
    match id {
        Some(id) => hierarchy.get(NodeId(id)),
        None => hierarchy.head(),
    }
}
