//! Option records for tracing, approximation and shape matching.
//!
//! Every record has documented defaults and is validated when it is built
//! (or deserialized), so the façade functions never re-check their options.

use std::str::FromStr;

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};

use crate::error::{ContourError, Result};

/// Polygon approximation algorithm.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
)]
#[serde(rename_all = "snake_case", try_from = "MethodRepr")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ApproxMethod {
    /// Douglas-Peucker; accuracy is the maximum distance from the original curve
    #[default]
    #[strum(to_string = "dp", serialize = "default")]
    Dp,
    /// Visvalingam-Whyatt; accuracy is the minimum triangle area kept
    Vw,
}

impl ApproxMethod {
    /// Native integer code of the method.
    pub fn code(self) -> i32 {
        match self {
            Self::Dp => 0,
            Self::Vw => 1,
        }
    }

    pub fn parse(name: &str) -> Result<Self> {
        Self::from_str(name).map_err(|_| ContourError::UnsupportedApproxMethod(name.to_string()))
    }
}

impl TryFrom<i32> for ApproxMethod {
    type Error = ContourError;

    fn try_from(code: i32) -> Result<Self> {
        match code {
            0 => Ok(Self::Dp),
            1 => Ok(Self::Vw),
            other => Err(ContourError::UnsupportedApproxMethod(other.to_string())),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MethodRepr {
    Name(String),
    Code(i64),
}

impl TryFrom<MethodRepr> for ApproxMethod {
    type Error = ContourError;

    fn try_from(repr: MethodRepr) -> Result<Self> {
        match repr {
            MethodRepr::Name(name) => Self::parse(&name),
            MethodRepr::Code(code) => i32::try_from(code)
                .map_err(|_| ContourError::UnsupportedApproxMethod(code.to_string()))
                .and_then(Self::try_from),
        }
    }
}

/// Options for polygon approximation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(try_from = "ApproxOptionsRepr")]
pub struct ApproxOptions {
    pub method: ApproxMethod,
    pub accuracy: f64,
    /// Approximate following siblings and nested contours too
    pub recursive: bool,
}

impl ApproxOptions {
    pub const DEFAULT: Self = Self {
        method: ApproxMethod::Dp,
        accuracy: 1.0,
        recursive: false,
    };

    pub fn new(method: ApproxMethod, accuracy: f64, recursive: bool) -> Result<Self> {
        if !accuracy.is_finite() || accuracy <= 0.0 {
            return Err(ContourError::InvalidAccuracy(accuracy));
        }
        Ok(Self {
            method,
            accuracy,
            recursive,
        })
    }

    pub fn with_method(self, method: ApproxMethod) -> Self {
        Self { method, ..self }
    }

    pub fn with_accuracy(self, accuracy: f64) -> Result<Self> {
        Self::new(self.method, accuracy, self.recursive)
    }

    pub fn with_recursive(self, recursive: bool) -> Self {
        Self { recursive, ..self }
    }

    /// Get the JSON schema for the options record
    pub fn schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ApproxOptions)
    }
}

impl Default for ApproxOptions {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Deserialize)]
struct ApproxOptionsRepr {
    #[serde(default)]
    method: ApproxMethod,
    #[serde(default = "default_accuracy")]
    accuracy: f64,
    #[serde(default, deserialize_with = "deserialize_truthy")]
    recursive: bool,
}

fn default_accuracy() -> f64 {
    ApproxOptions::DEFAULT.accuracy
}

impl TryFrom<ApproxOptionsRepr> for ApproxOptions {
    type Error = ContourError;

    fn try_from(repr: ApproxOptionsRepr) -> Result<Self> {
        Self::new(repr.method, repr.accuracy, repr.recursive)
    }
}

/// Accepts `true`/`false` as well as integers, where zero is false.
pub fn deserialize_truthy<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Truthy {
        Bool(bool),
        Int(i64),
    }

    Ok(match Truthy::deserialize(deserializer)? {
        Truthy::Bool(b) => b,
        Truthy::Int(i) => i != 0,
    })
}

/// Which borders a tracing pass keeps and how it links them.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum RetrievalMode {
    /// Outermost borders only
    External,
    /// Every border as one flat sibling chain
    #[default]
    List,
    /// Two levels: outer borders with their holes as children
    #[serde(rename = "ccomp")]
    #[strum(serialize = "ccomp")]
    CComp,
    /// Full nesting tree
    Tree,
}

/// Point storage for traced contours.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum ChainApprox {
    /// Every border pixel
    None,
    /// Endpoints of horizontal, vertical and diagonal runs
    #[default]
    Simple,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TraceOptions {
    pub mode: RetrievalMode,
    pub method: ChainApprox,
}

impl TraceOptions {
    pub fn new(mode: RetrievalMode, method: ChainApprox) -> Self {
        Self { mode, method }
    }
}

/// Hu-moment comparison used by shape matching.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[repr(i32)]
pub enum MatchMethod {
    /// Sum of absolute differences of reciprocal log-Hu values
    I1 = 1,
    /// Sum of absolute differences of log-Hu values
    I2 = 2,
    /// Maximum relative difference of log-Hu values
    I3 = 3,
}

impl MatchMethod {
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for MatchMethod {
    type Error = ContourError;

    fn try_from(code: i32) -> Result<Self> {
        match code {
            1 => Ok(Self::I1),
            2 => Ok(Self::I2),
            3 => Ok(Self::I3),
            other => Err(ContourError::type_mismatch("match method code 1, 2 or 3", other)),
        }
    }
}
