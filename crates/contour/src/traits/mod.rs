use image::GrayImage;
use crate::{
    config::{ApproxMethod, MatchMethod},
    error::Result,
    types::Point,
};

/// Whether a traced border encloses foreground or a hole in it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderKind {
    Outer,
    Hole,
}

/// A border as reported by a tracing pass, before hierarchy assembly
#[derive(Debug, Clone, PartialEq)]
pub struct RawContour {
    pub points: Vec<Point>,
    /// Index of the enclosing border in the same trace output
    pub parent: Option<usize>,
    pub kind: BorderKind,
}

/// The vision library primitives the contour API is built on.
///
/// Implementations own the numerics; callers own option handling and
/// hierarchy bookkeeping.
pub trait VisionBackend: Send + Sync {
    /// Trace every border of a binary image. Nonzero pixels are foreground.
    fn trace(&self, image: &GrayImage) -> Result<Vec<RawContour>>;

    /// Simplify a closed polygon. Must not return an empty polygon for a
    /// non-empty input.
    fn approx_poly(&self, points: &[Point], method: ApproxMethod, accuracy: f64) -> Result<Vec<Point>>;

    /// With `measure_dist` off: `1.0` inside, `-1.0` outside, `0.0` on the
    /// boundary. With it on: signed distance to the closest edge, positive
    /// inside.
    fn point_polygon_test(&self, points: &[Point], point: Point, measure_dist: bool) -> f64;

    /// Moment-based dissimilarity, `0.0` for identical shapes.
    fn match_shapes(&self, a: &[Point], b: &[Point], method: MatchMethod) -> Result<f64>;
}

/// Image preparation applied before tracing (e.g. blur, threshold)
pub trait ImagePreprocessor: Send + Sync {
    fn preprocess(&self, image: &GrayImage) -> Result<GrayImage>;
}

impl<B: VisionBackend + ?Sized> VisionBackend for &B {
    fn trace(&self, image: &GrayImage) -> Result<Vec<RawContour>> {
        (**self).trace(image)
    }

    fn approx_poly(&self, points: &[Point], method: ApproxMethod, accuracy: f64) -> Result<Vec<Point>> {
        (**self).approx_poly(points, method, accuracy)
    }

    fn point_polygon_test(&self, points: &[Point], point: Point, measure_dist: bool) -> f64 {
        (**self).point_polygon_test(points, point, measure_dist)
    }

    fn match_shapes(&self, a: &[Point], b: &[Point], method: MatchMethod) -> Result<f64> {
        (**self).match_shapes(a, b, method)
    }
}
