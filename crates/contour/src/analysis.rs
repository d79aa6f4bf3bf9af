//! Geometry queries, polygon approximation and shape matching.
//!
//! [`ContourAnalyzer`] marshals options and results around any
//! [`VisionBackend`]. The convenience methods on [`Contour`],
//! [`ContourRef`] and [`Hierarchy`] use the default backend.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::{
    backend::ImageprocBackend,
    config::{ApproxOptions, MatchMethod},
    contour::Contour,
    error::{ContourError, Result},
    hierarchy::{ContourRef, Hierarchy, NodeId},
    traits::VisionBackend,
    types::{Point, Rect},
};

#[derive(Debug, Clone, Default)]
pub struct ContourAnalyzer<B = ImageprocBackend> {
    backend: B,
}

impl<B: VisionBackend> ContourAnalyzer<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Minimal axis-aligned rectangle covering the contour.
    pub fn bounding_rect(&self, contour: &Contour) -> Rect {
        Rect::covering(contour.points())
    }

    /// `Some(true)` strictly inside, `Some(false)` strictly outside, `None`
    /// exactly on the boundary.
    pub fn contains_point(&self, contour: &Contour, point: Point) -> Option<bool> {
        let side = self.backend.point_polygon_test(contour.points(), point, false);
        if side > 0.0 {
            Some(true)
        } else if side < 0.0 {
            Some(false)
        } else {
            None
        }
    }

    /// Signed distance to the closest edge: positive inside, negative outside.
    pub fn measure_distance(&self, contour: &Contour, point: Point) -> f64 {
        self.backend.point_polygon_test(contour.points(), point, true)
    }

    /// `1.0`/`-1.0`/`0.0` classification when `measure_dist` is false,
    /// signed distance when it is true.
    ///
    /// Unlike [`contains_point`](Self::contains_point), the boundary is
    /// reported as `0.0` here.
    pub fn point_polygon_test(&self, contour: &Contour, point: Point, measure_dist: bool) -> f64 {
        self.backend.point_polygon_test(contour.points(), point, measure_dist)
    }

    /// Simplified copy of a single contour, with color and reserved slots
    /// reset. `options.recursive` has no effect here.
    pub fn approx_contour(&self, contour: &Contour, options: &ApproxOptions) -> Result<Contour> {
        if contour.is_empty() {
            return Err(ContourError::EmptyContour);
        }
        let points = self
            .backend
            .approx_poly(contour.points(), options.method, options.accuracy)?;
        Ok(Contour::from_points(points))
    }

    /// Approximate starting at `start`.
    ///
    /// Without `recursive` the result holds one contour. With it, the result
    /// mirrors `start`, its following siblings and everything nested below
    /// them; the parent and preceding siblings of `start` are left out.
    pub fn approx_poly(&self, start: ContourRef<'_>, options: &ApproxOptions) -> Result<Hierarchy> {
        if !options.recursive {
            let contour = self.approx_contour(start.contour(), options)?;
            return Ok(Hierarchy::from_contours(vec![contour]));
        }

        let mut index: HashMap<NodeId, usize> = HashMap::new();
        let mut entries = Vec::new();
        for node in start
            .siblings()
            .flat_map(|root| std::iter::once(root).chain(root.descendants()))
        {
            let parent = node.parent().and_then(|p| index.get(&p.id()).copied());
            let contour = self.approx_contour(node.contour(), options)?;
            index.insert(node.id(), entries.len());
            entries.push((contour, parent));
        }

        debug!(
            contours = entries.len(),
            method = %options.method,
            accuracy = options.accuracy,
            "approximated hierarchy"
        );
        Ok(Hierarchy::from_parents(entries))
    }

    /// Hu-moment dissimilarity between two contours. `parameter` is accepted
    /// for call compatibility and ignored.
    pub fn match_shapes(
        &self,
        a: &Contour,
        b: &Contour,
        method: MatchMethod,
        _parameter: Option<f64>,
    ) -> Result<f64> {
        self.backend.match_shapes(a.points(), b.points(), method)
    }

    /// Like [`match_shapes`](Self::match_shapes) with a raw method code;
    /// unknown codes are type errors.
    pub fn match_shapes_code(&self, a: &Contour, b: &Contour, code: i32) -> Result<f64> {
        let method = MatchMethod::try_from(code)?;
        self.match_shapes(a, b, method, None)
    }

    /// Shape matching on untyped arguments. Each shape must convert through
    /// `Contour::try_from` and the method must be an integer code; anything
    /// else is a type error raised before any computation.
    pub fn match_shapes_value(&self, a: &Value, b: &Value, method: &Value) -> Result<f64> {
        let a = Contour::try_from(a)?;
        let b = Contour::try_from(b)?;
        let code = method
            .as_i64()
            .and_then(|c| i32::try_from(c).ok())
            .ok_or_else(|| ContourError::type_mismatch("match method code", method))?;
        self.match_shapes_code(&a, &b, code)
    }
}

impl Contour {
    pub fn bounding_rect(&self) -> Rect {
        ContourAnalyzer::<ImageprocBackend>::default().bounding_rect(self)
    }

    pub fn contains_point(&self, point: Point) -> Option<bool> {
        ContourAnalyzer::<ImageprocBackend>::default().contains_point(self, point)
    }

    pub fn measure_distance(&self, point: Point) -> f64 {
        ContourAnalyzer::<ImageprocBackend>::default().measure_distance(self, point)
    }

    pub fn point_polygon_test(&self, point: Point, measure_dist: bool) -> f64 {
        ContourAnalyzer::<ImageprocBackend>::default().point_polygon_test(self, point, measure_dist)
    }

    pub fn approx_poly(&self, options: &ApproxOptions) -> Result<Contour> {
        ContourAnalyzer::<ImageprocBackend>::default().approx_contour(self, options)
    }

    pub fn match_shapes(&self, other: &Contour, method: MatchMethod, parameter: Option<f64>) -> Result<f64> {
        ContourAnalyzer::<ImageprocBackend>::default().match_shapes(self, other, method, parameter)
    }

    pub fn match_shapes_code(&self, other: &Contour, code: i32) -> Result<f64> {
        ContourAnalyzer::<ImageprocBackend>::default().match_shapes_code(self, other, code)
    }
}

impl ContourRef<'_> {
    /// Approximation that honours `options.recursive`; see
    /// [`ContourAnalyzer::approx_poly`].
    pub fn approx_poly(&self, options: &ApproxOptions) -> Result<Hierarchy> {
        ContourAnalyzer::<ImageprocBackend>::default().approx_poly(*self, options)
    }
}

impl Hierarchy {
    /// Approximate from the head. An empty hierarchy stays empty.
    pub fn approx_poly(&self, options: &ApproxOptions) -> Result<Hierarchy> {
        match self.head() {
            Some(head) => head.approx_poly(options),
            None => Ok(Hierarchy::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{ApproxMethod, ChainApprox, RetrievalMode, TraceOptions},
        trace::find_contours,
    };
    use image::{GrayImage, Luma};
    use strum::IntoEnumIterator;

    fn create_disk_image() -> GrayImage {
        GrayImage::from_fn(128, 128, |x, y| {
            let (dx, dy) = (x as i64 - 64, y as i64 - 64);
            if dx * dx + dy * dy <= 32 * 32 { Luma([255u8]) } else { Luma([0u8]) }
        })
    }

    fn create_rect_image() -> GrayImage {
        GrayImage::from_fn(128, 128, |x, y| {
            if (20..100).contains(&x) && (50..70).contains(&y) { Luma([255u8]) } else { Luma([0u8]) }
        })
    }

    fn disk_contour() -> Hierarchy {
        find_contours(&create_disk_image(), &TraceOptions::default()).expect("Should trace disk")
    }

    #[test]
    fn test_bounding_rect_of_disk() {
        let contours = disk_contour();
        let head = contours.head().expect("Should find the disk");
        assert_eq!(head.bounding_rect(), Rect::new(32, 32, 65, 65));
        assert_eq!(head.rect(), head.bounding_rect());
    }

    #[test]
    fn test_contains_point_is_tri_state() {
        let contours = disk_contour();
        let head = contours.head().expect("Should find the disk");
        assert_eq!(head.contains_point(Point::new(64, 64)), Some(true));
        assert_eq!(head.contains_point(Point::new(0, 0)), Some(false));
        assert_eq!(head.contains_point(Point::new(64, 32)), None);
    }

    #[test]
    fn test_measure_distance() {
        let contours = disk_contour();
        let head = contours.head().expect("Should find the disk");
        assert!((head.measure_distance(Point::new(63, 32)) + 0.7071).abs() < 0.01);
        assert!((head.measure_distance(Point::new(64, 64)) - 31.01).abs() < 0.01);
    }

    #[test]
    fn test_point_polygon_test_modes() {
        let contours = disk_contour();
        let head = contours.head().expect("Should find the disk");

        assert_eq!(head.point_polygon_test(Point::new(64, 64), false), 1.0);
        assert_eq!(head.point_polygon_test(Point::new(0, 0), false), -1.0);
        assert_eq!(head.point_polygon_test(Point::new(64, 32), false), 0.0);

        for point in [Point::new(63, 32), Point::new(64, 64), Point::new(0, 0), Point::new(64, 32)] {
            assert_eq!(head.point_polygon_test(point, true), head.measure_distance(point));
        }
    }

    #[test]
    fn test_approx_poly_option_combinations() {
        let contours = disk_contour();
        let mut options = vec![
            ApproxOptions::default(),
            ApproxOptions::default().with_method(ApproxMethod::Dp),
            ApproxOptions::default().with_accuracy(2.0).expect("Valid accuracy"),
            ApproxOptions::new(ApproxMethod::Dp, 2.0, false).expect("Valid options"),
        ];
        for recursive in [true, false] {
            options.push(ApproxOptions::default().with_recursive(recursive));
        }

        for opts in options {
            let poly = contours.approx_poly(&opts).expect("Should approximate");
            let head = poly.head().expect("Should have a head");
            assert!(!head.is_empty());
            assert!(head.len() < contours.head().map(|c| c.len()).unwrap_or(0));
            assert!(head.iter().all(|p| head.rect().contains(*p)));
            assert_eq!(head.color(), 0);
        }
    }

    #[test]
    fn test_approx_with_integer_recursive_flag() {
        let image = GrayImage::from_fn(128, 128, |x, y| {
            let in_disk = |cx: i64| {
                let (dx, dy) = (x as i64 - cx, y as i64 - 64);
                dx * dx + dy * dy <= 20 * 20
            };
            if in_disk(32) || in_disk(96) { Luma([255u8]) } else { Luma([0u8]) }
        });
        let contours = find_contours(&image, &TraceOptions::default()).expect("Should trace disks");
        assert_eq!(contours.len(), 2);

        let on: ApproxOptions = serde_json::from_str(r#"{"method": "dp", "recursive": 1}"#).expect("Should parse");
        let off: ApproxOptions = serde_json::from_str(r#"{"method": "default", "recursive": 0}"#).expect("Should parse");

        let all = contours.approx_poly(&on).expect("Should approximate");
        assert_eq!(all.len(), 2);
        let one = contours.approx_poly(&off).expect("Should approximate");
        assert_eq!(one.len(), 1);
        assert!(all.iter().chain(one.iter()).all(|c| !c.is_empty()));
    }

    #[test]
    fn test_approx_is_size_idempotent() {
        let contours = disk_contour();
        let options = ApproxOptions::default().with_accuracy(2.0).expect("Valid accuracy");
        let once = contours.approx_poly(&options).expect("Should approximate");
        let twice = once.approx_poly(&options).expect("Should approximate again");
        let size = |h: &Hierarchy| h.head().map(|c| c.len()).unwrap_or(0);
        assert!(size(&twice) <= size(&once));
    }

    #[test]
    fn test_approx_resets_color() {
        let mut contours = disk_contour();
        let id = contours.head().map(|c| c.id()).expect("Should find the disk");
        contours.contour_mut(id).expect("Should exist").set_color(7);
        let poly = contours.approx_poly(&ApproxOptions::default()).expect("Should approximate");
        assert_eq!(poly.head().map(|c| c.color()), Some(0));
        assert!(Contour::new().approx_poly(&ApproxOptions::default()).is_err());
    }

    #[test]
    fn test_recursive_approx_follows_siblings_and_children() {
        // Two rings side by side: each outer border holds one hole
        let image = GrayImage::from_fn(100, 50, |x, y| {
            let in_ring = |cx: u32| {
                let inside_outer = (cx - 15..=cx + 15).contains(&x) && (10..=40).contains(&y);
                let inside_hole = (cx - 5..=cx + 5).contains(&x) && (20..=30).contains(&y);
                inside_outer && !inside_hole
            };
            if in_ring(25) || in_ring(75) { Luma([255u8]) } else { Luma([0u8]) }
        });
        let options = TraceOptions::new(RetrievalMode::CComp, ChainApprox::Simple);
        let contours = find_contours(&image, &options).expect("Should trace rings");
        assert_eq!(contours.len(), 4);

        let recursive = ApproxOptions::default().with_recursive(true);
        let poly = contours.approx_poly(&recursive).expect("Should approximate");
        assert_eq!(poly.len(), 4);
        assert_eq!(poly.roots().count(), 2);
        assert!(poly.roots().all(|root| root.children().count() == 1));

        // Starting at the second root leaves the first one out
        let second = contours.roots().nth(1).expect("Should have two roots");
        let partial = second.approx_poly(&recursive).expect("Should approximate");
        assert_eq!(partial.len(), 2);

        let single = second.approx_poly(&ApproxOptions::default()).expect("Should approximate");
        assert_eq!(single.len(), 1);
        assert!(single.head().and_then(|h| h.next()).is_none());
    }

    #[test]
    fn test_match_shapes() {
        let disk = disk_contour();
        let rect = find_contours(&create_rect_image(), &TraceOptions::default()).expect("Should trace");
        let a = disk.head().expect("Should find the disk");
        let b = rect.head().expect("Should find the rectangle");

        for method in MatchMethod::iter() {
            assert!(a.match_shapes(&a, method, None).expect("Should match").abs() < 0.01);
            assert!(a.match_shapes(&b, method, None).expect("Should match") > 0.0);
            assert!(a.match_shapes_code(&b, method.code()).expect("Should match") > 0.0);
        }
    }

    #[test]
    fn test_match_shapes_rejects_bad_method_code() {
        let disk = disk_contour();
        let a = disk.head().expect("Should find the disk");
        let err = a.match_shapes_code(&a, 42).unwrap_err();
        assert!(err.is_type_error());
    }

    #[test]
    fn test_match_shapes_value_rejects_non_contours() {
        let analyzer = ContourAnalyzer::new(ImageprocBackend);
        let triangle = serde_json::json!([[0, 0], [20, 0], [0, 30]]);
        let square = serde_json::json!([[0, 0], [20, 0], [20, 20], [0, 20]]);

        let same = analyzer
            .match_shapes_value(&triangle, &triangle, &serde_json::json!(1))
            .expect("Should match");
        assert!(same.abs() < 0.01);
        assert!(analyzer.match_shapes_value(&triangle, &square, &serde_json::json!(2)).expect("Should match") > 0.0);

        let bad_shapes = [serde_json::json!("circle"), serde_json::json!(7), serde_json::json!([[1.5, 2]])];
        for bad in &bad_shapes {
            assert!(analyzer.match_shapes_value(bad, &square, &serde_json::json!(1)).unwrap_err().is_type_error());
            assert!(analyzer.match_shapes_value(&square, bad, &serde_json::json!(1)).unwrap_err().is_type_error());
        }
        for bad_method in [serde_json::json!("i1"), serde_json::json!(1.5), serde_json::json!(9)] {
            let err = analyzer.match_shapes_value(&triangle, &square, &bad_method).unwrap_err();
            assert!(err.is_type_error());
        }
    }
}
