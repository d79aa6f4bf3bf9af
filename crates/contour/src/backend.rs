//! Default [`VisionBackend`] built on imageproc and geo.

use geo::coordinate_position::{CoordPos, CoordinatePosition};
use geo::{EuclideanDistance, Simplify, SimplifyVw};
use geo_types::{Coord, LineString, Polygon};
use image::GrayImage;
use imageproc::contours::BorderType;
use tracing::{debug, trace};

use crate::{
    algorithms::moments::{log_hu, Moments},
    config::{ApproxMethod, MatchMethod},
    error::{ContourError, Result},
    traits::{BorderKind, RawContour, VisionBackend},
    types::Point,
};

/// Tracing via imageproc (Suzuki-Abe border following), geometry via geo,
/// shape matching via Hu moments.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageprocBackend;

impl ImageprocBackend {
    fn polygon(points: &[Point]) -> Polygon<f64> {
        let ring: LineString<f64> = points.iter().map(|p| p.to_coord()).collect::<Vec<Coord<f64>>>().into();
        Polygon::new(ring, vec![])
    }
}

impl VisionBackend for ImageprocBackend {
    fn trace(&self, image: &GrayImage) -> Result<Vec<RawContour>> {
        let contours = imageproc::contours::find_contours::<i32>(image);
        debug!(
            width = image.width(),
            height = image.height(),
            borders = contours.len(),
            "traced binary image"
        );

        let raw = contours
            .into_iter()
            .map(|contour| RawContour {
                points: contour.points.into_iter().map(Point::from).collect(),
                parent: contour.parent,
                kind: match contour.border_type {
                    BorderType::Outer => BorderKind::Outer,
                    BorderType::Hole => BorderKind::Hole,
                },
            })
            .collect();

        Ok(raw)
    }

    fn approx_poly(&self, points: &[Point], method: ApproxMethod, accuracy: f64) -> Result<Vec<Point>> {
        if points.len() < 3 {
            return Ok(points.to_vec());
        }

        // Close the ring so the edge back to the start is simplified too
        let mut coords: Vec<Coord<f64>> = points.iter().map(|p| p.to_coord()).collect();
        coords.push(points[0].to_coord());
        let ring = LineString::new(coords);

        let simplified = match method {
            ApproxMethod::Dp => ring.simplify(&accuracy),
            ApproxMethod::Vw => ring.simplify_vw(&accuracy),
        };

        let mut result: Vec<Point> = simplified
            .coords()
            .map(|c| Point::new(c.x.round() as i32, c.y.round() as i32))
            .collect();
        if result.len() > 1 && result.first() == result.last() {
            result.pop();
        }
        if result.is_empty() {
            result.push(points[0]);
        }

        trace!(%method, accuracy, before = points.len(), after = result.len(), "approximated polygon");
        Ok(result)
    }

    fn point_polygon_test(&self, points: &[Point], point: Point, measure_dist: bool) -> f64 {
        if points.is_empty() {
            return if measure_dist { f64::NEG_INFINITY } else { -1.0 };
        }

        let polygon = Self::polygon(points);
        let sign = match polygon.coordinate_position(&point.to_coord()) {
            CoordPos::Inside => 1.0,
            CoordPos::Outside => -1.0,
            CoordPos::OnBoundary => 0.0,
        };
        if !measure_dist || sign == 0.0 {
            return sign;
        }

        let query = geo::Point::from(point.to_coord());
        // A one-point ring has no segments to measure against
        let distance = if polygon.exterior().lines().next().is_none() {
            query.euclidean_distance(&geo::Point::from(points[0].to_coord()))
        } else {
            query.euclidean_distance(polygon.exterior())
        };
        sign * distance
    }

    fn match_shapes(&self, a: &[Point], b: &[Point], method: MatchMethod) -> Result<f64> {
        if a.is_empty() || b.is_empty() {
            return Err(ContourError::EmptyContour);
        }

        let hu_a = Moments::of_polygon(a).hu();
        let hu_b = Moments::of_polygon(b).hu();

        let pairs = hu_a
            .iter()
            .zip(hu_b.iter())
            .filter_map(|(&ha, &hb)| Some((log_hu(ha)?, log_hu(hb)?)));

        let score: f64 = match method {
            MatchMethod::I1 => pairs.map(|(ma, mb)| (1.0 / ma - 1.0 / mb).abs()).sum(),
            MatchMethod::I2 => pairs.map(|(ma, mb)| (ma - mb).abs()).sum(),
            MatchMethod::I3 => pairs.map(|(ma, mb)| ((ma - mb) / ma).abs()).fold(0.0, f64::max),
        };

        debug!(%method, score, "matched shapes");
        Ok(score)
    }
}
