use geo_types::Coord;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Integer pixel coordinate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub(crate) fn to_coord(self) -> Coord<f64> {
        Coord {
            x: self.x as f64,
            y: self.y as f64,
        }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

impl From<Point> for (i32, i32) {
    fn from(p: Point) -> Self {
        (p.x, p.y)
    }
}

impl From<imageproc::point::Point<i32>> for Point {
    fn from(p: imageproc::point::Point<i32>) -> Self {
        Self { x: p.x, y: p.y }
    }
}

impl From<Point> for imageproc::point::Point<i32> {
    fn from(p: Point) -> Self {
        imageproc::point::Point::new(p.x, p.y)
    }
}

impl From<Point> for Coord<f64> {
    fn from(p: Point) -> Self {
        p.to_coord()
    }
}

/// Axis-aligned rectangle in pixel units.
///
/// `width` and `height` count pixels, so a rectangle covering a single
/// point is `1 x 1`. They are 64-bit so the extent of any pair of `i32`
/// coordinates fits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i64,
    pub height: i64,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: i64, height: i64) -> Self {
        Self { x, y, width, height }
    }

    /// Minimal rectangle covering every point. Empty input gives the zero rect.
    pub fn covering<'a, I>(points: I) -> Self
    where
        I: IntoIterator<Item = &'a Point>,
    {
        let mut iter = points.into_iter();
        let Some(first) = iter.next() else {
            return Self::default();
        };

        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in iter {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        Self {
            x: min_x,
            y: min_y,
            width: i64::from(max_x) - i64::from(min_x) + 1,
            height: i64::from(max_y) - i64::from(min_y) + 1,
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.y >= self.y
            && i64::from(point.x) < i64::from(self.x) + self.width
            && i64::from(point.y) < i64::from(self.y) + self.height
    }

    pub fn area(&self) -> i64 {
        self.width.saturating_mul(self.height)
    }
}
