use std::ops::Index;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    error::{ContourError, Result},
    types::{Point, Rect},
};

/// Number of opaque slots carried by every contour.
pub const RESERVED_SLOTS: usize = 3;

/// An ordered boundary point sequence with its bounding rectangle, a color
/// tag and three reserved slots.
///
/// Point order is trace order. The bounding rectangle is derived and kept
/// in sync with the points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(from = "ContourRepr")]
pub struct Contour {
    points: Vec<Point>,
    #[serde(skip_serializing)]
    rect: Rect,
    color: i32,
    reserved: [i32; RESERVED_SLOTS],
}

impl Contour {
    pub fn new() -> Self {
        Self {
            points: Vec::new(),
            rect: Rect::default(),
            color: 0,
            reserved: [0; RESERVED_SLOTS],
        }
    }

    pub fn from_points(points: Vec<Point>) -> Self {
        let rect = Rect::covering(&points);
        Self {
            points,
            rect,
            ..Self::new()
        }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Replace the points, re-deriving the bounding rectangle.
    pub fn set_points(&mut self, points: Vec<Point>) {
        self.rect = Rect::covering(&points);
        self.points = points;
    }

    pub fn into_points(self) -> Vec<Point> {
        self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Point> {
        self.points.get(index).copied()
    }

    pub fn first(&self) -> Option<Point> {
        self.points.first().copied()
    }

    pub fn last(&self) -> Option<Point> {
        self.points.last().copied()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn color(&self) -> i32 {
        self.color
    }

    pub fn set_color(&mut self, color: i32) {
        self.color = color;
    }

    pub fn reserved(&self) -> &[i32; RESERVED_SLOTS] {
        &self.reserved
    }

    pub fn reserved_mut(&mut self) -> &mut [i32; RESERVED_SLOTS] {
        &mut self.reserved
    }
}

impl Default for Contour {
    fn default() -> Self {
        Self::new()
    }
}

impl Index<usize> for Contour {
    type Output = Point;

    fn index(&self, index: usize) -> &Point {
        &self.points[index]
    }
}

impl<'a> IntoIterator for &'a Contour {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl FromIterator<Point> for Contour {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Self::from_points(iter.into_iter().collect())
    }
}

impl From<Vec<Point>> for Contour {
    fn from(points: Vec<Point>) -> Self {
        Self::from_points(points)
    }
}

#[derive(Deserialize)]
struct ContourRepr {
    points: Vec<Point>,
    #[serde(default)]
    color: i32,
    #[serde(default)]
    reserved: [i32; RESERVED_SLOTS],
}

impl From<ContourRepr> for Contour {
    fn from(repr: ContourRepr) -> Self {
        let mut contour = Contour::from_points(repr.points);
        contour.color = repr.color;
        contour.reserved = repr.reserved;
        contour
    }
}

/// Strict conversion from loosely typed JSON.
///
/// Accepts an array whose elements are `[x, y]` integer pairs or
/// `{"x": .., "y": ..}` objects. Anything else, including fractional
/// coordinates, is a type error.
impl TryFrom<&Value> for Contour {
    type Error = ContourError;

    fn try_from(value: &Value) -> Result<Self> {
        let items = value
            .as_array()
            .ok_or_else(|| ContourError::type_mismatch("contour (array of points)", json_kind(value)))?;

        items.iter().map(point_from_json).collect::<Result<Vec<_>>>().map(Contour::from_points)
    }
}

fn point_from_json(value: &Value) -> Result<Point> {
    let (x, y) = match value {
        Value::Array(pair) if pair.len() == 2 => (&pair[0], &pair[1]),
        Value::Object(map) => match (map.get("x"), map.get("y")) {
            (Some(x), Some(y)) => (x, y),
            _ => return Err(ContourError::type_mismatch("point with x and y", value)),
        },
        other => return Err(ContourError::type_mismatch("point", json_kind(other))),
    };
    Ok(Point::new(coord_from_json(x)?, coord_from_json(y)?))
}

fn coord_from_json(value: &Value) -> Result<i32> {
    value
        .as_i64()
        .and_then(|v| i32::try_from(v).ok())
        .ok_or_else(|| ContourError::type_mismatch("32-bit integer coordinate", value))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
