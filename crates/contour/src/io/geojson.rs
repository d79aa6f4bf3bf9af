use geo::Area;
use geojson::{Feature, FeatureCollection, Geometry, Value};
use serde_json::{json, Map};

use crate::{
    contour::Contour,
    error::{ContourError, Result},
    hierarchy::Hierarchy,
    types::Point,
};

impl Contour {
    /// Closed exterior ring in GeoJSON coordinate order.
    fn ring(&self) -> Vec<Vec<f64>> {
        let mut ring: Vec<Vec<f64>> = self.iter().map(|p| vec![p.x as f64, p.y as f64]).collect();
        if let Some(first) = ring.first().cloned() {
            ring.push(first);
        }
        ring
    }

    /// Enclosed area of the contour polygon.
    pub fn area(&self) -> f64 {
        let coords: Vec<geo_types::Coord<f64>> = self.iter().map(|p| p.to_coord()).collect();
        geo_types::Polygon::new(coords.into(), vec![]).unsigned_area()
    }
}

impl Hierarchy {
    /// One Polygon feature per contour, in arena order.
    pub fn to_geojson(&self) -> Result<FeatureCollection> {
        let mut features = Vec::with_capacity(self.len());

        for node in self.iter() {
            let mut properties = Map::new();
            properties.insert("id".to_string(), json!(node.id().0));
            properties.insert("parent".to_string(), json!(node.parent().map(|p| p.id().0)));
            properties.insert("color".to_string(), json!(node.color()));
            properties.insert("rect".to_string(), serde_json::to_value(node.rect())?);
            properties.insert("point_count".to_string(), json!(node.len()));
            properties.insert("area".to_string(), json!(node.area()));

            features.push(Feature {
                bbox: None,
                geometry: Some(Geometry::new(Value::Polygon(vec![node.ring()]))),
                id: Some(geojson::feature::Id::Number(node.id().0.into())),
                properties: Some(properties),
                foreign_members: None,
            });
        }

        let mut foreign_members = Map::new();
        foreign_members.insert("contour_count".to_string(), json!(self.len()));

        Ok(FeatureCollection {
            bbox: None,
            features,
            foreign_members: Some(foreign_members),
        })
    }

    pub fn to_geojson_string(&self) -> Result<String> {
        let geojson = self.to_geojson()?;
        Ok(serde_json::to_string_pretty(&geojson)?)
    }

    pub fn save_geojson(&self, path: &str) -> Result<()> {
        std::fs::write(path, self.to_geojson_string()?)?;
        Ok(())
    }

    /// Rebuild a hierarchy written by [`to_geojson`](Self::to_geojson).
    pub fn from_geojson_string(geojson_str: &str) -> Result<Self> {
        let collection: FeatureCollection = geojson_str.parse()?;
        let mut entries = Vec::with_capacity(collection.features.len());

        for feature in collection.features {
            let Some(Value::Polygon(rings)) = feature.geometry.map(|g| g.value) else {
                return Err(ContourError::type_mismatch("Polygon feature", "other geometry"));
            };
            let mut points = rings
                .first()
                .map(|ring| ring.iter().map(|c| coord_to_point(c)).collect::<Result<Vec<_>>>())
                .transpose()?
                .unwrap_or_default();
            if points.len() > 1 && points.first() == points.last() {
                points.pop();
            }

            let properties = feature.properties.unwrap_or_default();
            let parent = properties
                .get("parent")
                .and_then(|v| v.as_u64())
                .map(|p| p as usize);
            let mut contour = Contour::from_points(points);
            if let Some(color) = properties.get("color") {
                let color = color
                    .as_i64()
                    .and_then(|c| i32::try_from(c).ok())
                    .ok_or_else(|| ContourError::type_mismatch("32-bit integer color", color))?;
                contour.set_color(color);
            }
            entries.push((contour, parent));
        }

        Ok(Hierarchy::from_parents(entries))
    }
}

fn coord_to_point(coord: &[f64]) -> Result<Point> {
    match coord {
        [x, y, ..] => match (exact_i32(*x), exact_i32(*y)) {
            (Some(x), Some(y)) => Ok(Point::new(x, y)),
            _ => Err(ContourError::type_mismatch("32-bit integer position", format!("{coord:?}"))),
        },
        _ => Err(ContourError::type_mismatch("integer position", format!("{coord:?}"))),
    }
}

fn exact_i32(v: f64) -> Option<i32> {
    let in_range = v >= f64::from(i32::MIN) && v <= f64::from(i32::MAX);
    (in_range && v.fract() == 0.0).then_some(v as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Hierarchy {
        let outer = Contour::from_points(vec![Point::new(0, 0), Point::new(10, 0), Point::new(10, 10), Point::new(0, 10)]);
        let mut inner = Contour::from_points(vec![Point::new(2, 2), Point::new(4, 2), Point::new(4, 4)]);
        inner.set_color(9);
        Hierarchy::from_parents(vec![(outer, None), (inner, Some(0))])
    }

    #[test]
    fn test_geojson_export() {
        let geojson = sample().to_geojson().expect("Should create GeoJSON");
        assert_eq!(geojson.features.len(), 2);

        let props = geojson.features[1].properties.as_ref().expect("Should have properties");
        assert_eq!(props.get("parent").and_then(|v| v.as_u64()), Some(0));
        assert_eq!(props.get("color").and_then(|v| v.as_i64()), Some(9));

        let area = geojson.features[0].properties.as_ref().and_then(|p| p.get("area")).and_then(|v| v.as_f64());
        assert_eq!(area, Some(100.0));
    }

    #[test]
    fn test_geojson_reload_keeps_nesting() {
        let original = sample();
        let text = original.to_geojson_string().expect("Should serialize");
        let reloaded = Hierarchy::from_geojson_string(&text).expect("Should parse");

        assert_eq!(reloaded.len(), 2);
        let head = reloaded.head().expect("Should have a head");
        assert_eq!(head.len(), 4);
        assert_eq!(head.child().map(|c| c.color()), Some(9));
    }

    #[test]
    fn test_geojson_reload_rejects_out_of_range_values() {
        let text = sample().to_geojson_string().expect("Should serialize");

        let big_color = text.replace("\"color\": 9", "\"color\": 4294967296");
        assert_ne!(big_color, text);
        let err = Hierarchy::from_geojson_string(&big_color).unwrap_err();
        assert!(err.is_type_error());

        let mut collection = sample().to_geojson().expect("Should create GeoJSON");
        collection.features[0].geometry = Some(Geometry::new(Value::Polygon(vec![vec![
            vec![0.0, 0.0],
            vec![1e12, 0.0],
            vec![0.0, 0.0],
        ]])));
        let text = serde_json::to_string(&collection).expect("Should serialize");
        let err = Hierarchy::from_geojson_string(&text).unwrap_err();
        assert!(err.is_type_error());
        assert!(coord_to_point(&[2.5, 1.0]).is_err());
        assert_eq!(coord_to_point(&[-3.0, 7.0]).expect("Should convert"), Point::new(-3, 7));
    }
}
