//! GeoJSON geometry types and decoding

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use thiserror::Error;

/// A single longitude/latitude pair in degrees.
///
/// GeoJSON positions may carry an altitude ordinate; it is dropped on decode.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(try_from = "Vec<f64>")]
pub struct Position {
    pub lon: f64,
    pub lat: f64,
}

impl Position {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

impl TryFrom<Vec<f64>> for Position {
    type Error = String;

    fn try_from(ordinates: Vec<f64>) -> Result<Self, Self::Error> {
        match ordinates.as_slice() {
            [lon, lat, ..] => Ok(Self::new(*lon, *lat)),
            _ => Err(format!(
                "position needs at least 2 ordinates, got {}",
                ordinates.len()
            )),
        }
    }
}

/// Tagged union over the GeoJSON geometry kinds.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: Position },
    MultiPoint { coordinates: Vec<Position> },
    LineString { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
    GeometryCollection { geometries: Vec<Geometry> },
}

#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("GeoJSON object has no \"type\" member")]
    MissingType,
    #[error("GeoJSON feature has no geometry")]
    MissingGeometry,
    #[error("expected exactly one feature, found {0}")]
    FeatureCount(usize),
    #[error("invalid GeoJSON: {0}")]
    Invalid(#[from] serde_json::Error),
}

impl Geometry {
    pub fn kind(&self) -> &'static str {
        match self {
            Geometry::Point { .. } => "Point",
            Geometry::MultiPoint { .. } => "MultiPoint",
            Geometry::LineString { .. } => "LineString",
            Geometry::MultiLineString { .. } => "MultiLineString",
            Geometry::Polygon { .. } => "Polygon",
            Geometry::MultiPolygon { .. } => "MultiPolygon",
            Geometry::GeometryCollection { .. } => "GeometryCollection",
        }
    }

    /// Visit every coordinate pair of the shape, whatever its kind.
    pub fn for_each_position(&self, visit: &mut dyn FnMut(Position)) {
        match self {
            Geometry::Point { coordinates } => visit(*coordinates),
            Geometry::MultiPoint { coordinates } | Geometry::LineString { coordinates } => {
                coordinates.iter().copied().for_each(|p| visit(p));
            }
            Geometry::MultiLineString { coordinates } | Geometry::Polygon { coordinates } => {
                for path in coordinates {
                    path.iter().copied().for_each(|p| visit(p));
                }
            }
            Geometry::MultiPolygon { coordinates } => {
                for polygon in coordinates {
                    for ring in polygon {
                        ring.iter().copied().for_each(|p| visit(p));
                    }
                }
            }
            Geometry::GeometryCollection { geometries } => {
                for geometry in geometries {
                    geometry.for_each_position(visit);
                }
            }
        }
    }

    pub fn positions(&self) -> Vec<Position> {
        let mut out = Vec::new();
        self.for_each_position(&mut |p| out.push(p));
        out
    }

    pub fn is_empty(&self) -> bool {
        let mut any = false;
        self.for_each_position(&mut |_| any = true);
        !any
    }

    /// Line-like parts of the shape: linestrings and polygon rings.
    pub fn paths(&self) -> Vec<&[Position]> {
        let mut out = Vec::new();
        self.collect_paths(&mut out);
        out
    }

    /// Point-like parts of the shape.
    pub fn points(&self) -> Vec<Position> {
        match self {
            Geometry::Point { coordinates } => vec![*coordinates],
            Geometry::MultiPoint { coordinates } => coordinates.clone(),
            Geometry::GeometryCollection { geometries } => {
                geometries.iter().flat_map(|g| g.points()).collect()
            }
            _ => Vec::new(),
        }
    }

    fn collect_paths<'a>(&'a self, out: &mut Vec<&'a [Position]>) {
        match self {
            Geometry::Point { .. } | Geometry::MultiPoint { .. } => {}
            Geometry::LineString { coordinates } => out.push(coordinates),
            Geometry::MultiLineString { coordinates } | Geometry::Polygon { coordinates } => {
                out.extend(coordinates.iter().map(Vec::as_slice));
            }
            Geometry::MultiPolygon { coordinates } => {
                for polygon in coordinates {
                    out.extend(polygon.iter().map(Vec::as_slice));
                }
            }
            Geometry::GeometryCollection { geometries } => {
                for geometry in geometries {
                    geometry.collect_paths(out);
                }
            }
        }
    }
}

/// Normalize a GeoJSON value into a [`Geometry`].
///
/// Accepts a bare geometry, a `Feature`, or a `FeatureCollection` (which
/// becomes a `GeometryCollection` of its feature geometries).
pub fn geometry_from_value(mut value: Value) -> Result<Geometry, GeometryError> {
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or(GeometryError::MissingType)?;

    match kind.as_str() {
        "Feature" => {
            let geometry = value
                .get_mut("geometry")
                .map(Value::take)
                .filter(|g| !g.is_null())
                .ok_or(GeometryError::MissingGeometry)?;
            geometry_from_value(geometry)
        }
        "FeatureCollection" => {
            let features = match value.get_mut("features").map(Value::take) {
                Some(Value::Array(items)) => items,
                _ => Vec::new(),
            };
            let geometries = features
                .into_iter()
                .map(geometry_from_value)
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Geometry::GeometryCollection { geometries })
        }
        _ => Ok(serde_json::from_value(value)?),
    }
}

/// Parse an AOI file the way the upload endpoint unwraps it: a bare geometry,
/// a single `Feature`, or a `FeatureCollection` holding exactly one feature.
pub fn parse_aoi_document(bytes: &[u8]) -> Result<Geometry, GeometryError> {
    let value: Value = serde_json::from_slice(bytes)?;
    if value.get("type").and_then(Value::as_str) == Some("FeatureCollection") {
        let count = value
            .get("features")
            .and_then(Value::as_array)
            .map(Vec::len)
            .unwrap_or(0);
        if count != 1 {
            return Err(GeometryError::FeatureCount(count));
        }
        return match geometry_from_value(value)? {
            Geometry::GeometryCollection { mut geometries } if geometries.len() == 1 => {
                Ok(geometries.remove(0))
            }
            other => Ok(other),
        };
    }
    geometry_from_value(value)
}

pub(crate) fn deserialize_geojson<'de, D>(deserializer: D) -> Result<Geometry, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    geometry_from_value(value).map_err(serde::de::Error::custom)
}

pub(crate) fn deserialize_optional_geojson<'de, D>(
    deserializer: D,
) -> Result<Option<Geometry>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(value) => geometry_from_value(value)
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}
