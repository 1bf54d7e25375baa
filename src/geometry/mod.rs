//! Geometry model and bounds aggregation
//!
//! GeoJSON shapes arriving from the backend (AOI polygons, pass ground tracks)
//! are decoded into one tagged [`Geometry`] type. Everything downstream only
//! relies on the shared "sequence of coordinate pairs" view of a shape.

pub mod bounds;
pub mod types;

pub use bounds::{BoundingBox, compute_bounds};
pub use types::{Geometry, GeometryError, Position, geometry_from_value, parse_aoi_document};
