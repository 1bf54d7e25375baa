//! Bounding box aggregation over an AOI and pass tracks

use crate::geometry::types::{Geometry, Position};

/// Fraction of the larger box span added on every side.
pub const BOUNDS_PADDING_RATIO: f64 = 0.05;
/// Lower bound for the margin so single points still get an area.
pub const MIN_BOUNDS_PADDING_DEG: f64 = 0.01;

/// Axis-aligned box in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    fn around(lon: f64, lat: f64) -> Self {
        Self {
            min_lat: lat,
            min_lon: lon,
            max_lat: lat,
            max_lon: lon,
        }
    }

    fn include(&mut self, lon: f64, lat: f64) {
        self.min_lat = self.min_lat.min(lat);
        self.min_lon = self.min_lon.min(lon);
        self.max_lat = self.max_lat.max(lat);
        self.max_lon = self.max_lon.max(lon);
    }

    pub fn width_deg(&self) -> f64 {
        self.max_lon - self.min_lon
    }

    pub fn height_deg(&self) -> f64 {
        self.max_lat - self.min_lat
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lon + self.max_lon) * 0.5,
            (self.min_lat + self.max_lat) * 0.5,
        )
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        (self.min_lon..=self.max_lon).contains(&lon) && (self.min_lat..=self.max_lat).contains(&lat)
    }

    /// Grow the box by the visual margin, clamped to the valid lon/lat ranges.
    pub fn padded(&self) -> Self {
        let span = self.width_deg().max(self.height_deg());
        let margin = (span * BOUNDS_PADDING_RATIO).max(MIN_BOUNDS_PADDING_DEG);
        Self {
            min_lat: (self.min_lat - margin).max(-90.0),
            min_lon: (self.min_lon - margin).max(-180.0),
            max_lat: (self.max_lat + margin).min(90.0),
            max_lon: (self.max_lon + margin).min(180.0),
        }
    }
}

/// Compute the padded box enclosing every coordinate of the AOI and tracks.
///
/// Returns `None` when there is nothing to enclose; the caller must then leave
/// the viewport where it is. Non-finite coordinates are skipped and
/// out-of-range ones are pulled onto the globe before padding, so the result
/// is never inverted.
pub fn compute_bounds<'a, I>(aoi: Option<&Geometry>, tracks: I) -> Option<BoundingBox>
where
    I: IntoIterator<Item = &'a Geometry>,
{
    let mut bounds: Option<BoundingBox> = None;
    let mut visit = |p: Position| {
        if !p.lon.is_finite() || !p.lat.is_finite() {
            return;
        }
        let (lon, lat) = (p.lon.clamp(-180.0, 180.0), p.lat.clamp(-90.0, 90.0));
        match bounds.as_mut() {
            Some(b) => b.include(lon, lat),
            None => bounds = Some(BoundingBox::around(lon, lat)),
        }
    };

    if let Some(aoi) = aoi {
        aoi.for_each_position(&mut visit);
    }
    for track in tracks {
        track.for_each_position(&mut visit);
    }

    bounds.map(|b| b.padded())
}
