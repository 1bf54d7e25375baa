//! The rendering surface the viewport controller drives

use bevy::prelude::*;

use crate::geometry::BoundingBox;

/// Commands the viewport controller issues to whatever draws the map.
pub trait MapSurface {
    /// Re-read the container size and redo internal layout. Returns `false`
    /// while the container still has no area.
    fn invalidate_size(&mut self) -> bool;

    /// Center and zoom so `bounds` fills the view, keeping `padding_px`
    /// screen pixels free on every side.
    fn fit_bounds(&mut self, bounds: &BoundingBox, padding_px: f32);
}

/// Camera placement on the equirectangular plane (x = lon, y = lat).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapView {
    pub center: Vec2,
    /// World units (degrees) per logical pixel.
    pub scale: f32,
}

/// Smallest box side used for fitting, so a zero-area box still zooms sanely.
const MIN_FIT_SPAN_DEG: f32 = 1e-4;

/// Compute the view that fits `bounds` inside a viewport of `size` logical
/// pixels. `None` when the viewport has no area.
pub fn fit_view(bounds: &BoundingBox, size: Vec2, padding_px: f32) -> Option<MapView> {
    if size.x <= 0.0 || size.y <= 0.0 {
        return None;
    }
    let usable = (size - Vec2::splat(2.0 * padding_px.max(0.0))).max(Vec2::ONE);
    let span_x = (bounds.width_deg() as f32).max(MIN_FIT_SPAN_DEG);
    let span_y = (bounds.height_deg() as f32).max(MIN_FIT_SPAN_DEG);
    let scale = (span_x / usable.x).max(span_y / usable.y);
    let (lon, lat) = bounds.center();
    Some(MapView {
        center: Vec2::new(lon as f32, lat as f32),
        scale,
    })
}

/// The map area of the window as the controller sees it.
///
/// Layout systems report the measured size every frame. The surface only
/// adopts it on [`MapSurface::invalidate_size`], and refits the last fitted
/// box when the adopted size differs. The controller's commands are turned
/// into a [`MapView`] that a camera system picks up.
#[derive(Resource, Debug, Default)]
pub struct MapViewport {
    measured: Vec2,
    size: Vec2,
    fit: Option<(BoundingBox, f32)>,
    fit_pending: bool,
    current: Option<MapView>,
    changed: bool,
}

impl MapViewport {
    /// Record the measured map area without adopting it; returns `true` if it
    /// differs from the previous measurement.
    pub fn set_measured(&mut self, size: Vec2) -> bool {
        if size == self.measured {
            return false;
        }
        self.measured = size;
        true
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn current(&self) -> Option<MapView> {
        self.current
    }

    pub fn has_pending_fit(&self) -> bool {
        self.fit_pending
    }

    /// The view to push to the camera, once per change.
    pub fn take_changed(&mut self) -> Option<MapView> {
        if !self.changed {
            return None;
        }
        self.changed = false;
        self.current
    }

    fn has_area(&self) -> bool {
        self.size.x > 0.0 && self.size.y > 0.0
    }

    fn apply_fit(&mut self, bounds: &BoundingBox, padding_px: f32) {
        if let Some(view) = fit_view(bounds, self.size, padding_px) {
            self.current = Some(view);
            self.changed = true;
        }
    }
}

impl MapSurface for MapViewport {
    fn invalidate_size(&mut self) -> bool {
        let resized = self.size != self.measured;
        self.size = self.measured;
        if !self.has_area() {
            return false;
        }
        if let Some((bounds, padding)) = self.fit
            && (self.fit_pending || resized)
        {
            debug!("[MAP] fitting to {}x{} area", self.size.x, self.size.y);
            self.fit_pending = false;
            self.apply_fit(&bounds, padding);
        }
        true
    }

    fn fit_bounds(&mut self, bounds: &BoundingBox, padding_px: f32) {
        self.fit = Some((*bounds, padding_px));
        self.fit_pending = !self.has_area();
        if !self.fit_pending {
            self.apply_fit(bounds, padding_px);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bbox(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> BoundingBox {
        BoundingBox {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        }
    }

    #[test]
    fn fit_centers_and_uses_tighter_axis() {
        let view = fit_view(&bbox(0.0, 0.0, 40.0, 10.0), Vec2::new(440.0, 240.0), 20.0).unwrap();
        assert_eq!(view.center, Vec2::new(20.0, 5.0));
        // 40 deg over 400 px wins over 10 deg over 200 px.
        assert!((view.scale - 0.1).abs() < 1e-6);
    }

    #[test]
    fn fit_keeps_padding_free() {
        let b = bbox(-10.0, -10.0, 10.0, 10.0);
        let size = Vec2::new(300.0, 300.0);
        let view = fit_view(&b, size, 50.0).unwrap();
        let half_extent_px = (b.width_deg() as f32 / view.scale) / 2.0;
        assert!(half_extent_px <= size.x / 2.0 - 50.0 + 1e-3);
    }

    #[test]
    fn zero_size_has_no_view() {
        assert_eq!(fit_view(&bbox(0.0, 0.0, 1.0, 1.0), Vec2::ZERO, 20.0), None);
    }

    #[test]
    fn fit_before_layout_is_deferred() {
        let mut viewport = MapViewport::default();
        viewport.fit_bounds(&bbox(0.0, 0.0, 10.0, 10.0), 20.0);
        assert!(viewport.has_pending_fit());
        assert_eq!(viewport.take_changed(), None);

        assert!(!viewport.invalidate_size());
        assert!(viewport.has_pending_fit());

        viewport.set_measured(Vec2::new(800.0, 600.0));
        assert!(viewport.invalidate_size());
        assert!(!viewport.has_pending_fit());
        let view = viewport.take_changed().unwrap();
        assert_eq!(view.center, Vec2::new(5.0, 5.0));
        assert_eq!(viewport.take_changed(), None);
    }

    #[test]
    fn adopting_a_new_size_refits_the_last_box() {
        let mut viewport = MapViewport::default();
        viewport.set_measured(Vec2::new(1000.0, 600.0));
        viewport.invalidate_size();
        viewport.fit_bounds(&bbox(0.0, 0.0, 40.0, 10.0), 20.0);
        let wide = viewport.take_changed().unwrap();

        viewport.set_measured(Vec2::new(660.0, 600.0));
        assert_eq!(viewport.size(), Vec2::new(1000.0, 600.0));
        assert_eq!(viewport.take_changed(), None);

        assert!(viewport.invalidate_size());
        assert_eq!(viewport.size(), Vec2::new(660.0, 600.0));
        let narrow = viewport.take_changed().unwrap();
        assert_eq!(narrow.center, wide.center);
        assert!(narrow.scale > wide.scale);

        // Same size again: nothing to redo.
        assert!(viewport.invalidate_size());
        assert_eq!(viewport.take_changed(), None);
    }

    #[test]
    fn measurement_change_is_reported_once() {
        let mut viewport = MapViewport::default();
        assert!(viewport.set_measured(Vec2::new(100.0, 100.0)));
        assert!(!viewport.set_measured(Vec2::new(100.0, 100.0)));
        assert_eq!(viewport.size(), Vec2::ZERO);
    }
}
