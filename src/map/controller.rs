//! Reactive plumbing between the page store and the map surface

use bevy::prelude::*;
use std::time::Duration;

use crate::geometry::compute_bounds;
use crate::map::surface::MapSurface;
use crate::store::DashboardStore;

/// Refits the map whenever the store's AOI or passes change and keeps the
/// surface's layout in step with its container. Holds no geometry.
#[derive(Resource, Debug)]
pub struct MapViewportController {
    padding_px: f32,
    retry_delay: Duration,
    seen_revision: Option<u64>,
    retry: Option<Timer>,
}

impl MapViewportController {
    pub fn new(padding_px: f32, retry_delay: Duration) -> Self {
        Self {
            padding_px,
            retry_delay,
            seen_revision: None,
            retry: None,
        }
    }

    /// Fit the surface to the store's geometry if it changed since the last
    /// call. Returns whether a fit was issued.
    pub fn sync(&mut self, store: &DashboardStore, surface: &mut impl MapSurface) -> bool {
        let revision = store.geometry_revision();
        if self.seen_revision == Some(revision) {
            return false;
        }
        self.seen_revision = Some(revision);
        match compute_bounds(store.aoi_geometry(), store.track_geometries()) {
            Some(bounds) => {
                debug!("[MAP] fitting to {:?}", bounds);
                surface.fit_bounds(&bounds, self.padding_px);
                true
            }
            None => false,
        }
    }

    pub fn on_mount(&mut self, surface: &mut impl MapSurface) {
        self.on_container_resized(surface);
    }

    /// Re-layout now and once more after a short delay, in case the container
    /// had no size yet or its measurement is still settling.
    pub fn on_container_resized(&mut self, surface: &mut impl MapSurface) {
        surface.invalidate_size();
        self.schedule_relayout();
    }

    /// Arm (or restart) the deferred re-layout without touching the surface.
    pub fn schedule_relayout(&mut self) {
        self.retry = Some(Timer::new(self.retry_delay, TimerMode::Once));
    }

    pub fn tick(&mut self, delta: Duration, surface: &mut impl MapSurface) {
        let Some(timer) = self.retry.as_mut() else {
            return;
        };
        timer.tick(delta);
        if timer.just_finished() {
            self.retry = None;
            surface.invalidate_size();
        }
    }

    pub fn retry_pending(&self) -> bool {
        self.retry.is_some()
    }
}
