//! Page-scoped selection and upload state
//!
//! Holds the current AOI, the satellite roster, the selected satellite and the
//! latest pass batch. Everything is replaced wholesale; nothing is merged.

use bevy::prelude::*;

use crate::api::{AreaOfInterest, Pass, Satellite};
use crate::geometry::Geometry;

#[derive(Resource, Debug, Default)]
pub struct DashboardStore {
    aoi: Option<AreaOfInterest>,
    roster: Vec<Satellite>,
    selected_satellite: Option<i64>,
    passes: Vec<Pass>,
    /// Bumped whenever the AOI or the pass batch changes, so the map can tell
    /// when its geometry inputs moved.
    geometry_revision: u64,
}

impl DashboardStore {
    pub fn aoi(&self) -> Option<&AreaOfInterest> {
        self.aoi.as_ref()
    }

    pub fn roster(&self) -> &[Satellite] {
        &self.roster
    }

    pub fn selected_satellite(&self) -> Option<i64> {
        self.selected_satellite
    }

    pub fn selected(&self) -> Option<&Satellite> {
        let id = self.selected_satellite?;
        self.roster.iter().find(|s| s.id == id)
    }

    pub fn passes(&self) -> &[Pass] {
        &self.passes
    }

    pub fn geometry_revision(&self) -> u64 {
        self.geometry_revision
    }

    pub fn set_aoi(&mut self, aoi: AreaOfInterest) {
        info!("[STORE] AOI {} ({}) active", aoi.id, aoi.name);
        self.aoi = Some(aoi);
        self.geometry_revision += 1;
    }

    /// Replace the roster; a selection that is no longer listed is dropped.
    pub fn set_satellite_roster(&mut self, roster: Vec<Satellite>) {
        self.roster = roster;
        if let Some(id) = self.selected_satellite
            && !self.roster.iter().any(|s| s.id == id)
        {
            debug!("[STORE] satellite {} left the roster, clearing selection", id);
            self.selected_satellite = None;
        }
    }

    /// Select a satellite by id. Ids missing from the roster count as no
    /// selection.
    pub fn select_satellite(&mut self, id: Option<i64>) {
        self.selected_satellite = id.filter(|id| self.roster.iter().any(|s| s.id == *id));
    }

    /// Drop the current batch ahead of a new compute response.
    pub fn begin_pass_compute(&mut self) {
        if !self.passes.is_empty() {
            self.passes.clear();
            self.geometry_revision += 1;
        }
    }

    pub fn set_passes(&mut self, passes: Vec<Pass>) {
        self.passes = passes;
        self.geometry_revision += 1;
    }

    /// `(satellite_id, aoi_id)` when a compute request is allowed.
    pub fn compute_target(&self) -> Option<(i64, i64)> {
        Some((self.selected_satellite?, self.aoi.as_ref()?.id))
    }

    pub fn aoi_geometry(&self) -> Option<&Geometry> {
        self.aoi.as_ref().map(|aoi| &aoi.geometry)
    }

    pub fn track_geometries(&self) -> impl Iterator<Item = &Geometry> {
        self.passes.iter().map(|p| &p.track_geometry)
    }
}
