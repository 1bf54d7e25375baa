//! Map module (2D equirectangular view of the AOI and pass tracks).

use bevy::prelude::*;

pub mod controller;
pub mod surface;
pub mod systems;

pub use controller::MapViewportController;
pub use surface::{MapSurface, MapViewport};

use crate::config::DashboardConfig;

pub struct MapPlugin;

impl Plugin for MapPlugin {
    fn build(&self, app: &mut App) {
        let (padding, retry) = app
            .world()
            .get_resource::<DashboardConfig>()
            .map(|c| (c.fit_padding_px, c.layout_retry()))
            .unwrap_or_else(|| {
                let defaults = DashboardConfig::default();
                (defaults.fit_padding_px, defaults.layout_retry())
            });

        app.init_resource::<MapViewport>()
            .insert_resource(MapViewportController::new(padding, retry))
            .add_systems(Startup, (systems::setup_map_camera, systems::setup_basemap))
            .add_systems(
                Update,
                (
                    systems::layout_map_viewport,
                    systems::sync_map_viewport,
                    systems::apply_map_view,
                )
                    .chain(),
            )
            .add_systems(
                Update,
                (systems::draw_world_frame, systems::draw_store_geometry),
            );
    }
}
