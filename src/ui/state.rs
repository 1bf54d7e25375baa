//! UI state management

use bevy::prelude::*;

use crate::config::DashboardConfig;

/// Main UI state resource
#[derive(Resource)]
pub struct UIState {
    pub show_sidebar: bool,
    /// Logical width of the side panel as last drawn
    pub sidebar_width_px: f32,
}

impl Default for UIState {
    fn default() -> Self {
        Self {
            show_sidebar: true,
            sidebar_width_px: 0.0,
        }
    }
}

/// Editable fields of the side panel forms
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct SidebarForm {
    pub aoi_name: String,
    pub aoi_path: String,
    pub tle_text: String,
    pub window_hours: u32,
    pub min_elevation_deg: f64,
}

impl SidebarForm {
    pub fn from_config(config: &DashboardConfig) -> Self {
        Self {
            aoi_name: String::new(),
            aoi_path: String::new(),
            tle_text: String::new(),
            window_hours: config.pass_window_hours,
            min_elevation_deg: config.min_elevation_deg,
        }
    }

    pub fn clear_upload(&mut self) {
        self.aoi_name.clear();
        self.aoi_path.clear();
    }
}

impl FromWorld for SidebarForm {
    fn from_world(world: &mut World) -> Self {
        match world.get_resource::<DashboardConfig>() {
            Some(config) => Self::from_config(config),
            None => Self::from_config(&DashboardConfig::default()),
        }
    }
}
