//! User interface module
//!
//! This module handles the side panel state, its sections, and the systems
//! that turn clicks into dashboard actions.

use bevy::prelude::*;
use bevy_egui::{EguiGlobalSettings, EguiPrimaryContextPass};

pub mod panels;
pub mod state;
pub mod systems;

pub use state::{SidebarForm, UIState};
pub use systems::{setup_ui_camera, ui_system};

/// Plugin for user interface management
pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        // Egui lives on its own uncropped camera, not on the map camera.
        app.insert_resource(EguiGlobalSettings {
            auto_create_primary_context: false,
            ..default()
        })
        .init_resource::<UIState>()
        .init_resource::<SidebarForm>()
        .add_systems(Startup, setup_ui_camera)
        .add_systems(Update, systems::handle_file_drop)
        .add_systems(EguiPrimaryContextPass, ui_system);
    }
}
