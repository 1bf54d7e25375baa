use bevy::prelude::*;
use bevy::window::{PresentMode, Window, WindowPlugin};
use bevy_egui::EguiPlugin;

#[cfg(feature = "dev")]
use bevy::dev_tools::fps_overlay::FpsOverlayPlugin;

mod api;
mod config;
mod dashboard;
mod geometry;
mod map;
mod request;
mod store;
mod ui;

use api::ApiPlugin;
use config::DashboardConfig;
use dashboard::DashboardPlugin;
use map::MapPlugin;
use ui::UiPlugin;

fn main() {
    let mut app = App::new();

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Orbital Edge Imaging".to_string(),
            present_mode: PresentMode::AutoVsync,
            ..default()
        }),
        ..default()
    }));

    #[cfg(feature = "dev")]
    app.add_plugins(FpsOverlayPlugin::default());

    // Loaded after DefaultPlugins so the log subscriber is already installed.
    app.insert_resource(DashboardConfig::load());

    app.add_plugins(EguiPlugin::default());
    app.add_plugins(ApiPlugin);
    app.add_plugins(DashboardPlugin);
    app.add_plugins(MapPlugin);
    app.add_plugins(UiPlugin);

    app.run();
}
