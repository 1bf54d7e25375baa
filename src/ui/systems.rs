//! UI systems for the egui interface

use bevy::camera::visibility::RenderLayers;
use bevy::prelude::*;
use bevy::window::FileDragAndDrop;
use bevy_egui::{EguiContexts, PrimaryEguiContext, egui};
use chrono::Utc;
use tokio::sync::mpsc::UnboundedSender;

use crate::api::{ApiChannels, ApiCommand};
use crate::config::DashboardConfig;
use crate::dashboard::actions::{
    WORKER_GONE, compute_passes, ingest_tles, refresh_roster, upload_aoi,
};
use crate::request::DashboardRequests;
use crate::store::DashboardStore;
use crate::ui::panels::{
    SidebarAction, render_compute_section, render_satellite_section, render_tle_section,
    render_upload_section,
};
use crate::ui::state::{SidebarForm, UIState};

/// Full-window camera that only renders egui, drawn over the map camera.
pub fn setup_ui_camera(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        Camera {
            order: 1,
            clear_color: ClearColorConfig::None,
            ..default()
        },
        RenderLayers::none(),
        PrimaryEguiContext,
        Name::new("UI Camera"),
    ));
}

/// Draw the side panel and run whatever the operator clicked.
pub fn ui_system(
    mut contexts: EguiContexts,
    mut state: ResMut<UIState>,
    mut form: ResMut<SidebarForm>,
    mut requests: ResMut<DashboardRequests>,
    mut store: ResMut<DashboardStore>,
    config: Res<DashboardConfig>,
    channels: Option<Res<ApiChannels>>,
) {
    let Ok(ctx) = contexts.ctx_mut() else { return };

    // Typing into a field must not toggle the panel.
    if !ctx.wants_keyboard_input() && ctx.input(|i| i.key_pressed(egui::Key::H)) {
        state.show_sidebar = !state.show_sidebar;
    }
    if !state.show_sidebar {
        state.sidebar_width_px = 0.0;
        return;
    }

    let mut actions = Vec::new();
    let width = egui::SidePanel::left("dashboard_panel")
        .resizable(true)
        .default_width(340.0)
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.heading("Orbital Edge Imaging");
                ui.separator();
                actions.extend(render_upload_section(
                    ui,
                    &mut form,
                    requests.upload.state(),
                    &store,
                ));
                ui.separator();
                actions.extend(render_satellite_section(ui, requests.roster.state(), &store));
                ui.separator();
                actions.extend(render_tle_section(ui, &mut form, requests.ingest.state()));
                ui.separator();
                actions.extend(render_compute_section(
                    ui,
                    &mut form,
                    requests.compute.state(),
                    &store,
                ));
            });
        })
        .response
        .rect
        .width();
    state.sidebar_width_px = width;

    let tx = channels.as_ref().map(|c| &c.cmd_tx);
    for action in actions {
        handle_action(action, &mut requests, &mut store, &form, &config, tx);
    }
}

/// Run one sidebar action. Selection is local; every other action needs the
/// API worker and fails on its orchestrator when there is none.
pub fn handle_action(
    action: SidebarAction,
    requests: &mut DashboardRequests,
    store: &mut DashboardStore,
    form: &SidebarForm,
    config: &DashboardConfig,
    tx: Option<&UnboundedSender<ApiCommand>>,
) {
    match (action, tx) {
        (SidebarAction::SelectSatellite(id), _) => store.select_satellite(id),
        (SidebarAction::ComputePasses, _) if store.compute_target().is_none() => {}
        (action, None) => {
            warn!("[UI] {:?} ignored, API worker not started", action);
            if let Some(kind) = action.kind() {
                requests.get_mut(kind).fail(WORKER_GONE);
            }
        }
        (SidebarAction::UploadAoi, Some(tx)) => {
            upload_aoi(&mut requests.upload, tx, &form.aoi_name, &form.aoi_path);
        }
        (SidebarAction::RefreshRoster, Some(tx)) => {
            refresh_roster(&mut requests.roster, tx, config.satellite_limit);
        }
        (SidebarAction::IngestTles, Some(tx)) => {
            ingest_tles(&mut requests.ingest, tx, &form.tle_text);
        }
        (SidebarAction::ComputePasses, Some(tx)) => {
            compute_passes(
                &mut requests.compute,
                store,
                tx,
                Utc::now(),
                form.window_hours,
                form.min_elevation_deg,
            );
        }
    }
}

/// A file dropped onto the window becomes the AOI file path.
pub fn handle_file_drop(
    mut drops: MessageReader<FileDragAndDrop>,
    mut form: ResMut<SidebarForm>,
) {
    for drop in drops.read() {
        if let FileDragAndDrop::DroppedFile { path_buf, .. } = drop {
            info!("[UI] AOI file dropped: {}", path_buf.display());
            form.aoi_path = path_buf.display().to_string();
        }
    }
}
