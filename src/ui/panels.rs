//! Side panel sections
use bevy_egui::egui::{self, Color32};
use chrono::SecondsFormat;

use crate::api::Pass;
use crate::request::{ActionKind, RequestPhase, RequestState};
use crate::store::DashboardStore;
use crate::ui::state::SidebarForm;

/// What the operator asked for this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SidebarAction {
    UploadAoi,
    RefreshRoster,
    SelectSatellite(Option<i64>),
    IngestTles,
    ComputePasses,
}

impl SidebarAction {
    /// The request this action issues; selection issues none.
    pub fn kind(self) -> Option<ActionKind> {
        match self {
            SidebarAction::UploadAoi => Some(ActionKind::UploadAoi),
            SidebarAction::RefreshRoster => Some(ActionKind::ListSatellites),
            SidebarAction::SelectSatellite(_) => None,
            SidebarAction::IngestTles => Some(ActionKind::IngestTles),
            SidebarAction::ComputePasses => Some(ActionKind::ComputePasses),
        }
    }
}

const OK_COLOR: Color32 = Color32::from_rgb(0x4c, 0xaf, 0x50);
const ERROR_COLOR: Color32 = Color32::from_rgb(0xe5, 0x39, 0x35);

fn status_line(ui: &mut egui::Ui, state: &RequestState) {
    match state.phase {
        RequestPhase::Idle => {}
        RequestPhase::Sending => {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label("Sending...");
            });
        }
        RequestPhase::Ok => {
            if let Some(msg) = &state.message {
                ui.colored_label(OK_COLOR, msg);
            }
        }
        RequestPhase::Error => {
            let msg = state.message.as_deref().unwrap_or("Request failed");
            ui.colored_label(ERROR_COLOR, msg);
        }
    }
}

pub fn render_upload_section(
    ui: &mut egui::Ui,
    form: &mut SidebarForm,
    state: &RequestState,
    store: &DashboardStore,
) -> Option<SidebarAction> {
    ui.heading("Upload AOI");
    ui.add(egui::TextEdit::singleline(&mut form.aoi_name).hint_text("AOI name"));
    ui.add(
        egui::TextEdit::singleline(&mut form.aoi_path).hint_text("GeoJSON file (or drop it here)"),
    );
    let clicked = ui
        .add_enabled(state.phase != RequestPhase::Sending, egui::Button::new("Upload"))
        .clicked();
    status_line(ui, state);
    if let Some(aoi) = store.aoi() {
        ui.label(format!("Active AOI: {} (id {})", aoi.name, aoi.id));
    }
    clicked.then_some(SidebarAction::UploadAoi)
}

pub fn render_satellite_section(
    ui: &mut egui::Ui,
    state: &RequestState,
    store: &DashboardStore,
) -> Option<SidebarAction> {
    let mut action = None;
    ui.heading("Select Satellite");

    let mut selection = store.selected_satellite();
    let selected_text = store
        .selected()
        .map(|s| s.label())
        .unwrap_or_else(|| "Choose a satellite...".to_string());
    egui::ComboBox::from_id_salt("satellite_select")
        .selected_text(selected_text)
        .width(ui.available_width())
        .show_ui(ui, |ui| {
            ui.selectable_value(&mut selection, None, "None");
            for sat in store.roster() {
                ui.selectable_value(&mut selection, Some(sat.id), sat.label());
            }
        });
    if selection != store.selected_satellite() {
        action = Some(SidebarAction::SelectSatellite(selection));
    }

    ui.horizontal(|ui| {
        if ui
            .add_enabled(state.phase != RequestPhase::Sending, egui::Button::new("Refresh"))
            .clicked()
        {
            action = Some(SidebarAction::RefreshRoster);
        }
        ui.label(format!("{} available", store.roster().len()));
    });
    status_line(ui, state);
    action
}

pub fn render_tle_section(
    ui: &mut egui::Ui,
    form: &mut SidebarForm,
    state: &RequestState,
) -> Option<SidebarAction> {
    ui.heading("Upload TLEs");
    ui.add(
        egui::TextEdit::multiline(&mut form.tle_text)
            .hint_text("Paste two- or three-line element sets")
            .desired_rows(5)
            .code_editor(),
    );
    let clicked = ui
        .add_enabled(state.phase != RequestPhase::Sending, egui::Button::new("Ingest"))
        .clicked();
    status_line(ui, state);
    clicked.then_some(SidebarAction::IngestTles)
}

pub fn render_compute_section(
    ui: &mut egui::Ui,
    form: &mut SidebarForm,
    state: &RequestState,
    store: &DashboardStore,
) -> Option<SidebarAction> {
    ui.heading("Compute Passes");
    ui.horizontal(|ui| {
        ui.label("Window:");
        ui.add(
            egui::DragValue::new(&mut form.window_hours)
                .range(1..=168)
                .suffix(" h"),
        );
        ui.label("Min elevation:");
        ui.add(
            egui::DragValue::new(&mut form.min_elevation_deg)
                .range(0.0..=90.0)
                .speed(0.5)
                .suffix("°"),
        );
    });

    let ready = store.compute_target().is_some();
    if !ready {
        ui.label("Upload an AOI and select a satellite first.");
    }
    let clicked = ui
        .add_enabled(
            ready && state.phase != RequestPhase::Sending,
            egui::Button::new("Compute"),
        )
        .clicked();
    status_line(ui, state);

    if !store.passes().is_empty() {
        render_pass_list(ui, store.passes());
    }
    clicked.then_some(SidebarAction::ComputePasses)
}

fn render_pass_list(ui: &mut egui::Ui, passes: &[Pass]) {
    egui::ScrollArea::vertical()
        .max_height(240.0)
        .show(ui, |ui| {
            egui::Grid::new("pass_list")
                .striped(true)
                .num_columns(3)
                .show(ui, |ui| {
                    ui.strong("Start (UTC)");
                    ui.strong("End (UTC)");
                    ui.strong("Max el.");
                    ui.end_row();
                    for pass in passes {
                        ui.label(pass.start_time.to_rfc3339_opts(SecondsFormat::Secs, true));
                        ui.label(pass.end_time.to_rfc3339_opts(SecondsFormat::Secs, true));
                        ui.label(format!("{:.1}°", pass.max_elevation_deg));
                        ui.end_row();
                    }
                });
        });
}
