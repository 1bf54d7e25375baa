//! Systems that feed worker replies back into the store

use bevy::prelude::*;

use crate::api::{ApiChannels, ApiPayload, ApiReply};
use crate::config::DashboardConfig;
use crate::dashboard::actions::refresh_roster;
use crate::request::{ActionKind, DashboardRequests, Settlement};
use crate::store::DashboardStore;
use crate::ui::state::SidebarForm;

pub const INGEST_DEFAULT_MESSAGE: &str = "TLEs uploaded successfully.";

/// Settle one reply against its orchestrator and, if it is still current and
/// successful, write the payload into the store.
pub fn apply_reply(
    reply: ApiReply,
    requests: &mut DashboardRequests,
    store: &mut DashboardStore,
) -> (ActionKind, Settlement) {
    let kind = reply.ticket.kind;
    let orch = requests.get_mut(kind);
    let settlement = orch.settle(reply.ticket, reply.outcome, |payload| match payload {
        ApiPayload::Aoi(aoi) => {
            let message = format!("Uploaded \"{}\" (id {})", aoi.name, aoi.id);
            store.set_aoi(aoi);
            Some(message)
        }
        ApiPayload::Roster(roster) => {
            let message = format!("{} satellites", roster.len());
            store.set_satellite_roster(roster);
            Some(message)
        }
        ApiPayload::Ingested(summary) => Some(
            summary
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| INGEST_DEFAULT_MESSAGE.to_string()),
        ),
        ApiPayload::Passes(passes) => {
            let message = match passes.len() {
                1 => "1 pass found".to_string(),
                n => format!("{} passes found", n),
            };
            store.set_passes(passes);
            Some(message)
        }
    });
    if settlement == Settlement::Applied {
        info!("[REQUEST] {} #{} applied", kind, reply.ticket.seq);
    }
    (kind, settlement)
}

pub fn request_initial_roster(
    config: Res<DashboardConfig>,
    channels: Option<Res<ApiChannels>>,
    mut requests: ResMut<DashboardRequests>,
    mut done: Local<bool>,
) {
    if *done {
        return;
    }
    let Some(channels) = channels else { return };
    *done = true;
    refresh_roster(&mut requests.roster, &channels.cmd_tx, config.satellite_limit);
}

/// Drain worker replies once per frame.
pub fn apply_api_replies(
    config: Res<DashboardConfig>,
    channels: Option<Res<ApiChannels>>,
    mut requests: ResMut<DashboardRequests>,
    mut store: ResMut<DashboardStore>,
    mut form: ResMut<SidebarForm>,
) {
    let Some(channels) = channels else { return };
    let Ok(guard) = channels.res_rx.lock() else {
        return;
    };

    while let Ok(reply) = guard.try_recv() {
        match apply_reply(reply, &mut requests, &mut store) {
            (ActionKind::UploadAoi, Settlement::Applied) => form.clear_upload(),
            (ActionKind::IngestTles, Settlement::Applied) => {
                form.tle_text.clear();
                refresh_roster(&mut requests.roster, &channels.cmd_tx, config.satellite_limit);
            }
            _ => {}
        }
    }
}
