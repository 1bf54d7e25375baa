//! Dispatch of the four dashboard actions
//!
//! Each entry point validates its input, opens a new ticket on the action's
//! orchestrator and hands the request to the API worker. Nothing here waits
//! for a reply.

use bevy::prelude::*;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tokio::sync::mpsc::UnboundedSender;

use crate::api::{ApiCommand, ApiRequest, PassComputeRequest, TimeWindow};
use crate::request::{RequestOrchestrator, RequestTicket};
use crate::store::DashboardStore;

pub const UPLOAD_FIELDS_REQUIRED: &str = "Name and file are required.";
pub const TLE_TEXT_REQUIRED: &str = "Paste at least one TLE set.";
pub(crate) const WORKER_GONE: &str = "API worker is not running";

fn dispatch(
    orch: &mut RequestOrchestrator,
    tx: &UnboundedSender<ApiCommand>,
    request: ApiRequest,
) -> Option<RequestTicket> {
    let ticket = orch.begin();
    info!("[REQUEST] {} #{} dispatched", ticket.kind, ticket.seq);
    if let Err(err) = tx.send(ApiCommand { ticket, request }) {
        error!("[REQUEST] failed to send {} #{}: {}", ticket.kind, ticket.seq, err);
        orch.fail(WORKER_GONE);
        return None;
    }
    Some(ticket)
}

/// Upload the GeoJSON file at `path` as a new AOI called `name`.
pub fn upload_aoi(
    orch: &mut RequestOrchestrator,
    tx: &UnboundedSender<ApiCommand>,
    name: &str,
    path: &str,
) -> Option<RequestTicket> {
    let (name, path) = (name.trim(), path.trim());
    if name.is_empty() || path.is_empty() {
        orch.fail(UPLOAD_FIELDS_REQUIRED);
        return None;
    }
    dispatch(
        orch,
        tx,
        ApiRequest::UploadAoi {
            name: name.to_string(),
            path: PathBuf::from(path),
        },
    )
}

pub fn refresh_roster(
    orch: &mut RequestOrchestrator,
    tx: &UnboundedSender<ApiCommand>,
    limit: usize,
) -> Option<RequestTicket> {
    dispatch(orch, tx, ApiRequest::ListSatellites { limit })
}

pub fn ingest_tles(
    orch: &mut RequestOrchestrator,
    tx: &UnboundedSender<ApiCommand>,
    text: &str,
) -> Option<RequestTicket> {
    let text = text.trim();
    if text.is_empty() {
        orch.fail(TLE_TEXT_REQUIRED);
        return None;
    }
    dispatch(
        orch,
        tx,
        ApiRequest::IngestTles {
            text: text.to_string(),
        },
    )
}

/// Request passes of the selected satellite over the current AOI.
///
/// Without both an AOI and a selection this is a no-op: nothing is sent and
/// the orchestrator keeps its phase. Otherwise the previous batch is cleared
/// before the request leaves.
pub fn compute_passes(
    orch: &mut RequestOrchestrator,
    store: &mut DashboardStore,
    tx: &UnboundedSender<ApiCommand>,
    now: DateTime<Utc>,
    window_hours: u32,
    min_elevation_deg: f64,
) -> Option<RequestTicket> {
    let (satellite_id, aoi_id) = store.compute_target()?;
    store.begin_pass_compute();
    dispatch(
        orch,
        tx,
        ApiRequest::ComputePasses(PassComputeRequest {
            satellite_id,
            aoi_id,
            window: TimeWindow::starting_at(now, window_hours),
            min_elevation_deg,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::{ActionKind, RequestPhase};
    use crate::store::tests::{pass_along, satellite, square_aoi};
    use tokio::sync::mpsc::unbounded_channel;

    #[test]
    fn upload_without_name_or_file_never_dispatches() {
        let (tx, mut rx) = unbounded_channel();
        let mut orch = RequestOrchestrator::new(ActionKind::UploadAoi);
        assert!(upload_aoi(&mut orch, &tx, "  ", "/tmp/a.geojson").is_none());
        assert!(upload_aoi(&mut orch, &tx, "A", "").is_none());
        assert!(rx.try_recv().is_err());
        assert_eq!(orch.phase(), RequestPhase::Error);
        assert_eq!(orch.state().message.as_deref(), Some(UPLOAD_FIELDS_REQUIRED));
    }

    #[test]
    fn upload_sends_trimmed_fields() {
        let (tx, mut rx) = unbounded_channel();
        let mut orch = RequestOrchestrator::new(ActionKind::UploadAoi);
        let ticket = upload_aoi(&mut orch, &tx, " Field A ", " /tmp/a.geojson").unwrap();
        let cmd = rx.try_recv().unwrap();
        assert_eq!(cmd.ticket, ticket);
        assert_eq!(
            cmd.request,
            ApiRequest::UploadAoi {
                name: "Field A".to_string(),
                path: PathBuf::from("/tmp/a.geojson"),
            }
        );
        assert!(orch.is_sending());
    }

    #[test]
    fn blank_tle_text_is_rejected() {
        let (tx, mut rx) = unbounded_channel();
        let mut orch = RequestOrchestrator::new(ActionKind::IngestTles);
        assert!(ingest_tles(&mut orch, &tx, " \n\t").is_none());
        assert!(rx.try_recv().is_err());
        assert_eq!(orch.phase(), RequestPhase::Error);

        ingest_tles(&mut orch, &tx, "\nISS\n1 25544U\n2 25544\n").unwrap();
        match rx.try_recv().unwrap().request {
            ApiRequest::IngestTles { text } => assert_eq!(text, "ISS\n1 25544U\n2 25544"),
            other => panic!("unexpected request {other:?}"),
        }
    }

    #[test]
    fn compute_without_target_stays_idle() {
        let (tx, mut rx) = unbounded_channel();
        let mut orch = RequestOrchestrator::new(ActionKind::ComputePasses);
        let mut store = DashboardStore::default();

        assert!(compute_passes(&mut orch, &mut store, &tx, Utc::now(), 24, 10.0).is_none());
        store.set_aoi(square_aoi(1));
        assert!(compute_passes(&mut orch, &mut store, &tx, Utc::now(), 24, 10.0).is_none());

        assert!(rx.try_recv().is_err());
        assert_eq!(orch.phase(), RequestPhase::Idle);
    }

    #[test]
    fn compute_clears_previous_passes_before_reply() {
        let (tx, mut rx) = unbounded_channel();
        let mut orch = RequestOrchestrator::new(ActionKind::ComputePasses);
        let mut store = DashboardStore::default();
        store.set_aoi(square_aoi(1));
        store.set_satellite_roster(vec![satellite(7, "S")]);
        store.select_satellite(Some(7));
        store.set_passes(vec![pass_along(&[(0.0, 0.0), (1.0, 1.0)])]);

        let now = Utc::now();
        compute_passes(&mut orch, &mut store, &tx, now, 24, 10.0).unwrap();
        assert!(store.passes().is_empty());
        assert!(orch.is_sending());

        match rx.try_recv().unwrap().request {
            ApiRequest::ComputePasses(req) => {
                assert_eq!((req.satellite_id, req.aoi_id), (7, 1));
                assert_eq!(req.window.start, now);
                assert_eq!((req.window.end - req.window.start).num_hours(), 24);
                assert_eq!(req.min_elevation_deg, 10.0);
            }
            other => panic!("unexpected request {other:?}"),
        }
    }

    #[test]
    fn closed_worker_fails_the_action() {
        let (tx, rx) = unbounded_channel();
        drop(rx);
        let mut orch = RequestOrchestrator::new(ActionKind::ListSatellites);
        assert!(refresh_roster(&mut orch, &tx, 1000).is_none());
        assert_eq!(orch.phase(), RequestPhase::Error);
        assert_eq!(orch.state().message.as_deref(), Some(WORKER_GONE));
    }
}
