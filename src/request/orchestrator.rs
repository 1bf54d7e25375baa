//! Per-action request lifecycle with supersession
//!
//! Every invocation of an action gets a [`RequestTicket`] carrying a sequence
//! number that only grows. When a reply comes back, only the ticket issued
//! last for that action may touch the phase or shared state; anything older is
//! dropped, whether it succeeded or failed.

use bevy::prelude::*;
use std::fmt;

use crate::api::ApiError;

/// The orchestrated network actions, one orchestrator each.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionKind {
    UploadAoi,
    ListSatellites,
    IngestTles,
    ComputePasses,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionKind::UploadAoi => "upload",
            ActionKind::ListSatellites => "roster",
            ActionKind::IngestTles => "ingest",
            ActionKind::ComputePasses => "compute",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RequestPhase {
    #[default]
    Idle,
    Sending,
    Ok,
    Error,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestState {
    pub phase: RequestPhase,
    pub message: Option<String>,
}

/// Identity of one dispatched invocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RequestTicket {
    pub kind: ActionKind,
    pub seq: u64,
}

/// What became of a reply once it reached its orchestrator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Settlement {
    Applied,
    Failed,
    Superseded,
}

#[derive(Debug)]
pub struct RequestOrchestrator {
    kind: ActionKind,
    latest_seq: u64,
    state: RequestState,
}

impl RequestOrchestrator {
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            latest_seq: 0,
            state: RequestState::default(),
        }
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    pub fn phase(&self) -> RequestPhase {
        self.state.phase
    }

    pub fn is_sending(&self) -> bool {
        self.state.phase == RequestPhase::Sending
    }

    /// Start a new invocation; any earlier one still in flight is superseded.
    pub fn begin(&mut self) -> RequestTicket {
        self.latest_seq += 1;
        self.state = RequestState {
            phase: RequestPhase::Sending,
            message: None,
        };
        RequestTicket {
            kind: self.kind,
            seq: self.latest_seq,
        }
    }

    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        ticket.kind == self.kind && ticket.seq == self.latest_seq
    }

    /// Apply the outcome of `ticket` if it is still the latest invocation.
    ///
    /// `on_success` receives the payload and may return a status message for
    /// the `ok` phase. It is never called for superseded tickets.
    pub fn settle<T, F>(
        &mut self,
        ticket: RequestTicket,
        outcome: Result<T, ApiError>,
        on_success: F,
    ) -> Settlement
    where
        F: FnOnce(T) -> Option<String>,
    {
        if !self.is_current(ticket) {
            debug!(
                "[REQUEST] {} #{} superseded by #{}, dropping reply",
                self.kind, ticket.seq, self.latest_seq
            );
            return Settlement::Superseded;
        }
        match outcome {
            Ok(payload) => {
                let message = on_success(payload);
                self.state = RequestState {
                    phase: RequestPhase::Ok,
                    message,
                };
                Settlement::Applied
            }
            Err(err) => {
                warn!("[REQUEST] {} #{} failed: {}", self.kind, ticket.seq, err);
                self.fail(err.to_string());
                Settlement::Failed
            }
        }
    }

    /// Mark the action failed without a network round trip, e.g. when the
    /// request could not be handed to the worker or its input is incomplete.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.state = RequestState {
            phase: RequestPhase::Error,
            message: Some(message.into()),
        };
    }
}

/// The four orchestrators of the dashboard page.
#[derive(Resource, Debug)]
pub struct DashboardRequests {
    pub upload: RequestOrchestrator,
    pub roster: RequestOrchestrator,
    pub ingest: RequestOrchestrator,
    pub compute: RequestOrchestrator,
}

impl Default for DashboardRequests {
    fn default() -> Self {
        Self {
            upload: RequestOrchestrator::new(ActionKind::UploadAoi),
            roster: RequestOrchestrator::new(ActionKind::ListSatellites),
            ingest: RequestOrchestrator::new(ActionKind::IngestTles),
            compute: RequestOrchestrator::new(ActionKind::ComputePasses),
        }
    }
}

impl DashboardRequests {
    pub fn get_mut(&mut self, kind: ActionKind) -> &mut RequestOrchestrator {
        match kind {
            ActionKind::UploadAoi => &mut self.upload,
            ActionKind::ListSatellites => &mut self.roster,
            ActionKind::IngestTles => &mut self.ingest,
            ActionKind::ComputePasses => &mut self.compute,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle_and_sends_on_begin() {
        let mut orch = RequestOrchestrator::new(ActionKind::UploadAoi);
        assert_eq!(orch.phase(), RequestPhase::Idle);
        let ticket = orch.begin();
        assert_eq!(ticket.kind, ActionKind::UploadAoi);
        assert!(orch.is_sending());
        assert!(orch.is_current(ticket));
    }

    #[test]
    fn success_runs_callback_and_records_message() {
        let mut orch = RequestOrchestrator::new(ActionKind::IngestTles);
        let ticket = orch.begin();
        let mut seen = None;
        let settled = orch.settle(ticket, Ok(3), |n| {
            seen = Some(n);
            Some("done".to_string())
        });
        assert_eq!(settled, Settlement::Applied);
        assert_eq!(seen, Some(3));
        assert_eq!(orch.phase(), RequestPhase::Ok);
        assert_eq!(orch.state().message.as_deref(), Some("done"));
    }

    #[test]
    fn failure_records_error_message() {
        let mut orch = RequestOrchestrator::new(ActionKind::ComputePasses);
        let ticket = orch.begin();
        let err = ApiError::Status {
            status: 404,
            message: Some("AOI not found".to_string()),
        };
        let settled = orch.settle(ticket, Err::<(), _>(err), |_| None);
        assert_eq!(settled, Settlement::Failed);
        assert_eq!(orch.phase(), RequestPhase::Error);
        assert_eq!(orch.state().message.as_deref(), Some("AOI not found"));
    }

    #[test]
    fn superseded_success_is_a_no_op() {
        let mut orch = RequestOrchestrator::new(ActionKind::ComputePasses);
        let first = orch.begin();
        let second = orch.begin();

        let mut applied = Vec::new();
        assert_eq!(
            orch.settle(second, Ok("r2"), |v| {
                applied.push(v);
                None
            }),
            Settlement::Applied
        );
        assert_eq!(
            orch.settle(first, Ok("r1"), |v| {
                applied.push(v);
                None
            }),
            Settlement::Superseded
        );
        assert_eq!(applied, vec!["r2"]);
        assert_eq!(orch.phase(), RequestPhase::Ok);
    }

    #[test]
    fn superseded_failure_leaves_phase_alone() {
        let mut orch = RequestOrchestrator::new(ActionKind::UploadAoi);
        let first = orch.begin();
        let _second = orch.begin();
        let settled = orch.settle(
            first,
            Err::<(), _>(ApiError::Transport("connection refused".into())),
            |_| None,
        );
        assert_eq!(settled, Settlement::Superseded);
        assert_eq!(orch.phase(), RequestPhase::Sending);
        assert_eq!(orch.state().message, None);
    }

    #[test]
    fn ticket_from_another_kind_is_not_current() {
        let mut upload = RequestOrchestrator::new(ActionKind::UploadAoi);
        let mut compute = RequestOrchestrator::new(ActionKind::ComputePasses);
        let _ = upload.begin();
        let foreign = compute.begin();
        assert!(!upload.is_current(foreign));
    }

    #[test]
    fn can_be_reinvoked_after_completion() {
        let mut orch = RequestOrchestrator::new(ActionKind::ListSatellites);
        let t1 = orch.begin();
        orch.settle(t1, Err::<(), _>(ApiError::Decode("bad".into())), |_| None);
        assert_eq!(orch.phase(), RequestPhase::Error);
        let t2 = orch.begin();
        assert!(orch.is_sending());
        assert_eq!(orch.state().message, None);
        assert!(t2.seq > t1.seq);
    }
}
