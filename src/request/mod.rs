//! Request orchestration for the dashboard's network actions

pub mod orchestrator;

pub use orchestrator::{
    ActionKind, DashboardRequests, RequestOrchestrator, RequestPhase, RequestState, RequestTicket,
    Settlement,
};
