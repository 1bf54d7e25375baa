//! Backend worker thread.

use bevy::prelude::*;
use std::sync::{
    Arc, Mutex,
    mpsc::{self},
};
use std::thread;
use tokio::sync::mpsc::unbounded_channel;

use crate::api::client::ApiClient;
use crate::api::error::ApiError;
use crate::api::types::{ApiChannels, ApiCommand, ApiReply};
use crate::config::DashboardConfig;

/// Spawn the worker that owns the HTTP client.
///
/// Each command runs as its own task so a slow compute never holds up an
/// upload; replies come back tagged with the ticket they were issued for.
pub fn start_api_worker(config: &DashboardConfig) -> ApiChannels {
    let (cmd_tx, mut cmd_rx) = unbounded_channel::<ApiCommand>();
    let (res_tx, res_rx) = mpsc::channel::<ApiReply>();
    let base_url = config.api_base_url.clone();
    let timeout = config.request_timeout();

    thread::spawn(move || {
        let rt = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(err) => {
                error!("[API] failed to start runtime: {}", err);
                return;
            }
        };
        rt.block_on(async move {
            let client = match ApiClient::new(&base_url, timeout) {
                Ok(client) => Some(client),
                Err(err) => {
                    error!("[API] failed to build HTTP client: {}", err);
                    None
                }
            };

            while let Some(cmd) = cmd_rx.recv().await {
                let res_tx = res_tx.clone();
                let Some(client) = client.clone() else {
                    let _ = res_tx.send(ApiReply {
                        ticket: cmd.ticket,
                        outcome: Err(ApiError::Transport("HTTP client unavailable".to_string())),
                    });
                    continue;
                };
                tokio::spawn(async move {
                    debug!("[API] {} #{} started", cmd.ticket.kind, cmd.ticket.seq);
                    let outcome = client.execute(cmd.request).await;
                    if let Err(err) = &outcome {
                        debug!("[API] {} #{} failed: {}", cmd.ticket.kind, cmd.ticket.seq, err);
                    }
                    let _ = res_tx.send(ApiReply {
                        ticket: cmd.ticket,
                        outcome,
                    });
                });
            }
        });
    });

    ApiChannels {
        cmd_tx,
        res_rx: Arc::new(Mutex::new(res_rx)),
    }
}
