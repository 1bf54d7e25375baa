//! Backend API module (HTTP worker, wire types, error mapping).

use bevy::prelude::*;

pub mod client;
pub mod decode;
pub mod error;
pub mod fetcher;
pub mod types;

pub use error::ApiError;
pub use types::{
    ApiChannels, ApiCommand, ApiPayload, ApiReply, ApiRequest, AreaOfInterest, IngestSummary,
    Pass, PassComputeRequest, Satellite, TimeWindow,
};

use crate::config::DashboardConfig;

pub struct ApiPlugin;

impl Plugin for ApiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_api_worker);
    }
}

pub fn setup_api_worker(mut commands: Commands, config: Res<DashboardConfig>) {
    let channels = fetcher::start_api_worker(&config);
    info!("[INIT] API worker started for {}", config.api_base_url);
    commands.insert_resource(channels);
}
