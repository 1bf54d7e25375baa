//! Dashboard page controller
//!
//! Owns the request orchestrators and the page store, dispatches the user's
//! actions to the API worker and applies whatever comes back.

use bevy::prelude::*;

pub mod actions;
pub mod systems;

use crate::request::DashboardRequests;
use crate::store::DashboardStore;

pub struct DashboardPlugin;

impl Plugin for DashboardPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<DashboardRequests>()
            .init_resource::<DashboardStore>()
            .add_systems(
                Update,
                (systems::request_initial_roster, systems::apply_api_replies).chain(),
            );
    }
}
