pub(crate) mod session;
pub(crate) mod sync;

use crate::api::{ApiClient, ApiError, ApiErrorKind};
use leptos::prelude::*;

pub(crate) use session::{Notice, NoticeLevel, OutlinerSession, SessionPhase};
pub(crate) use sync::{delete_item, load_structure, save_structure, SyncError};

#[derive(Clone, Copy)]
pub(crate) struct AppState {
    pub api_client: RwSignal<ApiClient>,

    /// Project opened most recently (remembered across visits).
    pub last_project_id: RwSignal<Option<String>>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            api_client: RwSignal::new(ApiClient::load_from_storage()),
            last_project_id: RwSignal::new(crate::storage::load_last_project()),
        }
    }

    pub fn remember_project(&self, project_id: &str) {
        crate::storage::write_last_project(project_id);
        self.last_project_id.set(Some(project_id.trim().to_string()));
    }

    /// Drops the stored token when the backend rejects it.
    ///
    /// Returns true if the error was an auth failure.
    pub fn handle_auth_error(&self, err: &ApiError) -> bool {
        if err.kind != ApiErrorKind::Unauthorized {
            return false;
        }
        log::warn!("token rejected by backend, signing out");
        self.api_client.update(|c| c.logout());
        true
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy)]
pub(crate) struct AppContext(pub AppState);
