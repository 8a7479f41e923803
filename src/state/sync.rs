//! Persistence round-trips for an outliner session.
//!
//! Each driver borrows the session only between awaits, so the UI stays
//! responsive (and editable) while a request is pending.

use super::session::OutlinerSession;
use crate::api::{ApiClient, ApiError, ApiResult};
use crate::models::BackendRecord;
use leptos::prelude::*;
use std::cell::RefCell;

#[derive(Clone, Debug, thiserror::Error)]
pub(crate) enum SyncError {
    #[error("another save or delete is still running")]
    Busy,
    #[error("the outline has not been loaded from the server yet")]
    NotLoaded,
    #[error("the outline must be reloaded before it can be written")]
    ReloadRequired,
    #[error("the outliner was closed")]
    SessionClosed,
    #[error(transparent)]
    Api(#[from] ApiError),
}

pub(crate) type SyncResult<T> = Result<T, SyncError>;

/// Backend endpoints the synchronizer needs.
pub(crate) trait StructureBackend {
    async fn fetch_structure(&self, project_id: &str) -> ApiResult<Vec<BackendRecord>>;
    async fn save_structure(&self, project_id: &str, records: &[BackendRecord]) -> ApiResult<()>;
    async fn delete_chapter(&self, project_id: &str, chapter_id: &str) -> ApiResult<()>;
}

impl StructureBackend for ApiClient {
    async fn fetch_structure(&self, project_id: &str) -> ApiResult<Vec<BackendRecord>> {
        self.get_project_structure(project_id).await
    }

    async fn save_structure(&self, project_id: &str, records: &[BackendRecord]) -> ApiResult<()> {
        self.put_project_structure(project_id, records).await
    }

    async fn delete_chapter(&self, project_id: &str, chapter_id: &str) -> ApiResult<()> {
        ApiClient::delete_chapter(self, project_id, chapter_id).await
    }
}

/// Where the session lives. Returns `None` once the owner is gone.
pub(crate) trait SessionCell {
    fn with_session<R>(&self, f: impl FnOnce(&mut OutlinerSession) -> R) -> Option<R>;
}

impl SessionCell for RefCell<OutlinerSession> {
    fn with_session<R>(&self, f: impl FnOnce(&mut OutlinerSession) -> R) -> Option<R> {
        Some(f(&mut self.borrow_mut()))
    }
}

impl SessionCell for RwSignal<OutlinerSession> {
    fn with_session<R>(&self, f: impl FnOnce(&mut OutlinerSession) -> R) -> Option<R> {
        self.try_update(f)
    }
}

fn session<C: SessionCell, R>(cell: &C, f: impl FnOnce(&mut OutlinerSession) -> R) -> SyncResult<R> {
    cell.with_session(f).ok_or(SyncError::SessionClosed)
}

/// Fetches the whole structure and replaces the visible tree.
pub(crate) async fn load_structure<B, C>(backend: &B, cell: &C, project_id: &str) -> SyncResult<()>
where
    B: StructureBackend,
    C: SessionCell,
{
    session(cell, |s| s.begin_load())??;
    refetch(backend, cell, project_id).await
}

async fn refetch<B, C>(backend: &B, cell: &C, project_id: &str) -> SyncResult<()>
where
    B: StructureBackend,
    C: SessionCell,
{
    let result = backend.fetch_structure(project_id).await;
    session(cell, |s| s.finish_load(result))??;
    Ok(())
}

/// PUTs the whole tree, then reloads so temporary ids are replaced.
pub(crate) async fn save_structure<B, C>(backend: &B, cell: &C, project_id: &str) -> SyncResult<()>
where
    B: StructureBackend,
    C: SessionCell,
{
    let payload = session(cell, |s| s.begin_save())??;
    log::info!("saving outline of {project_id} ({} top-level items)", payload.len());

    let result = backend.save_structure(project_id, &payload).await;
    session(cell, |s| s.finish_save(result))??;
    refetch(backend, cell, project_id).await
}

/// Deletes `id` and its subtree on the server, then reloads.
///
/// Chapter records go first, one call each; the structure PUT only runs if
/// all of them succeeded. The visible tree changes only after the PUT.
pub(crate) async fn delete_item<B, C>(
    backend: &B,
    cell: &C,
    project_id: &str,
    id: &str,
) -> SyncResult<()>
where
    B: StructureBackend,
    C: SessionCell,
{
    let Some(pending) = session(cell, |s| s.begin_delete(id))?? else {
        return Ok(());
    };

    let mut outcome = Ok(());
    for chapter_id in &pending.chapter_ids {
        if let Err(e) = backend.delete_chapter(project_id, chapter_id).await {
            log::warn!("deleting chapter {chapter_id} failed, aborting delete of {id}");
            outcome = Err(e);
            break;
        }
    }
    if outcome.is_ok() {
        outcome = backend.save_structure(project_id, &pending.payload).await;
    }

    match &outcome {
        Ok(()) => session(cell, |s| s.commit_delete(pending.removed_tree))?,
        Err(e) => session(cell, |s| s.fail_delete(e))?,
    }

    let reloaded = refetch(backend, cell, project_id).await;
    outcome?;
    reloaded
}
