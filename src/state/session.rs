//! State of one outliner editing session.
//!
//! The session owns the visible tree and the phase of the current server
//! round-trip. All methods are synchronous; the async drivers in
//! [`super::sync`] call `begin_*` before a request and `finish_*` after it.

use super::sync::SyncError;
use crate::api::{ApiError, ApiResult};
use crate::bridge::{from_backend_format, to_backend_format};
use crate::models::{BackendRecord, ChapterRef, Folder, StructureItem};
use crate::outline::{self, IdGenerator, OutlineError, OutlineStats};
#[cfg(target_arch = "wasm32")]
use crate::outline::TmpIdGenerator;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SessionPhase {
    /// Nothing loaded yet (or the initial load failed).
    Idle,
    Loading,
    Ready,
    /// Local mutations not yet saved.
    Editing,
    Saving,
    Deleting,
    /// Mandatory refetch after a save or delete.
    Reloading,
}

impl SessionPhase {
    pub fn in_flight(self) -> bool {
        matches!(
            self,
            SessionPhase::Loading
                | SessionPhase::Saving
                | SessionPhase::Deleting
                | SessionPhase::Reloading
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum NoticeLevel {
    Info,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// A delete computed locally but not yet applied to the visible tree.
#[derive(Clone, Debug)]
pub(crate) struct PendingDelete {
    pub removed_tree: Vec<StructureItem>,
    /// Persisted chapters to delete server-side, in order.
    pub chapter_ids: Vec<String>,
    /// Structure to PUT once every chapter deletion succeeded.
    pub payload: Vec<BackendRecord>,
}

pub(crate) struct OutlinerSession {
    tree: Vec<StructureItem>,
    phase: SessionPhase,
    /// Where a failed request returns to.
    resume_phase: SessionPhase,
    loaded: bool,
    reload_required: bool,
    notice: Option<Notice>,
    /// Set by a local edit made while a request was in flight.
    edits_during_request: bool,
    ids: Box<dyn IdGenerator + Send + Sync>,
}

impl OutlinerSession {
    pub fn new(ids: Box<dyn IdGenerator + Send + Sync>) -> Self {
        Self {
            tree: Vec::new(),
            phase: SessionPhase::Idle,
            resume_phase: SessionPhase::Idle,
            loaded: false,
            reload_required: false,
            notice: None,
            edits_during_request: false,
            ids,
        }
    }

    pub fn tree(&self) -> &[StructureItem] {
        &self.tree
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn is_busy(&self) -> bool {
        self.phase.in_flight()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn reload_required(&self) -> bool {
        self.reload_required
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.phase == SessionPhase::Editing
            || (self.phase.in_flight() && self.resume_phase == SessionPhase::Editing)
    }

    pub fn stats(&self) -> OutlineStats {
        outline::stats(&self.tree)
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn set_notice(&mut self, notice: Notice) {
        self.notice = Some(notice);
    }

    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    // ---- local edits ----

    fn apply_local(&mut self, next: Vec<StructureItem>, action: &str) {
        if next == self.tree {
            return;
        }
        if self.phase.in_flight() {
            log::warn!(
                "{action} while {:?}; the next reload will replace this edit",
                self.phase
            );
            self.resume_phase = SessionPhase::Editing;
            self.edits_during_request = true;
        } else {
            self.phase = SessionPhase::Editing;
        }
        self.tree = next;
    }

    /// Adds an empty folder and returns its temporary id.
    pub fn add_folder(
        &mut self,
        parent_id: Option<&str>,
        title: &str,
    ) -> Result<String, OutlineError> {
        let id = self.ids.next_id();
        let next = outline::insert_folder(&self.tree, parent_id, Folder::new(id.clone(), title))?;
        self.apply_local(next, "add folder");
        Ok(id)
    }

    pub fn add_chapter(
        &mut self,
        parent_id: Option<&str>,
        title: &str,
    ) -> Result<String, OutlineError> {
        let id = self.ids.next_id();
        let next =
            outline::insert_chapter(&self.tree, parent_id, ChapterRef::new(id.clone(), title))?;
        self.apply_local(next, "add chapter");
        Ok(id)
    }

    pub fn rename(&mut self, id: &str, title: &str) {
        let next = outline::rename(&self.tree, id, title);
        self.apply_local(next, "rename");
    }

    pub fn update_description(&mut self, id: &str, description: &str) {
        let next = outline::update_description(&self.tree, id, description);
        self.apply_local(next, "description edit");
    }

    pub fn move_item(&mut self, dragged_id: &str, target_id: &str) {
        let next = outline::resolve_drop(&self.tree, dragged_id, target_id);
        self.apply_local(next, "move");
    }

    // ---- server round-trips ----

    fn enter(&mut self, phase: SessionPhase) {
        self.resume_phase = self.phase;
        self.phase = phase;
    }

    fn check_writable(&self) -> Result<(), SyncError> {
        if self.phase.in_flight() {
            return Err(SyncError::Busy);
        }
        if !self.loaded {
            return Err(SyncError::NotLoaded);
        }
        if self.reload_required {
            return Err(SyncError::ReloadRequired);
        }
        Ok(())
    }

    pub fn begin_load(&mut self) -> Result<(), SyncError> {
        if self.phase.in_flight() {
            return Err(SyncError::Busy);
        }
        if self.phase == SessionPhase::Editing {
            log::info!("reloading outline; unsaved local edits are discarded");
        }
        self.enter(SessionPhase::Loading);
        Ok(())
    }

    /// Completes a `Loading` or `Reloading` phase.
    ///
    /// On failure the tree is left untouched and the error is handed back.
    pub fn finish_load(&mut self, result: ApiResult<Vec<BackendRecord>>) -> Result<(), ApiError> {
        let after_write = self.phase == SessionPhase::Reloading;
        let superseded = std::mem::take(&mut self.edits_during_request);
        match result {
            Ok(records) => {
                self.tree = from_backend_format(&records);
                self.loaded = true;
                self.reload_required = false;
                self.phase = SessionPhase::Ready;
                log::debug!("outline loaded: {:?}", self.stats());
                if superseded {
                    log::warn!("edits made during the request were replaced by the server copy");
                    self.notice = Some(Notice::error(
                        "Edits made while the outline was syncing were replaced by the server copy; apply them again",
                    ));
                }
                Ok(())
            }
            Err(e) => {
                log::error!("outline load failed: {e}");
                if after_write {
                    self.reload_required = true;
                    self.phase = SessionPhase::Ready;
                    self.notice = Some(Notice::error(format!(
                        "Could not refresh the outline, reload before saving again: {e}"
                    )));
                } else {
                    self.phase = if self.loaded {
                        self.resume_phase
                    } else {
                        SessionPhase::Idle
                    };
                    self.notice = Some(Notice::error(format!("Failed to load outline: {e}")));
                }
                Err(e)
            }
        }
    }

    /// Starts a whole-structure save and returns the payload to PUT.
    pub fn begin_save(&mut self) -> Result<Vec<BackendRecord>, SyncError> {
        self.check_writable()?;
        self.enter(SessionPhase::Saving);
        Ok(to_backend_format(&self.tree))
    }

    /// On success the session moves to `Reloading`; the caller must refetch.
    pub fn finish_save(&mut self, result: ApiResult<()>) -> Result<(), ApiError> {
        match result {
            Ok(()) => {
                self.phase = SessionPhase::Reloading;
                self.notice = Some(Notice::info("Outline saved"));
                Ok(())
            }
            Err(e) => {
                log::error!("outline save failed: {e}");
                self.edits_during_request = false;
                self.phase = self.resume_phase;
                self.notice = Some(Notice::error(format!("Failed to save outline: {e}")));
                Err(e)
            }
        }
    }

    /// Computes the delete of `id` without touching the visible tree.
    ///
    /// Returns `Ok(None)` for an id that is no longer in the tree.
    pub fn begin_delete(&mut self, id: &str) -> Result<Option<PendingDelete>, SyncError> {
        self.check_writable()?;
        if outline::find(&self.tree, id).is_none() {
            log::warn!("delete: stale reference {id}");
            return Ok(None);
        }

        let removal = outline::delete(&self.tree, id);
        self.enter(SessionPhase::Deleting);
        Ok(Some(PendingDelete {
            payload: to_backend_format(&removal.tree),
            removed_tree: removal.tree,
            chapter_ids: removal.chapter_ids,
        }))
    }

    pub fn commit_delete(&mut self, removed_tree: Vec<StructureItem>) {
        self.tree = removed_tree;
        self.phase = SessionPhase::Reloading;
        self.notice = Some(Notice::info("Deleted"));
    }

    /// The visible tree stays as it was; a reload follows either way.
    pub fn fail_delete(&mut self, err: &ApiError) {
        log::error!("delete aborted: {err}");
        self.phase = SessionPhase::Reloading;
        self.notice = Some(Notice::error(format!("Delete failed: {err}")));
    }
}

/// Browser only: [`TmpIdGenerator`] reads the JS clock.
#[cfg(target_arch = "wasm32")]
impl Default for OutlinerSession {
    fn default() -> Self {
        Self::new(Box::new(TmpIdGenerator))
    }
}
