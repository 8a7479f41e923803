pub(crate) mod ids;
pub(crate) mod reorder;
pub(crate) mod tree;

pub(crate) use ids::{is_tmp_id, IdGenerator, TmpIdGenerator};
pub(crate) use reorder::resolve_drop;
pub(crate) use tree::{
    delete, find, insert_chapter, insert_folder, rename, stats, update_description, OutlineStats,
};

/// Structural operations the engine refuses to perform.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub(crate) enum OutlineError {
    #[error("parent {0} does not exist")]
    ParentNotFound(String),
    #[error("{0} is a chapter and cannot hold children")]
    ParentIsChapter(String),
    #[error("id {0} is already used in this outline")]
    DuplicateId(String),
}
