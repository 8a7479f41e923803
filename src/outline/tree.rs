//! Outline tree queries and mutations.
//!
//! Every mutation takes the current tree by reference and returns a new tree;
//! callers replace the value they hold.

use super::ids::is_tmp_id;
use super::OutlineError;
use crate::models::{ChapterRef, Folder, StructureItem};
use std::collections::HashSet;

/// Container of a located node.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Parent<'a> {
    Root,
    Folder(&'a Folder),
}

impl<'a> Parent<'a> {
    pub fn folder_id(&self) -> Option<&'a str> {
        match self {
            Parent::Root => None,
            Parent::Folder(f) => Some(f.id.as_str()),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Found<'a> {
    pub node: &'a StructureItem,
    pub parent: Parent<'a>,
    /// Position inside the parent's sequence.
    pub index: usize,
}

/// Depth-first search for `id`, returning the node and its immediate container.
pub(crate) fn find<'a>(tree: &'a [StructureItem], id: &str) -> Option<Found<'a>> {
    find_in(tree, Parent::Root, id)
}

fn find_in<'a>(items: &'a [StructureItem], parent: Parent<'a>, id: &str) -> Option<Found<'a>> {
    for (index, node) in items.iter().enumerate() {
        if node.id() == id {
            return Some(Found {
                node,
                parent,
                index,
            });
        }
        if let StructureItem::Folder(folder) = node {
            if let Some(found) = find_in(&folder.children, Parent::Folder(folder), id) {
                return Some(found);
            }
        }
    }
    None
}

pub(crate) fn contains(tree: &[StructureItem], id: &str) -> bool {
    find(tree, id).is_some()
}

pub(crate) fn item_mut<'a>(items: &'a mut [StructureItem], id: &str) -> Option<&'a mut StructureItem> {
    for item in items.iter_mut() {
        if item.id() == id {
            return Some(item);
        }
        if let StructureItem::Folder(folder) = item {
            if let Some(found) = item_mut(&mut folder.children, id) {
                return Some(found);
            }
        }
    }
    None
}

pub(crate) fn folder_mut<'a>(items: &'a mut [StructureItem], id: &str) -> Option<&'a mut Folder> {
    match item_mut(items, id)? {
        StructureItem::Folder(f) => Some(f),
        StructureItem::Chapter(_) => None,
    }
}

/// Removes `id` from wherever it sits, returning the detached subtree.
pub(crate) fn detach(items: &mut Vec<StructureItem>, id: &str) -> Option<StructureItem> {
    if let Some(pos) = items.iter().position(|i| i.id() == id) {
        return Some(items.remove(pos));
    }
    for item in items.iter_mut() {
        if let StructureItem::Folder(folder) = item {
            if let Some(found) = detach(&mut folder.children, id) {
                return Some(found);
            }
        }
    }
    None
}

/// Resolves the sequence a new node should be appended to.
fn container_mut<'a>(
    tree: &'a mut Vec<StructureItem>,
    parent_id: Option<&str>,
) -> Result<&'a mut Vec<StructureItem>, OutlineError> {
    let Some(pid) = parent_id else {
        return Ok(tree);
    };
    match item_mut(tree, pid) {
        Some(StructureItem::Folder(f)) => Ok(&mut f.children),
        Some(StructureItem::Chapter(_)) => Err(OutlineError::ParentIsChapter(pid.to_string())),
        None => Err(OutlineError::ParentNotFound(pid.to_string())),
    }
}

/// Appends a new empty folder at root (`parent_id == None`) or into an existing folder.
pub(crate) fn insert_folder(
    tree: &[StructureItem],
    parent_id: Option<&str>,
    folder: Folder,
) -> Result<Vec<StructureItem>, OutlineError> {
    if contains(tree, &folder.id) {
        return Err(OutlineError::DuplicateId(folder.id));
    }

    let mut next = tree.to_vec();
    let children = container_mut(&mut next, parent_id)?;
    children.push(StructureItem::Folder(Folder {
        children: Vec::new(),
        ..folder
    }));
    Ok(next)
}

/// Appends a locally created chapter reference; same placement rules as folders.
pub(crate) fn insert_chapter(
    tree: &[StructureItem],
    parent_id: Option<&str>,
    chapter: ChapterRef,
) -> Result<Vec<StructureItem>, OutlineError> {
    if contains(tree, &chapter.id) {
        return Err(OutlineError::DuplicateId(chapter.id));
    }

    let mut next = tree.to_vec();
    let children = container_mut(&mut next, parent_id)?;
    children.push(StructureItem::Chapter(ChapterRef {
        parent_folder_id: parent_id.map(str::to_string),
        ..chapter
    }));
    Ok(next)
}

pub(crate) fn rename(tree: &[StructureItem], id: &str, new_title: &str) -> Vec<StructureItem> {
    let mut next = tree.to_vec();
    match item_mut(&mut next, id) {
        Some(StructureItem::Folder(f)) => f.title = new_title.to_string(),
        Some(StructureItem::Chapter(c)) => c.title = new_title.to_string(),
        None => log::warn!("rename: stale reference {id}"),
    }
    next
}

/// Folder-only; a chapter target is left untouched.
pub(crate) fn update_description(
    tree: &[StructureItem],
    id: &str,
    new_description: &str,
) -> Vec<StructureItem> {
    let mut next = tree.to_vec();
    match item_mut(&mut next, id) {
        Some(StructureItem::Folder(f)) => f.description = new_description.to_string(),
        Some(StructureItem::Chapter(_)) => {
            log::debug!("update_description: {id} is a chapter, ignoring");
        }
        None => log::warn!("update_description: stale reference {id}"),
    }
    next
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Removal {
    pub tree: Vec<StructureItem>,
    /// Persisted chapter ids under the removed node, in depth-first order.
    pub chapter_ids: Vec<String>,
}

/// Removes `id` and its whole subtree. Performs no I/O.
pub(crate) fn delete(tree: &[StructureItem], id: &str) -> Removal {
    let mut next = tree.to_vec();
    let Some(removed) = detach(&mut next, id) else {
        log::warn!("delete: stale reference {id}");
        return Removal {
            tree: next,
            chapter_ids: Vec::new(),
        };
    };

    let mut chapter_ids = Vec::new();
    collect_chapter_ids(&removed, &mut chapter_ids);
    chapter_ids.retain(|c| !is_tmp_id(c));

    Removal {
        tree: next,
        chapter_ids,
    }
}

fn collect_chapter_ids(item: &StructureItem, out: &mut Vec<String>) {
    match item {
        StructureItem::Chapter(c) => out.push(c.id.clone()),
        StructureItem::Folder(f) => {
            for child in &f.children {
                collect_chapter_ids(child, out);
            }
        }
    }
}

/// Recomputes every chapter's `parent_folder_id` from actual nesting.
pub(crate) fn relink_parents(tree: &mut [StructureItem]) {
    fn walk(items: &mut [StructureItem], parent: Option<&str>) {
        for item in items.iter_mut() {
            match item {
                StructureItem::Chapter(c) => c.parent_folder_id = parent.map(str::to_string),
                StructureItem::Folder(f) => walk(&mut f.children, Some(f.id.as_str())),
            }
        }
    }
    walk(tree, None);
}

/// Checks global id uniqueness, reporting the first duplicate found.
pub(crate) fn validate(tree: &[StructureItem]) -> Result<(), OutlineError> {
    fn walk<'a>(items: &'a [StructureItem], seen: &mut HashSet<&'a str>) -> Result<(), OutlineError> {
        for item in items {
            if !seen.insert(item.id()) {
                return Err(OutlineError::DuplicateId(item.id().to_string()));
            }
            if let StructureItem::Folder(f) = item {
                walk(&f.children, seen)?;
            }
        }
        Ok(())
    }
    walk(tree, &mut HashSet::new())
}

/// True if `descendant_id` lies strictly inside the subtree rooted at `ancestor`.
pub(crate) fn is_descendant(ancestor: &StructureItem, descendant_id: &str) -> bool {
    match ancestor {
        StructureItem::Chapter(_) => false,
        StructureItem::Folder(f) => find(&f.children, descendant_id).is_some(),
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct OutlineStats {
    pub folders: usize,
    pub chapters: usize,
}

pub(crate) fn stats(tree: &[StructureItem]) -> OutlineStats {
    let mut out = OutlineStats::default();
    for item in tree {
        match item {
            StructureItem::Chapter(_) => out.chapters += 1,
            StructureItem::Folder(f) => {
                let inner = stats(&f.children);
                out.folders += 1 + inner.folders;
                out.chapters += inner.chapters;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chapter(id: &str, parent: Option<&str>) -> StructureItem {
        StructureItem::Chapter(ChapterRef {
            id: id.to_string(),
            title: format!("Chapter {id}"),
            parent_folder_id: parent.map(str::to_string),
        })
    }

    fn folder(id: &str, children: Vec<StructureItem>) -> StructureItem {
        StructureItem::Folder(Folder::new(id, format!("Folder {id}")).with_children(children))
    }

    // A[c1, B[c2, c3]], c4
    fn sample() -> Vec<StructureItem> {
        vec![
            folder(
                "A",
                vec![
                    chapter("c1", Some("A")),
                    folder("B", vec![chapter("c2", Some("B")), chapter("c3", Some("B"))]),
                ],
            ),
            chapter("c4", None),
        ]
    }

    #[test]
    fn test_find_reports_parent_and_index() {
        let tree = sample();

        let found = find(&tree, "c3").expect("c3 should be found");
        assert_eq!(found.node.id(), "c3");
        assert_eq!(found.parent.folder_id(), Some("B"));
        assert_eq!(found.index, 1);

        let root = find(&tree, "c4").expect("c4 should be found");
        assert!(matches!(root.parent, Parent::Root));
        assert_eq!(root.index, 1);

        assert!(find(&tree, "nope").is_none());
    }

    #[test]
    fn test_insert_folder_at_root_and_nested() {
        let tree = sample();

        let next = insert_folder(&tree, None, Folder::new("N", "New")).expect("root insert");
        assert_eq!(next.last().map(|i| i.id()), Some("N"));
        // Input is untouched.
        assert_eq!(tree.len(), 2);

        let next = insert_folder(&next, Some("B"), Folder::new("N2", "Nested")).expect("nested insert");
        let found = find(&next, "N2").expect("N2 present");
        assert_eq!(found.parent.folder_id(), Some("B"));
        assert_eq!(found.index, 2);
    }

    #[test]
    fn test_insert_folder_drops_supplied_children() {
        let tree = sample();
        let with_kids = Folder::new("N", "New").with_children(vec![chapter("zz", None)]);
        let next = insert_folder(&tree, None, with_kids).expect("insert");
        assert!(!contains(&next, "zz"));
    }

    #[test]
    fn test_insert_folder_rejects_chapter_parent() {
        let tree = sample();
        let err = insert_folder(&tree, Some("c1"), Folder::new("N", "New")).unwrap_err();
        assert_eq!(err, OutlineError::ParentIsChapter("c1".to_string()));

        let err = insert_folder(&tree, Some("ghost"), Folder::new("N", "New")).unwrap_err();
        assert_eq!(err, OutlineError::ParentNotFound("ghost".to_string()));
    }

    #[test]
    fn test_insert_rejects_duplicate_id() {
        let tree = sample();
        let err = insert_folder(&tree, None, Folder::new("c2", "Clash")).unwrap_err();
        assert_eq!(err, OutlineError::DuplicateId("c2".to_string()));

        let err = insert_chapter(&tree, None, ChapterRef::new("B", "Clash")).unwrap_err();
        assert_eq!(err, OutlineError::DuplicateId("B".to_string()));
    }

    #[test]
    fn test_insert_chapter_sets_parent_link() {
        let tree = sample();
        let next = insert_chapter(&tree, Some("A"), ChapterRef::new("tmp-1", "Draft")).expect("insert");
        let found = find(&next, "tmp-1").expect("present");
        match found.node {
            StructureItem::Chapter(c) => assert_eq!(c.parent_folder_id.as_deref(), Some("A")),
            _ => panic!("expected chapter"),
        }

        let next = insert_chapter(&next, None, ChapterRef::new("tmp-2", "Loose")).expect("insert");
        match find(&next, "tmp-2").map(|f| f.node) {
            Some(StructureItem::Chapter(c)) => assert!(c.parent_folder_id.is_none()),
            _ => panic!("expected chapter"),
        }

        let err = insert_chapter(&next, Some("c4"), ChapterRef::new("tmp-3", "x")).unwrap_err();
        assert_eq!(err, OutlineError::ParentIsChapter("c4".to_string()));
    }

    #[test]
    fn test_rename_updates_title_in_place() {
        let tree = sample();
        let next = rename(&tree, "c2", "Renamed");
        assert_eq!(find(&next, "c2").map(|f| f.node.title()), Some("Renamed"));

        let next = rename(&next, "B", "Act II");
        assert_eq!(find(&next, "B").map(|f| f.node.title()), Some("Act II"));
        // Position unchanged.
        assert_eq!(find(&next, "B").map(|f| f.index), Some(1));
    }

    #[test]
    fn test_rename_stale_reference_is_noop() {
        let tree = sample();
        assert_eq!(rename(&tree, "ghost", "x"), tree);
    }

    #[test]
    fn test_update_description_folder_only() {
        let tree = sample();
        let next = update_description(&tree, "A", "The setup");
        let a = find(&next, "A").and_then(|f| f.node.as_folder()).expect("folder A");
        assert_eq!(a.description, "The setup");

        assert_eq!(update_description(&tree, "c1", "nope"), tree);
        assert_eq!(update_description(&tree, "ghost", "nope"), tree);
    }

    #[test]
    fn test_delete_folder_collects_all_nested_chapters() {
        let tree = sample();
        let removal = delete(&tree, "A");
        assert_eq!(removal.chapter_ids, vec!["c1", "c2", "c3"]);
        for id in ["A", "B", "c1", "c2", "c3"] {
            assert!(!contains(&removal.tree, id), "{id} should be gone");
        }
        assert!(contains(&removal.tree, "c4"));
    }

    #[test]
    fn test_delete_folder_with_two_chapters() {
        let tree = vec![folder("A", vec![chapter("c1", Some("A")), chapter("c2", Some("A"))])];
        let removal = delete(&tree, "A");
        assert_eq!(removal.chapter_ids, vec!["c1", "c2"]);
        assert!(removal.tree.is_empty());
    }

    #[test]
    fn test_delete_skips_temporary_chapter_ids() {
        let tree = vec![folder(
            "A",
            vec![chapter("c1", Some("A")), chapter("tmp-9-1", Some("A"))],
        )];
        let removal = delete(&tree, "A");
        assert_eq!(removal.chapter_ids, vec!["c1"]);
    }

    #[test]
    fn test_delete_single_chapter_and_stale() {
        let tree = sample();
        let removal = delete(&tree, "c2");
        assert_eq!(removal.chapter_ids, vec!["c2"]);
        assert!(!contains(&removal.tree, "c2"));
        assert!(contains(&removal.tree, "c3"));

        let removal = delete(&tree, "ghost");
        assert!(removal.chapter_ids.is_empty());
        assert_eq!(removal.tree, tree);
    }

    #[test]
    fn test_relink_parents_repairs_links() {
        let mut tree = vec![
            folder("A", vec![chapter("c1", None)]),
            chapter("c2", Some("A")),
        ];
        relink_parents(&mut tree);
        match find(&tree, "c1").map(|f| f.node) {
            Some(StructureItem::Chapter(c)) => assert_eq!(c.parent_folder_id.as_deref(), Some("A")),
            _ => panic!("expected chapter"),
        }
        match find(&tree, "c2").map(|f| f.node) {
            Some(StructureItem::Chapter(c)) => assert!(c.parent_folder_id.is_none()),
            _ => panic!("expected chapter"),
        }
    }

    #[test]
    fn test_validate_detects_duplicates() {
        assert!(validate(&sample()).is_ok());
        let bad = vec![folder("A", vec![chapter("x", Some("A"))]), chapter("x", None)];
        assert_eq!(validate(&bad), Err(OutlineError::DuplicateId("x".to_string())));
    }

    #[test]
    fn test_stats_and_descendants() {
        let tree = sample();
        assert_eq!(stats(&tree), OutlineStats { folders: 2, chapters: 4 });

        let a = find(&tree, "A").map(|f| f.node).expect("A");
        assert!(is_descendant(a, "c3"));
        assert!(!is_descendant(a, "A"));
        assert!(!is_descendant(a, "c4"));
    }
}
