use super::tree::{detach, find, folder_mut, is_descendant};
use crate::models::StructureItem;

/// Applies a drag of `dragged_id` onto `target_id` and returns the resulting tree.
///
/// Dropping onto a folder appends inside it; dropping onto a chapter inserts
/// before that chapter at the same level. If the target has disappeared the
/// dragged node is appended at root rather than lost.
pub(crate) fn resolve_drop(
    tree: &[StructureItem],
    dragged_id: &str,
    target_id: &str,
) -> Vec<StructureItem> {
    if dragged_id == target_id {
        return tree.to_vec();
    }

    let Some(dragged) = find(tree, dragged_id) else {
        log::warn!("resolve_drop: stale dragged reference {dragged_id}");
        return tree.to_vec();
    };
    if is_descendant(dragged.node, target_id) {
        log::warn!("resolve_drop: {target_id} is inside {dragged_id}, ignoring");
        return tree.to_vec();
    }

    let mut next = tree.to_vec();
    let Some(mut moving) = detach(&mut next, dragged_id) else {
        return tree.to_vec();
    };

    // Owned copy of the target's position; the tree is mutated below.
    let target = find(&next, target_id).map(|found| {
        (
            found.node.is_folder(),
            found.parent.folder_id().map(str::to_string),
            found.index,
        )
    });

    match target {
        Some((true, _, _)) => {
            set_parent_link(&mut moving, Some(target_id));
            match folder_mut(&mut next, target_id) {
                Some(folder) => folder.children.push(moving),
                None => next.push(moving),
            }
        }
        Some((false, container_id, index)) => {
            set_parent_link(&mut moving, container_id.as_deref());
            let siblings = match container_id.as_deref() {
                None => Some(&mut next),
                Some(cid) => folder_mut(&mut next, cid).map(|f| &mut f.children),
            };
            match siblings {
                Some(siblings) => {
                    let at = index.min(siblings.len());
                    siblings.insert(at, moving);
                }
                None => next.push(moving),
            }
        }
        None => {
            log::warn!("resolve_drop: target {target_id} not found, appending {dragged_id} at root");
            set_parent_link(&mut moving, None);
            next.push(moving);
        }
    }

    next
}

/// Folders carry no parent field; their position is pure containment.
fn set_parent_link(item: &mut StructureItem, parent: Option<&str>) {
    if let StructureItem::Chapter(c) = item {
        c.parent_folder_id = parent.map(str::to_string);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChapterRef, Folder};
    use crate::outline::tree::{insert_folder, validate};

    fn chapter(id: &str, parent: Option<&str>) -> StructureItem {
        StructureItem::Chapter(ChapterRef {
            id: id.to_string(),
            title: id.to_uppercase(),
            parent_folder_id: parent.map(str::to_string),
        })
    }

    fn folder(id: &str, children: Vec<StructureItem>) -> StructureItem {
        StructureItem::Folder(Folder::new(id, id).with_children(children))
    }

    fn ids(items: &[StructureItem]) -> Vec<&str> {
        items.iter().map(|i| i.id()).collect()
    }

    fn children<'a>(tree: &'a [StructureItem], id: &str) -> &'a [StructureItem] {
        find(tree, id)
            .and_then(|f| f.node.as_folder())
            .map(|f| f.children.as_slice())
            .unwrap_or_default()
    }

    fn parent_link(tree: &[StructureItem], id: &str) -> Option<String> {
        match find(tree, id).map(|f| f.node) {
            Some(StructureItem::Chapter(c)) => c.parent_folder_id.clone(),
            other => panic!("{id} is not a chapter: {other:?}"),
        }
    }

    /// Every chapter's parent link must equal its enclosing folder id.
    fn assert_links_agree(items: &[StructureItem], parent: Option<&str>) {
        for item in items {
            match item {
                StructureItem::Chapter(c) => {
                    assert_eq!(c.parent_folder_id.as_deref(), parent, "link of {}", c.id)
                }
                StructureItem::Folder(f) => assert_links_agree(&f.children, Some(&f.id)),
            }
        }
    }

    // A[c1, c2], B[c3], c4
    fn sample() -> Vec<StructureItem> {
        vec![
            folder("A", vec![chapter("c1", Some("A")), chapter("c2", Some("A"))]),
            folder("B", vec![chapter("c3", Some("B"))]),
            chapter("c4", None),
        ]
    }

    #[test]
    fn test_self_drop_is_noop() {
        let tree = sample();
        for id in ["A", "c1", "c4"] {
            assert_eq!(resolve_drop(&tree, id, id), tree);
        }
    }

    #[test]
    fn test_drop_onto_folder_appends_last() {
        let tree = sample();
        let next = resolve_drop(&tree, "c4", "A");
        assert_eq!(ids(children(&next, "A")), vec!["c1", "c2", "c4"]);
        assert_eq!(parent_link(&next, "c4").as_deref(), Some("A"));
        assert_eq!(ids(&next), vec!["A", "B"]);
        assert_links_agree(&next, None);
    }

    #[test]
    fn test_drop_onto_chapter_inserts_before_target() {
        let tree = sample();
        let next = resolve_drop(&tree, "c3", "c2");
        assert_eq!(ids(children(&next, "A")), vec!["c1", "c3", "c2"]);
        assert!(children(&next, "B").is_empty());
        assert_eq!(parent_link(&next, "c3").as_deref(), Some("A"));
        assert_links_agree(&next, None);
    }

    #[test]
    fn test_drop_onto_root_chapter_clears_link() {
        let tree = sample();
        let next = resolve_drop(&tree, "c1", "c4");
        assert_eq!(ids(&next), vec!["A", "B", "c1", "c4"]);
        assert_eq!(parent_link(&next, "c1"), None);
        assert_links_agree(&next, None);
    }

    #[test]
    fn test_reorder_within_same_container() {
        let tree = sample();
        // Moving c2 before c1 inside A.
        let next = resolve_drop(&tree, "c2", "c1");
        assert_eq!(ids(children(&next, "A")), vec!["c2", "c1"]);

        // Moving c1 down: target index is taken after detaching.
        let tree = vec![
            chapter("x", None),
            chapter("y", None),
            chapter("z", None),
        ];
        let next = resolve_drop(&tree, "x", "z");
        assert_eq!(ids(&next), vec!["y", "x", "z"]);
    }

    #[test]
    fn test_dragged_folder_keeps_subtree() {
        let tree = sample();
        let next = resolve_drop(&tree, "B", "A");
        assert_eq!(ids(children(&next, "A")), vec!["c1", "c2", "B"]);
        assert_eq!(ids(children(&next, "B")), vec!["c3"]);
        assert_eq!(parent_link(&next, "c3").as_deref(), Some("B"));

        let next = resolve_drop(&tree, "A", "c4");
        assert_eq!(ids(&next), vec!["B", "A", "c4"]);
        assert_links_agree(&next, None);
    }

    #[test]
    fn test_drop_folder_into_own_descendant_is_rejected() {
        let tree = vec![folder("A", vec![folder("B", vec![chapter("c1", Some("B"))])])];
        assert_eq!(resolve_drop(&tree, "A", "B"), tree);
        assert_eq!(resolve_drop(&tree, "A", "c1"), tree);
    }

    #[test]
    fn test_missing_target_falls_back_to_root() {
        let tree = vec![folder("A", vec![chapter("c1", Some("A"))])];
        let next = resolve_drop(&tree, "c1", "gone");
        assert_eq!(ids(&next), vec!["A", "c1"]);
        assert!(children(&next, "A").is_empty());
        assert_eq!(parent_link(&next, "c1"), None);
    }

    #[test]
    fn test_missing_dragged_is_noop() {
        let tree = sample();
        assert_eq!(resolve_drop(&tree, "ghost", "A"), tree);
    }

    #[test]
    fn test_ids_stay_unique_and_links_agree_over_sequences() {
        let mut tree = sample();
        tree = insert_folder(&tree, Some("B"), Folder::new("C", "C")).expect("insert");
        let moves = [
            ("c1", "C"),
            ("c4", "c3"),
            ("A", "C"),
            ("c2", "c4"),
            ("C", "c1"),
            ("c3", "A"),
            ("B", "c2"),
        ];
        for (dragged, target) in moves {
            tree = resolve_drop(&tree, dragged, target);
            assert!(validate(&tree).is_ok(), "duplicate after {dragged}->{target}");
            assert_links_agree(&tree, None);
        }
        for id in ["A", "B", "C", "c1", "c2", "c3", "c4"] {
            assert!(find(&tree, id).is_some(), "{id} lost");
        }
    }
}
