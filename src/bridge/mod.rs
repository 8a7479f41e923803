//! Conversion between the in-memory outline and the backend structure records.

use crate::api::{ApiError, ApiResult};
use crate::models::{BackendRecord, ChapterRecord, ChapterRef, Folder, FolderRecord, StructureItem};
use crate::outline::tree::{folder_mut, relink_parents, validate};
use std::collections::HashSet;

pub(crate) fn to_backend_format(tree: &[StructureItem]) -> Vec<BackendRecord> {
    tree.iter().map(to_record).collect()
}

fn to_record(item: &StructureItem) -> BackendRecord {
    match item {
        StructureItem::Folder(f) => BackendRecord::Folder(FolderRecord {
            id: f.id.clone(),
            name: f.title.clone(),
            title: f.title.clone(),
            description: f.description.clone(),
            children: to_backend_format(&f.children),
        }),
        StructureItem::Chapter(c) => BackendRecord::Chapter(ChapterRecord {
            id: c.id.clone(),
            title: c.title.clone(),
            name: c.title.clone(),
            parent_folder_id: None,
        }),
    }
}

/// Builds the outline from backend records.
///
/// A chapter that declares a parent folder other than the one it is nested in
/// is moved under the declared folder; if that folder is not in the payload the
/// chapter lands at root.
pub(crate) fn from_backend_format(records: &[BackendRecord]) -> Vec<StructureItem> {
    let mut folder_ids = HashSet::new();
    let mut relocate = Vec::new();
    let mut tree = convert(records, None, &mut folder_ids, &mut relocate);

    for (chapter, declared) in relocate {
        if folder_ids.contains(declared.as_str()) {
            if let Some(folder) = folder_mut(&mut tree, &declared) {
                folder.children.push(StructureItem::Chapter(chapter));
                continue;
            }
        }
        log::warn!(
            "chapter {} declares unknown parent folder {declared}, placing at root",
            chapter.id
        );
        tree.push(StructureItem::Chapter(chapter));
    }

    relink_parents(&mut tree);
    if let Err(e) = validate(&tree) {
        log::error!("backend structure violates id uniqueness: {e}");
    }
    tree
}

fn convert(
    records: &[BackendRecord],
    container: Option<&str>,
    folder_ids: &mut HashSet<String>,
    relocate: &mut Vec<(ChapterRef, String)>,
) -> Vec<StructureItem> {
    let mut out = Vec::with_capacity(records.len());
    for rec in records {
        match rec {
            BackendRecord::Folder(f) => {
                folder_ids.insert(f.id.clone());
                let children = convert(&f.children, Some(&f.id), folder_ids, relocate);
                out.push(StructureItem::Folder(Folder {
                    id: f.id.clone(),
                    title: f.label().to_string(),
                    description: f.description.clone(),
                    children,
                }));
            }
            BackendRecord::Chapter(c) => {
                let chapter = ChapterRef::new(c.id.clone(), c.label());
                match c.parent_folder_id.as_deref().filter(|p| !p.trim().is_empty()) {
                    Some(declared) if Some(declared) != container => {
                        relocate.push((chapter, declared.to_string()));
                    }
                    _ => out.push(StructureItem::Chapter(chapter)),
                }
            }
        }
    }
    out
}

/// Decodes the `GET .../structure` body.
///
/// A body without a `project_structure` array is an error, never an empty
/// outline. Each entry is read with the typed schema first; entries that fail
/// are read field by field (numeric ids, missing title). An entry that is still
/// unusable is skipped, but its readable children are kept one level up.
pub(crate) fn parse_structure_response(data: serde_json::Value) -> ApiResult<Vec<BackendRecord>> {
    let Some(list) = data.get("project_structure").and_then(|v| v.as_array()) else {
        return Err(ApiError::parse(
            "structure response has no project_structure list",
        ));
    };

    Ok(parse_record_list(list.clone()))
}

fn parse_record_list(list: Vec<serde_json::Value>) -> Vec<BackendRecord> {
    let mut out = Vec::with_capacity(list.len());
    for item in list {
        if let Ok(rec) = serde_json::from_value::<BackendRecord>(item.clone()) {
            out.push(rec);
            continue;
        }
        if let Some(rec) = parse_record_loose(&item) {
            out.push(rec);
            continue;
        }

        let orphans = item
            .get("children")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();
        if orphans.is_empty() {
            log::warn!("skipping unreadable structure record: {item}");
        } else {
            log::warn!(
                "unreadable structure record, keeping its {} children: {item}",
                orphans.len()
            );
            out.extend(parse_record_list(orphans));
        }
    }
    out
}

fn parse_record_loose(item: &serde_json::Value) -> Option<BackendRecord> {
    let get_s = |k: &str| -> Option<String> {
        match item.get(k)? {
            serde_json::Value::String(s) => Some(s.clone()),
            serde_json::Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    };

    let id = get_s("id").filter(|s| !s.trim().is_empty())?;
    let name = get_s("name").unwrap_or_default();
    let title = get_s("title").unwrap_or_default();

    match item.get("type").and_then(|v| v.as_str())? {
        "folder" => {
            let children = item
                .get("children")
                .and_then(|v| v.as_array())
                .cloned()
                .unwrap_or_default();
            Some(BackendRecord::Folder(FolderRecord {
                id,
                name,
                title,
                description: get_s("description").unwrap_or_default(),
                children: parse_record_list(children),
            }))
        }
        "chapter" => Some(BackendRecord::Chapter(ChapterRecord {
            id,
            title,
            name,
            parent_folder_id: get_s("parent_folder_id").or_else(|| get_s("parentFolderId")),
        })),
        _ => None,
    }
}
