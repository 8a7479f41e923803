use serde::{Deserialize, Serialize};

/// A node of the story outline: either a folder (act, stage, part...) or a
/// reference to a manuscript chapter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum StructureItem {
    Folder(Folder),
    Chapter(ChapterRef),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Folder {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Display order is exactly the order of this vector.
    pub children: Vec<StructureItem>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ChapterRef {
    pub id: String,
    pub title: String,
    /// Derived from containment. `None` iff the chapter sits at the tree root.
    pub parent_folder_id: Option<String>,
}

impl StructureItem {
    pub fn id(&self) -> &str {
        match self {
            StructureItem::Folder(f) => &f.id,
            StructureItem::Chapter(c) => &c.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            StructureItem::Folder(f) => &f.title,
            StructureItem::Chapter(c) => &c.title,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, StructureItem::Folder(_))
    }

    pub fn as_folder(&self) -> Option<&Folder> {
        match self {
            StructureItem::Folder(f) => Some(f),
            StructureItem::Chapter(_) => None,
        }
    }
}

impl Folder {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<StructureItem>) -> Self {
        self.children = children;
        self
    }
}

impl ChapterRef {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            parent_folder_id: None,
        }
    }
}

impl From<Folder> for StructureItem {
    fn from(f: Folder) -> Self {
        StructureItem::Folder(f)
    }
}

impl From<ChapterRef> for StructureItem {
    fn from(c: ChapterRef) -> Self {
        StructureItem::Chapter(c)
    }
}

/// Backend structure record, discriminated by the `type` field.
///
/// The backend duplicates the display label in both `name` and `title`; both are
/// written verbatim on save.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub(crate) enum BackendRecord {
    Folder(FolderRecord),
    Chapter(ChapterRecord),
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct FolderRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub children: Vec<BackendRecord>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct ChapterRecord {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub name: String,

    /// Parent declared by the backend. Read-only: never written on save.
    #[serde(
        default,
        alias = "parentFolderId",
        skip_serializing_if = "Option::is_none"
    )]
    pub parent_folder_id: Option<String>,
}

impl FolderRecord {
    /// Display label, preferring `title` and falling back to `name`.
    pub fn label(&self) -> &str {
        if self.title.trim().is_empty() {
            &self.name
        } else {
            &self.title
        }
    }
}

impl ChapterRecord {
    pub fn label(&self) -> &str {
        if self.title.trim().is_empty() {
            &self.name
        } else {
            &self.title
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct ProjectStructure {
    pub project_structure: Vec<BackendRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chapter_record_serializes_without_parent() {
        let rec = BackendRecord::Chapter(ChapterRecord {
            id: "c1".to_string(),
            title: "Ch1".to_string(),
            name: "Ch1".to_string(),
            parent_folder_id: None,
        });
        let v = serde_json::to_value(&rec).expect("should serialize");
        assert_eq!(
            v,
            serde_json::json!({"id": "c1", "type": "chapter", "title": "Ch1", "name": "Ch1"})
        );
    }

    #[test]
    fn test_chapter_record_accepts_camel_case_parent() {
        let json = r#"{"id": "c1", "type": "chapter", "title": "Ch1", "name": "Ch1", "parentFolderId": "A"}"#;
        let rec: BackendRecord = serde_json::from_str(json).expect("should parse");
        match rec {
            BackendRecord::Chapter(c) => assert_eq!(c.parent_folder_id.as_deref(), Some("A")),
            other => panic!("expected chapter, got {other:?}"),
        }
    }

    #[test]
    fn test_folder_record_defaults_missing_children() {
        let json = r#"{"id": "A", "type": "folder", "name": "Act I"}"#;
        let rec: BackendRecord = serde_json::from_str(json).expect("should parse");
        let BackendRecord::Folder(f) = rec else {
            panic!("expected folder");
        };
        assert!(f.children.is_empty());
        assert_eq!(f.description, "");
        assert_eq!(f.label(), "Act I");
    }

    #[test]
    fn test_item_accessors() {
        let item: StructureItem = Folder::new("A", "Act I").into();
        assert_eq!(item.id(), "A");
        assert_eq!(item.title(), "Act I");
        assert!(item.is_folder());
        assert!(item.as_folder().is_some());

        let ch: StructureItem = ChapterRef::new("c1", "Opening").into();
        assert!(!ch.is_folder());
        assert!(ch.as_folder().is_none());
    }
}
