mod api;
mod app;
mod bridge;
mod components;
mod editor;
mod logging;
mod models;
mod outline;
mod pages;
mod state;
mod storage;
mod util;

use crate::api::EnvConfig;
use crate::app::App;
use leptos::prelude::*;

// Needed for `#[wasm_bindgen(start)]` on the wasm entrypoint.
#[cfg(all(target_arch = "wasm32", not(test)))]
use wasm_bindgen::prelude::wasm_bindgen;


// Only register the WASM start function for normal builds (not for tests),
// otherwise wasm-bindgen-test will end up with multiple entry symbols.
#[cfg_attr(all(target_arch = "wasm32", not(test)), wasm_bindgen(start))]
pub fn main() {
    console_error_panic_hook::set_once();
    logging::init(EnvConfig::new().log_filter());
    log::info!("story outliner starting");
    mount_to_body(App);
}

#[cfg(test)]
mod tests {
    use crate::bridge::{from_backend_format, parse_structure_response, to_backend_format};
    use crate::models::ProjectStructure;
    use crate::outline::{delete, find};

    // Body of `GET /projects/{id}/structure`, as the backend sends it.
    fn sample_response() -> serde_json::Value {
        serde_json::json!({
            "project_structure": [
                {
                    "id": "act-1",
                    "name": "Act I",
                    "title": "Act I",
                    "type": "folder",
                    "description": "Setup",
                    "children": [
                        {"id": "ch-1", "type": "chapter", "title": "Opening", "name": "Opening"},
                        {
                            "id": "stage-1",
                            "name": "Inciting incident",
                            "title": "Inciting incident",
                            "type": "folder",
                            "description": "",
                            "children": [
                                {"id": "ch-2", "type": "chapter", "title": "The letter", "name": "The letter"}
                            ]
                        }
                    ]
                },
                {"id": "ch-3", "type": "chapter", "title": "Interlude", "name": "Interlude"}
            ]
        })
    }

    #[test]
    fn test_structure_response_contract() {
        let records = parse_structure_response(sample_response()).expect("sample has a list");
        let tree = from_backend_format(&records);

        let found = find(&tree, "ch-2").expect("nested chapter");
        assert_eq!(found.parent.folder_id(), Some("stage-1"));
        assert!(find(&tree, "ch-3")
            .map(|f| f.parent.folder_id().is_none())
            .unwrap_or(false));
    }

    #[test]
    fn test_put_body_matches_fetched_body() {
        let original = sample_response();
        let tree = from_backend_format(&parse_structure_response(original.clone()).expect("sample has a list"));
        let body = ProjectStructure {
            project_structure: to_backend_format(&tree),
        };
        let v = serde_json::to_value(body).expect("should serialize");
        assert_eq!(v, original);
    }

    #[test]
    fn test_delete_act_collects_all_chapters() {
        let tree = from_backend_format(&parse_structure_response(sample_response()).expect("sample has a list"));
        let removal = delete(&tree, "act-1");
        assert_eq!(removal.chapter_ids, vec!["ch-1", "ch-2"]);
        assert!(find(&removal.tree, "act-1").is_none());
        assert!(find(&removal.tree, "ch-2").is_none());
        assert_eq!(removal.tree.len(), 1);
    }
}
