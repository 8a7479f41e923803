pub(crate) const TOKEN_KEY: &str = "story_outliner_token";
pub(crate) const LAST_PROJECT_KEY: &str = "story_outliner_last_project";

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Option<web_sys::Storage> {
    web_sys::window().and_then(|w| w.local_storage().ok().flatten())
}

// No localStorage outside the browser; reads miss and writes are dropped.
#[cfg(not(target_arch = "wasm32"))]
fn local_storage() -> Option<NoStorage> {
    None
}

#[cfg(not(target_arch = "wasm32"))]
struct NoStorage;

#[cfg(not(target_arch = "wasm32"))]
impl NoStorage {
    fn get_item(&self, _key: &str) -> Result<Option<String>, ()> {
        Ok(None)
    }
    fn set_item(&self, _key: &str, _value: &str) -> Result<(), ()> {
        Ok(())
    }
    fn remove_item(&self, _key: &str) -> Result<(), ()> {
        Ok(())
    }
}

pub(crate) fn load_string(key: &str) -> Option<String> {
    local_storage()?
        .get_item(key)
        .ok()
        .flatten()
        .filter(|s| !s.trim().is_empty())
}

pub(crate) fn save_string(key: &str, value: &str) {
    if let Some(storage) = local_storage() {
        if storage.set_item(key, value).is_err() {
            log::warn!("localStorage write failed for {key}");
        }
    }
}

pub(crate) fn remove_item(key: &str) {
    if let Some(storage) = local_storage() {
        if storage.remove_item(key).is_err() {
            log::warn!("localStorage remove failed for {key}");
        }
    }
}

pub(crate) fn load_last_project() -> Option<String> {
    load_string(LAST_PROJECT_KEY)
}

pub(crate) fn write_last_project(project_id: &str) {
    if project_id.trim().is_empty() {
        return;
    }
    save_string(LAST_PROJECT_KEY, project_id.trim());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_is_inert_outside_browser() {
        save_string(TOKEN_KEY, "jwt");
        write_last_project("  p1  ");
        assert_eq!(load_string(TOKEN_KEY), None);
        assert_eq!(load_last_project(), None);
        remove_item(TOKEN_KEY);
        remove_item(LAST_PROJECT_KEY);
    }
}
