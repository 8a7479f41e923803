use crate::bridge::parse_structure_response;
use crate::models::{BackendRecord, ProjectStructure};
use crate::storage::TOKEN_KEY;
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    Unauthorized,
    Network,
    Http,
    Parse,
}

#[derive(Clone, Debug, thiserror::Error)]
#[error("{message}")]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self {
            kind: ApiErrorKind::Network,
            message: e.to_string(),
        }
    }

    pub(crate) fn parse(e: impl std::fmt::Display) -> Self {
        Self {
            kind: ApiErrorKind::Parse,
            message: e.to_string(),
        }
    }

    fn unauthorized() -> Self {
        Self {
            kind: ApiErrorKind::Unauthorized,
            message: "Unauthorized".to_string(),
        }
    }

    fn http(status: reqwest::StatusCode, body: String, ctx: &str) -> Self {
        Self {
            kind: ApiErrorKind::Http,
            message: format!("{ctx} ({status}): {body}"),
        }
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

const DEFAULT_API_URL: &str = "http://localhost:8000";
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct EnvConfig {
    pub api_url: String,
    pub log_level: String,
}

impl EnvConfig {
    /// Reads `window.ENV` (`API_URL` / `api_url`, `LOG_LEVEL` / `log_level`).
    pub fn new() -> Self {
        let mut cfg = Self::defaults();
        read_window_env(&mut cfg);
        cfg.api_url = cfg.api_url.trim_end_matches('/').to_string();
        cfg
    }

    fn defaults() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }

    pub fn log_filter(&self) -> log::LevelFilter {
        self.log_level
            .trim()
            .parse()
            .unwrap_or(log::LevelFilter::Info)
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
fn read_window_env(cfg: &mut EnvConfig) {
    let Some(env) = web_sys::window()
        .and_then(|w| w.get("ENV"))
        .filter(|env| !env.is_undefined() && env.is_object())
    else {
        return;
    };

    let read = |keys: &[&str]| {
        keys.iter().find_map(|k| {
            js_sys::Reflect::get(&env, &(*k).into())
                .ok()
                .and_then(|v| v.as_string())
        })
    };
    if let Some(url) = read(&["API_URL", "api_url"]) {
        cfg.api_url = url;
    }
    if let Some(level) = read(&["LOG_LEVEL", "log_level"]) {
        cfg.log_level = level;
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn read_window_env(_cfg: &mut EnvConfig) {}

#[derive(Clone, Debug)]
pub(crate) struct ApiClient {
    pub(crate) base_url: String,
    pub(crate) token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            token: None,
        }
    }

    pub fn load_from_storage() -> Self {
        let base_url = EnvConfig::new().api_url;
        let token = crate::storage::load_string(TOKEN_KEY);
        Self { base_url, token }
    }

    pub fn save_to_storage(&self) {
        if let Some(token) = &self.token {
            crate::storage::save_string(TOKEN_KEY, token);
        }
    }

    pub fn clear_storage() {
        crate::storage::remove_item(TOKEN_KEY);
    }

    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub fn get_auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {t}"))
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn logout(&mut self) {
        self.token = None;
        Self::clear_storage();
    }

    fn structure_path(project_id: &str) -> String {
        format!("/projects/{}/structure", urlencoding::encode(project_id))
    }

    fn chapter_path(project_id: &str, chapter_id: &str) -> String {
        format!(
            "/projects/{}/chapters/{}",
            urlencoding::encode(project_id),
            urlencoding::encode(chapter_id)
        )
    }

    async fn send_api(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&impl Serialize>,
    ) -> ApiResult<reqwest::Response> {
        let client = reqwest::Client::new();
        let url = format!("{}{}", self.base_url, path);
        let mut req = client.request(method, url);
        if let Some(auth) = self.get_auth_header() {
            req = req.header("Authorization", auth);
        }
        if let Some(b) = body {
            req = req.json(b);
        }

        let res = req.send().await.map_err(ApiError::network)?;

        if res.status().is_success() {
            Ok(res)
        } else if res.status() == reqwest::StatusCode::UNAUTHORIZED {
            Err(ApiError::unauthorized())
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::http(status, body, "Request failed"))
        }
    }

    async fn request_api<T: serde::de::DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&impl Serialize>,
    ) -> ApiResult<T> {
        let res = self.send_api(method, path, body).await?;
        res.json().await.map_err(ApiError::parse)
    }

    /// For endpoints whose response body carries nothing we need.
    async fn request_api_empty(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&impl Serialize>,
    ) -> ApiResult<()> {
        self.send_api(method, path, body).await.map(|_| ())
    }

    pub async fn get_project_structure(&self, project_id: &str) -> ApiResult<Vec<BackendRecord>> {
        let data: serde_json::Value = self
            .request_api(
                reqwest::Method::GET,
                &Self::structure_path(project_id),
                None::<&()>,
            )
            .await?;
        parse_structure_response(data)
    }

    pub async fn put_project_structure(
        &self,
        project_id: &str,
        records: &[BackendRecord],
    ) -> ApiResult<()> {
        let body = ProjectStructure {
            project_structure: records.to_vec(),
        };
        self.request_api_empty(
            reqwest::Method::PUT,
            &Self::structure_path(project_id),
            Some(&body),
        )
        .await
    }

    pub async fn delete_chapter(&self, project_id: &str, chapter_id: &str) -> ApiResult<()> {
        self.request_api_empty(
            reqwest::Method::DELETE,
            &Self::chapter_path(project_id, chapter_id),
            None::<&()>,
        )
        .await
    }
}
