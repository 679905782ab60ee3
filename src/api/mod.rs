use crate::models::AppConfig;
use crate::services::{ExternalOpener, NoteService};
use futures::future::{FutureExt, LocalBoxFuture};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ApiErrorKind {
    Unauthorized,
    Network,
    Http,
    Parse,
}

#[derive(Clone, Debug)]
pub(crate) struct ApiError {
    pub kind: ApiErrorKind,
    pub message: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl ApiError {
    pub(crate) fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    fn network(e: reqwest::Error) -> Self {
        Self::new(ApiErrorKind::Network, e.to_string())
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self::new(ApiErrorKind::Parse, e.to_string())
    }

    fn unauthorized() -> Self {
        Self::new(ApiErrorKind::Unauthorized, "Unauthorized")
    }

    fn http(status: reqwest::StatusCode, body: String, ctx: &str) -> Self {
        Self::new(ApiErrorKind::Http, format!("{ctx} ({status}): {body}"))
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct EnvConfig {
    pub api_url: String,
}

impl EnvConfig {
    pub fn new() -> Self {
        let default_api_url = "http://localhost:6689".to_string();

        // `window.ENV.API_URL` first, `window.ENV.api_url` as a fallback.
        if let Some(window) = web_sys::window() {
            if let Some(env) = window.get("ENV") {
                if !env.is_undefined() && env.is_object() {
                    for key in ["API_URL", "api_url"] {
                        if let Ok(api_url) = js_sys::Reflect::get(&env, &key.into()) {
                            if let Some(url_str) = api_url.as_string() {
                                return Self { api_url: url_str };
                            }
                        }
                    }
                }
            }
        }

        Self {
            api_url: default_api_url,
        }
    }
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct SearchRequest {
    pub query: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct NoteRequest {
    #[serde(rename = "note-id")]
    pub note_id: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct OpenUrlRequest {
    pub url: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct OpenPathRequest {
    pub path: String,
}

/// Client for the backend RPC surface. Each call is a JSON POST to
/// `<base_url>/<command>`.
#[derive(Clone)]
pub(crate) struct ApiClient {
    pub(crate) base_url: String,
}

impl ApiClient {
    pub fn new(base_url: String) -> Self {
        Self { base_url }
    }

    pub fn from_env() -> Self {
        Self::new(EnvConfig::new().api_url)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn request_api<T: serde::de::DeserializeOwned>(
        url: String,
        body: &impl Serialize,
    ) -> ApiResult<T> {
        let client = reqwest::Client::new();
        let res = client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(ApiError::network)?;

        if res.status().is_success() {
            res.json().await.map_err(ApiError::parse)
        } else if res.status().as_u16() == 401 {
            Err(ApiError::unauthorized())
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::http(status, body, "Request failed"))
        }
    }

    /// Commands that answer with an empty object or `null`.
    async fn request_unit(url: String, body: &impl Serialize) -> ApiResult<()> {
        let _: serde_json::Value = Self::request_api(url, body).await?;
        Ok(())
    }

    pub(crate) fn parse_search_response(data: serde_json::Value) -> Vec<String> {
        let list = data
            .get("notes")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();

        list.into_iter()
            .filter_map(|item| match item {
                serde_json::Value::String(id) => Some(id),
                other => other.get("id").and_then(|v| v.as_str()).map(|s| s.to_string()),
            })
            .filter(|id| !id.trim().is_empty())
            .collect()
    }

    pub async fn get_config(&self) -> ApiResult<AppConfig> {
        Self::request_api(self.url("/config/get"), &serde_json::json!({})).await
    }
}

impl NoteService for ApiClient {
    fn search(&self, query: &str) -> LocalBoxFuture<'static, ApiResult<Vec<String>>> {
        let url = self.url("/notes/search");
        let req = SearchRequest {
            query: query.to_string(),
        };
        async move {
            let data: serde_json::Value = Self::request_api(url, &req).await?;
            Ok(Self::parse_search_response(data))
        }
        .boxed_local()
    }

    fn get_content(&self, note_id: &str) -> LocalBoxFuture<'static, ApiResult<String>> {
        let url = self.url("/notes/content");
        let req = NoteRequest {
            note_id: note_id.to_string(),
        };
        async move {
            let data: serde_json::Value = Self::request_api(url, &req).await?;
            data.get("content")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
                .ok_or_else(|| ApiError::parse("missing `content` in response"))
        }
        .boxed_local()
    }

    fn open_in_editor(&self, note_id: &str) -> LocalBoxFuture<'static, ApiResult<()>> {
        let url = self.url("/notes/open-in-editor");
        let req = NoteRequest {
            note_id: note_id.to_string(),
        };
        async move { Self::request_unit(url, &req).await }.boxed_local()
    }

    fn open_folder(&self, note_id: &str) -> LocalBoxFuture<'static, ApiResult<()>> {
        let url = self.url("/notes/open-folder");
        let req = NoteRequest {
            note_id: note_id.to_string(),
        };
        async move { Self::request_unit(url, &req).await }.boxed_local()
    }
}

impl ExternalOpener for ApiClient {
    fn open_url(&self, url: &str) -> LocalBoxFuture<'static, ApiResult<()>> {
        let endpoint = self.url("/system/open-url");
        let req = OpenUrlRequest {
            url: url.to_string(),
        };
        async move { Self::request_unit(endpoint, &req).await }.boxed_local()
    }

    fn open_path(&self, path: &str) -> LocalBoxFuture<'static, ApiResult<()>> {
        let endpoint = self.url("/system/open-path");
        let req = OpenPathRequest {
            path: path.to_string(),
        };
        async move { Self::request_unit(endpoint, &req).await }.boxed_local()
    }
}
