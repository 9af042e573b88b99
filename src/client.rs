use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::{Certificate, Client, Method};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ResourceError {
    /// The server answered with a non-2xx status.
    #[error("HTTP {status} from {url}: {body}")]
    Http {
        status: u16,
        url: String,
        body: String,
    },

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to decode response JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Unable to use CA bundle {}: {message}", .path.display())]
    Certificate { path: PathBuf, message: String },

    #[error("Base URL cannot be empty")]
    EmptyBaseUrl,
}

impl ResourceError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ResourceError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Connection details for a [`ResourceClient`].
#[derive(Debug, Clone)]
pub struct ResourceSettings {
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub ca_bundle: Option<PathBuf>,
    pub timeout_secs: u64,
}

impl ResourceSettings {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
            ca_bundle: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Query parameters, JSON body and extra headers for one request.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// HTTP client that sends basic-auth credentials with every request and
/// decodes JSON responses.
#[derive(Debug, Clone)]
pub struct ResourceClient {
    http: Client,
    base_url: String,
    username: String,
    password: String,
    user_agent: String,
}

impl ResourceClient {
    pub fn new(settings: &ResourceSettings) -> Result<Self, ResourceError> {
        let base_url = settings.base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ResourceError::EmptyBaseUrl);
        }

        let mut builder = Client::builder().timeout(Duration::from_secs(settings.timeout_secs));
        if let Some(bundle) = &settings.ca_bundle {
            builder = builder.add_root_certificate(load_certificate(bundle)?);
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            base_url,
            username: settings.username.clone(),
            password: settings.password.clone(),
            user_agent: format!("crutool/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub async fn get(&self, path: &str, options: RequestOptions) -> Result<Value, ResourceError> {
        self.request(Method::GET, path, options).await
    }

    pub async fn post(&self, path: &str, options: RequestOptions) -> Result<Value, ResourceError> {
        self.request(Method::POST, path, options).await
    }

    pub async fn request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<Value, ResourceError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(method = %method, url = %url, "sending request");

        let mut req_builder = self
            .http
            .request(method.clone(), &url)
            .basic_auth(&self.username, Some(&self.password))
            .header("User-Agent", &self.user_agent)
            .header("Accept", "application/json");

        if !options.query.is_empty() {
            req_builder = req_builder.query(&options.query);
        }
        for (name, value) in &options.headers {
            req_builder = req_builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &options.body {
            req_builder = req_builder.json(body);
        }

        let response = req_builder.send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!(method = %method, url = %url, status = status.as_u16(), "received response");

        if !status.is_success() {
            warn!(url = %url, status = status.as_u16(), "request failed");
            return Err(ResourceError::Http {
                status: status.as_u16(),
                url,
                body: text,
            });
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }

        Ok(serde_json::from_str(&text)?)
    }
}

fn load_certificate(path: &Path) -> Result<Certificate, ResourceError> {
    let pem = std::fs::read(path).map_err(|err| ResourceError::Certificate {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;
    Certificate::from_pem(&pem).map_err(|err| ResourceError::Certificate {
        path: path.to_path_buf(),
        message: err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer) -> ResourceClient {
        let settings = ResourceSettings::new(format!("{}/", server.base_url()), "alice", "s3cret");
        ResourceClient::new(&settings).unwrap()
    }

    #[tokio::test]
    async fn get_sends_basic_auth_and_decodes_json() {
        let server = MockServer::start_async().await;

        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/things")
                    .query_param("q", "1")
                    .header("Authorization", "Basic YWxpY2U6czNjcmV0")
                    .header("X-Extra", "yes");
                then.status(200)
                    .header("Content-Type", "application/json")
                    .json_body(json!({"ok": true}));
            })
            .await;

        let client = client_for(&server);
        let value = client
            .get(
                "/things",
                RequestOptions {
                    headers: vec![("X-Extra".to_string(), "yes".to_string())],
                    ..RequestOptions::new().query("q", "1")
                },
            )
            .await
            .unwrap();

        assert_eq!(value, json!({"ok": true}));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn post_sends_json_body_and_accepts_empty_response() {
        let server = MockServer::start_async().await;

        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/things")
                    .json_body(json!({"name": "widget"}));
                then.status(204);
            })
            .await;

        let client = client_for(&server);
        let value = client
            .post("/things", RequestOptions::new().body(json!({"name": "widget"})))
            .await
            .unwrap();

        assert_eq!(value, Value::Null);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_an_http_error() {
        let server = MockServer::start_async().await;

        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/missing");
                then.status(404).body("nope");
            })
            .await;

        let client = client_for(&server);
        let err = client
            .get("/missing", RequestOptions::new())
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(404));
        assert!(err.to_string().contains("nope"));
        mock.assert_async().await;
    }

    #[test]
    fn rejects_empty_base_url() {
        let settings = ResourceSettings::new("/", "alice", "pw");
        assert!(matches!(
            ResourceClient::new(&settings),
            Err(ResourceError::EmptyBaseUrl)
        ));
    }

    #[test]
    fn reports_unreadable_ca_bundle() {
        let mut settings = ResourceSettings::new("https://jira.example.com", "alice", "pw");
        settings.ca_bundle = Some(PathBuf::from("/definitely/not/here.pem"));
        assert!(matches!(
            ResourceClient::new(&settings),
            Err(ResourceError::Certificate { .. })
        ));
    }
}
