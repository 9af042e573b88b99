//! JIRA REST endpoints layered on top of [`ResourceClient`].

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::client::{
    DEFAULT_TIMEOUT_SECS, RequestOptions, ResourceClient, ResourceError, ResourceSettings,
};
use crate::config::ConfigStore;

pub const JIRA_SECTION: &str = "jira";

/// Issue-tracker operations the command layer relies on.
#[async_trait]
pub trait IssueTracker: Send + Sync {
    async fn get_transitions(&self, issue: &str) -> Result<Value, ResourceError>;

    async fn transition_issue(
        &self,
        issue: &str,
        transition_id: &str,
        fields: Option<Value>,
        update: Option<Value>,
    ) -> Result<(), ResourceError>;

    async fn issue_info(&self, issue: &str) -> Result<Value, ResourceError>;

    /// Open issues assigned to the current user, highest priority first.
    ///
    /// Only the first issue is replaced by its full record unless
    /// `expand_all` is set; the rest stay as search summaries.
    async fn dashboard(&self, expand_all: bool) -> Result<Value, ResourceError>;
}

pub type DynIssueTracker = dyn IssueTracker;

#[derive(Debug, Clone)]
pub struct JiraClient {
    resource: ResourceClient,
}

impl JiraClient {
    pub fn new(settings: &ResourceSettings) -> Result<Self, ResourceError> {
        Ok(Self {
            resource: ResourceClient::new(settings)?,
        })
    }

    /// Builds a client from the `[jira]` section: `url`, `user` and
    /// `password` are required, `ca_certs` and `timeout_secs` optional.
    pub fn from_store(store: &ConfigStore) -> Result<Self> {
        let mut settings = ResourceSettings::new(
            store.require(JIRA_SECTION, "url")?,
            store.require(JIRA_SECTION, "user")?,
            store.require(JIRA_SECTION, "password")?,
        );

        settings.ca_bundle = store
            .get(JIRA_SECTION, "ca_certs")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        settings.timeout_secs = match store.get(JIRA_SECTION, "timeout_secs") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("Failed to parse [jira] timeout_secs value '{raw}'"))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Self::new(&settings).context("Failed to build JIRA client")
    }

    pub fn username(&self) -> &str {
        self.resource.username()
    }

    async fn get(&self, path: &str, options: RequestOptions) -> Result<Value, ResourceError> {
        self.resource.get(path, with_basic_auth_type(options)).await
    }

    async fn post(&self, path: &str, options: RequestOptions) -> Result<Value, ResourceError> {
        self.resource.post(path, with_basic_auth_type(options)).await
    }
}

fn with_basic_auth_type(options: RequestOptions) -> RequestOptions {
    options.query("os_authType", "basic")
}

pub fn transition_body(transition_id: &str, fields: Option<Value>, update: Option<Value>) -> Value {
    let mut body = Map::new();
    body.insert("transition".to_string(), json!({ "id": transition_id }));

    if let Some(fields) = fields.filter(is_present) {
        body.insert("fields".to_string(), fields);
    }
    if let Some(update) = update.filter(is_present) {
        body.insert("update".to_string(), update);
    }

    Value::Object(body)
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

#[async_trait]
impl IssueTracker for JiraClient {
    async fn get_transitions(&self, issue: &str) -> Result<Value, ResourceError> {
        self.get(&format!("/issue/{issue}/transitions"), RequestOptions::new())
            .await
    }

    async fn transition_issue(
        &self,
        issue: &str,
        transition_id: &str,
        fields: Option<Value>,
        update: Option<Value>,
    ) -> Result<(), ResourceError> {
        let body = transition_body(transition_id, fields, update);
        self.post(
            &format!("/issue/{issue}/transitions"),
            RequestOptions::new().body(body),
        )
        .await?;
        Ok(())
    }

    async fn issue_info(&self, issue: &str) -> Result<Value, ResourceError> {
        self.get(&format!("/issue/{issue}"), RequestOptions::new())
            .await
    }

    async fn dashboard(&self, expand_all: bool) -> Result<Value, ResourceError> {
        let jql = format!(
            "assignee={} and status=open order by priority",
            self.username()
        );
        let mut results = self
            .get("/search", RequestOptions::new().query("jql", jql))
            .await?;

        let Some(issues) = results.get_mut("issues").and_then(Value::as_array_mut) else {
            return Ok(results);
        };

        for slot in issues.iter_mut() {
            // A hit without a key is left as the search returned it.
            if let Some(key) = slot.get("key").and_then(Value::as_str).map(str::to_string) {
                debug!(issue = %key, "expanding dashboard issue");
                *slot = self.issue_info(&key).await?;
            }
            if !expand_all {
                break;
            }
        }

        Ok(results)
    }
}

/// Placeholder values for issue templates, taken from a search summary or a
/// full issue record.
pub fn issue_template_data(issue: &Value) -> HashMap<&'static str, String> {
    let fields = &issue["fields"];
    HashMap::from([
        ("key", text(&issue["key"])),
        ("summary", text(&fields["summary"])),
        ("status", text(&fields["status"]["name"])),
        ("priority", text(&fields["priority"]["name"])),
        ("assignee", text(&fields["assignee"]["displayName"])),
        ("type", text(&fields["issuetype"]["name"])),
    ])
}

pub fn transition_template_data(transition: &Value) -> HashMap<&'static str, String> {
    HashMap::from([
        ("id", text(&transition["id"])),
        ("name", text(&transition["name"])),
        ("to", text(&transition["to"]["name"])),
    ])
}

fn text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
