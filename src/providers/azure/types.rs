use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Envelope Azure DevOps wraps around every list response.
#[derive(Debug, Deserialize)]
pub struct ListResponse<T> {
    pub value: Vec<T>,
}

/// A pipeline definition as returned by `_apis/pipelines`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzurePipeline {
    pub id: u64,
    pub name: String,
    /// REST URL of the pipeline resource
    #[serde(default)]
    pub url: Option<String>,
    #[serde(rename = "_links", default)]
    pub links: Option<PipelineLinks>,
}

impl AzurePipeline {
    /// Web link when present, otherwise the REST URL.
    pub fn web_url(&self) -> Option<String> {
        self.links
            .as_ref()
            .and_then(|links| links.web.as_ref())
            .map(|link| link.href.clone())
            .or_else(|| self.url.clone())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineLinks {
    #[serde(default)]
    pub web: Option<Link>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
}

/// A single build (pipeline run) from `_apis/build/builds`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AzureBuild {
    pub id: u64,
    #[serde(default)]
    pub result: Option<BuildResult>,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    /// Absent while the build is still running
    #[serde(default)]
    pub finish_time: Option<DateTime<Utc>>,
    pub definition: DefinitionReference,
}

impl AzureBuild {
    pub fn is_finished(&self) -> bool {
        self.finish_time.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefinitionReference {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BuildResult {
    Succeeded,
    Failed,
    Canceled,
    /// `partiallySucceeded`, `none` and anything newer
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureProject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WiqlRequest {
    pub query: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WiqlResponse {
    #[serde(default)]
    pub work_items: Vec<WorkItemReference>,
}

#[derive(Debug, Deserialize)]
pub struct WorkItemReference {
    pub id: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AzureWorkItem {
    pub id: u64,
    #[serde(default)]
    pub fields: HashMap<String, serde_json::Value>,
}
