use log::debug;

use super::core::{AzureDevOpsClient, Page, PAGE_SIZE};
use crate::error::Result;
use crate::providers::azure::types::{AzureBuild, ListResponse};

impl AzureDevOpsClient {
    /// Fetches the most recent builds of the given pipeline definitions,
    /// newest first, up to `limit` builds.
    pub async fn list_builds(
        &self,
        project: &str,
        definition_ids: &[u64],
        limit: usize,
    ) -> Result<Vec<AzureBuild>> {
        if definition_ids.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }

        let definitions = definition_ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");

        let mut all_builds = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let remaining = limit.saturating_sub(all_builds.len());
            if remaining == 0 {
                break;
            }

            let mut url = self.api_url(Some(project), &["build", "builds"])?;
            {
                let mut query = url.query_pairs_mut();
                query
                    .append_pair("definitions", &definitions)
                    .append_pair("queryOrder", "queueTimeDescending")
                    .append_pair("$top", &remaining.min(PAGE_SIZE).to_string());
                if let Some(token) = &continuation {
                    query.append_pair("continuationToken", token);
                }
            }

            let page: Page<ListResponse<AzureBuild>> = self.get(url).await?;
            all_builds.extend(page.body.value);

            match page.continuation_token {
                Some(next) if continuation.as_deref() != Some(next.as_str()) => {
                    continuation = Some(next);
                }
                _ => break,
            }
        }

        all_builds.truncate(limit);

        debug!(
            "Fetched {} builds for {} pipelines in {project}",
            all_builds.len(),
            definition_ids.len()
        );

        Ok(all_builds)
    }
}
