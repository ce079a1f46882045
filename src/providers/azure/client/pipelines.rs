use log::debug;

use super::core::{AzureDevOpsClient, Page, PAGE_SIZE};
use crate::error::Result;
use crate::providers::azure::types::{AzurePipeline, ListResponse};

impl AzureDevOpsClient {
    /// Lists every pipeline defined in `project`, following continuation tokens.
    pub async fn list_pipelines(&self, project: &str) -> Result<Vec<AzurePipeline>> {
        let mut all_pipelines = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let mut url = self.api_url(Some(project), &["pipelines"])?;
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("$top", &PAGE_SIZE.to_string());
                if let Some(token) = &continuation {
                    query.append_pair("continuationToken", token);
                }
            }

            let page: Page<ListResponse<AzurePipeline>> = self.get(url).await?;
            all_pipelines.extend(page.body.value);

            match page.continuation_token {
                Some(next) if continuation.as_deref() != Some(next.as_str()) => {
                    continuation = Some(next);
                }
                _ => break,
            }
        }

        debug!("Listed {} pipelines in {project}", all_pipelines.len());

        Ok(all_pipelines)
    }
}
