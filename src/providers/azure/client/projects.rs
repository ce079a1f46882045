use super::core::{AzureDevOpsClient, Page, PAGE_SIZE};
use crate::error::Result;
use crate::providers::azure::types::{AzureProject, ListResponse};

impl AzureDevOpsClient {
    /// Lists every project in the organization visible to the token.
    pub async fn list_projects(&self) -> Result<Vec<AzureProject>> {
        let mut all_projects = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let mut url = self.api_url(None, &["projects"])?;
            {
                let mut query = url.query_pairs_mut();
                query.append_pair("$top", &PAGE_SIZE.to_string());
                if let Some(token) = &continuation {
                    query.append_pair("continuationToken", token);
                }
            }

            let page: Page<ListResponse<AzureProject>> = self.get(url).await?;
            all_projects.extend(page.body.value);

            match page.continuation_token {
                Some(next) if continuation.as_deref() != Some(next.as_str()) => {
                    continuation = Some(next);
                }
                _ => break,
            }
        }

        Ok(all_projects)
    }
}
