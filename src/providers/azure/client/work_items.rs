use log::debug;

use super::core::{AzureDevOpsClient, Page};
use crate::error::Result;
use crate::providers::azure::types::{
    AzureWorkItem, ListResponse, WiqlRequest, WiqlResponse,
};

/// The work items endpoint accepts at most 200 ids per call.
const WORK_ITEM_BATCH_SIZE: usize = 200;

impl AzureDevOpsClient {
    /// Runs a WIQL query scoped to `project` and returns the matching ids.
    pub async fn query_work_item_ids(&self, project: &str, wiql: &str) -> Result<Vec<u64>> {
        let url = self.api_url(Some(project), &["wit", "wiql"])?;
        let request = WiqlRequest {
            query: wiql.to_string(),
        };

        let page: Page<WiqlResponse> = self.post(url, &request).await?;
        let ids: Vec<u64> = page.body.work_items.into_iter().map(|item| item.id).collect();

        debug!("WIQL matched {} work items in {project}", ids.len());

        Ok(ids)
    }

    /// Fetches `fields` for the given work items, in batches. Ids that no
    /// longer resolve (deleted or inaccessible) are dropped.
    pub async fn get_work_items(&self, ids: &[u64], fields: &[&str]) -> Result<Vec<AzureWorkItem>> {
        let mut all_items = Vec::with_capacity(ids.len());

        for batch in ids.chunks(WORK_ITEM_BATCH_SIZE) {
            let mut url = self.api_url(None, &["wit", "workitems"])?;
            url.query_pairs_mut()
                .append_pair(
                    "ids",
                    &batch
                        .iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join(","),
                )
                .append_pair("fields", &fields.join(","))
                .append_pair("errorPolicy", "omit");

            let page: Page<ListResponse<Option<AzureWorkItem>>> = self.get(url).await?;
            all_items.extend(page.body.value.into_iter().flatten());
        }

        Ok(all_items)
    }
}
