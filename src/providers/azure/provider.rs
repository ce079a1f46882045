use chrono::{DateTime, TimeZone, Utc};
use futures::future::try_join_all;
use log::{info, warn};

use crate::auth::Token;
use crate::error::{AdoLensError, Result};
use crate::output::PhaseProgress;
use crate::overview::{
    BusinessValueReport, Currency, Period, PipelineOverview, PipelineOverviewReport,
};

use super::business_value::{
    build_wiql, period_start, sum_business_value, BusinessValueTotal, BUSINESS_VALUE_FIELD,
    CREATED_DATE_FIELD,
};
use super::client::AzureDevOpsClient;
use super::pipeline_stats::{merge_projects, summarize_project};
use super::types::AzureProject;

/// Which projects an overview spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectScope {
    /// Single-project mode: only the current project
    Current(String),
    /// Multi-project mode over an explicit selection
    Selected(Vec<String>),
    /// Multi-project mode over every project in the organization
    All,
}

/// Parameters of a business value lookup.
#[derive(Debug, Clone)]
pub struct BusinessValueQuery {
    pub project: String,
    pub work_item_type: String,
    pub period: Period,
    pub currency: Currency,
    pub target_value: Option<f64>,
}

/// Azure DevOps pipeline overview and business value provider.
///
/// Lists pipelines and builds through the REST API and reduces them to
/// per-pipeline statistics; sums work item business value over a period.
pub struct AzureDevOpsProvider {
    pub client: AzureDevOpsClient,
    pub organization: String,
}

impl AzureDevOpsProvider {
    /// Creates a provider for the organization at `organization_url`
    /// (e.g. <https://dev.azure.com/fabrikam>).
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not a valid http(s) URL.
    pub fn new(organization_url: &str, token: Option<Token>) -> Result<Self> {
        let client = AzureDevOpsClient::new(organization_url, token)?;
        let organization = client.organization();

        Ok(Self {
            client,
            organization,
        })
    }

    pub async fn list_projects(&self) -> Result<Vec<AzureProject>> {
        info!("Listing projects in {}", self.organization);
        self.client.list_projects().await
    }

    /// Expands a scope to concrete project names, dropping duplicates while
    /// keeping the first-seen order.
    pub async fn resolve_projects(&self, scope: &ProjectScope) -> Result<Vec<String>> {
        let candidates = match scope {
            ProjectScope::Current(project) => vec![project.clone()],
            ProjectScope::Selected(projects) => {
                if projects.is_empty() {
                    return Err(AdoLensError::Config(
                        "No projects selected for a multi-project overview".to_string(),
                    ));
                }
                projects.clone()
            }
            ProjectScope::All => self
                .list_projects()
                .await?
                .into_iter()
                .map(|project| project.name)
                .collect(),
        };

        let mut projects: Vec<String> = Vec::with_capacity(candidates.len());
        for project in candidates {
            if !projects.contains(&project) {
                projects.push(project);
            }
        }

        Ok(projects)
    }

    /// Builds the overview of one project. Builds are only requested when the
    /// project has at least one pipeline.
    pub async fn fetch_project_overview(
        &self,
        project: &str,
        show_as_percentage: bool,
        limit: usize,
    ) -> Result<Vec<PipelineOverview>> {
        let pipelines = self.client.list_pipelines(project).await?;

        if pipelines.is_empty() {
            warn!("No pipelines found in project: {project}");
            return Ok(Vec::new());
        }

        let definition_ids: Vec<u64> = pipelines.iter().map(|p| p.id).collect();
        let builds = self
            .client
            .list_builds(project, &definition_ids, limit)
            .await?;

        info!(
            "Project {project}: {} pipelines, {} builds",
            pipelines.len(),
            builds.len()
        );

        Ok(summarize_project(
            project,
            &pipelines,
            &builds,
            show_as_percentage,
        ))
    }

    /// Collects the pipeline overview across every project in `scope`.
    ///
    /// Projects are fetched concurrently; results are concatenated in project
    /// order and sorted by run count, busiest first. Any failing project fails
    /// the whole overview.
    ///
    /// # Arguments
    ///
    /// * `scope` - Projects to include
    /// * `show_as_percentage` - Report succeeded/failed/canceled as percentages of runs
    /// * `limit` - Maximum number of builds fetched per project
    pub async fn collect_overview(
        &self,
        scope: &ProjectScope,
        show_as_percentage: bool,
        limit: usize,
    ) -> Result<PipelineOverviewReport> {
        info!("Starting pipeline overview for {}", self.organization);

        let progress = PhaseProgress::start_phase_1();
        let projects = self.resolve_projects(scope).await?;

        let progress = progress.finish_phase_1_start_phase_2(projects.len());
        let per_project = try_join_all(
            projects
                .iter()
                .map(|project| self.fetch_project_overview(project, show_as_percentage, limit)),
        )
        .await?;

        let progress = progress.finish_phase_2_start_phase_3();
        let pipelines = merge_projects(per_project);

        if pipelines.is_empty() {
            warn!("No pipelines found for {}", self.organization);
        }

        let report = PipelineOverviewReport {
            provider: "Azure DevOps".to_string(),
            organization: self.organization.clone(),
            projects,
            collected_at: Utc::now(),
            show_as_percentage,
            total_pipelines: pipelines.len(),
            pipelines,
        };

        progress.finish_phase_3();

        Ok(report)
    }

    /// Sums the business value of work items of the requested type created
    /// since the start of the current period (relative to `now`).
    pub async fn collect_business_value<Tz: TimeZone>(
        &self,
        query: &BusinessValueQuery,
        now: &DateTime<Tz>,
    ) -> Result<BusinessValueReport> {
        info!(
            "Collecting business value of {} work items in {}",
            query.work_item_type, query.project
        );

        let start = period_start(query.period, now);
        let wiql = build_wiql(&query.project, &query.work_item_type);
        let ids = self.client.query_work_item_ids(&query.project, &wiql).await?;

        let total = if ids.is_empty() {
            BusinessValueTotal::default()
        } else {
            let work_items = self
                .client
                .get_work_items(&ids, &[BUSINESS_VALUE_FIELD, CREATED_DATE_FIELD])
                .await?;
            sum_business_value(&work_items, start)
        };

        Ok(BusinessValueReport {
            organization: self.organization.clone(),
            project: query.project.clone(),
            work_item_type: query.work_item_type.clone(),
            period: query.period,
            period_start: start,
            currency: query.currency,
            target_value: query.target_value,
            work_items_counted: total.counted,
            total_business_value: total.total,
            collected_at: Utc::now(),
        })
    }
}
