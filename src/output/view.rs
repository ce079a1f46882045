use std::cmp::Ordering;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::overview::PipelineOverview;

pub const DEFAULT_PIPELINES_TITLE: &str = "Pipelines Monitor";
pub const DEFAULT_BUSINESS_VALUE_TITLE: &str = "Total Business Value";

/// Optional columns of the pipelines table. The name column is always shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Column {
    Project,
    Runs,
    Succeeded,
    Failed,
    Canceled,
    Average,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SortColumn {
    Name,
    Runs,
    Succeeded,
    Failed,
    Canceled,
    Average,
}

/// How the pipelines table is titled, which columns it shows and how it is
/// ordered. `sort: None` keeps the aggregation order.
#[derive(Debug, Clone)]
pub struct PipelineView {
    pub title: String,
    pub columns: Vec<Column>,
    pub sort: Option<SortColumn>,
    pub ascending: bool,
}

impl Default for PipelineView {
    fn default() -> Self {
        Self {
            title: DEFAULT_PIPELINES_TITLE.to_string(),
            columns: vec![
                Column::Runs,
                Column::Succeeded,
                Column::Failed,
                Column::Canceled,
                Column::Average,
            ],
            sort: None,
            ascending: false,
        }
    }
}

impl PipelineView {
    pub fn shows(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    /// Returns the rows in display order.
    pub fn arrange<'a>(&self, pipelines: &'a [PipelineOverview]) -> Vec<&'a PipelineOverview> {
        let mut rows: Vec<&PipelineOverview> = pipelines.iter().collect();

        if let Some(column) = self.sort {
            rows.sort_by(|a, b| {
                let ordering = compare_by(column, a, b);
                if self.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }

        rows
    }
}

fn compare_by(column: SortColumn, a: &PipelineOverview, b: &PipelineOverview) -> Ordering {
    match column {
        SortColumn::Name => a.pipeline.name.cmp(&b.pipeline.name),
        SortColumn::Runs => a.stats.runs.cmp(&b.stats.runs),
        SortColumn::Succeeded => a.stats.succeeded.cmp(&b.stats.succeeded),
        SortColumn::Failed => a.stats.failed.cmp(&b.stats.failed),
        SortColumn::Canceled => a.stats.canceled.cmp(&b.stats.canceled),
        SortColumn::Average => a.stats.avg_duration_ms.cmp(&b.stats.avg_duration_ms),
    }
}
