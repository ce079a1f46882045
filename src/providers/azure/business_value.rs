use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use log::debug;
use serde_json::Value;

use super::types::AzureWorkItem;
use crate::overview::Period;

pub const BUSINESS_VALUE_FIELD: &str = "Microsoft.VSTS.Common.BusinessValue";
pub const CREATED_DATE_FIELD: &str = "System.CreatedDate";

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BusinessValueTotal {
    pub total: f64,
    pub counted: usize,
}

/// First instant of the current year or month, at midnight in `now`'s timezone.
pub fn period_start<Tz: TimeZone>(period: Period, now: &DateTime<Tz>) -> DateTime<Utc> {
    let month = match period {
        Period::Year => 1,
        Period::Month => now.month(),
    };

    let midnight = NaiveDate::from_ymd_opt(now.year(), month, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .unwrap_or_default();

    now.timezone()
        .from_local_datetime(&midnight)
        .earliest()
        .map_or_else(|| midnight.and_utc(), |start| start.with_timezone(&Utc))
}

fn escape_wiql(value: &str) -> String {
    value.replace('\'', "''")
}

/// WIQL query selecting every work item of `work_item_type` in `project`.
pub fn build_wiql(project: &str, work_item_type: &str) -> String {
    format!(
        "SELECT [System.Id] FROM workitems WHERE [System.TeamProject] = '{}' AND [System.WorkItemType] = '{}'",
        escape_wiql(project),
        escape_wiql(work_item_type)
    )
}

/// Sums the business value of work items created at or after `period_start`.
///
/// Items without a numeric business value, or without a parseable creation
/// date, are skipped.
pub fn sum_business_value(
    work_items: &[AzureWorkItem],
    period_start: DateTime<Utc>,
) -> BusinessValueTotal {
    let mut result = BusinessValueTotal::default();

    for item in work_items {
        let Some(value) = item.fields.get(BUSINESS_VALUE_FIELD).and_then(Value::as_f64) else {
            continue;
        };

        let Some(created) = item
            .fields
            .get(CREATED_DATE_FIELD)
            .and_then(Value::as_str)
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        else {
            debug!("Skipping work item {} without a valid creation date", item.id);
            continue;
        };

        if created.with_timezone(&Utc) >= period_start {
            result.total += value;
            result.counted += 1;
        }
    }

    result
}
