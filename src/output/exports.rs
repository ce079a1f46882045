use anyhow::Result;
use std::io::Write;

use crate::config::OutputFormat;
use crate::overview::{BusinessValueReport, PipelineOverviewReport};
use crate::providers::AzureProject;

use super::summary::{render_business_value, render_pipelines, render_projects};
use super::view::PipelineView;

/// Writes a pipeline overview in the requested format.
pub fn export_overview(
    report: &PipelineOverviewReport,
    view: &PipelineView,
    format: OutputFormat,
    pretty: bool,
    output: &mut dyn Write,
) -> Result<()> {
    match format {
        OutputFormat::Summary => {
            write!(output, "{}", render_pipelines(report, view))?;
            Ok(())
        }
        OutputFormat::Json => export_json(report, pretty, output),
        OutputFormat::Csv => export_overview_csv(report, view, output),
    }
}

/// Writes a business value report in the requested format.
pub fn export_business_value(
    report: &BusinessValueReport,
    title: &str,
    format: OutputFormat,
    pretty: bool,
    output: &mut dyn Write,
) -> Result<()> {
    match format {
        OutputFormat::Summary => {
            write!(output, "{}", render_business_value(report, title))?;
            Ok(())
        }
        OutputFormat::Json => export_json(report, pretty, output),
        OutputFormat::Csv => export_business_value_csv(report, output),
    }
}

/// Writes the organization's project list in the requested format.
pub fn export_projects(
    organization: &str,
    projects: &[AzureProject],
    format: OutputFormat,
    pretty: bool,
    output: &mut dyn Write,
) -> Result<()> {
    match format {
        OutputFormat::Summary => {
            write!(output, "{}", render_projects(organization, projects))?;
            Ok(())
        }
        OutputFormat::Json => export_json(&projects, pretty, output),
        OutputFormat::Csv => {
            writeln!(output, "ID,Name,State,Description")?;
            for project in projects {
                writeln!(
                    output,
                    "{},{},{},{}",
                    csv_field(&project.id),
                    csv_field(&project.name),
                    csv_field(project.state.as_deref().unwrap_or_default()),
                    csv_field(project.description.as_deref().unwrap_or_default())
                )?;
            }
            Ok(())
        }
    }
}

fn export_json<T: serde::Serialize + ?Sized>(value: &T, pretty: bool, output: &mut dyn Write) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    writeln!(output, "{json}")?;
    Ok(())
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn export_overview_csv(
    report: &PipelineOverviewReport,
    view: &PipelineView,
    output: &mut dyn Write,
) -> Result<()> {
    writeln!(
        output,
        "Project,Pipeline ID,Pipeline,URL,Runs,Succeeded,Failed,Canceled,Avg Duration (ms),As Percentage"
    )?;

    for overview in view.arrange(&report.pipelines) {
        let stats = &overview.stats;
        writeln!(
            output,
            "{},{},{},{},{},{},{},{},{},{}",
            csv_field(&overview.project),
            overview.pipeline.id,
            csv_field(&overview.pipeline.name),
            csv_field(overview.pipeline.url.as_deref().unwrap_or_default()),
            stats.runs,
            stats.succeeded,
            stats.failed,
            stats.canceled,
            stats.avg_duration_ms,
            report.show_as_percentage
        )?;
    }

    Ok(())
}

fn export_business_value_csv(report: &BusinessValueReport, output: &mut dyn Write) -> Result<()> {
    writeln!(
        output,
        "Project,Work Item Type,Period Start,Currency,Work Items Counted,Total Business Value,Target Value,Meets Target"
    )?;
    writeln!(
        output,
        "{},{},{},{},{},{},{},{}",
        csv_field(&report.project),
        csv_field(&report.work_item_type),
        report.period_start.format("%Y-%m-%d"),
        report.currency.code(),
        report.work_items_counted,
        report.total_business_value,
        report
            .target_value
            .map(|target| target.to_string())
            .unwrap_or_default(),
        report.meets_target()
    )?;
    Ok(())
}
