use std::fmt::Write;

use comfy_table::Cell;

use crate::overview::{BusinessValueReport, Period, PipelineOverview, PipelineOverviewReport};
use crate::providers::AzureProject;

use super::format::format_currency;
use super::styling::{bright, bright_green, bright_red, bright_yellow, cyan, dim};
use super::tables::{
    color_coded_duration_cell, color_coded_failure_cell, color_coded_success_cell, count_cell,
    create_table, header_cell,
};
use super::view::{Column, PipelineView};

fn add_section_header(output: &mut String, emoji: &str, title: &str) {
    let _ = writeln!(output, "{} {}", bright(emoji), bright(title).underlined());
}

fn outcome_cell(value: usize, as_percentage: bool, success: bool) -> Cell {
    match (as_percentage, success) {
        (false, _) => count_cell(value),
        (true, true) => color_coded_success_cell(value),
        (true, false) => color_coded_failure_cell(value),
    }
}

fn pipeline_row(overview: &PipelineOverview, view: &PipelineView, as_percentage: bool) -> Vec<Cell> {
    let stats = &overview.stats;
    let mut row = vec![Cell::new(&overview.pipeline.name)];

    if view.shows(Column::Project) {
        row.push(Cell::new(&overview.project));
    }
    if view.shows(Column::Runs) {
        row.push(count_cell(stats.runs));
    }
    if view.shows(Column::Succeeded) {
        row.push(outcome_cell(stats.succeeded, as_percentage, true));
    }
    if view.shows(Column::Failed) {
        row.push(outcome_cell(stats.failed, as_percentage, false));
    }
    if view.shows(Column::Canceled) {
        row.push(outcome_cell(stats.canceled, as_percentage, false));
    }
    if view.shows(Column::Average) {
        row.push(color_coded_duration_cell(stats.avg_duration_ms));
    }

    row
}

fn pipeline_header(view: &PipelineView) -> Vec<Cell> {
    let mut header = vec![header_cell("Name")];
    for (column, label) in [
        (Column::Project, "Project"),
        (Column::Runs, "Runs"),
        (Column::Succeeded, "Succeeded"),
        (Column::Failed, "Failed"),
        (Column::Canceled, "Canceled"),
        (Column::Average, "Avg Duration"),
    ] {
        if view.shows(column) {
            header.push(header_cell(label));
        }
    }
    header
}

/// Renders the pipelines table, titled `<title> (<count>)`.
pub fn render_pipelines(report: &PipelineOverviewReport, view: &PipelineView) -> String {
    let mut output = String::new();

    add_section_header(
        &mut output,
        "🚀",
        &format!("{} ({})", view.title, report.pipelines.len()),
    );
    let _ = writeln!(
        output,
        "  {} {}\n  {} {}\n  {} {}\n",
        dim("Organization:"),
        cyan(&report.organization),
        dim("Projects:"),
        cyan(report.projects.join(", ")),
        dim("Values:"),
        bright_yellow(if report.show_as_percentage {
            "percentage of finished runs"
        } else {
            "finished run counts"
        }),
    );

    if report.pipelines.is_empty() {
        let _ = writeln!(output, "  {}", bright_yellow("No pipelines found"));
        return output;
    }

    let mut table = create_table();
    table.set_header(pipeline_header(view));
    for overview in view.arrange(&report.pipelines) {
        table.add_row(pipeline_row(overview, view, report.show_as_percentage));
    }
    let _ = writeln!(output, "{table}");

    output
}

/// Renders the business value card: current total, optional target, and a
/// green/red status depending on whether the target is met.
pub fn render_business_value(report: &BusinessValueReport, title: &str) -> String {
    let mut output = String::new();

    add_section_header(&mut output, "💰", title);

    let period = match report.period {
        Period::Year => "year",
        Period::Month => "month",
    };
    let current = format_currency(report.total_business_value, report.currency);
    let current = if report.meets_target() {
        bright_green(current)
    } else {
        bright_red(current)
    };

    let _ = writeln!(
        output,
        "  {} {}\n  {} {}\n  {} {} {}\n  {} {}\n  {} {}",
        dim("Project:"),
        cyan(&report.project),
        dim("Work item type:"),
        cyan(&report.work_item_type),
        dim("Period:"),
        cyan(period),
        dim(format!("(since {})", report.period_start.format("%Y-%m-%d"))),
        dim("Work items counted:"),
        bright_yellow(report.work_items_counted),
        dim("Current:"),
        current,
    );

    if let Some(target) = report.target_value.filter(|target| *target > 0.0) {
        let _ = writeln!(
            output,
            "  {} {}",
            dim("Target:"),
            bright(format_currency(target, report.currency))
        );
    }

    output
}

/// Renders the organization's projects as a table.
pub fn render_projects(organization: &str, projects: &[AzureProject]) -> String {
    let mut output = String::new();

    add_section_header(
        &mut output,
        "📁",
        &format!("Projects in {organization} ({})", projects.len()),
    );

    if projects.is_empty() {
        let _ = writeln!(output, "  {}", bright_yellow("No projects found"));
        return output;
    }

    let mut table = create_table();
    table.set_header(vec![
        header_cell("Name"),
        header_cell("State"),
        header_cell("Description"),
    ]);
    for project in projects {
        table.add_row(vec![
            Cell::new(&project.name),
            Cell::new(project.state.as_deref().unwrap_or_default()),
            Cell::new(project.description.as_deref().unwrap_or_default()),
        ]);
    }
    let _ = writeln!(output, "{table}");

    output
}
