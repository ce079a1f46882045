mod exports;
mod format;
mod progress;
mod styling;
mod summary;
mod tables;
mod view;

pub use exports::{export_business_value, export_overview, export_projects};
pub use progress::PhaseProgress;
use styling::{blue_bold, dim};
pub use view::{Column, PipelineView, SortColumn, DEFAULT_BUSINESS_VALUE_TITLE, DEFAULT_PIPELINES_TITLE};

/// Prints the `ADOLens` banner to stderr.
pub fn print_banner() {
    eprintln!(
        r"
{} {}
  {}
",
        blue_bold("📊 ADOLens"),
        dim(env!("CARGO_PKG_VERSION")),
        dim("Azure DevOps pipeline overview & business value")
    );
}
