mod business_value;
mod client;
mod pipeline_stats;
mod provider;
mod types;

pub use provider::{AzureDevOpsProvider, BusinessValueQuery, ProjectScope};
pub use types::AzureProject;
