mod azure;

pub use azure::{AzureDevOpsProvider, AzureProject, BusinessValueQuery, ProjectScope};
