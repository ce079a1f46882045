mod builds;
mod core;
mod pipelines;
mod projects;
mod work_items;

pub use self::core::AzureDevOpsClient;
