use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::auth::Token;
use crate::config::{AzureDevOpsConfig, Config, OutputFormat};
use crate::output::{
    export_business_value, export_overview, export_projects, Column, PipelineView, SortColumn,
    DEFAULT_BUSINESS_VALUE_TITLE, DEFAULT_PIPELINES_TITLE,
};
use crate::overview::{Currency, Period};
use crate::providers::{AzureDevOpsProvider, BusinessValueQuery, ProjectScope};

#[derive(Parser)]
#[command(name = "adolens")]
#[command(author, version, about = "Azure DevOps pipeline overview & business value", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (TOML, JSON or YAML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Write the report to a file instead of stdout
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    #[arg(short, long, global = true, value_enum)]
    format: Option<OutputFormat>,

    /// Pretty-print JSON output
    #[arg(short, long, global = true, default_value_t = false, overrides_with = "no_pretty")]
    pretty: bool,

    /// Compact JSON output, even when the config enables pretty printing
    #[arg(long, global = true, default_value_t = false, overrides_with = "pretty")]
    no_pretty: bool,
}

#[derive(Args, Debug, Default)]
struct Connection {
    /// Organization URL (e.g., 'https://dev.azure.com/fabrikam')
    #[arg(long)]
    org: Option<String>,

    /// Personal access token
    #[arg(long, env = "AZURE_DEVOPS_EXT_PAT", hide_env_values = true)]
    token: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Per-pipeline run statistics for one or more projects
    Pipelines {
        #[command(flatten)]
        connection: Connection,

        #[arg(short = 'P', long)]
        project: Option<String>,

        /// Span these projects instead of the current one
        #[arg(long, value_delimiter = ',', conflicts_with = "all_projects")]
        projects: Vec<String>,

        /// Span every project in the organization
        #[arg(long, default_value_t = false)]
        all_projects: bool,

        /// Report outcomes as percentages of finished runs
        #[arg(long, default_value_t = false, overrides_with = "no_percentage")]
        percentage: bool,

        /// Report raw counts, even when the config enables percentages
        #[arg(long, default_value_t = false, overrides_with = "percentage")]
        no_percentage: bool,

        /// Maximum number of builds fetched per project
        #[arg(short, long)]
        limit: Option<usize>,

        #[arg(long, value_delimiter = ',', value_enum)]
        columns: Vec<Column>,

        #[arg(long, value_enum)]
        sort_by: Option<SortColumn>,

        #[arg(long, default_value_t = false, requires = "sort_by")]
        ascending: bool,

        #[arg(long)]
        title: Option<String>,
    },
    /// Total business value of work items created in the current period
    BusinessValue {
        #[command(flatten)]
        connection: Connection,

        #[arg(short = 'P', long)]
        project: Option<String>,

        #[arg(long)]
        work_item_type: Option<String>,

        #[arg(long, value_enum)]
        period: Option<Period>,

        #[arg(long, value_enum, ignore_case = true)]
        currency: Option<Currency>,

        #[arg(long)]
        target: Option<f64>,

        #[arg(long)]
        title: Option<String>,
    },
    /// List the organization's projects
    Projects {
        #[command(flatten)]
        connection: Connection,
    },
    /// Write a configuration file with the default settings
    InitConfig {
        /// Destination; the extension selects TOML, JSON or YAML
        #[arg(default_value = "adolens.toml")]
        path: PathBuf,
    },
}

/// Picks the project scope: explicit CLI selection first (`--all-projects`,
/// `--projects`, `--project`), then the multi-project settings of the
/// config, then the configured current project.
fn project_scope(
    project: Option<&str>,
    projects: &[String],
    all_projects: bool,
    config: &Config,
) -> Result<ProjectScope> {
    if all_projects {
        return Ok(ProjectScope::All);
    }
    if !projects.is_empty() {
        return Ok(ProjectScope::Selected(projects.to_vec()));
    }
    if let Some(project) = project {
        return Ok(ProjectScope::Current(project.to_owned()));
    }
    if config.pipelines.multiple_projects {
        return Ok(ProjectScope::Selected(
            config.pipelines.selected_projects.clone(),
        ));
    }

    current_project(None, &config.azure_devops).map(ProjectScope::Current)
}

/// Resolves an on/off flag pair against the configured value; the flag given
/// last on the command line has already won inside clap.
fn toggle(enable: bool, disable: bool, configured: bool) -> bool {
    if enable {
        true
    } else if disable {
        false
    } else {
        configured
    }
}

fn current_project(project: Option<&str>, config: &AzureDevOpsConfig) -> Result<String> {
    project
        .map(str::to_owned)
        .or_else(|| config.project.clone())
        .ok_or_else(|| anyhow!("No project given; pass --project or set azure-devops.project"))
}

fn pipeline_view(
    config: &Config,
    columns: &[Column],
    sort: Option<SortColumn>,
    ascending: bool,
    title: Option<&str>,
) -> PipelineView {
    PipelineView {
        title: title
            .map(str::to_owned)
            .or_else(|| config.pipelines.title.clone())
            .unwrap_or_else(|| DEFAULT_PIPELINES_TITLE.to_string()),
        columns: if columns.is_empty() {
            config.pipelines.columns()
        } else {
            columns.to_vec()
        },
        sort,
        ascending,
    }
}

impl Connection {
    fn provider(&self, config: &AzureDevOpsConfig) -> Result<AzureDevOpsProvider> {
        let organization_url = self
            .org
            .as_deref()
            .or(config.organization_url.as_deref())
            .ok_or_else(|| {
                anyhow!("No organization URL given; pass --org or set azure-devops.organization-url")
            })?;

        let token = self
            .token
            .as_deref()
            .or(config.token.as_deref())
            .map(Token::from);

        AzureDevOpsProvider::new(organization_url, token)
            .with_context(|| format!("Invalid organization URL: {organization_url}"))
    }
}

impl Cli {
    fn output_format(&self, config: &Config) -> (OutputFormat, bool) {
        (
            self.format.unwrap_or(config.output.format),
            toggle(self.pretty, self.no_pretty, config.output.pretty),
        )
    }

    fn write_report(&self, render: impl FnOnce(&mut dyn Write) -> Result<()>) -> Result<()> {
        if let Some(output_path) = &self.output {
            let mut file = std::fs::File::create(output_path)
                .with_context(|| format!("Failed to create {}", output_path.display()))?;
            render(&mut file)?;
            file.flush()?;
            info!("Report written to: {}", output_path.display());
        } else {
            let mut stdout = std::io::stdout().lock();
            render(&mut stdout)?;
            stdout.flush()?;
        }

        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    async fn execute_pipelines(
        &self,
        config: &Config,
        connection: &Connection,
        project: Option<&str>,
        projects: &[String],
        all_projects: bool,
        show_as_percentage: bool,
        limit: Option<usize>,
        view: PipelineView,
    ) -> Result<()> {
        let provider = connection.provider(&config.azure_devops)?;
        let scope = project_scope(project, projects, all_projects, config)?;
        let limit = limit.unwrap_or(config.pipelines.limit);

        info!("Collecting pipeline overview for {scope:?}");

        let report = provider
            .collect_overview(&scope, show_as_percentage, limit)
            .await?;

        let (format, pretty) = self.output_format(config);
        self.write_report(|out| export_overview(&report, &view, format, pretty, out))
    }

    async fn execute_business_value(
        &self,
        config: &Config,
        connection: &Connection,
        query: BusinessValueQuery,
        title: &str,
    ) -> Result<()> {
        let provider = connection.provider(&config.azure_devops)?;

        let report = provider
            .collect_business_value(&query, &chrono::Local::now())
            .await?;

        let (format, pretty) = self.output_format(config);
        self.write_report(|out| export_business_value(&report, title, format, pretty, out))
    }

    async fn execute_projects(&self, config: &Config, connection: &Connection) -> Result<()> {
        let provider = connection.provider(&config.azure_devops)?;
        let projects = provider.list_projects().await?;

        let (format, pretty) = self.output_format(config);
        self.write_report(|out| {
            export_projects(&provider.organization, &projects, format, pretty, out)
        })
    }

    fn execute_init_config(path: &Path) -> Result<()> {
        if path.exists() {
            return Err(anyhow!("Refusing to overwrite {}", path.display()));
        }

        Config::default().save(path)?;
        info!("Default configuration written to: {}", path.display());
        Ok(())
    }

    pub async fn execute(&self) -> Result<()> {
        if let Commands::InitConfig { path } = &self.command {
            return Self::execute_init_config(path);
        }

        let config = Config::load(self.config.as_deref())?;

        match &self.command {
            Commands::Pipelines {
                connection,
                project,
                projects,
                all_projects,
                percentage,
                no_percentage,
                limit,
                columns,
                sort_by,
                ascending,
                title,
            } => {
                let view = pipeline_view(&config, columns, *sort_by, *ascending, title.as_deref());
                self.execute_pipelines(
                    &config,
                    connection,
                    project.as_deref(),
                    projects,
                    *all_projects,
                    toggle(
                        *percentage,
                        *no_percentage,
                        config.pipelines.show_as_percentage,
                    ),
                    *limit,
                    view,
                )
                .await
            }
            Commands::BusinessValue {
                connection,
                project,
                work_item_type,
                period,
                currency,
                target,
                title,
            } => {
                let defaults = &config.business_value;
                let query = BusinessValueQuery {
                    project: current_project(project.as_deref(), &config.azure_devops)?,
                    work_item_type: work_item_type
                        .clone()
                        .unwrap_or_else(|| defaults.work_item_type.clone()),
                    period: period.unwrap_or(defaults.period),
                    currency: currency.unwrap_or(defaults.currency),
                    target_value: target.or(defaults.target_value),
                };
                let title = title
                    .as_deref()
                    .or(defaults.title.as_deref())
                    .unwrap_or(DEFAULT_BUSINESS_VALUE_TITLE);

                self.execute_business_value(&config, connection, query, title)
                    .await
            }
            Commands::Projects { connection } => self.execute_projects(&config, connection).await,
            Commands::InitConfig { path } => Self::execute_init_config(path),
        }
    }
}
