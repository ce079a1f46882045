use indexmap::IndexMap;

use super::types::{AzureBuild, AzurePipeline, BuildResult};
use crate::overview::{PipelineOverview, PipelineRef, PipelineStats};

/// Finished builds of one pipeline, in the order the API returned them.
struct BuildGroup<'a> {
    name: String,
    url: Option<String>,
    builds: Vec<&'a AzureBuild>,
}

/// Converts a count to a whole percentage of `total`, rounding half up.
///
/// Returns 0 when `total` is 0.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn to_percent(value: usize, total: usize) -> usize {
    if total == 0 {
        return 0;
    }
    ((value as f64 / total as f64) * 100.0).round() as usize
}

/// Wall-clock duration of a finished build in milliseconds.
///
/// Builds without a start time, or whose clock went backwards, count as 0.
pub fn build_duration_ms(build: &AzureBuild) -> u64 {
    match (build.start_time, build.finish_time) {
        (Some(start), Some(finish)) => {
            u64::try_from((finish - start).num_milliseconds()).unwrap_or(0)
        }
        _ => 0,
    }
}

fn group_finished_builds<'a>(
    pipelines: &[AzurePipeline],
    builds: &'a [AzureBuild],
) -> IndexMap<u64, BuildGroup<'a>> {
    let mut groups: IndexMap<u64, BuildGroup<'a>> = IndexMap::new();

    for build in builds.iter().filter(|build| build.is_finished()) {
        groups
            .entry(build.definition.id)
            .or_insert_with(|| {
                let listed = pipelines.iter().find(|p| p.id == build.definition.id);
                BuildGroup {
                    name: listed.map_or_else(|| build.definition.name.clone(), |p| p.name.clone()),
                    url: listed.and_then(AzurePipeline::web_url),
                    builds: Vec::new(),
                }
            })
            .builds
            .push(build);
    }

    groups
}

fn calculate_stats(builds: &[&AzureBuild], show_as_percentage: bool) -> PipelineStats {
    let runs = builds.len();
    let mut succeeded = 0;
    let mut failed = 0;
    let mut canceled = 0;
    let mut total_duration_ms: u64 = 0;

    for build in builds {
        total_duration_ms = total_duration_ms.saturating_add(build_duration_ms(build));
        match build.result {
            Some(BuildResult::Succeeded) => succeeded += 1,
            Some(BuildResult::Failed) => failed += 1,
            Some(BuildResult::Canceled) => canceled += 1,
            Some(BuildResult::Other) | None => {}
        }
    }

    let avg_duration_ms = if runs == 0 {
        0
    } else {
        let runs = runs as u64;
        (total_duration_ms + runs / 2) / runs
    };

    if show_as_percentage {
        succeeded = to_percent(succeeded, runs);
        failed = to_percent(failed, runs);
        canceled = to_percent(canceled, runs);
    }

    PipelineStats {
        runs,
        succeeded,
        failed,
        canceled,
        avg_duration_ms,
    }
}

/// Builds the overview for a single project.
///
/// Unfinished builds are ignored. Pipelines are keyed by definition id, so two
/// pipelines sharing a display name stay separate. Every listed pipeline
/// appears exactly once: those without finished builds are appended with
/// zeroed statistics, in listing order, after the pipelines that have runs.
pub fn summarize_project(
    project: &str,
    pipelines: &[AzurePipeline],
    builds: &[AzureBuild],
    show_as_percentage: bool,
) -> Vec<PipelineOverview> {
    let mut overviews: IndexMap<u64, PipelineOverview> = group_finished_builds(pipelines, builds)
        .into_iter()
        .map(|(id, group)| {
            let stats = calculate_stats(&group.builds, show_as_percentage);
            let overview = PipelineOverview {
                project: project.to_string(),
                pipeline: PipelineRef {
                    id,
                    name: group.name,
                    url: group.url,
                },
                stats,
            };
            (id, overview)
        })
        .collect();

    for pipeline in pipelines {
        overviews
            .entry(pipeline.id)
            .or_insert_with(|| PipelineOverview {
                project: project.to_string(),
                pipeline: PipelineRef {
                    id: pipeline.id,
                    name: pipeline.name.clone(),
                    url: pipeline.web_url(),
                },
                stats: PipelineStats::default(),
            });
    }

    overviews.into_values().collect()
}

/// Concatenates per-project overviews in project order and sorts them by run
/// count, busiest first. The sort is stable.
pub fn merge_projects(per_project: Vec<Vec<PipelineOverview>>) -> Vec<PipelineOverview> {
    let mut merged: Vec<PipelineOverview> = per_project.into_iter().flatten().collect();
    merged.sort_by(|a, b| b.stats.runs.cmp(&a.stats.runs));
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::azure::types::DefinitionReference;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn pipeline(id: u64, name: &str) -> AzurePipeline {
        AzurePipeline {
            id,
            name: name.to_string(),
            url: Some(format!("https://dev.azure.com/org/proj/_apis/pipelines/{id}")),
            links: None,
        }
    }

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap()
    }

    fn build(definition: (u64, &str), result: Option<BuildResult>, seconds: Option<i64>) -> AzureBuild {
        let start = base_time();
        AzureBuild {
            id: 0,
            result,
            start_time: Some(start),
            finish_time: seconds.map(|s| start + Duration::seconds(s)),
            definition: DefinitionReference {
                id: definition.0,
                name: definition.1.to_string(),
            },
        }
    }

    mod to_percent {
        use super::*;

        #[test]
        fn returns_zero_for_empty_total() {
            assert_eq!(to_percent(0, 0), 0);
            assert_eq!(to_percent(5, 0), 0);
        }

        #[test]
        fn rounds_to_nearest_whole_percent() {
            assert_eq!(to_percent(1, 3), 33);
            assert_eq!(to_percent(2, 3), 67);
            assert_eq!(to_percent(3, 3), 100);
        }

        #[test]
        fn rounds_halves_up() {
            assert_eq!(to_percent(1, 8), 13);
            assert_eq!(to_percent(1, 200), 1);
        }
    }

    mod build_duration {
        use super::*;

        #[test]
        fn measures_finish_minus_start() {
            let b = build((1, "A"), Some(BuildResult::Succeeded), Some(90));
            assert_eq!(build_duration_ms(&b), 90_000);
        }

        #[test]
        fn clamps_negative_durations() {
            let b = build((1, "A"), Some(BuildResult::Succeeded), Some(-5));
            assert_eq!(build_duration_ms(&b), 0);
        }

        #[test]
        fn missing_start_counts_as_zero() {
            let mut b = build((1, "A"), Some(BuildResult::Canceled), Some(30));
            b.start_time = None;
            assert_eq!(build_duration_ms(&b), 0);
        }
    }

    mod summarize_project {
        use super::*;

        #[test]
        fn aggregates_finished_runs_and_backfills_idle_pipelines() {
            let pipelines = vec![pipeline(1, "A"), pipeline(2, "B")];
            let builds = vec![
                build((1, "A"), Some(BuildResult::Succeeded), Some(60)),
                build((1, "A"), Some(BuildResult::Succeeded), Some(120)),
                build((1, "A"), Some(BuildResult::Failed), Some(180)),
                build((2, "B"), Some(BuildResult::Succeeded), None),
            ];

            let overview = merge_projects(vec![summarize_project("proj", &pipelines, &builds, false)]);

            assert_eq!(overview.len(), 2);
            assert_eq!(overview[0].pipeline.name, "A");
            assert_eq!(
                overview[0].stats,
                PipelineStats {
                    runs: 3,
                    succeeded: 2,
                    failed: 1,
                    canceled: 0,
                    avg_duration_ms: 120_000,
                }
            );
            assert_eq!(overview[1].pipeline.name, "B");
            assert_eq!(overview[1].stats, PipelineStats::default());
            assert_eq!(
                overview[1].pipeline.url.as_deref(),
                Some("https://dev.azure.com/org/proj/_apis/pipelines/2")
            );
        }

        #[test]
        fn unclassified_results_count_as_runs_only() {
            let pipelines = vec![pipeline(1, "A")];
            let builds = vec![
                build((1, "A"), Some(BuildResult::Succeeded), Some(10)),
                build((1, "A"), Some(BuildResult::Other), Some(10)),
                build((1, "A"), None, Some(10)),
                build((1, "A"), Some(BuildResult::Canceled), Some(10)),
            ];

            let overview = summarize_project("proj", &pipelines, &builds, false);
            let stats = overview[0].stats;

            assert_eq!(stats.runs, 4);
            assert_eq!(stats.succeeded, 1);
            assert_eq!(stats.canceled, 1);
            assert_eq!(stats.failed, 0);
            assert!(stats.succeeded + stats.failed + stats.canceled <= stats.runs);
        }

        #[test]
        fn percentage_mode_converts_counts_but_not_runs() {
            let pipelines = vec![pipeline(1, "A")];
            let builds = vec![
                build((1, "A"), Some(BuildResult::Succeeded), Some(10)),
                build((1, "A"), Some(BuildResult::Succeeded), Some(10)),
                build((1, "A"), Some(BuildResult::Failed), Some(10)),
            ];

            let overview = summarize_project("proj", &pipelines, &builds, true);
            let stats = overview[0].stats;

            assert_eq!(stats.runs, 3);
            assert_eq!(stats.succeeded, 67);
            assert_eq!(stats.failed, 33);
            assert_eq!(stats.canceled, 0);
        }

        #[test]
        fn percentage_mode_keeps_idle_pipelines_at_zero() {
            let pipelines = vec![pipeline(1, "A")];
            let overview = summarize_project("proj", &pipelines, &[], true);

            assert_eq!(overview.len(), 1);
            assert_eq!(overview[0].stats, PipelineStats::default());
        }

        #[test]
        fn length_matches_listing_regardless_of_runs() {
            let pipelines = vec![pipeline(1, "A"), pipeline(2, "B"), pipeline(3, "C")];
            let builds = vec![build((2, "B"), Some(BuildResult::Failed), Some(5))];

            let overview = summarize_project("proj", &pipelines, &builds, false);

            assert_eq!(overview.len(), 3);
            let names: Vec<_> = overview.iter().map(|o| o.pipeline.name.as_str()).collect();
            assert_eq!(names, vec!["B", "A", "C"]);
        }

        #[test]
        fn duplicate_display_names_stay_separate() {
            let pipelines = vec![pipeline(1, "deploy"), pipeline(2, "deploy")];
            let builds = vec![
                build((1, "deploy"), Some(BuildResult::Succeeded), Some(10)),
                build((2, "deploy"), Some(BuildResult::Failed), Some(10)),
                build((2, "deploy"), Some(BuildResult::Failed), Some(10)),
            ];

            let overview = summarize_project("proj", &pipelines, &builds, false);

            assert_eq!(overview.len(), 2);
            assert_eq!(overview[0].pipeline.id, 1);
            assert_eq!(overview[0].stats.runs, 1);
            assert_eq!(overview[1].pipeline.id, 2);
            assert_eq!(overview[1].stats.failed, 2);
        }

        #[test]
        fn listed_name_wins_over_stale_build_name() {
            let pipelines = vec![pipeline(1, "renamed")];
            let builds = vec![build((1, "old-name"), Some(BuildResult::Succeeded), Some(10))];

            let overview = summarize_project("proj", &pipelines, &builds, false);

            assert_eq!(overview.len(), 1);
            assert_eq!(overview[0].pipeline.name, "renamed");
        }

        #[test]
        fn unlisted_definitions_are_reported_without_url() {
            let builds = vec![build((9, "orphan"), Some(BuildResult::Succeeded), Some(10))];

            let overview = summarize_project("proj", &[], &builds, false);

            assert_eq!(overview.len(), 1);
            assert_eq!(overview[0].pipeline.name, "orphan");
            assert_eq!(overview[0].pipeline.url, None);
        }

        #[test]
        fn duplicate_listing_entries_collapse() {
            let pipelines = vec![pipeline(1, "A"), pipeline(1, "A")];
            let overview = summarize_project("proj", &pipelines, &[], false);
            assert_eq!(overview.len(), 1);
        }

        #[test]
        fn average_duration_rounds_to_nearest_millisecond() {
            let pipelines = vec![pipeline(1, "A")];
            let mut builds = vec![
                build((1, "A"), Some(BuildResult::Succeeded), Some(1)),
                build((1, "A"), Some(BuildResult::Succeeded), Some(1)),
                build((1, "A"), Some(BuildResult::Succeeded), Some(1)),
            ];
            builds[0].finish_time = builds[0].start_time.map(|s| s + Duration::milliseconds(2));

            let overview = summarize_project("proj", &pipelines, &builds, false);

            // (2 + 1000 + 1000) / 3 = 667.33
            assert_eq!(overview[0].stats.avg_duration_ms, 667);
        }
    }

    mod merge_projects {
        use super::*;

        #[test]
        fn concatenates_then_sorts_by_runs_descending() {
            let alpha = summarize_project(
                "alpha",
                &[pipeline(1, "a1"), pipeline(2, "a2")],
                &[build((1, "a1"), Some(BuildResult::Succeeded), Some(1))],
                false,
            );
            let beta = summarize_project(
                "beta",
                &[pipeline(10, "b1")],
                &[
                    build((10, "b1"), Some(BuildResult::Succeeded), Some(1)),
                    build((10, "b1"), Some(BuildResult::Failed), Some(1)),
                ],
                false,
            );

            let merged = merge_projects(vec![alpha, beta]);

            let rows: Vec<_> = merged
                .iter()
                .map(|o| (o.project.as_str(), o.pipeline.name.as_str(), o.stats.runs))
                .collect();
            assert_eq!(
                rows,
                vec![("beta", "b1", 2), ("alpha", "a1", 1), ("alpha", "a2", 0)]
            );
        }

        #[test]
        fn ties_keep_project_order() {
            let alpha = summarize_project("alpha", &[pipeline(1, "idle-a")], &[], false);
            let beta = summarize_project("beta", &[pipeline(2, "idle-b")], &[], false);

            let merged = merge_projects(vec![alpha, beta]);

            assert_eq!(merged[0].project, "alpha");
            assert_eq!(merged[1].project, "beta");
        }

        #[test]
        fn empty_input_yields_empty_overview() {
            assert!(merge_projects(Vec::new()).is_empty());
        }
    }
}
