//! Route command - map bucket ids to writer tasks.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Args;
use serde::Serialize;
use strata_iceberg::bucket::BucketPartitioner;

use super::load_spec;
use crate::OutputFormat;

/// Arguments for the route command.
#[derive(Debug, Args)]
pub struct RouteArgs {
    /// Path to the partition spec file (Iceberg JSON).
    #[arg(long)]
    pub spec: PathBuf,

    /// Number of writer tasks.
    #[arg(long, short = 'p', env = "STRATA_WRITE_PARALLELISM")]
    pub parallelism: usize,

    /// Bucket ids to route; `null` stands for a missing bucket id.
    #[arg(required = true, allow_negative_numbers = true)]
    pub bucket_ids: Vec<String>,
}

/// Routing result for one bucket id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteOutcome {
    /// Bucket id as given.
    pub bucket_id: Option<i32>,
    /// Writer task, when routing succeeded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<usize>,
    /// Routing error, when routing failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Execute the route command.
///
/// # Errors
///
/// Returns an error if the spec cannot be loaded or is invalid, a bucket id
/// is not an integer, or any bucket id fails to route.
pub fn execute(args: &RouteArgs, format: OutputFormat) -> Result<()> {
    let span = strata_core::sink_span("route", &args.spec.display().to_string());
    let _guard = span.enter();

    let spec = load_spec(&args.spec)?;
    let partitioner = BucketPartitioner::new(&spec)?;
    let outcomes = route_all(&partitioner, &args.bucket_ids, args.parallelism)?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&outcomes)?),
        OutputFormat::Text => print!("{}", render_text(&outcomes)),
    }

    let failed = outcomes.iter().filter(|o| o.error.is_some()).count();
    if failed > 0 {
        bail!("{failed} of {} bucket ids could not be routed", outcomes.len());
    }
    Ok(())
}

/// Routes every bucket id, collecting per-id failures.
///
/// # Errors
///
/// Returns an error if a bucket id is neither an integer nor `null`.
pub fn route_all(
    partitioner: &BucketPartitioner,
    bucket_ids: &[String],
    num_tasks: usize,
) -> Result<Vec<RouteOutcome>> {
    bucket_ids
        .iter()
        .map(|raw| {
            let bucket_id = parse_bucket_id(raw)?;
            let outcome = match partitioner.route(bucket_id, num_tasks) {
                Ok(task) => RouteOutcome {
                    bucket_id,
                    task: Some(task),
                    error: None,
                },
                Err(e) => {
                    tracing::warn!(error = %e, "bucket id could not be routed");
                    RouteOutcome {
                        bucket_id,
                        task: None,
                        error: Some(e.to_string()),
                    }
                }
            };
            Ok(outcome)
        })
        .collect()
}

fn parse_bucket_id(raw: &str) -> Result<Option<i32>> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("null") {
        return Ok(None);
    }
    raw.parse::<i32>()
        .map(Some)
        .with_context(|| format!("Invalid bucket id: {raw}"))
}

/// Renders outcomes one per line.
#[must_use]
pub fn render_text(outcomes: &[RouteOutcome]) -> String {
    let mut out = String::new();
    for outcome in outcomes {
        let bucket = outcome
            .bucket_id
            .map_or_else(|| "null".to_string(), |id| id.to_string());
        match (&outcome.task, &outcome.error) {
            (Some(task), _) => {
                let _ = writeln!(out, "bucket {bucket} -> task {task}");
            }
            (None, Some(error)) => {
                let _ = writeln!(out, "bucket {bucket} -> error: {error}");
            }
            (None, None) => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support;

    fn partitioner(num_buckets: u32) -> BucketPartitioner {
        let spec = load_spec(test_support::bucket_spec_file(num_buckets).path()).unwrap();
        BucketPartitioner::new(&spec).unwrap()
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| (*v).to_string()).collect()
    }

    #[test]
    fn test_route_all_mixed() {
        let outcomes = route_all(&partitioner(60), &ids(&["42", "null", "-1", "60"]), 30).unwrap();

        assert_eq!(outcomes[0].task, Some(12));
        assert_eq!(outcomes[1].error.as_deref(), Some("bucket id cannot be null"));
        assert_eq!(
            outcomes[2].error.as_deref(),
            Some("bucket id out of range: less than lower bound (0), got -1")
        );
        assert_eq!(
            outcomes[3].error.as_deref(),
            Some("bucket id out of range: greater than upper bound (59), got 60")
        );

        let text = render_text(&outcomes);
        assert_eq!(
            text.lines().take(2).collect::<Vec<_>>(),
            vec!["bucket 42 -> task 12", "bucket null -> error: bucket id cannot be null"]
        );
    }

    #[test]
    fn test_route_all_more_tasks_than_buckets() {
        let outcomes = route_all(&partitioner(60), &ids(&["0", "42", "59"]), 500).unwrap();
        let tasks = outcomes.iter().map(|o| o.task).collect::<Vec<_>>();
        assert_eq!(tasks, vec![Some(0), Some(42), Some(59)]);
    }

    #[test]
    fn test_route_all_rejects_garbage() {
        let err = route_all(&partitioner(4), &ids(&["abc"]), 2).unwrap_err();
        assert_eq!(err.to_string(), "Invalid bucket id: abc");
    }

    #[test]
    fn test_outcome_json_omits_empty_fields() {
        let outcomes = route_all(&partitioner(4), &ids(&["1", "null"]), 2).unwrap();
        let json = serde_json::to_value(&outcomes).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"bucketId": 1, "task": 1},
                {"bucketId": null, "error": "bucket id cannot be null"}
            ])
        );
    }
}
