//! Plan command - validate a spec and show the bucket assignment.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use serde::Serialize;
use strata_iceberg::bucket::{BucketFieldInfo, BucketPartitioner};
use strata_iceberg::types::PartitionSpec;

use super::load_spec;
use crate::OutputFormat;

/// Arguments for the plan command.
#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Path to the partition spec file (Iceberg JSON).
    #[arg(long)]
    pub spec: PathBuf,

    /// Number of writer tasks.
    #[arg(long, short = 'p', env = "STRATA_WRITE_PARALLELISM")]
    pub parallelism: usize,
}

/// Task to bucket assignment for one spec and parallelism.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanReport {
    /// Partition spec id.
    pub spec_id: i32,
    /// Name of the bucket partition field.
    pub bucket_field: String,
    /// Partition field id of the bucket field.
    pub bucket_field_id: i32,
    /// Position of the bucket field in the spec.
    pub bucket_field_position: usize,
    /// Declared bucket count.
    pub num_buckets: i32,
    /// Writer task count.
    pub num_tasks: usize,
    /// Buckets per task.
    pub tasks: Vec<Vec<i32>>,
    /// Tasks without buckets.
    pub idle_tasks: Vec<usize>,
    /// Largest bucket count difference between two tasks.
    pub max_skew: usize,
}

/// Execute the plan command.
///
/// # Errors
///
/// Returns an error if the spec cannot be loaded, does not have exactly one
/// bucket field, or the parallelism is zero.
pub fn execute(args: &PlanArgs, format: OutputFormat) -> Result<()> {
    let span = strata_core::sink_span("plan", &args.spec.display().to_string());
    let _guard = span.enter();

    let spec = load_spec(&args.spec)?;
    let report = build_report(&spec, args.parallelism)?;
    tracing::info!(
        num_buckets = report.num_buckets,
        num_tasks = report.num_tasks,
        idle_tasks = report.idle_tasks.len(),
        "planned bucket assignment"
    );

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print!("{}", render_text(&report)),
    }
    Ok(())
}

/// Builds the assignment report for a spec.
///
/// # Errors
///
/// Returns an error if the spec is invalid for bucket routing, `num_tasks`
/// is zero, or the table would exceed the assignment size limit.
pub fn build_report(spec: &PartitionSpec, num_tasks: usize) -> Result<PlanReport> {
    let info = BucketFieldInfo::from_spec(spec)?;
    let assignment = BucketPartitioner::from_field_info(&info).assignment(num_tasks)?;

    Ok(PlanReport {
        spec_id: spec.spec_id,
        bucket_field: spec.fields[info.position].name.clone(),
        bucket_field_id: info.field_id,
        bucket_field_position: info.position,
        num_buckets: info.num_buckets,
        num_tasks: assignment.num_tasks(),
        idle_tasks: assignment.idle_tasks(),
        max_skew: assignment.max_skew(),
        tasks: assignment.tasks,
    })
}

/// Renders a report as human-readable text.
#[must_use]
pub fn render_text(report: &PlanReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Partition spec {}", report.spec_id);
    let _ = writeln!(
        out,
        "  Bucket field: {} (field id {}, position {})",
        report.bucket_field, report.bucket_field_id, report.bucket_field_position
    );
    let _ = writeln!(out, "  Buckets:      {}", report.num_buckets);
    let _ = writeln!(out, "  Writer tasks: {}", report.num_tasks);
    let _ = writeln!(out, "  Max skew:     {}", report.max_skew);
    let _ = writeln!(out, "  Idle tasks:   {}", join_or_none(&report.idle_tasks));
    let _ = writeln!(out, "Assignment:");
    for (task, buckets) in report.tasks.iter().enumerate() {
        if !buckets.is_empty() {
            let _ = writeln!(out, "  task {task}: {}", join_or_none(buckets));
        }
    }
    out
}

fn join_or_none<T: ToString>(values: &[T]) -> String {
    if values.is_empty() {
        "none".to_string()
    } else {
        values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}
