//! One report run: locate, prepare, project, render, assemble, write.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;

use crate::config::Config;
use crate::error::{ReportError, Result};
use crate::logging::{info, obj, v_str, Domain, ProfileScope};
use crate::matchups::prepare_rows;
use crate::page::{assemble_page, format_timestamp, write_page};
use crate::projector::{project, DisplaySchema, PresentationRow};
use crate::render::render_fragment;
use crate::snapshot::find_latest_snapshot;

/// The table-or-error fragment plus what was learned producing it.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub html: String,
    pub snapshot: Option<PathBuf>,
    pub rows_read: usize,
    pub rows_retained: usize,
    /// `"table"` or the failing error's kind.
    pub outcome: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub snapshot: Option<String>,
    pub rows_read: usize,
    pub rows_retained: usize,
    pub outcome: String,
    pub output: String,
    pub generated_at: String,
}

struct Staged {
    rows: Vec<PresentationRow>,
    rows_read: usize,
    rows_retained: usize,
}

fn stage_rows(config: &Config, schema: &DisplaySchema) -> (Option<PathBuf>, Result<Staged>) {
    let Some(path) = find_latest_snapshot(&config.data_dir, &config.snapshot_pattern) else {
        let err = ReportError::SnapshotNotFound {
            pattern: config.snapshot_pattern.clone(),
            dir: config.data_dir.display().to_string(),
        };
        return (None, Err(err));
    };
    let staged = prepare_rows(&path, schema).map(|prepared| Staged {
        rows: project(schema, &prepared.rows),
        rows_read: prepared.rows_read,
        rows_retained: prepared.rows_retained,
    });
    (Some(path), staged)
}

/// Never fails: every recoverable error becomes an error fragment.
pub fn build_fragment(config: &Config, schema: &DisplaySchema) -> Fragment {
    let (snapshot, staged) = stage_rows(config, schema);
    match staged {
        Ok(staged) => {
            let html = render_fragment(schema, Ok(staged.rows));
            let outcome = if html.starts_with("<table") {
                "table"
            } else {
                "render_failure"
            };
            Fragment {
                html,
                snapshot,
                rows_read: staged.rows_read,
                rows_retained: staged.rows_retained,
                outcome,
            }
        }
        Err(err) => {
            let rows_read = match &err {
                ReportError::NoActionableRows { rows_read } => *rows_read,
                _ => 0,
            };
            let outcome = err.kind();
            Fragment {
                html: render_fragment(schema, Err(err)),
                snapshot,
                rows_read,
                rows_retained: 0,
                outcome,
            }
        }
    }
}

/// Produces the report page at `config.output_path`.
///
/// Only a failed write is returned as an error; data problems end up on the
/// page itself.
pub fn run(config: &Config, now: DateTime<Utc>) -> Result<RunSummary> {
    let _scope = ProfileScope::new("run");
    let schema = DisplaySchema::default();
    let fragment = build_fragment(config, &schema);

    let timestamp = format_timestamp(now);
    let page = assemble_page(&fragment.html, &timestamp);
    write_page(&config.output_path, &page)?;

    let summary = RunSummary {
        snapshot: fragment.snapshot.as_ref().map(|p| p.display().to_string()),
        rows_read: fragment.rows_read,
        rows_retained: fragment.rows_retained,
        outcome: fragment.outcome.to_string(),
        output: config.output_path.display().to_string(),
        generated_at: timestamp,
    };
    let mut fields = match serde_json::to_value(&summary) {
        Ok(serde_json::Value::Object(map)) => map,
        _ => obj(&[]),
    };
    fields.insert("msg".to_string(), v_str("report generated"));
    info(Domain::System, "run_summary", fields);
    Ok(summary)
}
