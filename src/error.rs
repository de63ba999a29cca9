use std::path::PathBuf;

use thiserror::Error;

/// Why a snapshot that exists still yields no data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyCause {
    /// The file has zero bytes.
    ZeroBytes,
    /// A header parsed but no data rows followed.
    NoRows,
    /// The content could not be read as CSV.
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Error: Could not find latest data file ({pattern}) in {dir}.")]
    SnapshotNotFound { pattern: String, dir: String },

    #[error("Data file not found: {}", .path.display())]
    FileNotFound { path: PathBuf },

    #[error("{}", empty_message(.path, .cause))]
    EmptyData { path: PathBuf, cause: EmptyCause },

    #[error("{}", no_actionable_message(.rows_read))]
    NoActionableRows { rows_read: usize },

    #[error("Data is missing columns needed for display: {}.", .missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    #[error("Internal Error: Failed to generate valid HTML content.")]
    RenderFailure { detail: String },

    #[error("failed to write report to {}: {source}", .path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ReportError>;

impl ReportError {
    /// Only a failed write of the output page stops the run.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ReportError::WriteFailure { .. })
    }

    /// Short stable name used in log records and run summaries.
    pub fn kind(&self) -> &'static str {
        match self {
            ReportError::SnapshotNotFound { .. } => "snapshot_not_found",
            ReportError::FileNotFound { .. } => "file_not_found",
            ReportError::EmptyData { .. } => "empty_data",
            ReportError::NoActionableRows { .. } => "no_actionable_rows",
            ReportError::MissingColumns { .. } => "missing_columns",
            ReportError::RenderFailure { .. } => "render_failure",
            ReportError::WriteFailure { .. } => "write_failure",
        }
    }

    /// Underlying parser or formatter message kept out of the page text.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ReportError::EmptyData {
                cause: EmptyCause::Invalid(reason),
                ..
            } => Some(reason.as_str()),
            ReportError::RenderFailure { detail } => Some(detail.as_str()),
            _ => None,
        }
    }
}

fn empty_message(path: &std::path::Path, cause: &EmptyCause) -> String {
    match cause {
        EmptyCause::ZeroBytes => format!("Data file is empty: {}", path.display()),
        EmptyCause::NoRows => {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());
            format!("Data file '{}' contains no match data.", name)
        }
        EmptyCause::Invalid(_) => format!("Data file is empty or invalid: {}", path.display()),
    }
}

fn no_actionable_message(rows_read: &usize) -> &'static str {
    if *rows_read > 0 {
        "No upcoming matches found (all matches appear completed or have invalid data)."
    } else {
        "No upcoming matches found after filtering (original file might have been empty or only contained headers)."
    }
}
