use std::path::{Path, PathBuf};

pub const DATA_DIR: &str = "data_archive";
pub const SNAPSHOT_PATTERN: &str = "sackmann_matchups_*.csv";
pub const OUTPUT_HTML_FILE: &str = "index.html";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Directory scanned for snapshot files.
    pub data_dir: PathBuf,
    /// File-name glob (`*` and `?`) a snapshot must match.
    pub snapshot_pattern: String,
    /// Report destination, overwritten on every run.
    pub output_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DATA_DIR),
            snapshot_pattern: SNAPSHOT_PATTERN.to_string(),
            output_path: PathBuf::from(OUTPUT_HTML_FILE),
        }
    }
}

impl Config {
    /// Same layout as the default, with both paths resolved under `base`.
    pub fn rooted_at(base: &Path) -> Self {
        Self {
            data_dir: base.join(DATA_DIR),
            snapshot_pattern: SNAPSHOT_PATTERN.to_string(),
            output_path: base.join(OUTPUT_HTML_FILE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rooted_config_keeps_pattern() {
        let cfg = Config::rooted_at(Path::new("/srv/report"));
        assert_eq!(cfg.data_dir, PathBuf::from("/srv/report/data_archive"));
        assert_eq!(cfg.output_path, PathBuf::from("/srv/report/index.html"));
        assert_eq!(cfg.snapshot_pattern, Config::default().snapshot_pattern);
    }
}
