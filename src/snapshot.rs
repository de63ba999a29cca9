use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::logging::{info, obj, v_num, v_str, warn, Domain};

/// Newest regular file in `dir` whose name matches `pattern`.
///
/// Missing or unreadable directories are reported as `None` with a warning;
/// they are never an error. Entries with equal modification times are
/// ordered by file name and the last one wins.
pub fn find_latest_snapshot(dir: &Path, pattern: &str) -> Option<PathBuf> {
    info(
        Domain::Locate,
        "search",
        obj(&[("dir", v_str(&dir.display().to_string())), ("pattern", v_str(pattern))]),
    );

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn(
                Domain::Locate,
                "dir_unreadable",
                obj(&[
                    ("msg", v_str(&err.to_string())),
                    ("dir", v_str(&dir.display().to_string())),
                ]),
            );
            return None;
        }
    };

    let mut name_matches = 0usize;
    let mut best: Option<(SystemTime, String, PathBuf)> = None;
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !glob_match(pattern, &name) {
            continue;
        }
        name_matches += 1;
        let path = entry.path();
        // follows symlinks, like the directory listing a user would see
        let meta = match fs::metadata(&path) {
            Ok(meta) => meta,
            Err(_) => continue,
        };
        if !meta.is_file() {
            continue;
        }
        let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        let newer = match &best {
            None => true,
            Some((best_time, best_name, _)) => (modified, &name) > (*best_time, best_name),
        };
        if newer {
            best = Some((modified, name, path));
        }
    }

    match best {
        Some((_, _, path)) => {
            info(
                Domain::Locate,
                "snapshot_found",
                obj(&[
                    ("path", v_str(&path.display().to_string())),
                    ("candidates", v_num(name_matches as f64)),
                ]),
            );
            Some(path)
        }
        None => {
            let msg = if name_matches == 0 {
                "no files match pattern"
            } else {
                "pattern matched only non-file entries"
            };
            warn(
                Domain::Locate,
                "snapshot_missing",
                obj(&[
                    ("msg", v_str(msg)),
                    ("dir", v_str(&dir.display().to_string())),
                    ("pattern", v_str(pattern)),
                ]),
            );
            None
        }
    }
}

/// File-name glob: `*` matches any run of characters, `?` exactly one.
pub fn glob_match(pattern: &str, name: &str) -> bool {
    let p: Vec<char> = pattern.chars().collect();
    let n: Vec<char> = name.chars().collect();
    let (mut pi, mut ni) = (0usize, 0usize);
    // position of the last `*` and the name index it was tried against
    let mut star: Option<(usize, usize)> = None;

    while ni < n.len() {
        if pi < p.len() && (p[pi] == '?' || p[pi] == n[ni]) {
            pi += 1;
            ni += 1;
        } else if pi < p.len() && p[pi] == '*' {
            star = Some((pi, ni));
            pi += 1;
        } else if let Some((star_pi, star_ni)) = star {
            pi = star_pi + 1;
            ni = star_ni + 1;
            star = Some((star_pi, star_ni + 1));
        } else {
            return false;
        }
    }
    while pi < p.len() && p[pi] == '*' {
        pi += 1;
    }
    pi == p.len()
}

/// Hex SHA-256 of snapshot content already read into memory.
pub fn content_digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
