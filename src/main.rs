use anyhow::{Context, Result};
use chrono::Utc;

use odds_board::config::Config;
use odds_board::logging::{info, log_error_chain, obj, v_str, Domain, Level};
use odds_board::pipeline;

fn main() -> Result<()> {
    let cfg = Config::default();
    info(
        Domain::System,
        "start",
        obj(&[
            ("data_dir", v_str(&cfg.data_dir.display().to_string())),
            ("pattern", v_str(&cfg.snapshot_pattern)),
            ("output", v_str(&cfg.output_path.display().to_string())),
        ]),
    );

    let now = Utc::now();
    if let Err(err) = pipeline::run(&cfg, now) {
        log_error_chain(Level::Fatal, Domain::System, err.kind(), &err);
        return Err(err).context("report generation failed");
    }
    Ok(())
}
