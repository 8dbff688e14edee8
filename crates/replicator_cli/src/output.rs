//! Writes scenario results to the output directory.

use crate::chart::draw_share_chart;
use anyhow::{anyhow, Context, Result};
use replicator_core::export::trajectory_csv;
use replicator_core::ScenarioRun;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))
}

/// Writes `<name>.csv` into `dir` and returns its path.
pub fn write_csv(run: &ScenarioRun, dir: &Path) -> Result<PathBuf> {
    ensure_dir(dir)?;
    let path = dir.join(format!("{}.csv", run.name));
    let contents = trajectory_csv(&run.trajectory, run.labels.as_slice())
        .with_context(|| format!("failed to format {} as CSV", run.name))?;
    fs::write(&path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    info!("wrote {}", path.display());
    Ok(path)
}

/// Renders `<name>.svg` into `dir` and returns its path.
pub fn write_chart(run: &ScenarioRun, dir: &Path) -> Result<PathBuf> {
    ensure_dir(dir)?;
    let path = dir.join(format!("{}.svg", run.name));
    draw_share_chart(run, &path)
        .map_err(|err| anyhow!("failed to render {}: {err}", path.display()))?;
    info!("wrote {}", path.display());
    Ok(path)
}

/// One-line summary of the final mix, e.g. `Fossil=0.012 Nuclear=0.210 ...`.
pub fn final_mix_summary(run: &ScenarioRun) -> String {
    match run.final_shares() {
        Some(shares) => run
            .labels
            .iter()
            .zip(shares)
            .map(|(label, share)| format!("{label}={share:.3}"))
            .collect::<Vec<_>>()
            .join(" "),
        None => String::from("<empty>"),
    }
}
