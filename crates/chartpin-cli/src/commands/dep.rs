//! Dependency update command

use std::path::Path;

use crate::error::Result;
use chartpin_repo::DependencyUpdater;

/// Run `helm dependency update` for a chart with `HOME` set to `home`
pub async fn update(chart_path: &Path, home: &Path, helm: &str) -> Result<()> {
    DependencyUpdater::new(helm)
        .update(home, chart_path)
        .await?;

    println!("Updated dependencies of {}", chart_path.display());
    Ok(())
}
