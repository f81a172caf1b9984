use std::path::Path;

use distpack_build::prune;
use distpack_core::{DistpackConfig, PatternSet};

/// Print the paths a release would prune from the project.
pub fn preview(project_dir: &Path) -> anyhow::Result<()> {
    let config = DistpackConfig::load(project_dir)?;
    let ignore_path = project_dir.join(&config.release.ignore_file);
    let patterns = PatternSet::load(&ignore_path)?;

    if patterns.is_empty() {
        println!(
            "No rules in {}, nothing will be removed",
            config.release.ignore_file
        );
        return Ok(());
    }

    let paths = prune::plan(project_dir, &patterns);
    if paths.is_empty() {
        println!("No files match {}", config.release.ignore_file);
        return Ok(());
    }

    for path in &paths {
        println!("{path}");
    }
    println!();
    println!(
        "{} path(s) would be removed ({} exclude rule(s), {} include rule(s))",
        paths.len(),
        patterns.excludes.len(),
        patterns.includes.len()
    );
    Ok(())
}
