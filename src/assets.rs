use crate::tables::{SPAWN_SUFFIX, TABLE_DIR};
use std::fs;
use std::path::Path;

#[derive(Debug, Default)]
pub struct AssetSummary {
    pub table_files: usize,
    pub spawn_files: usize,
    pub yaml_files: usize,
    pub missing_dir: bool,
}

/// Counts what sits under `<root>/tables/`. A missing directory is not an error;
/// the engine falls back to builtin tables.
pub fn scan(root: &Path) -> Result<AssetSummary, String> {
    let dir = root.join(TABLE_DIR);
    if !dir.is_dir() {
        return Ok(AssetSummary {
            missing_dir: true,
            ..AssetSummary::default()
        });
    }
    let entries =
        fs::read_dir(&dir).map_err(|err| format!("failed to read {}: {}", dir.display(), err))?;

    let mut summary = AssetSummary::default();
    for entry in entries.flatten() {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(SPAWN_SUFFIX) {
            summary.spawn_files += 1;
        } else if name.ends_with(".yml") || name.ends_with(".yaml") {
            summary.yaml_files += 1;
        } else if name.ends_with(".txt") {
            summary.table_files += 1;
        }
    }
    Ok(summary)
}
