// Input discovery: expand command-line inputs into an ordered file list

use std::path::{Path, PathBuf};

use ctrsum_core::CtrError;

/// Extensions calamine can open.
pub const SPREADSHEET_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xls", "xlsb", "ods"];

/// Spreadsheet by extension (case-insensitive), excluding Excel lock files.
pub fn is_spreadsheet(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    if name.starts_with("~$") {
        return false;
    }
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SPREADSHEET_EXTENSIONS.iter().any(|ext| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

/// Expand inputs in the order given.
///
/// Files are taken as-is, whatever their extension; a bad one fails later
/// as a skipped file. Directories contribute their spreadsheet files (not
/// recursive), sorted by name. `exclude` (the output workbook) is never
/// returned, so re-running in the same directory does not read its own output.
pub fn discover_inputs(inputs: &[PathBuf], exclude: Option<&Path>) -> Result<Vec<PathBuf>, CtrError> {
    let excluded = exclude.map(canonical_or_self);
    let is_excluded = |p: &Path| excluded.as_ref().is_some_and(|x| canonical_or_self(p) == *x);

    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let entries = std::fs::read_dir(input)
                .map_err(|e| CtrError::Io(format!("cannot list {}: {}", input.display(), e)))?;
            let mut found: Vec<PathBuf> = entries
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.is_file() && is_spreadsheet(p))
                .collect();
            found.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
            tracing::debug!(dir = %input.display(), files = found.len(), "listed input directory");
            files.extend(found.into_iter().filter(|p| !is_excluded(p)));
        } else if input.exists() {
            if !is_excluded(input) {
                files.push(input.clone());
            }
        } else {
            return Err(CtrError::Io(format!("no such file or directory: {}", input.display())));
        }
    }
    Ok(files)
}

fn canonical_or_self(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}
