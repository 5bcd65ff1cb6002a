//! Snapshot files on disk, picked through native dialogs.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum FileOpError {
    #[error("could not write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

const FILTER_NAME: &str = "Tabboard backup";

/// Ask where to save `json`. `Ok(None)` means the dialog was dismissed.
pub fn save_snapshot(json: &str) -> Result<Option<PathBuf>, FileOpError> {
    let dialog = rfd::FileDialog::new()
        .set_title("Export dashboard")
        .set_file_name("tabboard-backup.json")
        .add_filter(FILTER_NAME, &["json"]);
    let Some(path) = dialog.save_file() else {
        return Ok(None);
    };
    std::fs::write(&path, json).map_err(|source| FileOpError::Write {
        path: path.clone(),
        source,
    })?;
    log::info!("Exported dashboard to {:?}", path);
    Ok(Some(path))
}

/// Ask for a backup file and read it. `Ok(None)` means the dialog was
/// dismissed.
pub fn open_snapshot() -> Result<Option<String>, FileOpError> {
    let dialog = rfd::FileDialog::new()
        .set_title("Import dashboard")
        .add_filter(FILTER_NAME, &["json"]);
    let Some(path) = dialog.pick_file() else {
        return Ok(None);
    };
    std::fs::read_to_string(&path)
        .map(Some)
        .map_err(|source| FileOpError::Read { path, source })
}
