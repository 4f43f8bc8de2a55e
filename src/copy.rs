use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::files::{has_extension, read_dimensions, COPY_EXTENSIONS};

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CopyReport {
    pub copied: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Copy every horizontal JPG/PNG in `source` into `destination`, unchanged.
///
/// Per-file failures are logged and counted; files already copied stay in
/// place if a later one fails.
pub fn copy_horizontal(source: &Path, destination: &Path) -> Result<CopyReport> {
    if !source.is_dir() {
        return Err(Error::FolderNotFound(source.to_path_buf()));
    }
    if !destination.exists() {
        fs::create_dir_all(destination).map_err(|e| Error::io(destination, e))?;
        log::info!("Created destination folder: {}", destination.display());
    }

    let entries = fs::read_dir(source).map_err(|e| Error::io(source, e))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && has_extension(p, COPY_EXTENSIONS))
        .collect();
    files.sort();

    let mut report = CopyReport::default();
    for path in files {
        let Some(name) = path.file_name() else { continue };
        let (width, height) = match read_dimensions(&path) {
            Ok(dims) => dims,
            Err(e) => {
                log::warn!("Error processing {}", e);
                report.failed += 1;
                continue;
            }
        };

        if width <= height {
            log::info!("Skipped (vertical/square): {}", name.to_string_lossy());
            report.skipped += 1;
            continue;
        }

        let target = destination.join(name);
        match fs::copy(&path, &target) {
            Ok(_) => {
                if let Err(e) = copy_modified_time(&path, &target) {
                    log::warn!("Could not keep modification time of {}", e);
                }
                log::info!("Copied: {}", name.to_string_lossy());
                report.copied += 1;
            }
            Err(e) => {
                log::warn!("Error processing {}", Error::io(&path, e));
                report.failed += 1;
            }
        }
    }
    Ok(report)
}

fn copy_modified_time(source: &Path, target: &Path) -> Result<()> {
    let modified = fs::metadata(source)
        .and_then(|m| m.modified())
        .map_err(|e| Error::io(source, e))?;
    fs::File::options()
        .write(true)
        .open(target)
        .and_then(|f| f.set_modified(modified))
        .map_err(|e| Error::io(target, e))
}
