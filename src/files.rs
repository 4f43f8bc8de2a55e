use image::ImageReader;
use rand::seq::SliceRandom;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::error::{Error, Result};

/// Extensions the slideshow will display.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "tiff"];

/// Extensions the copy tool considers.
pub const COPY_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

pub fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| extensions.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Horizontal,
    Vertical,
}

impl Orientation {
    /// Square images are neither horizontal nor vertical.
    pub fn accepts(self, width: u32, height: u32) -> bool {
        match self {
            Orientation::Horizontal => width > height,
            Orientation::Vertical => height > width,
        }
    }
}

/// Read width and height from the image header without decoding pixels.
pub fn read_dimensions(path: &Path) -> Result<(u32, u32)> {
    let reader = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| Error::io(path, e))?;
    reader.into_dimensions().map_err(|e| Error::decode(path, e))
}

/// Unreadable files never match; the failure is logged.
pub fn matches_orientation(path: &Path, orientation: Orientation) -> bool {
    match read_dimensions(path) {
        Ok((w, h)) => orientation.accepts(w, h),
        Err(e) => {
            log::warn!("Could not read dimensions to check orientation: {}", e);
            false
        }
    }
}

/// List the regular files in `folder` with an allowed extension, sorted, as
/// absolute paths. With an orientation filter, only matching images are kept.
pub fn list_images(
    folder: &Path,
    extensions: &[&str],
    orientation: Option<Orientation>,
) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(Error::FolderNotFound(folder.to_path_buf()));
    }
    let folder = fs::canonicalize(folder).map_err(|e| Error::io(folder, e))?;
    let start_time = Instant::now();

    let entries = fs::read_dir(&folder).map_err(|e| Error::io(&folder, e))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && has_extension(p, extensions))
        .collect();
    files.sort();

    let found = files.len();
    if let Some(orientation) = orientation {
        files = files
            .into_par_iter()
            .filter(|p| matches_orientation(p, orientation))
            .collect();
    }

    log::info!(
        "Listed {:?} in {:.2}s: {} images, {} after orientation filter",
        folder,
        start_time.elapsed().as_secs_f64(),
        found,
        files.len()
    );
    Ok(files)
}

pub fn shuffle(paths: &mut [PathBuf]) {
    paths.shuffle(&mut rand::rng());
}
