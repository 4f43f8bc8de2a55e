use image::{Rgb, RgbImage};
use std::path::{Path, PathBuf};

/// Write a solid-colour image; the format follows the file extension.
pub fn write_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_pixel(width, height, Rgb([200, 40, 40]))
        .save(&path)
        .unwrap();
    path
}
