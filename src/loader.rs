use image::imageops::FilterType;
use image::{DynamicImage, ImageReader, RgbaImage};
use std::path::Path;

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Display modes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// Unscaled, with the file name drawn in the corner.
    Original,
    /// Scaled to fit inside the screen, aspect preserved.
    Fit,
    /// Scaled to cover the screen, center-cropped.
    Cover,
}

impl DisplayMode {
    pub fn next(self) -> Self {
        match self {
            DisplayMode::Original => DisplayMode::Fit,
            DisplayMode::Fit => DisplayMode::Cover,
            DisplayMode::Cover => DisplayMode::Original,
        }
    }
}

// ---------------------------------------------------------------------------
// Geometry
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Target size of the resized image and the region of it to keep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub width: u32,
    pub height: u32,
    pub crop: Option<CropBox>,
}

pub fn layout(img_w: u32, img_h: u32, screen_w: u32, screen_h: u32, mode: DisplayMode) -> Layout {
    let (iw, ih) = (img_w.max(1) as f64, img_h.max(1) as f64);
    let (sw, sh) = (screen_w as f64, screen_h as f64);
    match mode {
        DisplayMode::Original => Layout {
            width: img_w,
            height: img_h,
            crop: None,
        },
        DisplayMode::Fit => {
            let scale = (sw / iw).min(sh / ih);
            Layout {
                width: ((iw * scale).round() as u32).clamp(1, screen_w.max(1)),
                height: ((ih * scale).round() as u32).clamp(1, screen_h.max(1)),
                crop: None,
            }
        }
        DisplayMode::Cover => {
            let scale = (sw / iw).max(sh / ih);
            // Rounding may land a pixel short of the screen; never crop past the edge.
            let width = ((iw * scale).round() as u32).max(screen_w);
            let height = ((ih * scale).round() as u32).max(screen_h);
            Layout {
                width,
                height,
                crop: Some(CropBox {
                    x: (width - screen_w) / 2,
                    y: (height - screen_h) / 2,
                    width: screen_w,
                    height: screen_h,
                }),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Decode + present
// ---------------------------------------------------------------------------

/// The format is sniffed from the content, so a misnamed file still decodes.
pub fn decode_image(path: &Path) -> Result<DynamicImage> {
    let reader = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| Error::io(path, e))?;
    reader.decode().map_err(|e| Error::decode(path, e))
}

/// Resize and crop a decoded image for a screen of the given size.
pub fn present(img: &DynamicImage, screen_w: u32, screen_h: u32, mode: DisplayMode) -> RgbaImage {
    let l = layout(img.width(), img.height(), screen_w, screen_h, mode);
    let resized = if (l.width, l.height) == (img.width(), img.height()) {
        img.clone()
    } else {
        img.resize_exact(l.width, l.height, FilterType::Lanczos3)
    };
    match l.crop {
        Some(c) => resized.crop_imm(c.x, c.y, c.width, c.height).to_rgba8(),
        None => resized.to_rgba8(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycling_three_times_returns_to_start() {
        for mode in [DisplayMode::Original, DisplayMode::Fit, DisplayMode::Cover] {
            assert_eq!(mode.next().next().next(), mode);
            assert_ne!(mode.next(), mode);
        }
    }

    #[test]
    fn original_keeps_size() {
        let l = layout(3000, 2000, 1920, 1080, DisplayMode::Original);
        assert_eq!((l.width, l.height, l.crop), (3000, 2000, None));
    }

    #[test]
    fn fit_contains_and_preserves_aspect() {
        let l = layout(2000, 1000, 1920, 1080, DisplayMode::Fit);
        assert_eq!((l.width, l.height), (1920, 960));
        assert!(l.crop.is_none());

        let l = layout(500, 1000, 1920, 1080, DisplayMode::Fit);
        assert_eq!((l.width, l.height), (540, 1080));
    }

    #[test]
    fn cover_fills_and_crops_centered() {
        let l = layout(1000, 1000, 1920, 1080, DisplayMode::Cover);
        assert_eq!((l.width, l.height), (1920, 1920));
        assert_eq!(
            l.crop,
            Some(CropBox { x: 0, y: 420, width: 1920, height: 1080 })
        );
    }

    #[test]
    fn cover_crop_never_exceeds_resized_image() {
        for (w, h) in [(1000, 563), (333, 777), (1921, 1079), (7, 3)] {
            let l = layout(w, h, 1920, 1080, DisplayMode::Cover);
            let c = l.crop.unwrap();
            assert!(c.x + c.width <= l.width);
            assert!(c.y + c.height <= l.height);
            assert_eq!((c.width, c.height), (1920, 1080));
        }
    }

    #[test]
    fn present_produces_screen_sized_cover() {
        let img = DynamicImage::new_rgba8(40, 10);
        let out = present(&img, 32, 24, DisplayMode::Cover);
        assert_eq!(out.dimensions(), (32, 24));

        let out = present(&img, 32, 24, DisplayMode::Fit);
        assert_eq!(out.dimensions(), (32, 8));

        let out = present(&img, 32, 24, DisplayMode::Original);
        assert_eq!(out.dimensions(), (40, 10));
    }

    #[test]
    fn decodes_by_content_not_extension() {
        let tmp = tempfile::tempdir().unwrap();
        let png = crate::fixtures::write_image(tmp.path(), "photo.png", 12, 6);
        let misnamed = tmp.path().join("photo.jpg");
        std::fs::rename(&png, &misnamed).unwrap();

        let img = decode_image(&misnamed).unwrap();
        assert_eq!((img.width(), img.height()), (12, 6));
        assert_eq!(crate::files::read_dimensions(&misnamed).unwrap(), (12, 6));
    }
}
