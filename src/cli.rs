use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

use crate::files::Orientation;
use crate::loader::DisplayMode;

pub const HELP_KEYS: &str = "\
Key Bindings:
  Esc           : Quit
  Space         : Pause / resume
  Right         : Next image
  Left          : Previous image
  Enter         : Cycle display mode (original / fit / cover)
";

#[derive(Parser, Debug)]
#[command(name = "slideshow", about = "Display images from a folder in a fullscreen slideshow", after_help = HELP_KEYS)]
pub struct Cli {
    /// Folder containing the images
    pub folder_path: PathBuf,

    /// Seconds between images
    #[arg(long, default_value = "5.0", value_parser = parse_interval)]
    pub interval: Duration,

    /// Start in original mode (actual size, file name shown)
    #[arg(long, conflicts_with = "cover")]
    pub original: bool,

    /// Start in cover mode (fill the screen, cropping if necessary)
    #[arg(long)]
    pub cover: bool,

    /// Display images in random order
    #[arg(long)]
    pub random: bool,

    /// Only show images wider than they are tall
    #[arg(long, conflicts_with = "vertical")]
    pub horizontal: bool,

    /// Only show images taller than they are wide
    #[arg(long)]
    pub vertical: bool,
}

impl Cli {
    pub fn display_mode(&self) -> DisplayMode {
        if self.original {
            DisplayMode::Original
        } else if self.cover {
            DisplayMode::Cover
        } else {
            DisplayMode::Fit
        }
    }

    pub fn orientation(&self) -> Option<Orientation> {
        if self.horizontal {
            Some(Orientation::Horizontal)
        } else if self.vertical {
            Some(Orientation::Vertical)
        } else {
            None
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

fn parse_interval(s: &str) -> Result<Duration, String> {
    let secs: f64 = s.parse().map_err(|_| format!("invalid interval '{s}'"))?;
    if !secs.is_finite() || secs <= 0.0 {
        return Err("interval must be a positive number of seconds".to_string());
    }
    Duration::try_from_secs_f64(secs).map_err(|_| format!("interval '{s}' is too large"))
}

#[derive(Parser, Debug)]
#[command(name = "copy-horizontal", about = "Copy horizontal JPG and PNG images from a source to a destination folder")]
pub struct CopyCli {
    /// Folder containing the images
    pub source_folder: PathBuf,

    /// Folder receiving the horizontal images (created if missing)
    pub destination_folder: PathBuf,
}
