use image::{DynamicImage, RgbaImage};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::files::{self, Orientation};
use crate::loader::{decode_image, present, DisplayMode};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Delay before trying the next image after a decode failure.
pub const RETRY_DELAY: Duration = Duration::from_millis(100);

// ---------------------------------------------------------------------------
// Circular scans
// ---------------------------------------------------------------------------

/// First index at or after `start` (wrapping) accepted by `eligible`,
/// visiting each index at most once.
pub fn scan_forward(len: usize, start: usize, mut eligible: impl FnMut(usize) -> bool) -> Option<usize> {
    (0..len).map(|k| (start + k) % len).find(|&i| eligible(i))
}

/// First index at or before `start` (wrapping) accepted by `eligible`.
pub fn scan_backward(len: usize, start: usize, mut eligible: impl FnMut(usize) -> bool) -> Option<usize> {
    (0..len).map(|k| (start + len - k) % len).find(|&i| eligible(i))
}

// ---------------------------------------------------------------------------
// Slideshow state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    TogglePause,
    Next,
    Previous,
    CycleMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickKind {
    Advance,
    Retry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingTick {
    pub due: Instant,
    pub kind: TickKind,
}

/// What to put on screen: the prepared image and, in original mode, the file name.
pub struct Frame {
    pub pixels: RgbaImage,
    pub label: Option<String>,
}

pub struct Options {
    pub interval: Duration,
    pub mode: DisplayMode,
    pub orientation: Option<Orientation>,
    pub random: bool,
}

pub struct SlideshowState {
    paths: Vec<PathBuf>,
    options: Options,
    screen: (u32, u32),

    pub current_index: usize,
    pub last_shown: Option<usize>,
    pub paused: bool,
    pub mode: DisplayMode,
    pub pending: Option<PendingTick>,

    /// Decoded image on screen and its file name, kept for re-layout.
    shown: Option<(DynamicImage, String)>,
    pub frame: Option<Frame>,
    failures: usize,
    pub reshuffles: usize,
}

impl SlideshowState {
    pub fn new(paths: Vec<PathBuf>, options: Options, screen: (u32, u32)) -> Self {
        Self {
            paths,
            mode: options.mode,
            options,
            screen,
            current_index: 0,
            last_shown: None,
            paused: false,
            pending: None,
            shown: None,
            frame: None,
            failures: 0,
            reshuffles: 0,
        }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Show the first image. The session ends at once if nothing is eligible.
    pub fn start(&mut self) -> Flow {
        self.advance()
    }

    pub fn handle(&mut self, command: Command) -> Flow {
        log::debug!("[cmd] {:?} at index {}", command, self.current_index);
        match command {
            Command::Quit => Flow::Quit,
            Command::TogglePause => self.toggle_pause(),
            Command::Next => self.advance(),
            Command::Previous => self.previous(),
            Command::CycleMode => self.cycle_mode(),
        }
    }

    /// Fire the pending tick if it is due. Stale wake-ups are ignored.
    pub fn on_timer(&mut self, now: Instant) -> Flow {
        match self.pending {
            Some(tick) if tick.due <= now => {
                log::debug!("[timer] {:?} tick at index {}", tick.kind, self.current_index);
                self.advance()
            }
            _ => Flow::Continue,
        }
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.pending.map(|t| t.due)
    }

    /// Re-layout the image on screen for a new surface size.
    pub fn resize(&mut self, width: u32, height: u32) {
        let size = (width.max(1), height.max(1));
        if size == self.screen {
            return;
        }
        self.screen = size;
        self.refresh_frame();
    }

    fn advance(&mut self) -> Flow {
        self.pending = None;
        match self.next_eligible() {
            Some(idx) => self.show(idx),
            None => {
                log::info!("No eligible images left; ending slideshow.");
                Flow::Quit
            }
        }
    }

    /// Nearest eligible index at or after `current_index`.
    fn next_eligible(&self) -> Option<usize> {
        scan_forward(self.paths.len(), self.current_index, |i| self.is_eligible(i))
    }

    fn previous(&mut self) -> Flow {
        self.pending = None;
        let len = self.paths.len();
        if len == 0 {
            return Flow::Quit;
        }
        let start = match self.last_shown {
            Some(i) => (i + len - 1) % len,
            None => len - 1,
        };
        match scan_backward(len, start, |i| self.is_eligible(i)) {
            Some(idx) => self.show(idx),
            None => {
                log::debug!("[nav] no eligible image behind {}; showing current", start);
                self.show(self.current_index)
            }
        }
    }

    fn toggle_pause(&mut self) -> Flow {
        self.paused = !self.paused;
        if self.paused {
            self.pending = None;
            log::info!("Paused");
            Flow::Continue
        } else {
            log::info!("Resumed");
            self.advance()
        }
    }

    fn cycle_mode(&mut self) -> Flow {
        self.pending = None;
        if let Some(frame) = self.frame.as_mut() {
            frame.label = None;
        }
        self.mode = self.mode.next();
        log::info!("Display mode: {:?}", self.mode);
        if self.shown.is_none() {
            return self.advance();
        }
        // Same image, new layout; indices and path order stay put.
        self.refresh_frame();
        self.schedule(self.options.interval, TickKind::Advance);
        Flow::Continue
    }

    fn is_eligible(&self, idx: usize) -> bool {
        match self.options.orientation {
            Some(orientation) if !self.options.random => {
                files::matches_orientation(&self.paths[idx], orientation)
            }
            _ => true,
        }
    }

    /// Decode and present `idx`, then move `current_index` past it.
    fn show(&mut self, idx: usize) -> Flow {
        let len = self.paths.len();
        match decode_image(&self.paths[idx]) {
            Ok(img) => {
                let name = self.paths[idx]
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                self.failures = 0;
                self.shown = Some((img, name));
                self.refresh_frame();
                self.last_shown = Some(idx);
                log::debug!("[show] {} ({}/{})", self.paths[idx].display(), idx + 1, len);

                self.current_index = idx + 1;
                if self.current_index >= len {
                    self.current_index = 0;
                    if self.options.random {
                        files::shuffle(&mut self.paths);
                        self.reshuffles += 1;
                        log::debug!("[show] wrapped; reshuffled {} images", len);
                    }
                }
                self.schedule(self.options.interval, TickKind::Advance);
                Flow::Continue
            }
            Err(e) => {
                log::warn!("Error opening image {}", e);
                self.failures += 1;
                if self.failures >= len {
                    log::error!("No image in the list could be decoded; ending slideshow.");
                    return Flow::Quit;
                }
                self.current_index = (idx + 1) % len;
                self.schedule(RETRY_DELAY, TickKind::Retry);
                Flow::Continue
            }
        }
    }

    fn schedule(&mut self, delay: Duration, kind: TickKind) {
        if self.paused {
            self.pending = None;
            return;
        }
        // A delay past the end of the clock never fires.
        self.pending = Instant::now()
            .checked_add(delay)
            .map(|due| PendingTick { due, kind });
        if self.pending.is_none() {
            log::debug!("[timer] {:?} delay of {:?} is out of range; not scheduling", kind, delay);
        }
    }

    fn refresh_frame(&mut self) {
        let Some((img, name)) = self.shown.as_ref() else { return };
        let (sw, sh) = self.screen;
        self.frame = Some(Frame {
            pixels: present(img, sw, sh, self.mode),
            label: (self.mode == DisplayMode::Original).then(|| name.clone()),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::write_image;
    use std::fs;
    use std::path::Path;
    use tempfile::{tempdir, TempDir};

    const SCREEN: (u32, u32) = (32, 24);

    fn options(mode: DisplayMode, orientation: Option<Orientation>, random: bool) -> Options {
        Options {
            interval: Duration::from_secs(5),
            mode,
            orientation,
            random,
        }
    }

    fn folder(images: &[(&str, u32, u32)]) -> (TempDir, Vec<PathBuf>) {
        let tmp = tempdir().unwrap();
        let paths = images
            .iter()
            .map(|&(name, w, h)| write_image(tmp.path(), name, w, h))
            .collect();
        (tmp, paths)
    }

    fn slideshow(paths: Vec<PathBuf>, opts: Options) -> SlideshowState {
        SlideshowState::new(paths, opts, SCREEN)
    }

    fn shown_name(state: &SlideshowState) -> String {
        let idx = state.last_shown.unwrap();
        name_of(&state.paths()[idx])
    }

    fn name_of(path: &Path) -> String {
        path.file_name().unwrap().to_string_lossy().into_owned()
    }

    #[test]
    fn forward_scan_finds_nearest_at_or_after_start() {
        let eligible = |i: usize| i == 2 || i == 5;
        assert_eq!(scan_forward(8, 0, eligible), Some(2));
        assert_eq!(scan_forward(8, 2, eligible), Some(2));
        assert_eq!(scan_forward(8, 3, eligible), Some(5));
        assert_eq!(scan_forward(8, 6, eligible), Some(2));
        assert_eq!(scan_forward(0, 0, eligible), None);

        let mut calls = 0;
        assert_eq!(scan_forward(8, 3, |_| { calls += 1; false }), None);
        assert_eq!(calls, 8);
    }

    #[test]
    fn backward_scan_finds_nearest_at_or_before_start() {
        let eligible = |i: usize| i == 2 || i == 5;
        assert_eq!(scan_backward(8, 4, eligible), Some(2));
        assert_eq!(scan_backward(8, 5, eligible), Some(5));
        assert_eq!(scan_backward(8, 1, eligible), Some(5));
        assert_eq!(scan_backward(8, 7, eligible), Some(5));

        let mut calls = 0;
        assert_eq!(scan_backward(8, 0, |_| { calls += 1; false }), None);
        assert_eq!(calls, 8);
    }

    #[test]
    fn advances_in_order_and_wraps() {
        let (_tmp, paths) = folder(&[("a.png", 8, 4), ("b.png", 8, 4), ("c.png", 8, 4)]);
        let mut state = slideshow(paths, options(DisplayMode::Fit, None, false));

        assert_eq!(state.start(), Flow::Continue);
        assert_eq!(shown_name(&state), "a.png");
        assert_eq!(state.current_index, 1);
        assert_eq!(state.pending.map(|t| t.kind), Some(TickKind::Advance));

        let mut seen = Vec::new();
        for _ in 0..3 {
            assert_eq!(state.handle(Command::Next), Flow::Continue);
            seen.push(shown_name(&state));
        }
        assert_eq!(seen, vec!["b.png", "c.png", "a.png"]);
        assert_eq!(state.reshuffles, 0);
    }

    #[test]
    fn timer_fires_only_when_due() {
        let (_tmp, paths) = folder(&[("a.png", 8, 4), ("b.png", 8, 4)]);
        let mut state = slideshow(paths, options(DisplayMode::Fit, None, false));
        state.start();

        assert_eq!(state.on_timer(Instant::now()), Flow::Continue);
        assert_eq!(shown_name(&state), "a.png");

        let due = state.next_due().unwrap();
        assert_eq!(state.on_timer(due), Flow::Continue);
        assert_eq!(shown_name(&state), "b.png");
        assert!(state.next_due().unwrap() >= due);
    }

    #[test]
    fn previous_walks_backwards_from_last_shown() {
        let (_tmp, paths) = folder(&[("a.png", 8, 4), ("b.png", 8, 4), ("c.png", 8, 4)]);
        let mut state = slideshow(paths, options(DisplayMode::Fit, None, false));
        state.start();
        state.handle(Command::Next);
        assert_eq!(shown_name(&state), "b.png");

        state.handle(Command::Previous);
        assert_eq!(shown_name(&state), "a.png");
        assert_eq!(state.current_index, 1);

        state.handle(Command::Previous);
        assert_eq!(shown_name(&state), "c.png");
        assert!(state.pending.is_some());
    }

    #[test]
    fn previous_before_anything_shown_starts_at_the_end() {
        let (_tmp, paths) = folder(&[("a.png", 8, 4), ("b.png", 8, 4), ("c.png", 8, 4)]);
        let mut state = slideshow(paths, options(DisplayMode::Fit, None, false));
        state.handle(Command::Previous);
        assert_eq!(shown_name(&state), "c.png");
        assert_eq!(state.current_index, 0);
    }

    #[test]
    fn orientation_is_rechecked_per_candidate() {
        let (_tmp, paths) = folder(&[("a.png", 8, 4), ("b.png", 4, 8), ("c.png", 8, 4)]);
        let mut state = slideshow(paths, options(DisplayMode::Fit, Some(Orientation::Horizontal), false));
        state.start();
        assert_eq!(shown_name(&state), "a.png");
        state.handle(Command::Next);
        assert_eq!(shown_name(&state), "c.png");
        state.handle(Command::Next);
        assert_eq!(shown_name(&state), "a.png");
        state.handle(Command::Previous);
        assert_eq!(shown_name(&state), "c.png");
    }

    #[test]
    fn nothing_eligible_ends_the_session() {
        let (_tmp, paths) = folder(&[("a.png", 4, 8), ("b.png", 4, 8)]);
        let mut state = slideshow(paths, options(DisplayMode::Fit, Some(Orientation::Horizontal), false));
        assert_eq!(state.start(), Flow::Quit);
        assert!(state.frame.is_none());
    }

    #[test]
    fn previous_without_eligible_image_falls_back_to_current() {
        let (_tmp, paths) = folder(&[("a.png", 8, 4), ("b.png", 8, 4)]);
        let mut state = slideshow(paths, options(DisplayMode::Fit, Some(Orientation::Horizontal), false));
        state.start();
        assert_eq!(state.current_index, 1);
        // Both files turn vertical on disk while the slideshow runs.
        for p in state.paths().to_vec() {
            write_image(p.parent().unwrap(), &name_of(&p), 4, 8);
        }
        assert_eq!(state.handle(Command::Previous), Flow::Continue);
        assert_eq!(shown_name(&state), "b.png");
    }

    #[test]
    fn pause_cancels_and_resume_shows_next() {
        let (_tmp, paths) = folder(&[("a.png", 8, 4), ("b.png", 8, 4), ("c.png", 8, 4)]);
        let mut state = slideshow(paths, options(DisplayMode::Fit, None, false));
        state.start();

        state.handle(Command::TogglePause);
        assert!(state.paused);
        assert!(state.pending.is_none());

        state.handle(Command::Next);
        assert_eq!(shown_name(&state), "b.png");
        assert!(state.pending.is_none());

        state.handle(Command::TogglePause);
        assert!(!state.paused);
        assert_eq!(shown_name(&state), "c.png");
        assert!(state.pending.is_some());
    }

    #[test]
    fn cycling_mode_rerenders_the_same_image() {
        let (_tmp, paths) = folder(&[("a.png", 64, 16), ("b.png", 8, 4)]);
        let mut state = slideshow(paths, options(DisplayMode::Original, None, false));
        state.start();
        let frame = state.frame.as_ref().unwrap();
        assert_eq!(frame.pixels.dimensions(), (64, 16));
        assert_eq!(frame.label.as_deref(), Some("a.png"));

        state.handle(Command::CycleMode);
        assert_eq!(state.mode, DisplayMode::Fit);
        assert_eq!(shown_name(&state), "a.png");
        let frame = state.frame.as_ref().unwrap();
        assert_eq!(frame.pixels.dimensions(), (32, 8));
        assert!(frame.label.is_none());

        state.handle(Command::CycleMode);
        assert_eq!(state.mode, DisplayMode::Cover);
        assert_eq!(state.frame.as_ref().unwrap().pixels.dimensions(), SCREEN);

        state.handle(Command::CycleMode);
        assert_eq!(state.mode, DisplayMode::Original);
        assert_eq!(shown_name(&state), "a.png");
        assert_eq!(state.current_index, 1);
    }

    #[test]
    fn resize_relayouts_without_moving() {
        let (_tmp, paths) = folder(&[("a.png", 8, 4), ("b.png", 8, 4)]);
        let mut state = slideshow(paths, options(DisplayMode::Cover, None, false));
        state.start();
        let due = state.next_due();
        state.resize(50, 40);
        assert_eq!(state.frame.as_ref().unwrap().pixels.dimensions(), (50, 40));
        assert_eq!(shown_name(&state), "a.png");
        assert_eq!(state.next_due(), due);
    }

    #[test]
    fn decode_failure_skips_with_short_retry() {
        let (tmp, mut paths) = folder(&[("a.png", 8, 4), ("c.png", 8, 4)]);
        let broken = tmp.path().join("b.png");
        fs::write(&broken, b"not a png").unwrap();
        paths.insert(1, broken);

        let mut state = slideshow(paths, options(DisplayMode::Fit, None, false));
        state.start();
        let before = Instant::now();
        state.handle(Command::Next);
        assert_eq!(shown_name(&state), "a.png");
        assert_eq!(state.current_index, 2);
        let tick = state.pending.unwrap();
        assert_eq!(tick.kind, TickKind::Retry);
        assert!(tick.due < before + Duration::from_secs(1));

        assert_eq!(state.on_timer(tick.due), Flow::Continue);
        assert_eq!(shown_name(&state), "c.png");
    }

    #[test]
    fn all_images_failing_ends_the_session() {
        let tmp = tempdir().unwrap();
        let paths: Vec<PathBuf> = ["a.png", "b.png"]
            .iter()
            .map(|n| {
                let p = tmp.path().join(n);
                fs::write(&p, b"junk").unwrap();
                p
            })
            .collect();
        let mut state = slideshow(paths, options(DisplayMode::Fit, None, false));
        assert_eq!(state.start(), Flow::Continue);
        let due = state.next_due().unwrap();
        assert_eq!(state.on_timer(due), Flow::Quit);
    }

    #[test]
    fn random_mode_reshuffles_on_wrap() {
        let (_tmp, paths) = folder(&[("a.png", 8, 4), ("b.png", 8, 4), ("c.png", 8, 4)]);
        let mut expected: Vec<String> = paths.iter().map(|p| name_of(p)).collect();
        let mut state = slideshow(paths, options(DisplayMode::Fit, None, true));

        state.start();
        state.handle(Command::Next);
        assert_eq!(state.reshuffles, 0);
        state.handle(Command::Next);
        assert_eq!(state.reshuffles, 1);
        assert_eq!(state.current_index, 0);

        let mut names: Vec<String> = state.paths().iter().map(|p| name_of(p)).collect();
        names.sort();
        expected.sort();
        assert_eq!(names, expected);
    }

    #[test]
    fn quit_command_ends_the_session() {
        let (_tmp, paths) = folder(&[("a.png", 8, 4)]);
        let mut state = slideshow(paths, options(DisplayMode::Fit, None, false));
        state.start();
        assert_eq!(state.handle(Command::Quit), Flow::Quit);
    }

    #[test]
    fn cycling_after_random_wrap_keeps_image_and_order() {
        let (_tmp, paths) = folder(&[
            ("a.png", 8, 4),
            ("b.png", 8, 4),
            ("c.png", 8, 4),
            ("d.png", 8, 4),
        ]);
        let mut state = slideshow(paths, options(DisplayMode::Fit, None, true));
        state.start();
        for _ in 0..3 {
            state.handle(Command::Next);
        }
        assert_eq!(state.reshuffles, 1);
        let shown = state.shown.as_ref().unwrap().1.clone();
        let order = state.paths().to_vec();

        state.handle(Command::CycleMode);
        assert_eq!(state.mode, DisplayMode::Cover);
        assert_eq!(state.shown.as_ref().unwrap().1, shown);
        assert_eq!(state.frame.as_ref().unwrap().pixels.dimensions(), SCREEN);
        assert_eq!(state.reshuffles, 1);
        assert_eq!(state.paths(), &order[..]);
        assert_eq!(state.current_index, 0);
        assert_eq!(state.pending.map(|t| t.kind), Some(TickKind::Advance));
    }

    #[test]
    fn cycling_while_paused_does_not_schedule() {
        let (_tmp, paths) = folder(&[("a.png", 8, 4), ("b.png", 8, 4)]);
        let mut state = slideshow(paths, options(DisplayMode::Fit, None, false));
        state.start();
        state.handle(Command::TogglePause);
        state.handle(Command::CycleMode);
        assert!(state.pending.is_none());
        assert_eq!(shown_name(&state), "a.png");
    }

    #[test]
    fn huge_interval_is_never_due() {
        let (_tmp, paths) = folder(&[("a.png", 8, 4), ("b.png", 8, 4)]);
        let mut opts = options(DisplayMode::Fit, None, false);
        opts.interval = Duration::from_secs(u64::MAX);
        let mut state = slideshow(paths, opts);
        assert_eq!(state.start(), Flow::Continue);
        assert_eq!(shown_name(&state), "a.png");
        assert!(state.next_due().is_none());
        assert_eq!(state.on_timer(Instant::now()), Flow::Continue);
        assert_eq!(shown_name(&state), "a.png");
    }
}
