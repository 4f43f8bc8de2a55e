use clap::Parser;
use winit::event_loop::EventLoop;

use slideshow::cli::Cli;
use slideshow::files::{list_images, shuffle, IMAGE_EXTENSIONS};
use slideshow::ui::state::{Options, SlideshowState};
use slideshow::ui::App;
use slideshow::Error;

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut paths = match list_images(&cli.folder_path, IMAGE_EXTENSIONS, cli.orientation()) {
        Ok(paths) => paths,
        Err(e) => {
            log::error!("{}", e);
            return Ok(());
        }
    };
    if paths.is_empty() {
        log::error!("{}", Error::NoImages(cli.folder_path.clone()));
        return Ok(());
    }
    if cli.random {
        shuffle(&mut paths);
    }
    log::info!("Starting slideshow of {} images", paths.len());

    let options = Options {
        interval: cli.interval(),
        mode: cli.display_mode(),
        orientation: cli.orientation(),
        random: cli.random,
    };
    let state = SlideshowState::new(paths, options, (1, 1));

    let event_loop = EventLoop::new()?;
    let mut app = App::new(state);
    event_loop.run_app(&mut app)?;
    Ok(())
}
