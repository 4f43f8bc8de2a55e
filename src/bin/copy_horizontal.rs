use clap::Parser;

use slideshow::cli::CopyCli;
use slideshow::copy::copy_horizontal;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = CopyCli::parse();

    match copy_horizontal(&cli.source_folder, &cli.destination_folder) {
        Ok(report) => log::info!(
            "Finished. Copied {} horizontal images to {} ({} skipped, {} failed)",
            report.copied,
            cli.destination_folder.display(),
            report.skipped,
            report.failed
        ),
        Err(e) => log::error!("{}", e),
    }
}
