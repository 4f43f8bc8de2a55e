use std::io;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("folder '{}' not found", .0.display())]
    FolderNotFound(PathBuf),

    #[error("no supported image files found in '{}'", .0.display())]
    NoImages(PathBuf),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io { path: path.into(), source }
    }

    pub(crate) fn decode(path: impl Into<PathBuf>, source: image::ImageError) -> Self {
        Error::Decode { path: path.into(), source }
    }
}
