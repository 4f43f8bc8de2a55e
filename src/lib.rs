pub mod cli;
pub mod copy;
pub mod error;
pub mod files;
pub mod loader;
pub mod ui;

pub use error::{Error, Result};

#[cfg(test)]
pub(crate) mod fixtures;
