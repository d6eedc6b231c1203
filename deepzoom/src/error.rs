//! Error type for montage assembly and pyramid building.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while building a Deep Zoom pyramid. All are fatal.
#[derive(Debug, Error)]
pub enum Error {
    #[error(
        "Image '{path}' is {width}x{height}, expected {expected_width}x{expected_height}"
    )]
    InputMismatch {
        path: PathBuf,
        expected_width: u32,
        expected_height: u32,
        width: u32,
        height: u32,
    },

    #[error("{images} images do not fit a {cols}x{rows} grid")]
    Capacity { images: usize, cols: u32, rows: u32 },

    #[error("Failed to encode tile {col}_{row} of level {level}: {source}")]
    Encode {
        level: u32,
        col: u32,
        row: u32,
        #[source]
        source: imaginarium::Error,
    },

    #[error("I/O error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to decode '{path}': {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: imaginarium::Error,
    },

    #[error("Invalid descriptor '{path}': {reason}")]
    Descriptor { path: PathBuf, reason: String },

    #[error("Image operation failed: {0}")]
    Image(#[from] imaginarium::Error),

    #[error("Cancelled while building level {level}")]
    Cancelled { level: u32 },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }
}
