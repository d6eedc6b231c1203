pub mod cancel;
pub mod file_format;
pub mod file_utils;
pub mod log_setup;
pub mod parallel;
pub mod serde;

pub use crate::cancel::CancelToken;
pub use crate::file_format::{FileExtensionError, FileFormat, FileFormatResult, get_file_extension};
pub use crate::serde::{deserialize, read_file, serialize};
