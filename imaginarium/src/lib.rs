#![allow(dead_code)]

mod common;
mod image;
mod ops;

pub mod prelude;

pub use prelude::*;

// Color formats
pub use crate::common::{ALL_FORMATS, ChannelCount, ChannelSize, ChannelType, ColorFormat};

// Colors
pub use crate::common::Color;

// Error handling
pub use crate::common::{Error, Result};

// Image types
pub use crate::image::{DEFAULT_QUALITY, EncodeFormat, Image, ImageDesc, SUPPORTED_EXTENSIONS};

// Operations
pub use crate::ops::{ResampleFilter, half_size};

// Comparison helpers
pub use crate::common::image_diff::{max_pixel_diff, pixels_equal};
