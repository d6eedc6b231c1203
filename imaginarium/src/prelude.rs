pub use crate::common::{
    ChannelCount, ChannelSize, ChannelType, Color, ColorFormat, Error, Result,
};
pub use crate::image::{DEFAULT_QUALITY, EncodeFormat, Image, ImageDesc};
pub use crate::ops::ResampleFilter;
