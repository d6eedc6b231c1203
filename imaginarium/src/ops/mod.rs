mod blit;
mod fill;
mod resample;

pub use resample::{ResampleFilter, half_size};
