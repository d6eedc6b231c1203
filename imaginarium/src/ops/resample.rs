//! 2x downsampling for building image pyramids.
//!
//! Output size is `ceil(w / 2) x ceil(h / 2)`. On odd sizes the last output
//! column/row covers a single source column/row.

use std::str::FromStr;

use ::image::imageops::FilterType;
use rayon::prelude::*;

use crate::image::io;
use crate::prelude::*;

/// Filter used to halve an image.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ResampleFilter {
    /// Top-left pixel of each 2x2 block. Fast, aliases.
    Nearest,
    /// Rounded mean of each 2x2 block (area average), weighted by alpha
    /// when the image has an alpha channel.
    #[default]
    Box,
    /// Lanczos windowed sinc with radius 3, via the `image` crate.
    Lanczos3,
}

impl FromStr for ResampleFilter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "nearest" => Ok(ResampleFilter::Nearest),
            "box" | "area" => Ok(ResampleFilter::Box),
            "lanczos3" | "lanczos" | "antialias" => Ok(ResampleFilter::Lanczos3),
            _ => Err(Error::UnsupportedFormat(format!("resample filter: {}", s))),
        }
    }
}

impl std::fmt::Display for ResampleFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResampleFilter::Nearest => write!(f, "nearest"),
            ResampleFilter::Box => write!(f, "box"),
            ResampleFilter::Lanczos3 => write!(f, "lanczos3"),
        }
    }
}

/// Size of an image after one halving step.
pub fn half_size(width: u32, height: u32) -> (u32, u32) {
    (width.div_ceil(2), height.div_ceil(2))
}

impl Image {
    /// Returns this 8-bit image downsampled by two in each axis, rounding up.
    pub fn downsample_half(&self, filter: ResampleFilter) -> Result<Image> {
        let desc = *self.desc();
        if !desc.color_format.is_u8() {
            return Err(Error::UnsupportedFormat(format!(
                "downsampling expects an 8-bit image, got {}",
                desc.color_format
            )));
        }

        let (out_w, out_h) = half_size(desc.width, desc.height);

        match filter {
            ResampleFilter::Nearest | ResampleFilter::Box => {
                let out_desc = ImageDesc::new(out_w, out_h, desc.color_format);
                let mut out = Image::new_empty(out_desc)?;
                halve_blocks(self, &mut out, filter == ResampleFilter::Box);
                Ok(out)
            }
            ResampleFilter::Lanczos3 => {
                let packed = if desc.is_packed() {
                    std::borrow::Cow::Borrowed(self)
                } else {
                    std::borrow::Cow::Owned(self.clone().packed())
                };
                let resized = io::to_dynamic(&packed)?.resize_exact(
                    out_w,
                    out_h,
                    FilterType::Lanczos3,
                );
                io::from_dynamic(resized)
            }
        }
    }
}

fn halve_blocks(src: &Image, out: &mut Image, average: bool) {
    let src_desc = *src.desc();
    let out_desc = *out.desc();
    let bpp = src_desc.color_format.byte_count() as usize;
    let (src_w, src_h) = (src_desc.width as usize, src_desc.height as usize);
    let src_stride = src_desc.stride;
    let src_bytes = src.bytes();
    let out_w = out_desc.width as usize;
    let alpha_index = src_desc.color_format.has_alpha().then(|| bpp - 1);

    out.bytes_mut()
        .par_chunks_mut(out_desc.stride)
        .enumerate()
        .for_each(|(oy, out_row)| {
            let y0 = oy * 2;
            let y1 = (y0 + 1).min(src_h - 1);
            let row0 = &src_bytes[y0 * src_stride..];
            let row1 = &src_bytes[y1 * src_stride..];

            for ox in 0..out_w {
                let x0 = ox * 2;
                let x1 = (x0 + 1).min(src_w - 1);
                let dst = &mut out_row[ox * bpp..(ox + 1) * bpp];

                if !average {
                    dst.copy_from_slice(&row0[x0 * bpp..(x0 + 1) * bpp]);
                    continue;
                }

                // Clamped duplicates are skipped so edge pixels are not over-weighted.
                let mut samples = [&row0[x0 * bpp..(x0 + 1) * bpp]; 4];
                let mut count = 1;
                if x1 != x0 {
                    samples[count] = &row0[x1 * bpp..(x1 + 1) * bpp];
                    count += 1;
                }
                if y1 != y0 {
                    samples[count] = &row1[x0 * bpp..(x0 + 1) * bpp];
                    count += 1;
                    if x1 != x0 {
                        samples[count] = &row1[x1 * bpp..(x1 + 1) * bpp];
                        count += 1;
                    }
                }

                average_pixels(&samples[..count], alpha_index, dst);
            }
        });
}

/// Rounded mean of `samples`. With an alpha channel the colors are weighted by
/// alpha, so fully transparent pixels do not bleed into their neighbours.
fn average_pixels(samples: &[&[u8]], alpha_index: Option<usize>, dst: &mut [u8]) {
    let count = samples.len() as u32;

    let Some(alpha) = alpha_index else {
        for (c, value) in dst.iter_mut().enumerate() {
            let sum: u32 = samples.iter().map(|px| px[c] as u32).sum();
            *value = ((sum + count / 2) / count) as u8;
        }
        return;
    };

    let alpha_sum: u32 = samples.iter().map(|px| px[alpha] as u32).sum();
    dst[alpha] = ((alpha_sum + count / 2) / count) as u8;

    for c in (0..dst.len()).filter(|&c| c != alpha) {
        dst[c] = if alpha_sum == 0 {
            0
        } else {
            let weighted: u32 = samples
                .iter()
                .map(|px| px[c] as u32 * px[alpha] as u32)
                .sum();
            ((weighted + alpha_sum / 2) / alpha_sum) as u8
        };
    }
}
