//! Pixel format conversion into 8-bit layouts.
//!
//! Every source format expands to RGBA u8 per pixel, then projects onto the
//! target channel layout. Wider samples are reduced to their high byte (u16)
//! or scaled and rounded (f32).

use bytemuck::pod_read_unaligned;
use rayon::prelude::*;

use crate::common::color_format::*;
use crate::common::error::{Error, Result};
use crate::image::Image;

pub(crate) fn convert_image(from: &Image, to: &mut Image) -> Result<()> {
    let src_desc = *from.desc();
    let dst_desc = *to.desc();

    if !dst_desc.color_format.is_u8() {
        return Err(Error::UnsupportedFormat(format!(
            "conversion target must be 8-bit unsigned, got {}",
            dst_desc.color_format
        )));
    }
    assert_eq!(src_desc.width, dst_desc.width, "width mismatch");
    assert_eq!(src_desc.height, dst_desc.height, "height mismatch");

    let width = src_desc.width as usize;
    let src_format = src_desc.color_format;
    let src_bpp = src_format.byte_count() as usize;
    let src_channels = src_format.channel_count;
    let dst_channels = dst_desc.color_format.channel_count;
    let dst_bpp = dst_channels.channel_count() as usize;
    let src_stride = src_desc.stride;
    let src_bytes = from.bytes();

    to.bytes_mut()
        .par_chunks_mut(dst_desc.stride)
        .enumerate()
        .for_each(|(y, dst_row)| {
            let src_row = &src_bytes[y * src_stride..y * src_stride + width * src_bpp];
            for x in 0..width {
                let src_px = &src_row[x * src_bpp..(x + 1) * src_bpp];
                let rgba = expand_to_rgba(src_px, src_format, src_channels);
                project(rgba, dst_channels, &mut dst_row[x * dst_bpp..(x + 1) * dst_bpp]);
            }
        });

    Ok(())
}

#[inline]
fn sample_u8(px: &[u8], index: usize, format: ColorFormat) -> u8 {
    match (format.channel_size, format.channel_type) {
        (ChannelSize::_8bit, _) => px[index],
        (ChannelSize::_16bit, _) => {
            let v: u16 = pod_read_unaligned(&px[index * 2..index * 2 + 2]);
            (v >> 8) as u8
        }
        (ChannelSize::_32bit, ChannelType::Float) => {
            let v: f32 = pod_read_unaligned(&px[index * 4..index * 4 + 4]);
            (v.clamp(0.0, 1.0) * 255.0).round() as u8
        }
        (ChannelSize::_32bit, ChannelType::UInt) => {
            let v: u32 = pod_read_unaligned(&px[index * 4..index * 4 + 4]);
            (v >> 24) as u8
        }
    }
}

#[inline]
fn expand_to_rgba(px: &[u8], format: ColorFormat, channels: ChannelCount) -> [u8; 4] {
    match channels {
        ChannelCount::L => {
            let l = sample_u8(px, 0, format);
            [l, l, l, 255]
        }
        ChannelCount::LA => {
            let l = sample_u8(px, 0, format);
            [l, l, l, sample_u8(px, 1, format)]
        }
        ChannelCount::Rgb => [
            sample_u8(px, 0, format),
            sample_u8(px, 1, format),
            sample_u8(px, 2, format),
            255,
        ],
        ChannelCount::Rgba => [
            sample_u8(px, 0, format),
            sample_u8(px, 1, format),
            sample_u8(px, 2, format),
            sample_u8(px, 3, format),
        ],
    }
}

/// Rec. 709 luminance in integer arithmetic.
#[inline]
fn luminance_u8(r: u8, g: u8, b: u8) -> u8 {
    ((2126 * r as u32 + 7152 * g as u32 + 722 * b as u32 + 5000) / 10000) as u8
}

#[inline]
fn project(rgba: [u8; 4], channels: ChannelCount, out: &mut [u8]) {
    let [r, g, b, a] = rgba;
    match channels {
        ChannelCount::L => out[0] = luminance_u8(r, g, b),
        ChannelCount::LA => {
            out[0] = luminance_u8(r, g, b);
            out[1] = a;
        }
        ChannelCount::Rgb => out.copy_from_slice(&[r, g, b]),
        ChannelCount::Rgba => out.copy_from_slice(&rgba),
    }
}
