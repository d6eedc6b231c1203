use std::path::Path;

use ::image as image_lib;
use image_lib::codecs::jpeg::JpegEncoder;
use image_lib::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image_lib::{DynamicImage, ImageEncoder};

use super::EncodeFormat;
use crate::prelude::*;

pub(crate) fn load<P: AsRef<Path>>(filename: P) -> Result<Image> {
    let img = image_lib::open(filename)?;
    from_dynamic(img)
}

pub(crate) fn from_dynamic(img: DynamicImage) -> Result<Image> {
    let (channel_count, channel_size, channel_type) = match img.color() {
        image_lib::ColorType::L8 => (ChannelCount::L, ChannelSize::_8bit, ChannelType::UInt),
        image_lib::ColorType::L16 => (ChannelCount::L, ChannelSize::_16bit, ChannelType::UInt),
        image_lib::ColorType::La8 => (ChannelCount::LA, ChannelSize::_8bit, ChannelType::UInt),
        image_lib::ColorType::La16 => (ChannelCount::LA, ChannelSize::_16bit, ChannelType::UInt),
        image_lib::ColorType::Rgb8 => (ChannelCount::Rgb, ChannelSize::_8bit, ChannelType::UInt),
        image_lib::ColorType::Rgb16 => (ChannelCount::Rgb, ChannelSize::_16bit, ChannelType::UInt),
        image_lib::ColorType::Rgba8 => (ChannelCount::Rgba, ChannelSize::_8bit, ChannelType::UInt),
        image_lib::ColorType::Rgba16 => {
            (ChannelCount::Rgba, ChannelSize::_16bit, ChannelType::UInt)
        }
        image_lib::ColorType::Rgb32F => {
            (ChannelCount::Rgb, ChannelSize::_32bit, ChannelType::Float)
        }
        image_lib::ColorType::Rgba32F => {
            (ChannelCount::Rgba, ChannelSize::_32bit, ChannelType::Float)
        }
        _ => return Err(Error::UnsupportedColorType(format!("{:?}", img.color()))),
    };

    let color_format = ColorFormat::from((channel_count, channel_size, channel_type));
    let desc = ImageDesc::new_packed(img.width(), img.height(), color_format);

    Image::new_with_data(desc, img.into_bytes())
}

/// Wraps a packed 8-bit image as a `DynamicImage` (copies the pixels).
pub(crate) fn to_dynamic(image: &Image) -> Result<DynamicImage> {
    let desc = *image.desc();
    debug_assert!(desc.is_packed(), "Image must be packed");

    if !desc.color_format.is_u8() {
        return Err(Error::UnsupportedFormat(format!(
            "expected an 8-bit image, got {}",
            desc.color_format
        )));
    }

    let (w, h) = (desc.width, desc.height);
    let bytes = image.bytes().to_vec();
    let dynamic = match desc.color_format.channel_count {
        ChannelCount::L => image_lib::GrayImage::from_raw(w, h, bytes).map(DynamicImage::ImageLuma8),
        ChannelCount::LA => {
            image_lib::GrayAlphaImage::from_raw(w, h, bytes).map(DynamicImage::ImageLumaA8)
        }
        ChannelCount::Rgb => image_lib::RgbImage::from_raw(w, h, bytes).map(DynamicImage::ImageRgb8),
        ChannelCount::Rgba => {
            image_lib::RgbaImage::from_raw(w, h, bytes).map(DynamicImage::ImageRgba8)
        }
    };

    dynamic.ok_or_else(|| Error::InvalidRegion(format!("buffer does not match {}", desc)))
}

fn color_type_u8(image: &Image, format: EncodeFormat) -> Result<image_lib::ColorType> {
    let color_format = image.desc().color_format;

    if !color_format.is_u8() {
        return Err(Error::UnsupportedFormat(format!(
            "{} channel format: {}",
            format, color_format
        )));
    }

    match (format, color_format.channel_count) {
        (_, ChannelCount::L) => Ok(image_lib::ColorType::L8),
        (_, ChannelCount::Rgb) => Ok(image_lib::ColorType::Rgb8),
        (EncodeFormat::Png, ChannelCount::LA) => Ok(image_lib::ColorType::La8),
        (EncodeFormat::Png, ChannelCount::Rgba) => Ok(image_lib::ColorType::Rgba8),
        (EncodeFormat::Jpeg, channels) => Err(Error::UnsupportedFormat(format!(
            "JPEG color format: {}",
            channels
        ))),
    }
}

fn png_compression(quality: f32) -> CompressionType {
    // 0 (no effort) ..= 10 (max effort)
    let level = ((1.0 - quality.clamp(0.0, 1.0)) * 10.0).round() as u8;
    match level {
        0..=3 => CompressionType::Fast,
        4..=6 => CompressionType::Default,
        _ => CompressionType::Best,
    }
}

fn jpeg_quality(quality: f32) -> u8 {
    ((quality.clamp(0.0, 1.0) * 100.0).round() as u8).max(1)
}

pub(crate) fn encode(image: &Image, format: EncodeFormat, quality: f32) -> Result<Vec<u8>> {
    debug_assert!(
        image.desc().is_packed(),
        "Image must be packed before encoding"
    );

    let color_type = color_type_u8(image, format)?;
    let (w, h) = (image.desc().width, image.desc().height);
    let mut buffer = Vec::new();

    match format {
        EncodeFormat::Png => {
            PngEncoder::new_with_quality(&mut buffer, png_compression(quality), PngFilter::Adaptive)
                .write_image(image.bytes(), w, h, color_type.into())?;
        }
        EncodeFormat::Jpeg => {
            JpegEncoder::new_with_quality(&mut buffer, jpeg_quality(quality))
                .write_image(image.bytes(), w, h, color_type.into())?;
        }
    }

    Ok(buffer)
}
