pub(crate) mod io;
mod stride;


use std::path::Path;
use std::str::FromStr;

use crate::common::conversion::convert_image;
use crate::common::{ColorFormat, Error, Result};

use stride::{align_stride, strip_stride_padding};

/// Supported image file extensions for reading.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "tiff", "tif"];

/// Quality used by [`Image::save_file`]: lossless-fast PNG, JPEG quality 80.
pub const DEFAULT_QUALITY: f32 = 0.8;

#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub struct ImageDesc {
    pub width: u32,
    pub height: u32,
    pub stride: usize,
    pub color_format: ColorFormat,
}

#[derive(Clone, Debug)]
pub struct Image {
    desc: ImageDesc,
    bytes: Vec<u8>,
}

/// Raster encodings images can be written in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodeFormat {
    #[default]
    Png,
    #[serde(rename = "jpg", alias = "jpeg")]
    Jpeg,
}

impl EncodeFormat {
    /// File extension, also the `Format` value of a Deep Zoom descriptor.
    pub fn extension(&self) -> &'static str {
        match self {
            EncodeFormat::Png => "png",
            EncodeFormat::Jpeg => "jpg",
        }
    }

    pub fn is_lossless(&self) -> bool {
        matches!(self, EncodeFormat::Png)
    }

    pub fn from_extension(ext: &str) -> Result<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Ok(EncodeFormat::Png),
            "jpg" | "jpeg" => Ok(EncodeFormat::Jpeg),
            _ => Err(Error::InvalidExtension(ext.to_string())),
        }
    }
}

impl FromStr for EncodeFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_extension(s)
    }
}

impl std::fmt::Display for EncodeFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

impl Image {
    /// Returns the image descriptor.
    pub fn desc(&self) -> &ImageDesc {
        &self.desc
    }

    /// Returns the image bytes as a slice.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the image bytes as a mutable slice.
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    pub fn width(&self) -> u32 {
        self.desc.width
    }

    pub fn height(&self) -> u32 {
        self.desc.height
    }

    pub fn new_empty(desc: ImageDesc) -> Result<Image> {
        desc.validate()?;

        let bytes = vec![0; desc.size_in_bytes()];

        Ok(Image { desc, bytes })
    }

    pub fn new_with_data(desc: ImageDesc, bytes: Vec<u8>) -> Result<Image> {
        desc.validate()?;

        if bytes.len() != desc.size_in_bytes() {
            return Err(Error::InvalidColorFormat(format!(
                "bytes length {} does not match expected size {}",
                bytes.len(),
                desc.size_in_bytes()
            )));
        }

        Ok(Image { desc, bytes })
    }

    pub fn read_file<P: AsRef<Path>>(filename: P) -> Result<Image> {
        let extension = filename
            .as_ref()
            .extension()
            .and_then(|os_str| os_str.to_str())
            .ok_or_else(|| Error::InvalidExtension("missing extension".to_string()))?
            .to_ascii_lowercase();

        if !SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(Error::InvalidExtension(extension));
        }

        io::load(filename)
    }

    /// Encodes and writes the image; the format follows the file extension.
    pub fn save_file<P: AsRef<Path>>(&self, filename: P) -> Result<()> {
        let extension = filename
            .as_ref()
            .extension()
            .and_then(|os_str| os_str.to_str())
            .ok_or_else(|| Error::InvalidExtension("missing extension".to_string()))?;
        let format = EncodeFormat::from_extension(extension)?;

        let encoded = self.encode(format, DEFAULT_QUALITY)?;
        std::fs::write(filename, encoded)?;

        Ok(())
    }

    /// Encodes the image in memory.
    ///
    /// `quality` is in [0, 1]: JPEG quality `quality * 100`, PNG compression
    /// effort grows as quality drops (PNG stays lossless either way).
    pub fn encode(&self, format: EncodeFormat, quality: f32) -> Result<Vec<u8>> {
        // Encoders expect tightly packed rows
        let image = if self.desc.is_packed() {
            std::borrow::Cow::Borrowed(self)
        } else {
            std::borrow::Cow::Owned(self.clone().packed())
        };

        io::encode(&image, format, quality)
    }

    pub fn convert(self, color_format: ColorFormat) -> Result<Image> {
        color_format.validate()?;

        if self.desc.color_format == color_format {
            return Ok(self);
        }

        let desc = ImageDesc::new(self.desc.width, self.desc.height, color_format);

        let mut result = Image::new_empty(desc)?;

        convert_image(&self, &mut result)?;

        Ok(result)
    }

    pub fn bytes_per_pixel(&self) -> u8 {
        self.desc.color_format.byte_count()
    }

    /// Returns an image with tightly packed pixel data (stride equals row bytes).
    pub fn packed(self) -> Image {
        if self.desc.is_packed() {
            return self;
        }

        let bytes = strip_stride_padding(
            &self.bytes,
            self.desc.row_bytes(),
            self.desc.height as usize,
            self.desc.stride,
        );

        Image {
            desc: ImageDesc {
                stride: self.desc.row_bytes(),
                ..self.desc
            },
            bytes,
        }
    }

    /// Copies the `width x height` region at `(x, y)` into a new packed image.
    pub fn crop(&self, x: u32, y: u32, width: u32, height: u32) -> Result<Image> {
        self.desc.check_region(x, y, width, height)?;

        let desc = ImageDesc::new_packed(width, height, self.desc.color_format);
        let bpp = self.desc.color_format.byte_count() as usize;
        let row_bytes = desc.row_bytes();
        let mut bytes = Vec::with_capacity(desc.size_in_bytes());

        for row in y as usize..(y + height) as usize {
            let start = row * self.desc.stride + x as usize * bpp;
            bytes.extend_from_slice(&self.bytes[start..start + row_bytes]);
        }

        Ok(Image { desc, bytes })
    }
}

impl ImageDesc {
    /// Descriptor with a 4-byte aligned stride.
    pub fn new(width: u32, height: u32, color_format: ColorFormat) -> Self {
        let stride = align_stride(width as usize * color_format.byte_count() as usize);

        Self {
            width,
            height,
            stride,
            color_format,
        }
    }

    /// Descriptor with no row padding.
    pub fn new_packed(width: u32, height: u32, color_format: ColorFormat) -> Self {
        Self {
            width,
            height,
            stride: width as usize * color_format.byte_count() as usize,
            color_format,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.color_format.validate()?;

        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidRegion(format!(
                "image dimensions must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if self.stride < self.row_bytes() {
            return Err(Error::InvalidRegion(format!(
                "stride {} is smaller than row size {}",
                self.stride,
                self.row_bytes()
            )));
        }

        Ok(())
    }

    pub fn size_in_bytes(&self) -> usize {
        self.height as usize * self.stride
    }

    /// Returns the number of bytes per row without padding.
    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.color_format.byte_count() as usize
    }

    /// Returns true if stride equals row bytes (no padding).
    pub fn is_packed(&self) -> bool {
        self.stride == self.row_bytes()
    }

    /// Fails unless the region is non-empty and lies inside the image.
    pub fn check_region(&self, x: u32, y: u32, width: u32, height: u32) -> Result<()> {
        let fits_x = x.checked_add(width).is_some_and(|end| end <= self.width);
        let fits_y = y.checked_add(height).is_some_and(|end| end <= self.height);

        if width == 0 || height == 0 || !fits_x || !fits_y {
            return Err(Error::InvalidRegion(format!(
                "{}x{} at ({}, {}) does not fit in {}x{}",
                width, height, x, y, self.width, self.height
            )));
        }

        Ok(())
    }
}

impl std::fmt::Display for ImageDesc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{} {}", self.width, self.height, self.color_format)
    }
}
