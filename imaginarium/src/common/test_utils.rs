use crate::prelude::*;

/// RGB_U8 image with a deterministic gradient; stride keeps the default 4-byte alignment.
pub fn gradient_rgb_u8(width: u32, height: u32) -> Image {
    let desc = ImageDesc::new(width, height, ColorFormat::RGB_U8);
    let mut img = Image::new_empty(desc).unwrap();
    let stride = desc.stride;

    for y in 0..height as usize {
        for x in 0..width as usize {
            let o = y * stride + x * 3;
            img.bytes_mut()[o] = (x * 255 / width.max(2) as usize) as u8;
            img.bytes_mut()[o + 1] = (y * 255 / height.max(2) as usize) as u8;
            img.bytes_mut()[o + 2] = ((x + y) % 256) as u8;
        }
    }

    img
}

/// Image of `format` filled with one repeated pixel value.
pub fn solid(width: u32, height: u32, format: ColorFormat, pixel: &[u8]) -> Image {
    assert_eq!(pixel.len(), format.byte_count() as usize);
    let desc = ImageDesc::new(width, height, format);
    let mut img = Image::new_empty(desc).unwrap();
    let stride = desc.stride;

    for y in 0..height as usize {
        for x in 0..width as usize {
            let o = y * stride + x * pixel.len();
            img.bytes_mut()[o..o + pixel.len()].copy_from_slice(pixel);
        }
    }

    img
}

/// Reads one pixel's bytes, honoring stride.
pub fn pixel_at(img: &Image, x: u32, y: u32) -> Vec<u8> {
    let bpp = img.desc().color_format.byte_count() as usize;
    let o = y as usize * img.desc().stride + x as usize * bpp;
    img.bytes()[o..o + bpp].to_vec()
}
