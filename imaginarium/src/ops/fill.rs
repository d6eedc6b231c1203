use rayon::prelude::*;

use crate::prelude::*;

impl Image {
    /// Creates an 8-bit image with every pixel set to `color`.
    pub fn new_filled(desc: ImageDesc, color: Color) -> Result<Image> {
        let mut image = Image::new_empty(desc)?;
        image.fill(color)?;
        Ok(image)
    }

    /// Sets every pixel of an 8-bit image to `color`.
    pub fn fill(&mut self, color: Color) -> Result<()> {
        let desc = *self.desc();
        if !desc.color_format.is_u8() {
            return Err(Error::UnsupportedFormat(format!(
                "fill expects an 8-bit image, got {}",
                desc.color_format
            )));
        }

        let bpp = desc.color_format.byte_count() as usize;
        let pixel = color.to_pixel_u8(desc.color_format.channel_count);
        let pixel = &pixel[..bpp];
        let row_bytes = desc.row_bytes();

        self.bytes_mut()
            .par_chunks_mut(desc.stride)
            .for_each(|row| {
                for px in row[..row_bytes].chunks_exact_mut(bpp) {
                    px.copy_from_slice(pixel);
                }
            });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::common::test_utils::pixel_at;
    use crate::prelude::*;

    #[test]
    fn fills_rgb_with_opaque_color() {
        let desc = ImageDesc::new(3, 2, ColorFormat::RGB_U8);
        let img = Image::new_filled(desc, Color::from_u8(10, 20, 30, 255)).unwrap();
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(pixel_at(&img, x, y), vec![10, 20, 30]);
            }
        }
    }

    #[test]
    fn fills_rgba_with_transparent() {
        let desc = ImageDesc::new(2, 2, ColorFormat::RGBA_U8);
        let img = Image::new_filled(desc, Color::TRANSPARENT).unwrap();
        assert!(img.bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn stride_padding_is_left_untouched() {
        let desc = ImageDesc::new(1, 2, ColorFormat::RGB_U8);
        assert_eq!(desc.stride, 4);
        let img = Image::new_filled(desc, Color::WHITE).unwrap();
        assert_eq!(img.bytes(), &[255, 255, 255, 0, 255, 255, 255, 0]);
    }

    #[test]
    fn rejects_wide_formats() {
        let desc = ImageDesc::new(1, 1, ColorFormat::RGB_F32);
        assert!(matches!(
            Image::new_filled(desc, Color::WHITE),
            Err(Error::UnsupportedFormat(_))
        ));
    }
}
