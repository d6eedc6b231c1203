use rayon::prelude::*;

use crate::prelude::*;

impl Image {
    /// Copies all of `src` into this image with its top-left corner at `(x, y)`.
    ///
    /// Both images must share a color format and `src` must fit entirely.
    pub fn blit(&mut self, src: &Image, x: u32, y: u32) -> Result<()> {
        let dst_desc = *self.desc();
        let src_desc = *src.desc();

        if src_desc.color_format != dst_desc.color_format {
            return Err(Error::InvalidColorFormat(format!(
                "cannot blit {} onto {}",
                src_desc.color_format, dst_desc.color_format
            )));
        }
        dst_desc.check_region(x, y, src_desc.width, src_desc.height)?;

        let bpp = dst_desc.color_format.byte_count() as usize;
        let row_bytes = src_desc.row_bytes();
        let x_offset = x as usize * bpp;
        let first_row = y as usize;
        let src_bytes = src.bytes();

        self.bytes_mut()
            .par_chunks_mut(dst_desc.stride)
            .skip(first_row)
            .take(src_desc.height as usize)
            .enumerate()
            .for_each(|(sy, dst_row)| {
                let src_row = &src_bytes[sy * src_desc.stride..sy * src_desc.stride + row_bytes];
                dst_row[x_offset..x_offset + row_bytes].copy_from_slice(src_row);
            });

        Ok(())
    }
}
