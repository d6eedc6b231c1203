//! Image comparison helpers.

use rayon::prelude::*;

use crate::image::Image;

/// Checks whether two images hold identical pixels, ignoring stride padding.
///
/// Images with different dimensions or color formats are never equal.
pub fn pixels_equal(img1: &Image, img2: &Image) -> bool {
    let (d1, d2) = (img1.desc(), img2.desc());
    if d1.width != d2.width || d1.height != d2.height || d1.color_format != d2.color_format {
        return false;
    }

    let row_bytes = d1.row_bytes();
    let (stride1, stride2) = (d1.stride, d2.stride);

    (0..d1.height as usize).into_par_iter().all(|y| {
        let row1 = &img1.bytes()[y * stride1..y * stride1 + row_bytes];
        let row2 = &img2.bytes()[y * stride2..y * stride2 + row_bytes];
        row1 == row2
    })
}

/// Largest absolute per-channel difference between two 8-bit images.
///
/// # Panics
/// Panics if the images differ in size or format, or are not 8-bit.
pub fn max_pixel_diff(img1: &Image, img2: &Image) -> u8 {
    let (d1, d2) = (img1.desc(), img2.desc());
    assert_eq!(d1.width, d2.width, "width mismatch");
    assert_eq!(d1.height, d2.height, "height mismatch");
    assert_eq!(d1.color_format, d2.color_format, "format mismatch");
    assert!(d1.color_format.is_u8(), "max_pixel_diff expects 8-bit images");

    let row_bytes = d1.row_bytes();
    let (stride1, stride2) = (d1.stride, d2.stride);

    (0..d1.height as usize)
        .into_par_iter()
        .map(|y| {
            let row1 = &img1.bytes()[y * stride1..y * stride1 + row_bytes];
            let row2 = &img2.bytes()[y * stride2..y * stride2 + row_bytes];
            row1.iter()
                .zip(row2)
                .map(|(a, b)| a.abs_diff(*b))
                .max()
                .unwrap_or(0)
        })
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::test_utils::gradient_rgb_u8;
    use crate::prelude::*;

    #[test]
    fn equal_ignores_stride_padding() {
        let padded = gradient_rgb_u8(5, 3);
        assert!(!padded.desc().is_packed());
        let packed = padded.clone().packed();
        assert!(pixels_equal(&padded, &packed));
        assert_eq!(max_pixel_diff(&padded, &packed), 0);
    }

    #[test]
    fn different_sizes_are_not_equal() {
        assert!(!pixels_equal(&gradient_rgb_u8(4, 4), &gradient_rgb_u8(4, 5)));
    }

    #[test]
    fn max_diff_reports_largest_channel_delta() {
        let a = gradient_rgb_u8(4, 4);
        let mut b = a.clone();
        let v = b.bytes()[5];
        b.bytes_mut()[5] = v.wrapping_add(7);
        assert!(!pixels_equal(&a, &b));
        assert_eq!(max_pixel_diff(&a, &b), 7);
    }
}
