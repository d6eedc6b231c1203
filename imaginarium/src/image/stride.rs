/// Aligns a value to 4-byte boundary.
pub(crate) fn align_stride(n: usize) -> usize {
    (n + 3) & !3
}

/// Copies the first `row_bytes` of every `stride`-sized row into a packed buffer.
pub(crate) fn strip_stride_padding(
    src: &[u8],
    row_bytes: usize,
    height: usize,
    stride: usize,
) -> Vec<u8> {
    if row_bytes == stride {
        return src[..row_bytes * height].to_vec();
    }

    let mut packed = Vec::with_capacity(row_bytes * height);
    for y in 0..height {
        packed.extend_from_slice(&src[y * stride..y * stride + row_bytes]);
    }
    packed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_rounds_up_to_four() {
        assert_eq!(align_stride(0), 0);
        assert_eq!(align_stride(1), 4);
        assert_eq!(align_stride(4), 4);
        assert_eq!(align_stride(2685), 2688);
    }

    #[test]
    fn strip_removes_padding() {
        let src = [1, 2, 3, 0, 4, 5, 6, 0];
        assert_eq!(strip_stride_padding(&src, 3, 2, 4), vec![1, 2, 3, 4, 5, 6]);
    }
}
