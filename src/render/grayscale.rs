//! RGB to grayscale conversion using the ITU-R BT.601 luminance formula.

use image::{GrayImage, Luma, RgbImage};

/// Convert an RGB frame to its luminance counterpart.
///
/// Uses integer math with coefficients scaled by 1000
/// (299 + 587 + 114 = 1000), avoiding floating point in the hot path.
pub fn to_grayscale(frame: &RgbImage) -> GrayImage {
    let mut gray = GrayImage::new(frame.width(), frame.height());
    for (src, dst) in frame.pixels().zip(gray.pixels_mut()) {
        let r = src[0] as u32;
        let g = src[1] as u32;
        let b = src[2] as u32;
        let luminance = (299 * r + 587 * g + 114 * b) / 1000;
        *dst = Luma([luminance as u8]);
    }
    gray
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_primaries() {
        let frame = RgbImage::from_fn(3, 1, |x, _| match x {
            0 => Rgb([255, 0, 0]),
            1 => Rgb([0, 255, 0]),
            _ => Rgb([0, 0, 255]),
        });
        let gray = to_grayscale(&frame);
        assert_eq!(gray.get_pixel(0, 0)[0], 76); // 299 * 255 / 1000
        assert_eq!(gray.get_pixel(1, 0)[0], 149); // 587 * 255 / 1000
        assert_eq!(gray.get_pixel(2, 0)[0], 29); // 114 * 255 / 1000
    }

    #[test]
    fn test_black_and_white_extremes() {
        let white = RgbImage::from_pixel(1, 1, Rgb([255, 255, 255]));
        assert_eq!(to_grayscale(&white).get_pixel(0, 0)[0], 255);

        let black = RgbImage::from_pixel(1, 1, Rgb([0, 0, 0]));
        assert_eq!(to_grayscale(&black).get_pixel(0, 0)[0], 0);
    }
}
