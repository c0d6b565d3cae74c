//! Area-averaging resampling for color and luminance frames.
//!
//! Both planes go through the same cell-bounds math so they stay spatially
//! aligned; a pixel in the resized color frame and the resized luminance
//! frame always cover the same source region.

use image::{GrayImage, Luma, Rgb, RgbImage};

/// Resize an RGB frame by averaging all source pixels inside each
/// destination pixel's cell.
pub fn resize_rgb(src: &RgbImage, target_width: u32, target_height: u32) -> RgbImage {
    if target_width == 0 || target_height == 0 || src.width() == 0 || src.height() == 0 {
        return RgbImage::new(target_width, target_height);
    }

    let cell_w = src.width() as f32 / target_width as f32;
    let cell_h = src.height() as f32 / target_height as f32;

    let mut out = RgbImage::new(target_width, target_height);
    for cy in 0..target_height {
        let (start_y, end_y) = cell_bounds(cy, cell_h, src.height());
        for cx in 0..target_width {
            let (start_x, end_x) = cell_bounds(cx, cell_w, src.width());

            let mut sum = [0u32; 3];
            let mut count = 0u32;
            for py in start_y..end_y {
                for px in start_x..end_x {
                    let pixel = src.get_pixel(px, py);
                    sum[0] += pixel[0] as u32;
                    sum[1] += pixel[1] as u32;
                    sum[2] += pixel[2] as u32;
                    count += 1;
                }
            }
            out.put_pixel(
                cx,
                cy,
                Rgb([
                    (sum[0] / count) as u8,
                    (sum[1] / count) as u8,
                    (sum[2] / count) as u8,
                ]),
            );
        }
    }
    out
}

/// Resize a luminance frame with the same cell-bounds math as [`resize_rgb`].
pub fn resize_luma(src: &GrayImage, target_width: u32, target_height: u32) -> GrayImage {
    if target_width == 0 || target_height == 0 || src.width() == 0 || src.height() == 0 {
        return GrayImage::new(target_width, target_height);
    }

    let cell_w = src.width() as f32 / target_width as f32;
    let cell_h = src.height() as f32 / target_height as f32;

    let mut out = GrayImage::new(target_width, target_height);
    for cy in 0..target_height {
        let (start_y, end_y) = cell_bounds(cy, cell_h, src.height());
        for cx in 0..target_width {
            let (start_x, end_x) = cell_bounds(cx, cell_w, src.width());

            let mut sum = 0u32;
            let mut count = 0u32;
            for py in start_y..end_y {
                for px in start_x..end_x {
                    sum += src.get_pixel(px, py)[0] as u32;
                    count += 1;
                }
            }
            out.put_pixel(cx, cy, Luma([(sum / count) as u8]));
        }
    }
    out
}

/// Source pixel range covered by destination cell `c`.
///
/// Cells narrower than one source pixel (upscaling) still cover at least one,
/// and the range never reaches past the source edge, so the average is always
/// over a non-empty region.
#[inline]
fn cell_bounds(c: u32, cell: f32, dim: u32) -> (u32, u32) {
    let start = ((c as f32 * cell) as u32).min(dim - 1);
    let end = (((c + 1) as f32 * cell) as u32).clamp(start + 1, dim);
    (start, end)
}
