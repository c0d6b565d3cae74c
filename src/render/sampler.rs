//! Frame sampling: turning a dense pixel grid into sparse drawable cells.

use image::{GrayImage, RgbImage};

use super::errors::InvalidConfig;
use super::quantize::{ColorQuantizer, QuantizedColor};
use super::ramp::CharRamp;

/// One drawable cell produced by the sampler.
///
/// Transient: produced fresh per frame and consumed by the compositor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// Ramp ordinal; never 0, blank cells are not emitted.
    pub glyph: usize,
    pub color: QuantizedColor,
    /// Top-left pixel position of the cell on the canvas.
    pub x: u32,
    pub y: u32,
}

/// Sample a frame on a fixed stride.
///
/// Walks the grid at increments of `stride` in both axes, row-major (y outer,
/// x inner), so output order is deterministic. For each sampled position the
/// luminance picks a glyph index; cells whose luminance maps to the blank
/// glyph are skipped, everything else is quantized and emitted.
///
/// Dimensions not evenly divisible by `stride` leave a partial final
/// row/column unsampled at the edge; that is accepted, not an error.
///
/// # Errors
/// [`InvalidConfig`] for a zero stride or mismatched frame dimensions.
pub fn sample_frame(
    color: &RgbImage,
    luminance: &GrayImage,
    ramp: &CharRamp,
    quantizer: &ColorQuantizer,
    stride: u32,
) -> Result<Vec<Cell>, InvalidConfig> {
    if stride == 0 {
        return Err(InvalidConfig("sampling stride must be at least 1".into()));
    }
    let (width, height) = color.dimensions();
    if luminance.dimensions() != (width, height) {
        return Err(InvalidConfig(format!(
            "color frame is {}x{} but luminance frame is {}x{}",
            width,
            height,
            luminance.width(),
            luminance.height()
        )));
    }

    let mut cells =
        Vec::with_capacity(((width / stride + 1) * (height / stride + 1)) as usize);
    let mut y = 0;
    while y < height {
        let mut x = 0;
        while x < width {
            let glyph = ramp.glyph_index(luminance.get_pixel(x, y)[0]);
            if glyph != 0 {
                cells.push(Cell {
                    glyph,
                    color: quantizer.quantize(*color.get_pixel(x, y)),
                    x,
                    y,
                });
            }
            x += stride;
        }
        y += stride;
    }

    Ok(cells)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_color(width: u32, height: u32, rgb: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(width, height, image::Rgb(rgb))
    }

    #[test]
    fn test_zero_stride_rejected() {
        let color = flat_color(2, 2, [0, 0, 0]);
        let luma = GrayImage::new(2, 2);
        let ramp = CharRamp::new(" ab").unwrap();
        let q = ColorQuantizer::new(2).unwrap();
        assert!(sample_frame(&color, &luma, &ramp, &q, 0).is_err());
    }

    #[test]
    fn test_mismatched_dimensions_rejected() {
        let color = flat_color(2, 2, [0, 0, 0]);
        let luma = GrayImage::new(3, 2);
        let ramp = CharRamp::new(" ab").unwrap();
        let q = ColorQuantizer::new(2).unwrap();
        assert!(sample_frame(&color, &luma, &ramp, &q, 1).is_err());
    }

    #[test]
    fn test_black_frame_emits_nothing() {
        let color = flat_color(4, 4, [0, 0, 0]);
        let luma = GrayImage::new(4, 4);
        let ramp = CharRamp::new(crate::render::DEFAULT_RAMP).unwrap();
        let q = ColorQuantizer::new(32).unwrap();
        let cells = sample_frame(&color, &luma, &ramp, &q, 1).unwrap();
        assert!(cells.is_empty(), "all-blank frames produce no cells");
    }

    #[test]
    fn test_partial_edge_left_unsampled() {
        // 5 pixels at stride 3 sample positions 0 and 3; the partial final
        // row and column at pixel 4 are simply skipped.
        let color = flat_color(5, 5, [255, 255, 255]);
        let luma = GrayImage::from_pixel(5, 5, image::Luma([255]));
        let ramp = CharRamp::new(" ab").unwrap();
        let q = ColorQuantizer::new(2).unwrap();
        let cells = sample_frame(&color, &luma, &ramp, &q, 3).unwrap();
        let positions: Vec<(u32, u32)> = cells.iter().map(|c| (c.x, c.y)).collect();
        assert_eq!(positions, vec![(0, 0), (3, 0), (0, 3), (3, 3)]);
    }
}
