//! Frame compositing: painting sampled cells onto the output canvas.

use image::{Rgb, RgbImage};

use super::errors::CompositeError;
use super::palette::GlyphPalette;
use super::sampler::Cell;

/// Reset a canvas to the black background before compositing a frame.
pub fn clear_canvas(canvas: &mut RgbImage) {
    for pixel in canvas.pixels_mut() {
        *pixel = Rgb([0, 0, 0]);
    }
}

/// Paint each cell's palette bitmap at its grid position.
///
/// Bitmaps are painted with their origin at the cell position and clipped at
/// the canvas edges. No blending: painting overwrites, and since the sampling
/// grid partitions the canvas, cells never overlap in correct operation.
///
/// # Errors
/// [`CompositeError::PaletteMismatch`] when a cell has no palette entry. That
/// means the sampler quantized with a different step than the palette was
/// built with; skipping the cell would mask the configuration bug with
/// silently corrupted output, so the whole frame fails instead.
pub fn composite(
    canvas: &mut RgbImage,
    cells: &[Cell],
    palette: &GlyphPalette,
) -> Result<(), CompositeError> {
    let cell_px = palette.cell();
    let (width, height) = canvas.dimensions();

    for cell in cells {
        let bitmap = palette
            .get(cell.glyph, cell.color)
            .ok_or(CompositeError::PaletteMismatch {
                glyph: cell.glyph,
                color: cell.color,
            })?;

        for dy in 0..cell_px {
            let y = cell.y + dy;
            if y >= height {
                break;
            }
            for dx in 0..cell_px {
                let x = cell.x + dx;
                if x >= width {
                    break;
                }
                let i = ((dy * cell_px + dx) * 3) as usize;
                canvas.put_pixel(x, y, Rgb([bitmap[i], bitmap[i + 1], bitmap[i + 2]]));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::glyphs::GlyphSet;
    use crate::render::quantize::{ColorQuantizer, QuantizedColor};

    fn white_square_palette(cell: u32, glyphs: usize) -> GlyphPalette {
        let set =
            GlyphSet::from_coverage(cell, vec![vec![255; (cell * cell) as usize]; glyphs]).unwrap();
        GlyphPalette::build(&set, &ColorQuantizer::new(2).unwrap())
    }

    #[test]
    fn test_paints_at_cell_origin() {
        let palette = white_square_palette(2, 2);
        let mut canvas = RgbImage::new(4, 4);
        let cells = [Cell {
            glyph: 1,
            color: QuantizedColor { r: 1, g: 1, b: 1 },
            x: 2,
            y: 0,
        }];
        composite(&mut canvas, &cells, &palette).unwrap();

        assert_eq!(canvas.get_pixel(2, 0).0, [255, 255, 255]);
        assert_eq!(canvas.get_pixel(3, 1).0, [255, 255, 255]);
        assert_eq!(canvas.get_pixel(0, 0).0, [0, 0, 0]);
        assert_eq!(canvas.get_pixel(2, 2).0, [0, 0, 0]);
    }

    #[test]
    fn test_clips_at_canvas_edge() {
        let palette = white_square_palette(2, 2);
        let mut canvas = RgbImage::new(3, 3);
        let cells = [Cell {
            glyph: 1,
            color: QuantizedColor { r: 1, g: 1, b: 1 },
            x: 2,
            y: 2,
        }];
        composite(&mut canvas, &cells, &palette).unwrap();
        assert_eq!(canvas.get_pixel(2, 2).0, [255, 255, 255]);
    }

    #[test]
    fn test_lookup_miss_is_fatal() {
        let palette = white_square_palette(2, 2);
        let mut canvas = RgbImage::new(4, 4);
        // Bucket 5 cannot come from the quantizer the palette was built with.
        let cells = [Cell {
            glyph: 1,
            color: QuantizedColor { r: 5, g: 0, b: 0 },
            x: 0,
            y: 0,
        }];
        let err = composite(&mut canvas, &cells, &palette).unwrap_err();
        assert!(matches!(
            err,
            CompositeError::PaletteMismatch { glyph: 1, .. }
        ));
    }

    #[test]
    fn test_clear_canvas() {
        let mut canvas = RgbImage::from_pixel(2, 2, Rgb([9, 9, 9]));
        clear_canvas(&mut canvas);
        assert!(canvas.pixels().all(|p| p.0 == [0, 0, 0]));
    }
}
