//! The glyph palette: pre-rendered bitmaps per (glyph, quantized color).

use std::time::Instant;

use super::glyphs::GlyphSet;
use super::quantize::{ColorQuantizer, QuantizedColor};

/// Palettes above this estimated size log a memory warning.
const SIZE_WARN_BYTES: usize = 1 << 29;

/// A flat table of tinted glyph bitmaps indexed by
/// (glyph ordinal, packed quantized-color key).
///
/// Each entry is a `cell * cell` RGB bitmap: the glyph's coverage map with
/// every texel tinted by the color bucket's representative value. The table
/// covers every glyph crossed with every reachable bucket triple, so a cell
/// produced by a sampler sharing the same quantizer always hits.
///
/// Built once per conversion run and read-only afterwards. Memory grows with
/// the cube of the bucket count; that cost is the point of quantizing at all.
#[derive(Debug)]
pub struct GlyphPalette {
    cell: u32,
    glyph_count: usize,
    bucket_count: u32,
    key_space: usize,
    stride: usize,
    data: Vec<u8>,
}

impl GlyphPalette {
    /// Render the full palette from a glyph set and a quantizer.
    ///
    /// The quantizer must be the same one the sampler will use; the packed
    /// key layout is `(r * bucket_count + g) * bucket_count + b`.
    pub fn build(glyphs: &GlyphSet, quantizer: &ColorQuantizer) -> Self {
        let start = Instant::now();

        let cell = glyphs.cell() as usize;
        let stride = cell * cell * 3;
        let bc = quantizer.bucket_count();
        let key_space = quantizer.key_space();
        let total = glyphs.len() * key_space * stride;
        if total > SIZE_WARN_BYTES {
            log::warn!(
                "glyph palette needs ~{} MiB; consider fewer color levels or a smaller cell size",
                total >> 20
            );
        }

        let mut data = vec![0u8; total];
        for glyph in 0..glyphs.len() {
            let coverage = glyphs.map(glyph);
            for rb in 0..bc {
                let r = quantizer.representative(rb as u8) as u16;
                for gb in 0..bc {
                    let g = quantizer.representative(gb as u8) as u16;
                    for bb in 0..bc {
                        let b = quantizer.representative(bb as u8) as u16;
                        let key = ((rb * bc + gb) * bc + bb) as usize;
                        let base = (glyph * key_space + key) * stride;
                        for (i, &alpha) in coverage.iter().enumerate() {
                            if alpha == 0 {
                                continue;
                            }
                            let a = alpha as u16;
                            let o = base + i * 3;
                            data[o] = (r * a / 255) as u8;
                            data[o + 1] = (g * a / 255) as u8;
                            data[o + 2] = (b * a / 255) as u8;
                        }
                    }
                }
            }
        }

        log::info!(
            "built glyph palette: {} glyphs x {} colors in {}ms",
            glyphs.len(),
            key_space,
            start.elapsed().as_millis()
        );

        Self {
            cell: glyphs.cell(),
            glyph_count: glyphs.len(),
            bucket_count: bc,
            key_space,
            stride,
            data,
        }
    }

    /// Edge length of the square glyph bitmaps, in pixels.
    pub fn cell(&self) -> u32 {
        self.cell
    }

    /// Number of (glyph, color) entries in the table.
    pub fn entries(&self) -> usize {
        self.glyph_count * self.key_space
    }

    /// Look up the bitmap for a glyph in a quantized color.
    ///
    /// Returns the entry as a `cell * cell * 3` RGB slice, or `None` when the
    /// glyph ordinal or any bucket index falls outside the table. Callers
    /// must treat `None` as a fatal quantization mismatch, never skip it.
    pub fn get(&self, glyph: usize, color: QuantizedColor) -> Option<&[u8]> {
        if glyph >= self.glyph_count {
            return None;
        }
        let bc = self.bucket_count;
        let (r, g, b) = (color.r as u32, color.g as u32, color.b as u32);
        if r >= bc || g >= bc || b >= bc {
            return None;
        }
        let key = ((r * bc + g) * bc + b) as usize;
        let base = (glyph * self.key_space + key) * self.stride;
        Some(&self.data[base..base + self.stride])
    }
}
