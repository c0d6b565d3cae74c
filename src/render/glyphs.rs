//! Glyph rasterization: per-character coverage bitmaps at a fixed cell size.
//!
//! Uses fontdue for cross-platform rasterization. Each ramp character is
//! rendered once into a cell-sized 8-bit coverage map, positioned on the
//! font's baseline; the palette builder tints these maps per color bucket.

use std::path::Path;

use fontdue::{Font, FontSettings};

use super::errors::PaletteError;
use super::ramp::CharRamp;

/// Monospace fonts probed when no font path is configured.
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
    "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationMono-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeMono.ttf",
    "/System/Library/Fonts/Supplemental/Courier New.ttf",
    "/Library/Fonts/Courier New.ttf",
];

/// Load a font from an explicit path, or probe the system font list.
///
/// An explicit path that cannot be read or parsed is an error; with no path,
/// the first probe entry that exists and parses wins. Fails with
/// [`PaletteError::NoFontFound`] when the probe list is exhausted.
pub fn load_font(path: Option<&Path>) -> Result<Font, PaletteError> {
    if let Some(path) = path {
        return read_font(path);
    }
    for candidate in SYSTEM_FONTS {
        let candidate = Path::new(candidate);
        if candidate.exists() {
            match read_font(candidate) {
                Ok(font) => {
                    log::debug!("using system font {}", candidate.display());
                    return Ok(font);
                }
                Err(e) => log::warn!("skipping unusable system font: {}", e),
            }
        }
    }
    Err(PaletteError::NoFontFound)
}

fn read_font(path: &Path) -> Result<Font, PaletteError> {
    let bytes = std::fs::read(path).map_err(|source| PaletteError::FontRead {
        path: path.to_path_buf(),
        source,
    })?;
    Font::from_bytes(bytes, FontSettings::default()).map_err(|message| PaletteError::FontParse {
        path: path.to_path_buf(),
        message: message.to_string(),
    })
}

/// Cell-sized coverage bitmaps for every glyph in a ramp.
///
/// Coverage maps are `cell * cell` bytes, one alpha value per texel, in
/// row-major order. Ordinal 0 is the ramp's blank glyph; it is rasterized
/// like any other for palette completeness even though it is never drawn.
#[derive(Debug, Clone)]
pub struct GlyphSet {
    cell: u32,
    coverage: Vec<Vec<u8>>,
}

impl GlyphSet {
    /// Rasterize every ramp character at the given cell size.
    ///
    /// Each glyph is rendered at a font size equal to the cell size and
    /// placed on the baseline derived from the font's line metrics, clipped
    /// to the cell. A ramp character with no glyph in the font fails the
    /// whole set with [`PaletteError::MissingGlyph`].
    pub fn rasterize(font: &Font, ramp: &CharRamp, cell: u32) -> Result<Self, PaletteError> {
        let px = cell as f32;
        let ascent = font
            .horizontal_line_metrics(px)
            .map(|m| m.ascent)
            .unwrap_or(px * 0.8);

        let mut coverage = Vec::with_capacity(ramp.len());
        for ch in ramp.iter() {
            if !ch.is_whitespace() && font.lookup_glyph_index(ch) == 0 {
                return Err(PaletteError::MissingGlyph { ch });
            }

            let (metrics, bitmap) = font.rasterize(ch, px);
            let mut map = vec![0u8; (cell * cell) as usize];

            let top = ascent as i32 - metrics.height as i32 - metrics.ymin;
            let left = metrics.xmin;
            for row in 0..metrics.height {
                for col in 0..metrics.width {
                    let y = top + row as i32;
                    let x = left + col as i32;
                    if x < 0 || y < 0 || x >= cell as i32 || y >= cell as i32 {
                        continue;
                    }
                    map[(y as u32 * cell + x as u32) as usize] = bitmap[row * metrics.width + col];
                }
            }
            coverage.push(map);
        }

        Ok(Self { cell, coverage })
    }

    /// Build a glyph set from raw coverage maps.
    ///
    /// Useful for custom glyph art; every map must be `cell * cell` bytes.
    pub fn from_coverage(cell: u32, coverage: Vec<Vec<u8>>) -> Result<Self, PaletteError> {
        let expected = (cell * cell) as usize;
        for (index, map) in coverage.iter().enumerate() {
            if map.len() != expected {
                return Err(PaletteError::CoverageSize {
                    index,
                    got: map.len(),
                    expected,
                    cell,
                });
            }
        }
        Ok(Self { cell, coverage })
    }

    /// Edge length of the square glyph cell, in pixels.
    pub fn cell(&self) -> u32 {
        self.cell
    }

    /// Number of glyphs in the set.
    pub fn len(&self) -> usize {
        self.coverage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coverage.is_empty()
    }

    /// The coverage map for a glyph ordinal.
    pub(crate) fn map(&self, glyph: usize) -> &[u8] {
        &self.coverage[glyph]
    }
}
