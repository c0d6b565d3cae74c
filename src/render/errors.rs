//! Error types for the conversion core.

use std::path::PathBuf;

use super::quantize::QuantizedColor;

/// A configuration value rejected before any conversion work begins.
#[derive(Debug, thiserror::Error)]
#[error("invalid configuration: {0}")]
pub struct InvalidConfig(pub String);

/// Errors that can occur while building the glyph palette.
///
/// A failed build aborts the run; a partially built palette is never used.
#[derive(Debug, thiserror::Error)]
pub enum PaletteError {
    #[error("failed to read font '{path}': {source}")]
    FontRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse font '{path}': {message}")]
    FontParse { path: PathBuf, message: String },

    #[error("no usable monospace font found; pass one explicitly with --font")]
    NoFontFound,

    #[error("font has no glyph for ramp character {ch:?}")]
    MissingGlyph { ch: char },

    #[error("coverage map {index} is {got} bytes, expected {expected} for cell size {cell}")]
    CoverageSize {
        index: usize,
        got: usize,
        expected: usize,
        cell: u32,
    },
}

/// Errors that can occur while compositing sampled cells onto a canvas.
#[derive(Debug, thiserror::Error)]
pub enum CompositeError {
    /// The palette has no entry for a sampled cell. This means the sampler
    /// quantized with a different step than the palette was built with, which
    /// is an internal-consistency fault, not a recoverable condition.
    #[error(
        "palette lookup missed glyph {glyph} at color {color:?}; \
         sampler and palette quantization disagree"
    )]
    PaletteMismatch { glyph: usize, color: QuantizedColor },
}
