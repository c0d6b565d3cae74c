//! Conversion pipeline: orchestrates whole image and frame-stream runs.
//!
//! A [`Pipeline`] validates its configuration up front, builds the glyph
//! palette once, then drives the per-frame loop: decode, optional resize,
//! sample, composite, encode. The canvas is cleared and reused across frames
//! rather than reallocated.

use std::path::Path;

use image::RgbImage;

use crate::encode::{save_image, EncodeError, FrameSink, OutputFormat};
use crate::render::{
    clear_canvas, composite, load_font, resize_luma, resize_rgb, sample_frame, CharRamp,
    ColorQuantizer, CompositeError, GlyphPalette, GlyphSet, InvalidConfig, PaletteError,
    DEFAULT_RAMP,
};
use crate::source::{FramePair, FrameSource, ImageSource, SourceError};

/// Frame rate assumed when neither the caller nor the source supplies one.
const DEFAULT_FPS: f64 = 30.0;

/// Caller-supplied configuration for one conversion run.
#[derive(Debug, Clone)]
pub struct Options {
    /// Character ramp, emptiest to densest; index 0 is never drawn.
    pub ramp: String,
    /// Discrete color levels per channel.
    pub color_levels: u32,
    /// Glyph cell size in pixels; also the sampling stride.
    pub cell_size: u32,
    /// Output geometry override; `None` keeps the source resolution.
    pub geometry: Option<(u32, u32)>,
    /// Output frame rate; `None` follows the source's hint.
    pub fps: Option<f64>,
    /// Font file to rasterize glyphs from; `None` probes system fonts.
    pub font: Option<std::path::PathBuf>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            ramp: DEFAULT_RAMP.to_string(),
            color_levels: 32,
            cell_size: 12,
            geometry: None,
            fps: None,
            font: None,
        }
    }
}

/// Errors from a conversion run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    InvalidConfig(#[from] InvalidConfig),

    #[error(transparent)]
    Palette(#[from] PaletteError),

    #[error(transparent)]
    Composite(#[from] CompositeError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// Progress signal emitted after each composited frame.
///
/// Purely informational; `frames_total` is the source's hint and may
/// overstate the true count.
#[derive(Debug, Clone, Copy)]
pub struct Progress {
    pub frames_done: u64,
    pub frames_total: Option<u64>,
}

/// A configured conversion run: validated options plus the built palette.
#[derive(Debug)]
pub struct Pipeline {
    ramp: CharRamp,
    quantizer: ColorQuantizer,
    palette: GlyphPalette,
    stride: u32,
    geometry: Option<(u32, u32)>,
    fps: Option<f64>,
    canvas: RgbImage,
}

impl Pipeline {
    /// Validate options, load the font, and build the glyph palette.
    ///
    /// All configuration errors surface here, before any frame I/O.
    pub fn new(options: &Options) -> Result<Self, PipelineError> {
        let (ramp, quantizer) = validate(options)?;
        let font = load_font(options.font.as_deref())?;
        let glyphs = GlyphSet::rasterize(&font, &ramp, options.cell_size)?;
        Ok(Self::assemble(options, ramp, quantizer, glyphs))
    }

    /// Build a pipeline from pre-rasterized glyphs.
    ///
    /// The glyph set's cell size becomes the sampling stride, overriding
    /// `options.cell_size`. Used for custom glyph art and by tests that
    /// don't want a font on disk.
    pub fn with_glyphs(options: &Options, glyphs: GlyphSet) -> Result<Self, PipelineError> {
        let (ramp, quantizer) = validate(options)?;
        Ok(Self::assemble(options, ramp, quantizer, glyphs))
    }

    fn assemble(
        options: &Options,
        ramp: CharRamp,
        quantizer: ColorQuantizer,
        glyphs: GlyphSet,
    ) -> Self {
        let palette = GlyphPalette::build(&glyphs, &quantizer);
        Self {
            ramp,
            quantizer,
            stride: glyphs.cell(),
            palette,
            geometry: options.geometry,
            fps: options.fps,
            canvas: RgbImage::new(0, 0),
        }
    }

    /// Convert a single still image.
    ///
    /// The output format is checked first, so an unsupported extension fails
    /// before the input is even opened.
    pub fn convert_image(&mut self, input: &Path, output: &Path) -> Result<(), PipelineError> {
        if OutputFormat::from_path(output) == OutputFormat::Gif {
            return Err(EncodeError::UnsupportedFormat(output.to_path_buf()).into());
        }

        let mut source = ImageSource::new(input);
        while let Some(pair) = source.next_frame()? {
            self.render_frame(pair)?;
            save_image(&self.canvas, output)?;
        }
        log::info!("wrote {}", output.display());
        Ok(())
    }

    /// Convert a stream of frames, reporting progress after each one.
    ///
    /// The loop ends when the source reports no more frames; ending earlier
    /// than `frame_count_hint` promised is normal termination, since hints
    /// may overstate the true count. Returns the number of frames written.
    pub fn convert_frames(
        &mut self,
        source: &mut dyn FrameSource,
        sink: &mut dyn FrameSink,
        progress: &mut dyn FnMut(Progress),
    ) -> Result<u64, PipelineError> {
        let total = source.frame_count_hint();
        let fps = self.fps.or_else(|| source.fps_hint()).unwrap_or(DEFAULT_FPS);

        let mut frames_done = 0u64;
        while let Some(pair) = source.next_frame()? {
            self.render_frame(pair)?;
            if frames_done == 0 {
                let (width, height) = self.canvas.dimensions();
                sink.begin(width, height, fps)?;
            }
            sink.write(&self.canvas)?;
            frames_done += 1;
            progress(Progress {
                frames_done,
                frames_total: total,
            });
        }
        sink.finish()?;

        log::info!("converted {} frames", frames_done);
        Ok(frames_done)
    }

    /// Read-only view of the last composited canvas.
    pub fn canvas(&self) -> &RgbImage {
        &self.canvas
    }

    /// Resize, sample, and composite one frame into the reusable canvas.
    fn render_frame(&mut self, pair: FramePair) -> Result<(), PipelineError> {
        let pair = match self.geometry {
            Some((width, height)) if (width, height) != pair.dimensions() => FramePair {
                color: resize_rgb(&pair.color, width, height),
                luma: resize_luma(&pair.luma, width, height),
            },
            _ => pair,
        };

        let (width, height) = pair.dimensions();
        if self.canvas.dimensions() != (width, height) {
            self.canvas = RgbImage::new(width, height);
        } else {
            clear_canvas(&mut self.canvas);
        }

        let cells = sample_frame(&pair.color, &pair.luma, &self.ramp, &self.quantizer, self.stride)?;
        log::debug!("sampled {} cells from {}x{} frame", cells.len(), width, height);
        composite(&mut self.canvas, &cells, &self.palette)?;
        Ok(())
    }
}

fn validate(options: &Options) -> Result<(CharRamp, ColorQuantizer), InvalidConfig> {
    let ramp = CharRamp::new(&options.ramp)?;
    let quantizer = ColorQuantizer::new(options.color_levels)?;
    if options.cell_size == 0 {
        return Err(InvalidConfig("glyph cell size must be at least 1".into()));
    }
    if let Some((width, height)) = options.geometry {
        if width == 0 || height == 0 {
            return Err(InvalidConfig(format!(
                "output geometry must be non-zero, got {}x{}",
                width, height
            )));
        }
    }
    if let Some(fps) = options.fps {
        if !fps.is_finite() || fps <= 0.0 {
            return Err(InvalidConfig(format!(
                "output frame rate must be positive, got {}",
                fps
            )));
        }
    }
    if options.color_levels > 64 {
        log::warn!(
            "{} color levels builds a large palette; expect heavy memory use",
            options.color_levels
        );
    }
    Ok((ramp, quantizer))
}
