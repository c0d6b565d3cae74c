//! Encoders: where composited canvases go.
//!
//! Still images are written with parameters selected by the output path's
//! extension; frame streams go through the [`FrameSink`] trait. GIF output is
//! refused outright rather than silently downgraded, and the refusal is
//! detectable from the path alone so callers can fail before doing any work.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::RgbImage;

/// JPEG quality used for `.jpg`/`.jpeg` outputs.
pub const JPEG_QUALITY: u8 = 90;

/// Output format classes recognized from a path extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
    Gif,
    /// Anything else goes through the image crate's generic save path.
    Other,
}

impl OutputFormat {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("jpg") | Some("jpeg") => OutputFormat::Jpeg,
            Some("png") => OutputFormat::Png,
            Some("gif") => OutputFormat::Gif,
            _ => OutputFormat::Other,
        }
    }
}

/// Errors that can occur while encoding output.
#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("GIF output is not supported; use .png or .jpg instead of '{0}'")]
    UnsupportedFormat(PathBuf),

    #[error("failed to create '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode '{path}': {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Write a canvas to disk with extension-selected parameters.
///
/// `.jpg`/`.jpeg` encodes at quality [`JPEG_QUALITY`]; `.png` uses best
/// compression; `.gif` fails with [`EncodeError::UnsupportedFormat`]; any
/// other extension is handed to the image crate's generic save, which
/// rejects formats it cannot write.
pub fn save_image(canvas: &RgbImage, path: &Path) -> Result<(), EncodeError> {
    match OutputFormat::from_path(path) {
        OutputFormat::Gif => Err(EncodeError::UnsupportedFormat(path.to_path_buf())),
        OutputFormat::Jpeg => {
            let writer = create_writer(path)?;
            let encoder = JpegEncoder::new_with_quality(writer, JPEG_QUALITY);
            canvas
                .write_with_encoder(encoder)
                .map_err(|source| EncodeError::Image {
                    path: path.to_path_buf(),
                    source,
                })
        }
        OutputFormat::Png => {
            let writer = create_writer(path)?;
            let encoder =
                PngEncoder::new_with_quality(writer, CompressionType::Best, PngFilter::Adaptive);
            canvas
                .write_with_encoder(encoder)
                .map_err(|source| EncodeError::Image {
                    path: path.to_path_buf(),
                    source,
                })
        }
        OutputFormat::Other => canvas.save(path).map_err(|source| EncodeError::Image {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn create_writer(path: &Path) -> Result<BufWriter<File>, EncodeError> {
    let file = File::create(path).map_err(|source| EncodeError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(BufWriter::new(file))
}

/// Sequential consumer of composited canvases.
///
/// `begin` is called once before the first frame with the canvas geometry
/// and the effective frame rate; sinks that don't carry timing metadata may
/// ignore it. Failed writes leave whatever was already written on disk;
/// callers needing atomicity should target a temporary path and rename.
pub trait FrameSink {
    fn begin(&mut self, _width: u32, _height: u32, _fps: f64) -> Result<(), EncodeError> {
        Ok(())
    }

    fn write(&mut self, canvas: &RgbImage) -> Result<(), EncodeError>;

    fn finish(&mut self) -> Result<(), EncodeError> {
        Ok(())
    }
}

/// Writes frames as numbered image files in a directory.
#[derive(Debug)]
pub struct ImageSequenceSink {
    dir: PathBuf,
    extension: String,
    next: u64,
}

impl ImageSequenceSink {
    /// Create a sink writing `frame_NNNNNN.<extension>` files.
    ///
    /// The extension is validated up front so an unsupported format is
    /// reported before any frame is processed. The directory is created if
    /// missing.
    pub fn create(dir: impl Into<PathBuf>, extension: &str) -> Result<Self, EncodeError> {
        let dir = dir.into();
        let extension = extension.trim_start_matches('.').to_ascii_lowercase();
        if OutputFormat::from_path(Path::new(&format!("frame.{extension}"))) == OutputFormat::Gif {
            return Err(EncodeError::UnsupportedFormat(dir.join(format!(
                "frame_000000.{extension}"
            ))));
        }
        std::fs::create_dir_all(&dir).map_err(|source| EncodeError::Io {
            path: dir.clone(),
            source,
        })?;
        Ok(Self {
            dir,
            extension,
            next: 0,
        })
    }

    /// Number of frames written so far.
    pub fn frames_written(&self) -> u64 {
        self.next
    }
}

impl FrameSink for ImageSequenceSink {
    fn begin(&mut self, width: u32, height: u32, fps: f64) -> Result<(), EncodeError> {
        log::info!(
            "writing {}x{} frames to {} ({} fps nominal)",
            width,
            height,
            self.dir.display(),
            fps
        );
        Ok(())
    }

    fn write(&mut self, canvas: &RgbImage) -> Result<(), EncodeError> {
        let path = self
            .dir
            .join(format!("frame_{:06}.{}", self.next, self.extension));
        save_image(canvas, &path)?;
        self.next += 1;
        Ok(())
    }
}
