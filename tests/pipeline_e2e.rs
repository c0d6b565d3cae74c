//! End-to-end tests for the conversion pipeline.
//!
//! These drive whole conversion runs through the public API with synthetic
//! glyph sets (no font on disk needed) and temporary directories for all
//! file output.

use std::path::Path;

use asciify::encode::{EncodeError, ImageSequenceSink};
use asciify::pipeline::{Options, Pipeline, PipelineError, Progress};
use asciify::source::{FramePair, FrameSource, ImageSequenceSource, SourceError};
use image::{Rgb, RgbImage};

/// A glyph set whose every glyph is a fully-covered square cell.
fn solid_glyphs(cell: u32, count: usize) -> asciify::render::GlyphSet {
    asciify::render::GlyphSet::from_coverage(cell, vec![vec![255; (cell * cell) as usize]; count])
        .unwrap()
}

fn make_pipeline(options: &Options, cell: u32) -> Pipeline {
    let ramp_len = options.ramp.chars().count();
    Pipeline::with_glyphs(options, solid_glyphs(cell, ramp_len)).unwrap()
}

fn write_png(path: &Path, width: u32, height: u32, pixel: [u8; 3]) {
    RgbImage::from_pixel(width, height, Rgb(pixel))
        .save(path)
        .unwrap();
}

/// In-memory frame source with a deliberately overstated frame count hint.
struct VecSource {
    frames: Vec<RgbImage>,
    next: usize,
    hint: u64,
}

impl FrameSource for VecSource {
    fn next_frame(&mut self) -> Result<Option<FramePair>, SourceError> {
        let Some(frame) = self.frames.get(self.next) else {
            return Ok(None);
        };
        self.next += 1;
        Ok(Some(FramePair::from_color(frame.clone())))
    }

    fn frame_count_hint(&self) -> Option<u64> {
        Some(self.hint)
    }

    fn fps_hint(&self) -> Option<f64> {
        Some(24.0)
    }
}

// ==================== Image Mode ====================

#[test]
fn test_image_conversion_keeps_source_resolution() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.png");
    let output = dir.path().join("output.png");
    write_png(&input, 8, 6, [255, 255, 255]);

    let options = Options {
        ramp: " a".into(),
        color_levels: 2,
        ..Options::default()
    };
    let mut pipeline = make_pipeline(&options, 2);
    pipeline.convert_image(&input, &output).unwrap();

    let result = image::open(&output).unwrap().to_rgb8();
    assert_eq!(result.dimensions(), (8, 6));
    // A solid white frame with a solid glyph and 2 color levels comes back
    // pure white: bucket 1's representative is 255.
    assert!(result.pixels().all(|p| p.0 == [255, 255, 255]));
}

#[test]
fn test_geometry_override_fixes_output_size() {
    // A 200x100 source with geometry 100x50 produces exactly a 100x50
    // canvas, whatever the sampling stride.
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.png");
    write_png(&input, 200, 100, [180, 40, 40]);

    for cell in [1u32, 3, 7] {
        let output = dir.path().join(format!("out_{}.png", cell));
        let options = Options {
            ramp: " a".into(),
            color_levels: 2,
            geometry: Some((100, 50)),
            ..Options::default()
        };
        let mut pipeline = make_pipeline(&options, cell);
        pipeline.convert_image(&input, &output).unwrap();

        let result = image::open(&output).unwrap().to_rgb8();
        assert_eq!(
            result.dimensions(),
            (100, 50),
            "stride {} must not change the output geometry",
            cell
        );
    }
}

#[test]
fn test_gif_output_rejected_before_any_decode() {
    // The input path does not exist; the gif refusal must fire first.
    let options = Options {
        ramp: " a".into(),
        color_levels: 2,
        ..Options::default()
    };
    let mut pipeline = make_pipeline(&options, 2);
    let err = pipeline
        .convert_image(Path::new("/nonexistent/input.png"), Path::new("out.gif"))
        .unwrap_err();
    assert!(
        matches!(
            err,
            PipelineError::Encode(EncodeError::UnsupportedFormat(_))
        ),
        "expected the gif refusal, got: {}",
        err
    );
}

#[test]
fn test_conversion_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("input.png");
    let gradient = RgbImage::from_fn(16, 16, |x, y| {
        Rgb([(x * 16) as u8, (y * 16) as u8, ((x + y) * 8) as u8])
    });
    gradient.save(&input).unwrap();

    let options = Options {
        ramp: " .:#".into(),
        color_levels: 8,
        ..Options::default()
    };

    let first_out = dir.path().join("first.png");
    let second_out = dir.path().join("second.png");
    make_pipeline(&options, 2)
        .convert_image(&input, &first_out)
        .unwrap();
    make_pipeline(&options, 2)
        .convert_image(&input, &second_out)
        .unwrap();

    let first = image::open(&first_out).unwrap().to_rgb8();
    let second = image::open(&second_out).unwrap().to_rgb8();
    assert_eq!(first.as_raw(), second.as_raw());
}

#[test]
fn test_invalid_options_fail_before_work() {
    let err = Pipeline::with_glyphs(
        &Options {
            color_levels: 1,
            ..Options::default()
        },
        solid_glyphs(2, 16),
    )
    .unwrap_err();
    assert!(matches!(err, PipelineError::InvalidConfig(_)));
}

// ==================== Video Mode ====================

#[test]
fn test_sequence_conversion_tolerates_overstated_hint() {
    let dir = tempfile::tempdir().unwrap();
    let out_dir = dir.path().join("frames_out");

    // Three frames, but the source claims ten; the loop must end normally
    // after three.
    let mut source = VecSource {
        frames: vec![
            RgbImage::from_pixel(4, 4, Rgb([255, 0, 0])),
            RgbImage::from_pixel(4, 4, Rgb([0, 255, 0])),
            RgbImage::from_pixel(4, 4, Rgb([0, 0, 255])),
        ],
        next: 0,
        hint: 10,
    };
    let mut sink = ImageSequenceSink::create(&out_dir, "png").unwrap();

    let options = Options {
        ramp: " a".into(),
        color_levels: 2,
        ..Options::default()
    };
    let mut pipeline = make_pipeline(&options, 2);

    let mut seen = Vec::new();
    let written = pipeline
        .convert_frames(&mut source, &mut sink, &mut |p: Progress| {
            seen.push((p.frames_done, p.frames_total));
        })
        .unwrap();

    assert_eq!(written, 3);
    assert_eq!(sink.frames_written(), 3);
    assert_eq!(
        seen,
        vec![(1, Some(10)), (2, Some(10)), (3, Some(10))],
        "progress advances by one per composited frame"
    );
    for i in 0..3 {
        let frame = out_dir.join(format!("frame_{:06}.png", i));
        assert!(frame.exists(), "missing {}", frame.display());
    }
    assert!(!out_dir.join("frame_000003.png").exists());
}

#[test]
fn test_sequence_source_reads_frames_in_name_order() {
    let dir = tempfile::tempdir().unwrap();
    // Written out of order; names must decide playback order.
    write_png(&dir.path().join("frame_000002.png"), 2, 2, [0, 0, 255]);
    write_png(&dir.path().join("frame_000000.png"), 2, 2, [255, 0, 0]);
    write_png(&dir.path().join("frame_000001.png"), 2, 2, [0, 255, 0]);

    let mut source = ImageSequenceSource::open(dir.path(), Some(24.0)).unwrap();
    assert_eq!(source.frame_count_hint(), Some(3));
    assert_eq!(source.fps_hint(), Some(24.0));

    let mut dominant_channels = Vec::new();
    while let Some(pair) = source.next_frame().unwrap() {
        let p = pair.color.get_pixel(0, 0).0;
        dominant_channels.push((0..3usize).max_by_key(|&i| p[i]).unwrap());
    }
    assert_eq!(dominant_channels, vec![0, 1, 2]);
}

#[test]
fn test_empty_sequence_dir_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ImageSequenceSource::open(dir.path(), None).unwrap_err();
    assert!(matches!(err, SourceError::EmptySequence { .. }));
}

#[test]
fn test_gif_sink_rejected_before_any_frame() {
    let dir = tempfile::tempdir().unwrap();
    let err = ImageSequenceSink::create(dir.path().join("out"), "gif").unwrap_err();
    assert!(matches!(err, EncodeError::UnsupportedFormat(_)));
    assert!(
        !dir.path().join("out").exists(),
        "refused sink must not create its output directory"
    );
}
