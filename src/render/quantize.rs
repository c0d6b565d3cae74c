//! Color quantization: reducing 8-bit channels to discrete buckets.

use image::Rgb;

use super::errors::InvalidConfig;

/// An RGB color reduced to per-channel bucket indices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct QuantizedColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// Maps 8-bit channel values onto `levels` discrete buckets.
///
/// The bucket step is the spacing of `levels` evenly spaced sample points
/// across 0-255: `max(1, 255 / (levels - 1))` with integer division. The same
/// step quantizes frame pixels and keys the glyph palette; both sides must be
/// built from one `ColorQuantizer` or palette lookups miss.
///
/// Because the step is floored, the reachable bucket count can exceed
/// `levels` for some values (e.g. 100 levels gives step 2 and 128 buckets).
/// [`bucket_count`](Self::bucket_count) is therefore the authoritative size
/// of the key space, not `levels`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorQuantizer {
    step: u32,
    bucket_count: u32,
}

impl ColorQuantizer {
    /// Derive the quantization step from a color level count.
    ///
    /// Fails with [`InvalidConfig`] for `levels` outside 2..=256. One level
    /// would collapse every color to a single bucket with a degenerate step;
    /// more than 256 cannot produce distinct 8-bit buckets and the palette
    /// cost grows with the cube of the bucket count.
    pub fn new(levels: u32) -> Result<Self, InvalidConfig> {
        if !(2..=256).contains(&levels) {
            return Err(InvalidConfig(format!(
                "color level count must be between 2 and 256, got {}",
                levels
            )));
        }
        let step = (255 / (levels - 1)).max(1);
        Ok(Self {
            step,
            bucket_count: 255 / step + 1,
        })
    }

    /// The channel step between consecutive buckets.
    pub fn step(&self) -> u32 {
        self.step
    }

    /// Number of reachable buckets per channel, `255 / step + 1`.
    pub fn bucket_count(&self) -> u32 {
        self.bucket_count
    }

    /// Total number of distinct quantized colors, `bucket_count^3`.
    pub fn key_space(&self) -> usize {
        let bc = self.bucket_count as usize;
        bc * bc * bc
    }

    /// Quantize a single channel value to its bucket index.
    #[inline]
    pub fn quantize_channel(&self, value: u8) -> u8 {
        (value as u32 / self.step) as u8
    }

    /// Quantize an RGB pixel to per-channel buckets.
    #[inline]
    pub fn quantize(&self, pixel: Rgb<u8>) -> QuantizedColor {
        QuantizedColor {
            r: self.quantize_channel(pixel[0]),
            g: self.quantize_channel(pixel[1]),
            b: self.quantize_channel(pixel[2]),
        }
    }

    /// The representative channel value for a bucket: the quantized value
    /// `bucket * step`, not the original pixel value.
    #[inline]
    pub fn representative(&self, bucket: u8) -> u8 {
        (bucket as u32 * self.step).min(255) as u8
    }
}
