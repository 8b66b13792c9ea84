//! Decoded image handles and their memory footprint.

use serde::{Deserialize, Serialize};

/// Pixel layout of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PixelFormat {
    /// Single 8-bit alpha channel
    Alpha8,
    /// 16-bit packed RGB without alpha
    Rgb565,
    /// 16-bit packed ARGB, 4 bits per channel
    Argb4444,
    /// 32-bit ARGB, 8 bits per channel
    #[default]
    Argb8888,
    /// 64-bit RGBA, half-float per channel
    RgbaF16,
}

impl PixelFormat {
    /// Bytes used to store one pixel in this format
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Alpha8 => 1,
            PixelFormat::Rgb565 | PixelFormat::Argb4444 => 2,
            PixelFormat::Argb8888 => 4,
            PixelFormat::RgbaF16 => 8,
        }
    }
}

/// Anything that can report how many bytes it keeps resident.
///
/// The cache calls this exactly once, when the value is inserted.
pub trait ByteFootprint {
    fn byte_footprint(&self) -> usize;
}

/// A decoded, in-memory bitmap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Pixel layout of `pixels`
    pub format: PixelFormat,
    /// Raw pixel data, row-major
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    /// Wrap an existing pixel buffer
    pub fn new(width: u32, height: u32, format: PixelFormat, pixels: Vec<u8>) -> Self {
        Self {
            width,
            height,
            format,
            pixels,
        }
    }

    /// Allocate a zeroed image of the given dimensions
    pub fn blank(width: u32, height: u32, format: PixelFormat) -> Self {
        let len = allocation_size(width, height, format);
        Self::new(width, height, format, vec![0u8; len])
    }
}

impl ByteFootprint for DecodedImage {
    /// Allocated size of the bitmap, not the length of whatever buffer backs it.
    fn byte_footprint(&self) -> usize {
        allocation_size(self.width, self.height, self.format)
    }
}

/// `width * height * bytes_per_pixel`, saturating on overflow
pub fn allocation_size(width: u32, height: u32, format: PixelFormat) -> usize {
    (width as usize)
        .saturating_mul(height as usize)
        .saturating_mul(format.bytes_per_pixel())
}
