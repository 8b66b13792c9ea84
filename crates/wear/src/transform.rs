//! Phone-side shrinking of images bound for a wearable

use imgreq_cache::PixelFormat;

use crate::params::{ParamsError, TransformerParams};

pub(crate) const MAX_WIDTH: &str = "maxWidth";
pub(crate) const MAX_HEIGHT: &str = "maxHeight";
pub(crate) const CONFIG: &str = "config";

/// Bounds an image must fit in before it is sent to the wearable
///
/// A bound of 0 leaves that axis unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageTransform {
    pub max_width: u32,
    pub max_height: u32,
    pub config: PixelFormat,
}

impl ImageTransform {
    pub fn new(max_width: u32, max_height: u32, config: PixelFormat) -> Self {
        Self {
            max_width,
            max_height,
            config,
        }
    }

    /// Rebuild a transform from the parameters a wearable sent
    pub fn from_params(params: &TransformerParams) -> Result<Self, ParamsError> {
        Ok(Self {
            max_width: params.get_u32(MAX_WIDTH)?,
            max_height: params.get_u32(MAX_HEIGHT)?,
            config: params.get_format(CONFIG)?,
        })
    }

    pub fn to_params(&self) -> TransformerParams {
        let mut params = TransformerParams::new();
        params.put_int(MAX_WIDTH, i64::from(self.max_width));
        params.put_int(MAX_HEIGHT, i64::from(self.max_height));
        params.put_format(CONFIG, self.config);
        params
    }

    /// Size of the image after scaling it to fit the bounds
    ///
    /// Aspect ratio is preserved and images are never enlarged. A non-empty
    /// image never scales below 1x1.
    pub fn target_size(&self, width: u32, height: u32) -> (u32, u32) {
        if width == 0 || height == 0 {
            return (width, height);
        }

        let mut scale = 1.0_f64;
        if self.max_width > 0 {
            scale = scale.min(self.max_width as f64 / width as f64);
        }
        if self.max_height > 0 {
            scale = scale.min(self.max_height as f64 / height as f64);
        }
        if scale >= 1.0 {
            return (width, height);
        }

        let scaled = |side: u32| ((side as f64 * scale).floor() as u32).max(1);
        (scaled(width), scaled(height))
    }

    /// Largest power-of-two decode subsampling that still yields at least the
    /// target size
    pub fn sample_size(&self, width: u32, height: u32) -> u32 {
        let (target_w, target_h) = self.target_size(width, height);
        if target_w == 0 || target_h == 0 {
            return 1;
        }
        let ratio = (width as f64 / target_w as f64).min(height as f64 / target_h as f64);

        let mut n = 1u32;
        while let Some(next) = n.checked_mul(2) {
            if f64::from(next) > ratio {
                break;
            }
            n = next;
        }
        n
    }

    /// Bytes the transformed image will occupy once decoded
    pub fn target_footprint(&self, width: u32, height: u32) -> usize {
        let (w, h) = self.target_size(width, height);
        imgreq_cache::image::allocation_size(w, h, self.config)
    }
}
