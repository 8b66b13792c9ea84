//! Requests issued by the wearable and run on the paired phone

use imgreq_cache::PixelFormat;
use serde::{Deserialize, Serialize};

use crate::params::{ParamsError, TransformerParams};
use crate::transform::ImageTransform;

/// Transformer the phone applies to image responses
pub const IMAGE_TRANSFORMER_KEY: &str = "imgreq.transformer.image";

/// A request that carries work for the phone-side transformer
pub trait WearRequest {
    fn url(&self) -> &str;

    /// Parameters handed to the transformer on the phone
    fn transformer_params(&self) -> TransformerParams;

    /// Which transformer processes the response
    fn transformer_key(&self) -> &str;
}

/// Image request sized for a wearable screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WearImageRequest {
    url: String,
    transform: ImageTransform,
}

impl WearImageRequest {
    pub fn new(url: impl Into<String>, max_width: u32, max_height: u32, config: PixelFormat) -> Self {
        Self {
            url: url.into(),
            transform: ImageTransform::new(max_width, max_height, config),
        }
    }

    pub fn max_width(&self) -> u32 {
        self.transform.max_width
    }

    pub fn max_height(&self) -> u32 {
        self.transform.max_height
    }

    pub fn config(&self) -> PixelFormat {
        self.transform.config
    }

    pub fn transform(&self) -> &ImageTransform {
        &self.transform
    }
}

impl WearRequest for WearImageRequest {
    fn url(&self) -> &str {
        &self.url
    }

    fn transformer_params(&self) -> TransformerParams {
        self.transform.to_params()
    }

    fn transformer_key(&self) -> &str {
        IMAGE_TRANSFORMER_KEY
    }
}

/// Build an image request for the wearable
///
/// The decoded image the phone sends back fits in `max_width` x `max_height`
/// (0 for no limit) and uses the `config` pixel format.
pub fn wear_image_request(
    url: impl Into<String>,
    max_width: u32,
    max_height: u32,
    config: PixelFormat,
) -> WearImageRequest {
    WearImageRequest::new(url, max_width, max_height, config)
}

/// What actually travels between devices for a wear request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WearEnvelope {
    pub url: String,
    pub transformer_key: String,
    pub params: TransformerParams,
}

impl WearEnvelope {
    pub fn from_request<R: WearRequest + ?Sized>(request: &R) -> Self {
        Self {
            url: request.url().to_string(),
            transformer_key: request.transformer_key().to_string(),
            params: request.transformer_params(),
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ParamsError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParamsError> {
        let envelope: Self = serde_json::from_slice(bytes)?;
        tracing::debug!(
            url = envelope.url.as_str(),
            transformer = envelope.transformer_key.as_str(),
            params = envelope.params.len(),
            "received wear request"
        );
        Ok(envelope)
    }

    /// Image transform for envelopes addressed to the image transformer
    pub fn image_transform(&self) -> Option<Result<ImageTransform, ParamsError>> {
        (self.transformer_key == IMAGE_TRANSFORMER_KEY)
            .then(|| ImageTransform::from_params(&self.params))
    }
}
