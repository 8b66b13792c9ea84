//! Wearable image requests
//!
//! A wearable cannot fetch and decode full-size images itself. It sends the
//! request to the paired phone together with transform parameters; the phone
//! fetches, shrinks the image with [`ImageTransform`] and ships it back.

pub mod params;
pub mod request;
pub mod transform;

pub use params::{ParamValue, ParamsError, TransformerParams};
pub use request::{wear_image_request, WearEnvelope, WearImageRequest, WearRequest, IMAGE_TRANSFORMER_KEY};
pub use transform::ImageTransform;
