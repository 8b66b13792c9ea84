//! Image request cache library
//!
//! Byte-bounded in-memory cache for decoded images with LRU eviction and
//! memory pressure handling.

pub mod config;
pub mod image;
pub mod image_cache;
pub mod pressure;

pub use config::{CacheConfig, ConfigError};
pub use image::{ByteFootprint, DecodedImage, PixelFormat};
pub use image_cache::{BoundedImageCache, CacheStats};
pub use pressure::{MemoryPressure, PressureResponse};
