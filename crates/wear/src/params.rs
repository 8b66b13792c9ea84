//! Key-value parameter bundle sent alongside a wearable request

use std::collections::BTreeMap;

use imgreq_cache::PixelFormat;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ParamValue {
    Int(i64),
    Str(String),
    Format(PixelFormat),
}

#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    #[error("missing transformer parameter `{0}`")]
    Missing(String),
    #[error("transformer parameter `{key}` has the wrong type")]
    WrongType { key: String },
    #[error("transformer parameter `{key}` is out of range: {value}")]
    OutOfRange { key: String, value: i64 },
    #[error("could not encode transformer parameters: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Ordered parameter bundle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransformerParams {
    values: BTreeMap<String, ParamValue>,
}

impl TransformerParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: impl Into<String>, value: ParamValue) -> Option<ParamValue> {
        self.values.insert(key.into(), value)
    }

    pub fn put_int(&mut self, key: impl Into<String>, value: i64) {
        self.put(key, ParamValue::Int(value));
    }

    pub fn put_str(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.put(key, ParamValue::Str(value.into()));
    }

    pub fn put_format(&mut self, key: impl Into<String>, value: PixelFormat) {
        self.put(key, ParamValue::Format(value));
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.values.get(key)
    }

    pub fn get_int(&self, key: &str) -> Result<i64, ParamsError> {
        match self.require(key)? {
            ParamValue::Int(value) => Ok(*value),
            _ => Err(ParamsError::WrongType { key: key.to_string() }),
        }
    }

    pub fn get_str(&self, key: &str) -> Result<&str, ParamsError> {
        match self.require(key)? {
            ParamValue::Str(value) => Ok(value.as_str()),
            _ => Err(ParamsError::WrongType { key: key.to_string() }),
        }
    }

    pub fn get_format(&self, key: &str) -> Result<PixelFormat, ParamsError> {
        match self.require(key)? {
            ParamValue::Format(value) => Ok(*value),
            _ => Err(ParamsError::WrongType { key: key.to_string() }),
        }
    }

    /// Integer parameter that must fit in a `u32`
    pub fn get_u32(&self, key: &str) -> Result<u32, ParamsError> {
        let value = self.get_int(key)?;
        u32::try_from(value).map_err(|_| ParamsError::OutOfRange {
            key: key.to_string(),
            value,
        })
    }

    fn require(&self, key: &str) -> Result<&ParamValue, ParamsError> {
        self.values
            .get(key)
            .ok_or_else(|| ParamsError::Missing(key.to_string()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ParamValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Encode for delivery to the paired device
    pub fn to_bytes(&self) -> Result<Vec<u8>, ParamsError> {
        Ok(serde_json::to_vec(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ParamsError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
