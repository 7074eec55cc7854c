//! Value Codec Module
//!
//! Converts typed cache values to and from the JSON stored in a box.

use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{CacheError, Result};

// == Cache Codec ==
/// Encodes values of type `V` into JSON and back.
///
/// Implementations must round-trip: `decode(encode(v))` yields a value equal
/// to `v`. They must not carry business logic.
pub trait CacheCodec<V>: Send + Sync {
    fn encode(&self, value: &V) -> Result<Value>;

    fn decode(&self, data: Value) -> Result<V>;
}

// == JSON Codec ==
/// Serde-based codec for any `Serialize + DeserializeOwned` type.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl<V> CacheCodec<V> for JsonCodec
where
    V: Serialize + DeserializeOwned,
{
    fn encode(&self, value: &V) -> Result<Value> {
        Ok(serde_json::to_value(value)?)
    }

    fn decode(&self, data: Value) -> Result<V> {
        Ok(serde_json::from_value(data)?)
    }
}

// == Function Codec ==
/// Codec built from a pair of plain functions, for types that do not
/// implement serde's traits.
///
/// The decoder returns `None` when the stored JSON has the wrong shape.
pub struct FnCodec<V, E, D> {
    to_json: E,
    from_json: D,
    _marker: PhantomData<fn() -> V>,
}

impl<V, E, D> FnCodec<V, E, D>
where
    E: Fn(&V) -> Value + Send + Sync,
    D: Fn(Value) -> Option<V> + Send + Sync,
{
    pub fn new(to_json: E, from_json: D) -> Self {
        Self {
            to_json,
            from_json,
            _marker: PhantomData,
        }
    }
}

impl<V, E, D> CacheCodec<V> for FnCodec<V, E, D>
where
    E: Fn(&V) -> Value + Send + Sync,
    D: Fn(Value) -> Option<V> + Send + Sync,
{
    fn encode(&self, value: &V) -> Result<Value> {
        Ok((self.to_json)(value))
    }

    fn decode(&self, data: Value) -> Result<V> {
        (self.from_json)(data)
            .ok_or_else(|| CacheError::Codec("stored data rejected by decoder".to_string()))
    }
}

impl<V, E, D> fmt::Debug for FnCodec<V, E, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCodec").finish_non_exhaustive()
    }
}
