//! Remote wire model
//!
//! The request/response shape of the remote API, kept as a JSON object so
//! optional fields stay present-or-absent rather than zero-filled.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as Json};

/// A wire-shaped request or response object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteModel(Map<String, Json>);

impl RemoteModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON value, returning `None` unless it is an object
    pub fn from_value(value: Json) -> Option<Self> {
        match value {
            Json::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    pub fn get(&self, field: &str) -> Option<&Json> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: &str, value: Json) -> Option<Json> {
        self.0.insert(field.to_string(), value)
    }

    pub fn remove(&mut self, field: &str) -> Option<Json> {
        self.0.remove(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &Map<String, Json> {
        &self.0
    }

    pub fn into_value(self) -> Json {
        Json::Object(self.0)
    }
}

impl From<Map<String, Json>> for RemoteModel {
    fn from(map: Map<String, Json>) -> Self {
        Self(map)
    }
}
