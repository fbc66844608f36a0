// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-entity metadata tags.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::uid::Uid;

/// Name of the tag marking populations and projections that serve as channel
/// endpoints.
pub const IO_TYPE_TAG: &str = "io_type";

/// Values of the `io_type` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IoType {
    Input,
    Output,
}

/// A tag value. The set of representable types is closed, like every other
/// type list in the runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TagValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Uid(Uid),
    Io(IoType),
}

impl TagValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            TagValue::Bool(_) => "bool",
            TagValue::Int(_) => "int",
            TagValue::Float(_) => "float",
            TagValue::Text(_) => "text",
            TagValue::Uid(_) => "uid",
            TagValue::Io(_) => "io type",
        }
    }
}

impl From<bool> for TagValue {
    fn from(value: bool) -> Self {
        TagValue::Bool(value)
    }
}

impl From<i64> for TagValue {
    fn from(value: i64) -> Self {
        TagValue::Int(value)
    }
}

impl From<f64> for TagValue {
    fn from(value: f64) -> Self {
        TagValue::Float(value)
    }
}

impl From<&str> for TagValue {
    fn from(value: &str) -> Self {
        TagValue::Text(value.to_owned())
    }
}

impl From<String> for TagValue {
    fn from(value: String) -> Self {
        TagValue::Text(value)
    }
}

impl From<Uid> for TagValue {
    fn from(value: Uid) -> Self {
        TagValue::Uid(value)
    }
}

impl From<IoType> for TagValue {
    fn from(value: IoType) -> Self {
        TagValue::Io(value)
    }
}

/// String-keyed tag map attached to every first-class entity. Lives and dies
/// with its owner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagMap {
    tags: AHashMap<String, TagValue>,
}

macro_rules! typed_getter {
    ($name:ident, $variant:ident, $ty:ty, $expected:literal) => {
        /// Typed read. Fails if the tag is absent or holds another type.
        pub fn $name(&self, name: &str) -> Result<$ty> {
            match self.tags.get(name) {
                None => Err(CoreError::TagNotFound(name.to_owned())),
                Some(TagValue::$variant(value)) => Ok(value.clone()),
                Some(other) => Err(CoreError::TagTypeMismatch {
                    tag: name.to_owned(),
                    expected: $expected,
                    found: other.type_name(),
                }),
            }
        }
    };
}

impl TagMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<TagValue>) {
        self.tags.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&TagValue> {
        self.tags.get(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<TagValue> {
        self.tags.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tags.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &TagValue)> {
        self.tags.iter()
    }

    typed_getter!(get_bool, Bool, bool, "bool");
    typed_getter!(get_int, Int, i64, "int");
    typed_getter!(get_float, Float, f64, "float");
    typed_getter!(get_text, Text, String, "text");
    typed_getter!(get_uid, Uid, Uid, "uid");
    typed_getter!(get_io_type, Io, IoType, "io type");
}
