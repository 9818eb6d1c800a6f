// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! JSON encoding/decoding for records.
//!
//! A record encodes to a flat object with one key per set field, in
//! declaration order. There is no envelope: decoding is parameterized by the
//! layout, the JSON does not say which layout it belongs to.

use crate::descriptor::json_kind;
use crate::error::RecordError;
use crate::layout::Layout;
use crate::record::Record;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Policy for object keys that match no declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnknownKeys {
    /// Skip silently.
    #[default]
    Ignore,
    /// Skip, logging each key at warn level.
    Warn,
    /// Fail with [`RecordError::UnknownKey`].
    Reject,
}

/// Options for [`decode_with`].
#[derive(Debug, Clone, Default)]
pub struct DecodeOptions {
    /// Handling of undeclared keys.
    pub unknown_keys: UnknownKeys,
}

impl DecodeOptions {
    /// Default options: unknown keys are ignored.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the unknown-key policy.
    pub fn unknown_keys(mut self, policy: UnknownKeys) -> Self {
        self.unknown_keys = policy;
        self
    }
}

/// Encode a record to a JSON object. Unset fields are omitted.
pub fn encode<S: 'static>(record: &Record<S>) -> Value {
    let names = record.layout().field_names();
    let mut object = Map::new();
    for (index, value) in record.encoded_slots() {
        if let Some(name) = names.get(index) {
            object.insert(name.clone(), value);
        }
    }
    Value::Object(object)
}

/// Decode a JSON object against `layout`, ignoring unknown keys.
pub fn decode<S: 'static>(layout: &Arc<Layout<S>>, json: &Value) -> Result<Record<S>, RecordError> {
    decode_with(layout, json, &DecodeOptions::default())
}

/// Decode a JSON object against `layout`.
///
/// Missing keys leave their field unset. The first field that fails to
/// decode aborts with an error naming that field.
pub fn decode_with<S: 'static>(
    layout: &Arc<Layout<S>>,
    json: &Value,
    options: &DecodeOptions,
) -> Result<Record<S>, RecordError> {
    let object = json.as_object().ok_or_else(|| RecordError::NotAnObject {
        layout: layout.name().to_string(),
        found: json_kind(json),
    })?;

    let mut record = Record::allocate(layout)?;

    let decoders = layout.decoders();
    for (index, (name, decode_field)) in decoders.iter().enumerate() {
        let Some(value) = object.get(name) else {
            continue;
        };
        log::trace!("[json] \"{}\" decoding field \"{}\"", layout.name(), name);
        let slot = decode_field(value).map_err(|e| RecordError::from_decode(name, e))?;
        record.put(index, slot);
    }

    if options.unknown_keys != UnknownKeys::Ignore {
        for key in object.keys() {
            if decoders.iter().any(|(name, _)| name == key) {
                continue;
            }
            if options.unknown_keys == UnknownKeys::Reject {
                return Err(RecordError::UnknownKey {
                    layout: layout.name().to_string(),
                    key: key.clone(),
                });
            }
            log::warn!("[json] \"{}\" ignoring unknown key \"{}\"", layout.name(), key);
        }
    }

    Ok(record)
}

/// Encode a record to compact JSON text.
pub fn to_string<S: 'static>(record: &Record<S>) -> String {
    encode(record).to_string()
}

/// Encode a record to indented JSON text.
pub fn to_string_pretty<S: 'static>(record: &Record<S>) -> Result<String, RecordError> {
    Ok(serde_json::to_string_pretty(&encode(record))?)
}

/// Parse JSON text and decode it against `layout`.
pub fn from_str<S: 'static>(layout: &Arc<Layout<S>>, text: &str) -> Result<Record<S>, RecordError> {
    let json: Value = serde_json::from_str(text)?;
    decode(layout, &json)
}

impl<S: 'static> Record<S> {
    /// Encode to a JSON object. See [`encode`].
    pub fn to_json(&self) -> Value {
        encode(self)
    }
}

impl<S: 'static> Layout<S> {
    /// Decode a record of this layout. See [`decode`].
    pub fn decode(self: &Arc<Self>, json: &Value) -> Result<Record<S>, RecordError> {
        decode(self, json)
    }
}

/// Prints the record as compact JSON.
impl<S: 'static> fmt::Display for Record<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", encode(self))
    }
}
