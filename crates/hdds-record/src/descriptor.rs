// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type descriptors: named, bidirectional JSON codecs for field values.
//!
//! A [`Descriptor<V>`] pairs a name and a [`Shape`] with the two conversion
//! functions for `V`. Leaves are built with [`Descriptor::new`] (or
//! [`Descriptor::serde`] for serde types); composite descriptors come from the
//! combinators in this module ([`list_of`], [`option_of`], [`pair_of`],
//! [`result_of`], [`view`]).
//!
//! # Wire shapes
//!
//! | Descriptor | JSON |
//! |------------|------|
//! | [`unit`] | `null` |
//! | [`boolean`] | `true` / `false` |
//! | [`int`] | integer number (`i64`) |
//! | [`float`] | number (`f64`) |
//! | [`string`] | string |
//! | [`list_of`] | array |
//! | [`option_of`] | `null` or the inner shape |
//! | [`pair_of`] | `{"<label1>": a, "<label2>": b}` |
//! | [`result_of`] | `{"Ok": a}` or `{"Error": b}` |
//! | [`view`] | shape of the base descriptor |
//! | [`opaque_error`] | string (encode only) |

use crate::error::DecodeError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

pub(crate) type ToJsonFn<V> = Arc<dyn Fn(&V) -> Value + Send + Sync>;
type FromJsonFn<V> = Arc<dyn Fn(&Value) -> Result<V, DecodeError> + Send + Sync>;

/// Opaque error values: encodable for reporting, never decodable.
pub type OpaqueError = Arc<dyn std::error::Error + Send + Sync>;

/// Structural description of a descriptor.
///
/// Closed set of variants; user-defined types appear as [`Shape::Leaf`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    /// User or built-in scalar codec.
    Leaf {
        /// Descriptor name.
        name: String,
    },
    /// JSON array of elements.
    List {
        /// Element shape.
        element: Box<Shape>,
    },
    /// Nullable value.
    Option {
        /// Inner shape.
        inner: Box<Shape>,
    },
    /// Two-key object.
    Pair {
        /// First component.
        first: Labeled,
        /// Second component.
        second: Labeled,
    },
    /// `{"Ok": ..}` / `{"Error": ..}` tagged value.
    Result {
        /// Success shape.
        ok: Box<Shape>,
        /// Failure shape.
        err: Box<Shape>,
    },
    /// Re-typed view over another shape.
    View {
        /// View name.
        name: String,
        /// Underlying wire shape.
        base: Box<Shape>,
    },
    /// Encode-only value.
    Opaque {
        /// Descriptor name.
        name: String,
    },
}

/// A pair component: wire key plus shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Labeled {
    /// JSON object key.
    pub label: String,
    /// Component shape.
    pub shape: Box<Shape>,
}

impl Shape {
    /// Check if this shape can be decoded.
    ///
    /// False when any component is opaque.
    pub fn is_decodable(&self) -> bool {
        match self {
            Shape::Leaf { .. } => true,
            Shape::Opaque { .. } => false,
            Shape::List { element } => element.is_decodable(),
            Shape::Option { inner } => inner.is_decodable(),
            Shape::Pair { first, second } => {
                first.shape.is_decodable() && second.shape.is_decodable()
            }
            Shape::Result { ok, err } => ok.is_decodable() && err.is_decodable(),
            Shape::View { base, .. } => base.is_decodable(),
        }
    }
}

/// Named bidirectional JSON codec for values of type `V`.
///
/// Cheap to clone; the conversion functions are shared.
pub struct Descriptor<V> {
    name: String,
    shape: Shape,
    to_json: ToJsonFn<V>,
    from_json: FromJsonFn<V>,
}

impl<V: 'static> Descriptor<V> {
    /// Create a leaf descriptor from a pair of conversion functions.
    ///
    /// `from_json` reports failures as plain messages; they surface as
    /// [`DecodeError::Invalid`].
    pub fn new<E, D>(name: impl Into<String>, to_json: E, from_json: D) -> Self
    where
        E: Fn(&V) -> Value + Send + Sync + 'static,
        D: Fn(&Value) -> Result<V, String> + Send + Sync + 'static,
    {
        let name = name.into();
        Self {
            shape: Shape::Leaf { name: name.clone() },
            name,
            to_json: Arc::new(to_json),
            from_json: Arc::new(move |json: &Value| from_json(json).map_err(DecodeError::Invalid)),
        }
    }

    fn from_parts<E, D>(name: String, shape: Shape, to_json: E, from_json: D) -> Self
    where
        E: Fn(&V) -> Value + Send + Sync + 'static,
        D: Fn(&Value) -> Result<V, DecodeError> + Send + Sync + 'static,
    {
        Self {
            name,
            shape,
            to_json: Arc::new(to_json),
            from_json: Arc::new(from_json),
        }
    }

    /// Descriptor name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Structural description.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Encode a value.
    pub fn to_json(&self, value: &V) -> Value {
        (self.to_json)(value)
    }

    /// Decode a value.
    pub fn from_json(&self, json: &Value) -> Result<V, DecodeError> {
        (self.from_json)(json)
    }

    /// Shared handle on the encode function.
    pub(crate) fn encoder(&self) -> ToJsonFn<V> {
        Arc::clone(&self.to_json)
    }
}

impl<V> Descriptor<V>
where
    V: Serialize + DeserializeOwned + 'static,
{
    /// Leaf descriptor backed by the type's serde implementation.
    ///
    /// Values serde cannot represent as JSON encode to `null` and are
    /// logged at error level.
    pub fn serde(name: impl Into<String>) -> Self {
        let name = name.into();
        let type_name = name.clone();
        Self::new(
            name,
            move |value: &V| {
                serde_json::to_value(value).unwrap_or_else(|e| {
                    log::error!("[descriptor] cannot encode {} value: {}", type_name, e);
                    Value::Null
                })
            },
            |json| serde_json::from_value(json.clone()).map_err(|e| e.to_string()),
        )
    }
}

impl<V> Clone for Descriptor<V> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            shape: self.shape.clone(),
            to_json: Arc::clone(&self.to_json),
            from_json: Arc::clone(&self.from_json),
        }
    }
}

impl<V> fmt::Debug for Descriptor<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("name", &self.name)
            .field("shape", &self.shape)
            .finish()
    }
}

/// Human-readable name of a JSON value's kind, for error messages.
pub fn json_kind(json: &Value) -> &'static str {
    match json {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn mismatch(expected: &str, json: &Value) -> String {
    format!("expected {}, found {}", expected, json_kind(json))
}

// ---------------------------------------------------------------------------
// Built-in leaves
// ---------------------------------------------------------------------------

/// `()` as JSON `null`.
pub fn unit() -> Descriptor<()> {
    Descriptor::new(
        "unit",
        |_: &()| Value::Null,
        |json| match json {
            Value::Null => Ok(()),
            other => Err(mismatch("null", other)),
        },
    )
}

/// `bool` as a JSON boolean.
pub fn boolean() -> Descriptor<bool> {
    Descriptor::new(
        "bool",
        |b: &bool| Value::Bool(*b),
        |json| json.as_bool().ok_or_else(|| mismatch("bool", json)),
    )
}

/// `i64` as a JSON integer. Non-integral numbers are rejected.
pub fn int() -> Descriptor<i64> {
    Descriptor::new(
        "int",
        |n: &i64| Value::from(*n),
        |json| json.as_i64().ok_or_else(|| mismatch("int", json)),
    )
}

/// `f64` as a JSON number.
///
/// Non-finite values have no JSON form and encode to `null`.
pub fn float() -> Descriptor<f64> {
    Descriptor::new(
        "float",
        |x: &f64| Value::from(*x),
        |json| json.as_f64().ok_or_else(|| mismatch("float", json)),
    )
}

/// `String` as a JSON string.
pub fn string() -> Descriptor<String> {
    Descriptor::new(
        "string",
        |s: &String| Value::String(s.clone()),
        |json| {
            json.as_str()
                .map(str::to_string)
                .ok_or_else(|| mismatch("string", json))
        },
    )
}

/// Raw JSON values, passed through unchanged.
pub fn json() -> Descriptor<Value> {
    Descriptor::new("json", Value::clone, |json| Ok(json.clone()))
}

/// Opaque errors, encoded as their display string.
///
/// Decoding always fails with [`DecodeError::Opaque`]: a live error value
/// cannot be rebuilt from its message.
pub fn opaque_error() -> Descriptor<OpaqueError> {
    let name = "error".to_string();
    let type_name = name.clone();
    Descriptor::from_parts(
        name.clone(),
        Shape::Opaque { name },
        |err: &OpaqueError| Value::String(err.to_string()),
        move |_: &Value| {
            Err(DecodeError::Opaque {
                type_name: type_name.clone(),
            })
        },
    )
}

// ---------------------------------------------------------------------------
// Combinators
// ---------------------------------------------------------------------------

/// Homogeneous list as a JSON array.
///
/// Decoding stops at the first failing element and reports its index
/// alongside the element's own message.
pub fn list_of<V: 'static>(element: &Descriptor<V>) -> Descriptor<Vec<V>> {
    let enc = element.clone();
    let dec = element.clone();
    Descriptor::from_parts(
        format!("list<{}>", element.name),
        Shape::List {
            element: Box::new(element.shape.clone()),
        },
        move |items: &Vec<V>| {
            Value::Array(items.iter().map(|item| enc.to_json(item)).collect())
        },
        move |json| {
            let items = json
                .as_array()
                .ok_or_else(|| DecodeError::Invalid(mismatch("array", json)))?;
            items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    dec.from_json(item)
                        .map_err(|e| e.context(format_args!("at index {}", i)))
                })
                .collect()
        },
    )
}

/// Optional value: `None` is `null`, `Some(v)` uses the inner shape.
pub fn option_of<V: 'static>(inner: &Descriptor<V>) -> Descriptor<Option<V>> {
    let enc = inner.clone();
    let dec = inner.clone();
    Descriptor::from_parts(
        format!("option<{}>", inner.name),
        Shape::Option {
            inner: Box::new(inner.shape.clone()),
        },
        move |value: &Option<V>| match value {
            Some(v) => enc.to_json(v),
            None => Value::Null,
        },
        move |json| match json {
            Value::Null => Ok(None),
            other => dec.from_json(other).map(Some),
        },
    )
}

/// Pair as a two-key JSON object.
///
/// Labels are the wire keys. Equal labels cannot hold both components: the
/// conflict is logged at warn level when the descriptor is built, and every
/// decode through it fails.
pub fn pair_of<A: 'static, B: 'static>(
    first_label: impl Into<String>,
    first: &Descriptor<A>,
    second_label: impl Into<String>,
    second: &Descriptor<B>,
) -> Descriptor<(A, B)> {
    let first_label = first_label.into();
    let second_label = second_label.into();
    let (enc_a, dec_a) = (first.clone(), first.clone());
    let (enc_b, dec_b) = (second.clone(), second.clone());
    let (enc_la, enc_lb) = (first_label.clone(), second_label.clone());
    let (dec_la, dec_lb) = (first_label.clone(), second_label.clone());
    let collide = first_label == second_label;
    if collide {
        log::warn!(
            "[descriptor] pair<{},{}> uses label \"{}\" twice; values will not decode",
            first.name,
            second.name,
            first_label
        );
    }

    Descriptor::from_parts(
        format!("pair<{},{}>", first.name, second.name),
        Shape::Pair {
            first: Labeled {
                label: first_label,
                shape: Box::new(first.shape.clone()),
            },
            second: Labeled {
                label: second_label,
                shape: Box::new(second.shape.clone()),
            },
        },
        move |(a, b): &(A, B)| {
            let mut map = Map::new();
            map.insert(enc_la.clone(), enc_a.to_json(a));
            map.insert(enc_lb.clone(), enc_b.to_json(b));
            Value::Object(map)
        },
        move |json| {
            if collide {
                return Err(DecodeError::Invalid(format!(
                    "pair labels collide on \"{}\"",
                    dec_la
                )));
            }
            let map = json
                .as_object()
                .ok_or_else(|| DecodeError::Invalid(mismatch("object", json)))?;
            let a = decode_member(map, &dec_la, &dec_a)?;
            let b = decode_member(map, &dec_lb, &dec_b)?;
            Ok((a, b))
        },
    )
}

fn decode_member<V: 'static>(
    map: &Map<String, Value>,
    label: &str,
    desc: &Descriptor<V>,
) -> Result<V, DecodeError> {
    let value = map
        .get(label)
        .ok_or_else(|| DecodeError::Invalid(format!("missing key \"{}\"", label)))?;
    desc.from_json(value)
        .map_err(|e| e.context(format_args!("in \"{}\"", label)))
}

const OK_TAG: &str = "Ok";
const ERROR_TAG: &str = "Error";

/// Success-or-failure value as `{"Ok": v}` or `{"Error": e}`.
pub fn result_of<A: 'static, B: 'static>(
    ok: &Descriptor<A>,
    err: &Descriptor<B>,
) -> Descriptor<Result<A, B>> {
    let (enc_ok, dec_ok) = (ok.clone(), ok.clone());
    let (enc_err, dec_err) = (err.clone(), err.clone());

    Descriptor::from_parts(
        format!("result<{},{}>", ok.name, err.name),
        Shape::Result {
            ok: Box::new(ok.shape.clone()),
            err: Box::new(err.shape.clone()),
        },
        move |value: &Result<A, B>| {
            let (tag, inner) = match value {
                Ok(a) => (OK_TAG, enc_ok.to_json(a)),
                Err(b) => (ERROR_TAG, enc_err.to_json(b)),
            };
            let mut map = Map::new();
            map.insert(tag.to_string(), inner);
            Value::Object(map)
        },
        move |json| {
            let map = json
                .as_object()
                .ok_or_else(|| DecodeError::Invalid(mismatch("object", json)))?;
            if map.len() != 1 {
                return Err(DecodeError::Invalid(format!(
                    "expected exactly one of \"{}\" or \"{}\", found {} keys",
                    OK_TAG,
                    ERROR_TAG,
                    map.len()
                )));
            }
            match map.iter().next() {
                Some((tag, inner)) if tag == OK_TAG => dec_ok
                    .from_json(inner)
                    .map(Ok)
                    .map_err(|e| e.context(OK_TAG)),
                Some((tag, inner)) if tag == ERROR_TAG => dec_err
                    .from_json(inner)
                    .map(Err)
                    .map_err(|e| e.context(ERROR_TAG)),
                Some((tag, _)) => Err(DecodeError::Invalid(format!(
                    "unknown result tag \"{}\"",
                    tag
                ))),
                None => Err(DecodeError::invalid("empty result object")),
            }
        },
    )
}

/// Re-type `base` as `V2`, reusing its wire shape.
///
/// Encoding converts with `write` (total) then applies `base`. Decoding
/// applies `base` then `read`; a failing `read` fails the decode with its
/// message.
pub fn view<V, V2, R, W>(name: impl Into<String>, read: R, write: W, base: &Descriptor<V>) -> Descriptor<V2>
where
    V: 'static,
    V2: 'static,
    R: Fn(V) -> Result<V2, String> + Send + Sync + 'static,
    W: Fn(&V2) -> V + Send + Sync + 'static,
{
    let name = name.into();
    let enc = base.clone();
    let dec = base.clone();
    Descriptor::from_parts(
        name.clone(),
        Shape::View {
            name,
            base: Box::new(base.shape.clone()),
        },
        move |v2: &V2| enc.to_json(&write(v2)),
        move |json| {
            let v = dec.from_json(json)?;
            read(v).map_err(DecodeError::Invalid)
        },
    )
}
