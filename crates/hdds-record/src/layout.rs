// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Layouts: runtime-declared record schemas, and the field handles they issue.
//!
//! A [`Layout`] accepts field declarations until it is sealed. Each
//! declaration returns a [`Field`] handle bound to that layout's identity;
//! sealing freezes the field list and enables record allocation.
//!
//! ```text
//!   Unsealed --field--> Unsealed
//!   Unsealed --seal---> Sealed --seal--> Sealed (no-op)
//!                       Sealed --field--> SealedLayoutMutation
//! ```
//!
//! The `S` type parameter is a caller-chosen tag. Fields of a
//! `Layout<Sensor>` cannot be passed to a `Record<Actuator>` at all; fields of
//! two layouts sharing the same tag are told apart at runtime by identity.

use crate::descriptor::{Descriptor, Shape};
use crate::error::{DecodeError, RecordError};
use crate::polid::{Equality, Polid};
use crate::record::{Record, Slot, TypedSlot};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

pub(crate) type DecodeSlotFn = Arc<dyn Fn(&Value) -> Result<Box<dyn Slot>, DecodeError> + Send + Sync>;

/// Declare an untagged layout.
///
/// Shorthand for `Layout::<()>::declare(name)`.
pub fn declare(name: impl Into<String>) -> Arc<Layout> {
    Layout::declare(name)
}

/// Record schema: a named, ordered list of typed fields.
pub struct Layout<S = ()> {
    name: String,
    identity: Polid<S>,
    state: RwLock<LayoutState>,
}

#[derive(Default)]
struct LayoutState {
    fields: Vec<FieldMeta>,
    sealed: bool,
}

/// Per-field metadata with a type-erased decoder.
struct FieldMeta {
    name: String,
    type_name: String,
    shape: Shape,
    decode: DecodeSlotFn,
}

/// Read-only description of a declared field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldInfo {
    /// Position in declaration order.
    pub index: usize,
    /// Field name (JSON key).
    pub name: String,
    /// Descriptor name.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Descriptor shape.
    pub shape: Shape,
}

impl<S: 'static> Layout<S> {
    /// Declare a new, empty, unsealed layout with a fresh identity.
    pub fn declare(name: impl Into<String>) -> Arc<Self> {
        let name = name.into();
        let identity = Polid::fresh();
        log::debug!("[layout] declared \"{}\" identity={}", name, identity);
        Arc::new(Self {
            name,
            identity,
            state: RwLock::new(LayoutState::default()),
        })
    }

    /// Layout name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identity token, unique to this layout instance.
    pub fn identity(&self) -> &Polid<S> {
        &self.identity
    }

    /// Compare identities with another layout, possibly of another tag type.
    pub fn same_as<U: 'static>(&self, other: &Layout<U>) -> Equality<S, U> {
        self.identity.equal(&other.identity)
    }

    /// Check if the layout is sealed.
    pub fn is_sealed(&self) -> bool {
        self.state.read().sealed
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.state.read().fields.len()
    }

    /// Check if no field is declared.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Declare a field.
    ///
    /// Fails with [`RecordError::SealedLayoutMutation`] once sealed, and with
    /// [`RecordError::DuplicateField`] if `name` is already declared.
    pub fn field<V>(
        &self,
        name: impl Into<String>,
        descriptor: &Descriptor<V>,
    ) -> Result<Field<S, V>, RecordError>
    where
        V: Clone + Send + Sync + 'static,
    {
        let name = name.into();
        let mut state = self.state.write();

        if state.sealed {
            return Err(RecordError::SealedLayoutMutation {
                layout: self.name.clone(),
                field: name,
            });
        }
        if state.fields.iter().any(|f| f.name == name) {
            return Err(RecordError::DuplicateField {
                layout: self.name.clone(),
                field: name,
            });
        }

        let index = state.fields.len();
        let decoder = descriptor.clone();
        state.fields.push(FieldMeta {
            name: name.clone(),
            type_name: descriptor.name().to_string(),
            shape: descriptor.shape().clone(),
            decode: Arc::new(move |json: &Value| -> Result<Box<dyn Slot>, DecodeError> {
                let value = decoder.from_json(json)?;
                Ok(Box::new(TypedSlot::new(value, &decoder)))
            }),
        });

        log::trace!(
            "[layout] \"{}\" field #{} \"{}\": {}",
            self.name,
            index,
            name,
            descriptor.name()
        );

        Ok(Field {
            layout_id: self.identity.id(),
            layout_name: self.name.clone(),
            index,
            name,
            descriptor: descriptor.clone(),
            _tag: PhantomData,
        })
    }

    /// Seal the layout. Idempotent; sealing cannot be undone.
    pub fn seal(&self) {
        let mut state = self.state.write();
        if state.sealed {
            log::debug!("[layout] \"{}\" already sealed", self.name);
            return;
        }
        state.sealed = true;
        log::debug!(
            "[layout] sealed \"{}\" with {} field(s)",
            self.name,
            state.fields.len()
        );
    }

    /// Allocate an empty record. Fails unless the layout is sealed.
    pub fn allocate(self: &Arc<Self>) -> Result<Record<S>, RecordError> {
        Record::allocate(self)
    }

    /// Describe declared fields, in declaration order.
    pub fn fields(&self) -> Vec<FieldInfo> {
        self.state
            .read()
            .fields
            .iter()
            .enumerate()
            .map(|(index, f)| FieldInfo {
                index,
                name: f.name.clone(),
                type_name: f.type_name.clone(),
                shape: f.shape.clone(),
            })
            .collect()
    }

    /// Declared field names, in declaration order.
    pub fn field_names(&self) -> Vec<String> {
        self.state
            .read()
            .fields
            .iter()
            .map(|f| f.name.clone())
            .collect()
    }

    /// Position of a field by name.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.state.read().fields.iter().position(|f| f.name == name)
    }

    /// JSON description of the layout: name, sealing state and fields.
    pub fn schema(&self) -> Value {
        serde_json::json!({
            "name": self.name,
            "sealed": self.is_sealed(),
            "fields": self.fields(),
        })
    }

    /// Field names paired with their decoders, in declaration order.
    ///
    /// Copied out so decoders run without holding the layout lock.
    pub(crate) fn decoders(&self) -> Vec<(String, DecodeSlotFn)> {
        self.state
            .read()
            .fields
            .iter()
            .map(|f| (f.name.clone(), Arc::clone(&f.decode)))
            .collect()
    }
}

impl<S> fmt::Debug for Layout<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("Layout")
            .field("name", &self.name)
            .field("identity", &self.identity)
            .field(
                "fields",
                &state.fields.iter().map(|m| m.name.as_str()).collect::<Vec<_>>(),
            )
            .field("sealed", &state.sealed)
            .finish()
    }
}

/// Typed handle to one field of one layout.
///
/// Only [`Layout::field`] creates handles. A handle is accepted only by
/// records of the layout that issued it.
pub struct Field<S, V> {
    layout_id: u64,
    layout_name: String,
    index: usize,
    name: String,
    descriptor: Descriptor<V>,
    _tag: PhantomData<fn() -> S>,
}

impl<S, V: 'static> Field<S, V> {
    /// Field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position in the layout.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Value descriptor.
    pub fn descriptor(&self) -> &Descriptor<V> {
        &self.descriptor
    }

    /// Identity of the declaring layout.
    pub fn layout_id(&self) -> u64 {
        self.layout_id
    }

    /// Name of the declaring layout.
    pub fn layout_name(&self) -> &str {
        &self.layout_name
    }

    /// Check if this handle was issued by `layout`.
    pub fn belongs_to(&self, layout: &Layout<S>) -> bool
    where
        S: 'static,
    {
        self.layout_id == layout.identity().id()
    }

    /// Re-tag the handle once two tags are proven equal.
    pub fn coerce<U>(self, _proof: &crate::polid::TypeEq<S, U>) -> Field<U, V> {
        Field {
            layout_id: self.layout_id,
            layout_name: self.layout_name,
            index: self.index,
            name: self.name,
            descriptor: self.descriptor,
            _tag: PhantomData,
        }
    }
}

impl<S, V> Clone for Field<S, V> {
    fn clone(&self) -> Self {
        Self {
            layout_id: self.layout_id,
            layout_name: self.layout_name.clone(),
            index: self.index,
            name: self.name.clone(),
            descriptor: self.descriptor.clone(),
            _tag: PhantomData,
        }
    }
}

impl<S, V> fmt::Debug for Field<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("layout", &self.layout_name)
            .field("layout_id", &self.layout_id)
            .field("index", &self.index)
            .field("name", &self.name)
            .finish()
    }
}
