// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Record container: one value slot per field of a sealed layout.

use crate::descriptor::{Descriptor, ToJsonFn};
use crate::error::RecordError;
use crate::layout::{Field, Layout};
use crate::polid::TypeEq;
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Type-erased stored value that knows how to encode itself.
pub(crate) trait Slot: Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any>;
    fn to_json(&self) -> Value;
    fn clone_slot(&self) -> Box<dyn Slot>;
}

/// Concrete slot: the value plus the encoder of the field it was written with.
pub(crate) struct TypedSlot<V> {
    value: V,
    encode: ToJsonFn<V>,
}

impl<V: 'static> TypedSlot<V> {
    pub(crate) fn new(value: V, descriptor: &Descriptor<V>) -> Self {
        Self {
            value,
            encode: descriptor.encoder(),
        }
    }
}

impl<V> Slot for TypedSlot<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn as_any(&self) -> &dyn Any {
        &self.value
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        Box::new(self.value)
    }

    fn to_json(&self) -> Value {
        (self.encode)(&self.value)
    }

    fn clone_slot(&self) -> Box<dyn Slot> {
        Box::new(Self {
            value: self.value.clone(),
            encode: Arc::clone(&self.encode),
        })
    }
}

/// A value conforming to one sealed [`Layout`].
///
/// Fields start unset. Access goes through [`Field`] handles; a handle from
/// another layout is rejected with [`RecordError::LayoutMismatch`].
pub struct Record<S = ()> {
    layout: Arc<Layout<S>>,
    slots: Vec<Option<Box<dyn Slot>>>,
}

impl<S: 'static> Record<S> {
    /// Allocate an empty record. Fails unless `layout` is sealed.
    pub fn allocate(layout: &Arc<Layout<S>>) -> Result<Self, RecordError> {
        if !layout.is_sealed() {
            return Err(RecordError::UnsealedLayoutAllocation {
                layout: layout.name().to_string(),
            });
        }
        let slots = (0..layout.len()).map(|_| None).collect();
        Ok(Self {
            layout: Arc::clone(layout),
            slots,
        })
    }

    /// Layout this record conforms to.
    pub fn layout(&self) -> &Arc<Layout<S>> {
        &self.layout
    }

    /// Read a field.
    ///
    /// Fails with [`RecordError::UndefinedField`] if the field was never set.
    pub fn get<V: 'static>(&self, field: &Field<S, V>) -> Result<&V, RecordError> {
        self.try_get(field)?
            .ok_or_else(|| RecordError::UndefinedField {
                layout: self.layout.name().to_string(),
                field: field.name().to_string(),
            })
    }

    /// Read a field, treating "unset" as `None`.
    pub fn try_get<V: 'static>(&self, field: &Field<S, V>) -> Result<Option<&V>, RecordError> {
        self.check(field)?;
        match self.slots.get(field.index()) {
            Some(Some(slot)) => slot
                .as_any()
                .downcast_ref::<V>()
                .map(Some)
                .ok_or_else(|| self.mismatch(field)),
            _ => Ok(None),
        }
    }

    /// Write a field, replacing any previous value.
    pub fn set<V>(&mut self, field: &Field<S, V>, value: V) -> Result<(), RecordError>
    where
        V: Clone + Send + Sync + 'static,
    {
        self.check(field)?;
        let slot = Box::new(TypedSlot::new(value, field.descriptor()));
        self.put(field.index(), slot);
        Ok(())
    }

    /// Clear a field, returning its previous value if it was set.
    pub fn unset<V: 'static>(&mut self, field: &Field<S, V>) -> Result<Option<V>, RecordError> {
        self.check(field)?;
        let Some(slot) = self.slots.get_mut(field.index()).and_then(Option::take) else {
            return Ok(None);
        };
        match slot.into_any().downcast::<V>() {
            Ok(value) => Ok(Some(*value)),
            Err(_) => Err(self.mismatch(field)),
        }
    }

    /// Check if a field is set.
    pub fn is_set<V: 'static>(&self, field: &Field<S, V>) -> Result<bool, RecordError> {
        self.check(field)?;
        Ok(matches!(self.slots.get(field.index()), Some(Some(_))))
    }

    /// Number of set fields.
    pub fn set_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Re-tag the record once two tags are proven equal.
    pub fn coerce<U: 'static>(self, _proof: &TypeEq<S, U>) -> Record<U> {
        let erased: Arc<dyn Any + Send + Sync> = self.layout;
        let layout = match erased.downcast::<Layout<U>>() {
            Ok(layout) => layout,
            // TypeEq<S, U> only exists when S and U are the same type.
            Err(_) => unreachable!("TypeEq witness held for distinct tags"),
        };
        Record {
            layout,
            slots: self.slots,
        }
    }

    /// Store a decoded slot by position.
    pub(crate) fn put(&mut self, index: usize, slot: Box<dyn Slot>) {
        if let Some(entry) = self.slots.get_mut(index) {
            *entry = Some(slot);
        }
    }

    /// Encoded value of each set field, paired with its position.
    pub(crate) fn encoded_slots(&self) -> impl Iterator<Item = (usize, Value)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|s| (i, s.to_json())))
    }

    fn check<V: 'static>(&self, field: &Field<S, V>) -> Result<(), RecordError> {
        if field.layout_id() == self.layout.identity().id() {
            Ok(())
        } else {
            Err(self.mismatch(field))
        }
    }

    fn mismatch<V: 'static>(&self, field: &Field<S, V>) -> RecordError {
        RecordError::LayoutMismatch {
            field: field.name().to_string(),
            expected: format!("\"{}\" {}", field.layout_name(), field.layout_id()),
            found: format!("\"{}\" {}", self.layout.name(), self.layout.identity().id()),
        }
    }
}

impl<S> Clone for Record<S> {
    fn clone(&self) -> Self {
        Self {
            layout: Arc::clone(&self.layout),
            slots: self
                .slots
                .iter()
                .map(|slot| slot.as_ref().map(|s| s.clone_slot()))
                .collect(),
        }
    }
}

impl<S: 'static> PartialEq for Record<S> {
    /// Same layout instance and same encoded content.
    fn eq(&self, other: &Self) -> bool {
        self.layout.identity().is(other.layout.identity())
            && self.encoded_slots().eq(other.encoded_slots())
    }
}

impl<S: 'static> fmt::Debug for Record<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Record")
            .field("layout", &self.layout.name())
            .field("content", &crate::json::encode(self))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{int, list_of, string};
    use crate::layout::declare;

    fn person() -> (Arc<Layout>, Field<(), String>, Field<(), i64>) {
        let layout = declare("person");
        let name = layout.field("name", &string()).expect("name");
        let age = layout.field("age", &int()).expect("age");
        layout.seal();
        (layout, name, age)
    }

    #[test]
    fn test_allocate_unsealed_fails() {
        let layout = declare("draft");
        layout.field("x", &int()).expect("x");
        let err = Record::allocate(&layout).unwrap_err();
        assert_eq!(
            err,
            RecordError::UnsealedLayoutAllocation {
                layout: "draft".into()
            }
        );
    }

    #[test]
    fn test_fresh_record_is_unset() {
        let (layout, name, age) = person();
        let record = layout.allocate().expect("allocate");

        assert_eq!(record.set_count(), 0);
        assert!(matches!(
            record.get(&name),
            Err(RecordError::UndefinedField { .. })
        ));
        assert!(matches!(
            record.get(&age),
            Err(RecordError::UndefinedField { .. })
        ));
        assert_eq!(record.try_get(&age), Ok(None));
    }

    #[test]
    fn test_set_get_overwrite() {
        let (layout, name, age) = person();
        let mut record = layout.allocate().expect("allocate");

        record.set(&name, "Ada".to_string()).expect("set name");
        record.set(&age, 30).expect("set age");
        assert_eq!(record.get(&name).expect("get name"), "Ada");
        assert_eq!(*record.get(&age).expect("get age"), 30);

        record.set(&age, 31).expect("overwrite age");
        assert_eq!(*record.get(&age).expect("get age"), 31);
        assert_eq!(record.set_count(), 2);
    }

    #[test]
    fn test_unset() {
        let (layout, name, _) = person();
        let mut record = layout.allocate().expect("allocate");
        record.set(&name, "Ada".to_string()).expect("set");

        assert_eq!(record.unset(&name).expect("unset"), Some("Ada".to_string()));
        assert!(!record.is_set(&name).expect("is_set"));
        assert_eq!(record.unset(&name).expect("unset again"), None);
    }

    #[test]
    fn test_foreign_field_rejected() {
        let (layout, _, _) = person();
        let other = declare("person");
        let foreign = other.field("name", &string()).expect("foreign");
        other.seal();

        let mut record = layout.allocate().expect("allocate");
        let err = record.set(&foreign, "Eve".to_string()).unwrap_err();
        assert!(matches!(err, RecordError::LayoutMismatch { .. }));
        assert!(err.is_contract_violation());
        assert!(record.get(&foreign).is_err());
        assert!(record.is_set(&foreign).is_err());
    }

    #[test]
    fn test_clone_is_independent() {
        let (layout, name, _) = person();
        let mut a = layout.allocate().expect("allocate");
        a.set(&name, "Ada".to_string()).expect("set");

        let mut b = a.clone();
        assert_eq!(a, b);
        b.set(&name, "Grace".to_string()).expect("set");
        assert_eq!(a.get(&name).expect("a"), "Ada");
        assert_eq!(b.get(&name).expect("b"), "Grace");
        assert_ne!(a, b);
    }

    #[test]
    fn test_composite_values() {
        let layout = declare("tags");
        let tags = layout.field("tags", &list_of(&string())).expect("tags");
        layout.seal();

        let mut record = layout.allocate().expect("allocate");
        record
            .set(&tags, vec!["a".to_string(), "b".to_string()])
            .expect("set");
        assert_eq!(record.get(&tags).expect("get").len(), 2);
    }

    #[test]
    fn test_coerce_with_witness() {
        struct Sensor;

        let layout = Layout::<Sensor>::declare("sensor");
        let id = layout.field("id", &int()).expect("id");
        layout.seal();

        let mut record = layout.allocate().expect("allocate");
        record.set(&id, 7).expect("set");

        let eq = layout.same_as(&layout).witness().expect("same layout");
        let record: Record<Sensor> = record.coerce(&eq);
        let id = id.coerce(&eq);
        assert_eq!(*record.get(&id).expect("get"), 7);
    }
}
