// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Process-unique identity tokens with a type-equality witness.
//!
//! A [`Polid<T>`] is a fresh integer paired with a phantom type. Comparing two
//! tokens yields an [`Equality`]: either proof that both sides name the same
//! type (a [`TypeEq`], which allows casting between them) or
//! [`Equality::Different`].

use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};

/// Global identity counter. Starts at 1, only ever incremented.
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Typed identity token.
///
/// Identifiers are monotonic and never reused for the lifetime of the process.
pub struct Polid<T> {
    id: u64,
    _marker: PhantomData<fn() -> T>,
}

impl<T: 'static> Polid<T> {
    /// Allocate a new token. Never equal to any previously allocated token.
    pub fn fresh() -> Self {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        Self {
            id,
            _marker: PhantomData,
        }
    }

    /// Raw numeric identifier.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Compare two tokens, possibly of different type parameters.
    ///
    /// Returns [`Equality::Same`] only when both tokens come from the same
    /// [`Polid::fresh`] call.
    pub fn equal<U: 'static>(&self, other: &Polid<U>) -> Equality<T, U> {
        if self.id == other.id && TypeId::of::<T>() == TypeId::of::<U>() {
            Equality::Same(TypeEq {
                _marker: PhantomData,
            })
        } else {
            Equality::Different
        }
    }

    /// Plain equality predicate, without the witness.
    pub fn is<U>(&self, other: &Polid<U>) -> bool {
        self.id == other.id
    }
}

impl<T> Clone for Polid<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Polid<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Polid({})", self.id)
    }
}

impl<T> fmt::Display for Polid<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.id)
    }
}

/// Outcome of comparing two identity tokens.
pub enum Equality<A, B> {
    /// Both tokens are the same; `A` and `B` are the same type.
    Same(TypeEq<A, B>),
    /// Tokens differ. No cast is permitted.
    Different,
}

impl<A, B> Equality<A, B> {
    /// True for [`Equality::Same`].
    pub fn is_same(&self) -> bool {
        matches!(self, Self::Same(_))
    }

    /// Extract the witness, if any.
    pub fn witness(self) -> Option<TypeEq<A, B>> {
        match self {
            Self::Same(eq) => Some(eq),
            Self::Different => None,
        }
    }
}

impl<A, B> fmt::Debug for Equality<A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Same(_) => f.write_str("Same"),
            Self::Different => f.write_str("Different"),
        }
    }
}

/// Proof that `A` and `B` are the same type.
///
/// Only obtainable from [`Polid::equal`] (or [`TypeEq::refl`]).
pub struct TypeEq<A, B> {
    _marker: PhantomData<(fn(A) -> A, fn(B) -> B)>,
}

impl<A: 'static> TypeEq<A, A> {
    /// Reflexivity: every type equals itself.
    pub fn refl() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<A: 'static, B: 'static> TypeEq<A, B> {
    /// Reinterpret an `A` as a `B`.
    pub fn cast(&self, value: A) -> B {
        let boxed: Box<dyn Any> = Box::new(value);
        match boxed.downcast::<B>() {
            Ok(b) => *b,
            // TypeEq is only constructed once TypeId::of::<A>() == TypeId::of::<B>().
            Err(_) => unreachable!("TypeEq witness held for distinct types"),
        }
    }

    /// Reinterpret a `&A` as a `&B`.
    pub fn cast_ref<'a>(&self, value: &'a A) -> &'a B {
        match (value as &dyn Any).downcast_ref::<B>() {
            Some(b) => b,
            None => unreachable!("TypeEq witness held for distinct types"),
        }
    }

    /// The witness is symmetric.
    pub fn flip(&self) -> TypeEq<B, A> {
        TypeEq {
            _marker: PhantomData,
        }
    }
}

impl<A, B> Clone for TypeEq<A, B> {
    fn clone(&self) -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<A, B> fmt::Debug for TypeEq<A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TypeEq")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Tag;

    #[test]
    fn test_fresh_ids_are_distinct() {
        let a = Polid::<Tag>::fresh();
        let b = Polid::<Tag>::fresh();
        assert_ne!(a.id(), b.id());
        assert!(!a.equal(&b).is_same());
        assert!(!a.is(&b));
    }

    #[test]
    fn test_fresh_ids_are_monotonic() {
        let a = Polid::<u8>::fresh();
        let b = Polid::<u16>::fresh();
        assert!(b.id() > a.id());
    }

    #[test]
    fn test_clone_is_same() {
        let a = Polid::<Tag>::fresh();
        let b = a.clone();
        assert!(a.equal(&b).is_same());
        assert!(a.is(&b));
    }

    #[test]
    fn test_different_type_parameter() {
        let a = Polid::<u32>::fresh();
        let b = Polid::<String>::fresh();
        assert!(matches!(a.equal(&b), Equality::Different));
    }

    #[test]
    fn test_witness_casts() {
        let a = Polid::<String>::fresh();
        let b = a.clone();
        let eq = a.equal(&b).witness().expect("same token");
        assert_eq!(eq.cast("hello".to_string()), "hello");

        let s = String::from("borrowed");
        assert_eq!(eq.flip().cast_ref(&s), "borrowed");
    }

    #[test]
    fn test_refl() {
        let eq = TypeEq::<i64, i64>::refl();
        assert_eq!(eq.cast(7), 7);
    }

    #[test]
    fn test_concurrent_fresh() {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                std::thread::spawn(|| (0..100).map(|_| Polid::<()>::fresh().id()).collect::<Vec<_>>())
            })
            .collect();

        let mut ids: Vec<u64> = handles
            .into_iter()
            .flat_map(|h| h.join().expect("thread"))
            .collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }
}
