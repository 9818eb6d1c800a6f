// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! One-call layout declarations for small layouts.
//!
//! Each `declareN` declares a layout, its `N` fields in order, seals it, and
//! returns the layout with the field handles.

use crate::descriptor::Descriptor;
use crate::error::RecordError;
use crate::layout::{declare, Field, Layout};
use std::sync::Arc;

/// Declare and seal a layout with no fields.
pub fn declare0(name: impl Into<String>) -> Arc<Layout> {
    let layout = declare(name);
    layout.seal();
    layout
}

/// Declare and seal a layout with one field.
pub fn declare1<A>(
    name: impl Into<String>,
    a: (&str, &Descriptor<A>),
) -> Result<(Arc<Layout>, Field<(), A>), RecordError>
where
    A: Clone + Send + Sync + 'static,
{
    let layout = declare(name);
    let fa = layout.field(a.0, a.1)?;
    layout.seal();
    Ok((layout, fa))
}

/// Declare and seal a layout with two fields.
pub fn declare2<A, B>(
    name: impl Into<String>,
    a: (&str, &Descriptor<A>),
    b: (&str, &Descriptor<B>),
) -> Result<(Arc<Layout>, Field<(), A>, Field<(), B>), RecordError>
where
    A: Clone + Send + Sync + 'static,
    B: Clone + Send + Sync + 'static,
{
    let layout = declare(name);
    let fa = layout.field(a.0, a.1)?;
    let fb = layout.field(b.0, b.1)?;
    layout.seal();
    Ok((layout, fa, fb))
}

/// Declare and seal a layout with three fields.
pub fn declare3<A, B, C>(
    name: impl Into<String>,
    a: (&str, &Descriptor<A>),
    b: (&str, &Descriptor<B>),
    c: (&str, &Descriptor<C>),
) -> Result<(Arc<Layout>, Field<(), A>, Field<(), B>, Field<(), C>), RecordError>
where
    A: Clone + Send + Sync + 'static,
    B: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
{
    let layout = declare(name);
    let fa = layout.field(a.0, a.1)?;
    let fb = layout.field(b.0, b.1)?;
    let fc = layout.field(c.0, c.1)?;
    layout.seal();
    Ok((layout, fa, fb, fc))
}

/// Declare and seal a layout with four fields.
pub fn declare4<A, B, C, D>(
    name: impl Into<String>,
    a: (&str, &Descriptor<A>),
    b: (&str, &Descriptor<B>),
    c: (&str, &Descriptor<C>),
    d: (&str, &Descriptor<D>),
) -> Result<(Arc<Layout>, Field<(), A>, Field<(), B>, Field<(), C>, Field<(), D>), RecordError>
where
    A: Clone + Send + Sync + 'static,
    B: Clone + Send + Sync + 'static,
    C: Clone + Send + Sync + 'static,
    D: Clone + Send + Sync + 'static,
{
    let layout = declare(name);
    let fa = layout.field(a.0, a.1)?;
    let fb = layout.field(b.0, b.1)?;
    let fc = layout.field(c.0, c.1)?;
    let fd = layout.field(d.0, d.1)?;
    layout.seal();
    Ok((layout, fa, fb, fc, fd))
}
