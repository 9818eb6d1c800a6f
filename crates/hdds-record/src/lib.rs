// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! # HDDS Record - extensible typed records with JSON round-tripping
//!
//! Records whose field set is declared at runtime, by independent modules,
//! while every field access stays typed.
//!
//! - **Layout**: named schema, open for field declarations until sealed
//! - **Field**: typed handle issued by one layout, rejected by any other
//! - **Record**: value store for one sealed layout
//! - **Descriptor**: named JSON codec for a value type, with combinators
//! - **Polid**: process-unique identity tokens with a type-equality witness
//!
//! ## Quick Start
//!
//! ```rust
//! use hdds_record::{declare, descriptor, json};
//!
//! let person = declare("person");
//! let name = person.field("name", &descriptor::string()).unwrap();
//! let age = person.field("age", &descriptor::int()).unwrap();
//! person.seal();
//!
//! let mut ada = person.allocate().unwrap();
//! ada.set(&name, "Ada".to_string()).unwrap();
//! ada.set(&age, 30).unwrap();
//! assert_eq!(json::to_string(&ada), r#"{"name":"Ada","age":30}"#);
//!
//! let back = json::decode(&person, &ada.to_json()).unwrap();
//! assert_eq!(*back.get(&age).unwrap(), 30);
//! ```
//!
//! ## Architecture
//!
//! ```text
//!   Descriptor<V> ----------+
//!        |                  |
//!        v                  v
//!   Layout<S>::field --> Field<S, V> --get/set--> Record<S>
//!        |                                          ^
//!        +--seal--> allocate ------------------------+
//!                                                   |
//!   json::encode / json::decode <--------------------+
//! ```
//!
//! ## Errors
//!
//! Every operation returns [`RecordError`]. Misuse of the API (sealed
//! mutation, unsealed allocation, foreign field handles, decoding an
//! encode-only type) is flagged by [`RecordError::is_contract_violation`];
//! unset fields and malformed JSON are ordinary, recoverable results.
//!
//! ## Logging
//!
//! Diagnostics go through the [`log`] facade; install any logger to see
//! layout declarations and sealing (debug) or per-field decoding (trace).

pub mod builder;
pub mod descriptor;
pub mod error;
pub mod json;
pub mod layout;
pub mod polid;
pub mod record;

pub use builder::{declare0, declare1, declare2, declare3, declare4};
pub use descriptor::{Descriptor, Labeled, OpaqueError, Shape};
pub use error::{DecodeError, RecordError};
pub use json::{DecodeOptions, UnknownKeys};
pub use layout::{declare, Field, FieldInfo, Layout};
pub use polid::{Equality, Polid, TypeEq};
pub use record::Record;
