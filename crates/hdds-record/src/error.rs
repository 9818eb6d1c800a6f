// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for layouts, records and descriptors.

use thiserror::Error;

/// Failure reported by a descriptor's decode direction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// JSON shape or value did not match the descriptor.
    #[error("{0}")]
    Invalid(String),

    /// The descriptor is encode-only and cannot rebuild a value.
    #[error("cannot deserialize values of type {type_name}")]
    Opaque {
        /// Name of the encode-only descriptor.
        type_name: String,
    },
}

impl DecodeError {
    /// Create an [`DecodeError::Invalid`] from anything printable.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }

    /// Prefix an `Invalid` message with location context. `Opaque` passes
    /// through unchanged so the condition survives nesting.
    pub(crate) fn context(self, ctx: impl std::fmt::Display) -> Self {
        match self {
            Self::Invalid(msg) => Self::Invalid(format!("{}: {}", ctx, msg)),
            opaque @ Self::Opaque { .. } => opaque,
        }
    }
}

impl From<String> for DecodeError {
    fn from(msg: String) -> Self {
        Self::Invalid(msg)
    }
}

impl From<&str> for DecodeError {
    fn from(msg: &str) -> Self {
        Self::Invalid(msg.to_string())
    }
}

/// Errors for layout, record and JSON codec operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// A field was declared on a layout that is already sealed.
    #[error("cannot declare field \"{field}\": layout \"{layout}\" is sealed")]
    SealedLayoutMutation {
        /// Layout name.
        layout: String,
        /// Rejected field name.
        field: String,
    },

    /// A record was allocated against a layout that is not sealed yet.
    #[error("cannot allocate record: layout \"{layout}\" is not sealed")]
    UnsealedLayoutAllocation {
        /// Layout name.
        layout: String,
    },

    /// A field name was declared twice on the same layout.
    #[error("field \"{field}\" is already declared on layout \"{layout}\"")]
    DuplicateField {
        /// Layout name.
        layout: String,
        /// Duplicated field name.
        field: String,
    },

    /// A field handle was used with a record of another layout.
    #[error("field \"{field}\" belongs to layout {expected}, record uses layout {found}")]
    LayoutMismatch {
        /// Field name.
        field: String,
        /// Layout the field was declared on.
        expected: String,
        /// Layout of the record it was used with.
        found: String,
    },

    /// Read of a field never set on this record.
    #[error("field \"{field}\" is not set on record of layout \"{layout}\"")]
    UndefinedField {
        /// Layout name.
        layout: String,
        /// Field name.
        field: String,
    },

    /// A field value could not be decoded.
    #[error("field \"{field}\": {message}")]
    Decode {
        /// Field whose value failed.
        field: String,
        /// Descriptor message.
        message: String,
    },

    /// Decoding reached an encode-only descriptor.
    #[error("field \"{field}\": cannot deserialize values of type {type_name}")]
    UndeserializableOpaqueValue {
        /// Field whose value was requested.
        field: String,
        /// Encode-only descriptor name.
        type_name: String,
    },

    /// Record JSON was not an object.
    #[error("expected JSON object for layout \"{layout}\", found {found}")]
    NotAnObject {
        /// Layout name.
        layout: String,
        /// Kind of JSON value found.
        found: &'static str,
    },

    /// Key not declared by the layout (only with `UnknownKeys::Reject`).
    #[error("unknown key \"{key}\" for layout \"{layout}\"")]
    UnknownKey {
        /// Layout name.
        layout: String,
        /// Offending key.
        key: String,
    },

    /// JSON text could not be parsed.
    #[error("JSON parse error: {0}")]
    Parse(String),
}

impl RecordError {
    /// True for conditions caused by misuse of the API rather than by data.
    ///
    /// Callers are expected to branch on `UndefinedField` and decode
    /// failures; the remaining variants indicate a bug in the calling code.
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::SealedLayoutMutation { .. }
                | Self::UnsealedLayoutAllocation { .. }
                | Self::DuplicateField { .. }
                | Self::LayoutMismatch { .. }
                | Self::UndeserializableOpaqueValue { .. }
        )
    }

    /// Attach a field name to a descriptor failure.
    pub(crate) fn from_decode(field: &str, err: DecodeError) -> Self {
        match err {
            DecodeError::Invalid(message) => Self::Decode {
                field: field.to_string(),
                message,
            },
            DecodeError::Opaque { type_name } => Self::UndeserializableOpaqueValue {
                field: field.to_string(),
                type_name,
            },
        }
    }
}

impl From<serde_json::Error> for RecordError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}
