//! Value codecs
//!
//! Every type a [`Parameter`](crate::Parameter) can hold implements
//! [`ParamValue`], which converts the value to and from a document node.
//! Scalars go through serde, so range and kind checks come from
//! `serde_json` itself: loading `300` into a `u8` or `"abc"` into an `f64`
//! is a mismatch, while an integer node loads fine into a float.
//!
//! Enumerations are stored as their integer representation. Derive
//! `serde_repr`'s `Serialize_repr`/`Deserialize_repr` and register the type
//! with [`scalar_param!`](crate::scalar_param):
//!
//! ```
//! use familiar_params::{scalar_param, Parameter};
//! use serde_repr::{Deserialize_repr, Serialize_repr};
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Default, Serialize_repr, Deserialize_repr)]
//! #[repr(u8)]
//! enum Level {
//!     #[default]
//!     Low = 0,
//!     High = 1,
//! }
//! scalar_param!(Level => "Level");
//!
//! let level = Parameter::new("level", Level::High);
//! assert_eq!(level.to_string(), "level = 1");
//! ```

use std::borrow::Cow;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::error::{node_kind, RegistryError};
use crate::param::LoadMode;

/// Conversion between a parameter value and a document node
pub trait ParamValue: std::fmt::Debug + 'static {
    /// Human-readable name of the type, used in mismatch errors
    fn type_name() -> Cow<'static, str>
    where
        Self: Sized;

    /// Convert the value into a document node
    fn to_document(&self) -> Value;

    /// Overwrite the value from a present document node
    fn load_document(&mut self, node: &Value, mode: LoadMode) -> Result<(), CodecError>;

    /// Text used by the debug view
    fn render(&self) -> String;
}

/// Failure converting a document node, before parameter context is attached
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("expected {expected}: {detail}")]
    Mismatch {
        expected: Cow<'static, str>,
        detail: String,
    },

    #[error("record {index}: {source}")]
    Record {
        index: usize,
        #[source]
        source: RegistryError,
    },
}

impl CodecError {
    /// Attach the owning parameter's name and group path
    pub fn into_registry_error(self, name: &str, group: Option<&str>) -> RegistryError {
        match self {
            CodecError::Mismatch { expected, detail } => RegistryError::TypeMismatch {
                name: name.to_string(),
                group: group.map(str::to_string),
                expected: expected.into_owned(),
                detail,
            },
            CodecError::Record { index, source } => RegistryError::RecordElement {
                parameter: name.to_string(),
                index,
                source: Box::new(source),
            },
        }
    }

    fn at_index(self, index: usize) -> Self {
        match self {
            CodecError::Mismatch { expected, detail } => CodecError::Mismatch {
                expected,
                detail: format!("element {}: {}", index, detail),
            },
            other => other,
        }
    }
}

/// Encode any serde-serializable scalar
pub fn encode_scalar<T: Serialize>(value: &T) -> Value {
    match serde_json::to_value(value) {
        Ok(node) => node,
        Err(e) => {
            tracing::warn!(error = %e, "value is not representable as a document node");
            Value::Null
        }
    }
}

/// Decode a scalar, reporting the node kind and serde's reason on failure
pub fn decode_scalar<T: DeserializeOwned>(
    node: &Value,
    expected: &'static str,
) -> Result<T, CodecError> {
    T::deserialize(node).map_err(|e| CodecError::Mismatch {
        expected: Cow::Borrowed(expected),
        detail: format!("found {} ({})", node_kind(node), e),
    })
}

/// Render a node without quoting strings
pub fn render_node(node: &Value) -> String {
    match node {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Implement [`ParamValue`] for serde scalars.
///
/// The type must implement `Serialize`, `DeserializeOwned` and `Debug`.
#[macro_export]
macro_rules! scalar_param {
    ($($ty:ty => $name:expr),+ $(,)?) => {$(
        impl $crate::ParamValue for $ty {
            fn type_name() -> ::std::borrow::Cow<'static, str> {
                ::std::borrow::Cow::Borrowed($name)
            }

            fn to_document(&self) -> $crate::__private::Value {
                $crate::codec::encode_scalar(self)
            }

            fn load_document(
                &mut self,
                node: &$crate::__private::Value,
                _mode: $crate::LoadMode,
            ) -> ::std::result::Result<(), $crate::codec::CodecError> {
                *self = $crate::codec::decode_scalar(node, $name)?;
                Ok(())
            }

            fn render(&self) -> String {
                $crate::codec::render_node(&$crate::codec::encode_scalar(self))
            }
        }
    )+};
}

scalar_param! {
    String => "string",
    bool => "boolean",
    i8 => "i8",
    i16 => "i16",
    i32 => "i32",
    i64 => "i64",
    u8 => "u8",
    u16 => "u16",
    u32 => "u32",
    u64 => "u64",
    f32 => "f32",
    f64 => "f64",
}

impl<T: ParamValue + Default> ParamValue for Vec<T> {
    fn type_name() -> Cow<'static, str> {
        Cow::Owned(format!("array of {}", T::type_name()))
    }

    fn to_document(&self) -> Value {
        Value::Array(self.iter().map(ParamValue::to_document).collect())
    }

    fn load_document(&mut self, node: &Value, mode: LoadMode) -> Result<(), CodecError> {
        let elements = node.as_array().ok_or_else(|| CodecError::Mismatch {
            expected: Self::type_name(),
            detail: format!("found {}", node_kind(node)),
        })?;

        let mut loaded = Vec::with_capacity(elements.len());
        for (index, element) in elements.iter().enumerate() {
            let mut value = T::default();
            value
                .load_document(element, mode)
                .map_err(|e| e.at_index(index))?;
            loaded.push(value);
        }
        *self = loaded;
        Ok(())
    }

    fn render(&self) -> String {
        let items: Vec<String> = self.iter().map(ParamValue::render).collect();
        format!("[{}]", items.join(", "))
    }
}
