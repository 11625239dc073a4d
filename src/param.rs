//! Named, typed leaf values
//!
//! A [`Parameter<T>`] owns one value. Groups store parameters of different
//! value types side by side behind the [`Param`] capability trait and narrow
//! them back to the concrete type with a checked downcast.

use std::any::Any;
use std::borrow::Cow;
use std::fmt;
use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::trace;

use crate::codec::{CodecError, ParamValue};
use crate::error::{RegistryError, Result};

/// How a load treats document entries that are absent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadMode {
    /// Absent entries keep their current value
    #[default]
    Lenient,
    /// Absent entries fail the load
    Strict,
}

impl LoadMode {
    pub fn is_strict(self) -> bool {
        self == LoadMode::Strict
    }
}

impl From<bool> for LoadMode {
    fn from(strict: bool) -> Self {
        if strict {
            LoadMode::Strict
        } else {
            LoadMode::Lenient
        }
    }
}

/// Type-erased handle to a parameter of some concrete value type
pub trait Param: fmt::Debug {
    fn name(&self) -> &str;

    fn type_name(&self) -> Cow<'static, str>;

    /// The value as a document node
    fn to_document(&self) -> Value;

    /// Overwrite the value from a present document node
    fn load_document(&mut self, node: &Value, mode: LoadMode) -> std::result::Result<(), CodecError>;

    /// The value as shown by the debug view
    fn render(&self) -> String;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Write the value into `into` at this parameter's name.
    ///
    /// An anonymous parameter replaces `into` with its bare value.
    fn serialize(&self, into: &mut Value) {
        write_entry(into, self.name(), self.to_document());
    }

    /// Read the value from `from` at this parameter's name
    fn load(&mut self, from: &Value, mode: LoadMode) -> Result<()> {
        self.load_in(from, mode, None)
    }

    /// Like [`Param::load`], naming the enclosing group in errors
    fn load_in(&mut self, from: &Value, mode: LoadMode, group: Option<&str>) -> Result<()> {
        let entry = if self.name().is_empty() {
            Some(from).filter(|node| !node.is_null())
        } else {
            from.get(self.name())
        };
        self.load_entry(entry, mode, group)
    }

    /// Load from an already located entry; `None` means the entry is absent
    fn load_entry(&mut self, entry: Option<&Value>, mode: LoadMode, group: Option<&str>) -> Result<()> {
        let Some(node) = entry else {
            if mode.is_strict() {
                return Err(RegistryError::MissingKey {
                    name: self.name().to_string(),
                    group: group.filter(|g| !g.is_empty()).map(str::to_string),
                });
            }
            trace!(parameter = self.name(), "not in document, keeping current value");
            return Ok(());
        };

        self.load_document(node, mode)
            .map_err(|e| e.into_registry_error(self.name(), group.filter(|g| !g.is_empty())))
    }
}

/// Write `value` at `key` inside `into`, turning `into` into an object if needed.
/// An empty key replaces `into` itself.
pub(crate) fn write_entry(into: &mut Value, key: &str, value: Value) {
    if key.is_empty() {
        *into = value;
        return;
    }
    ensure_object(into);
    into[key] = value;
}

/// The object node at `key` inside `into`, created if absent
pub(crate) fn object_slot<'a>(into: &'a mut Value, key: &str) -> &'a mut Value {
    ensure_object(into);
    let slot = &mut into[key];
    ensure_object(slot);
    slot
}

fn ensure_object(node: &mut Value) {
    if node.is_object() {
        return;
    }
    if !node.is_null() {
        tracing::warn!(replaced = %node, "overwriting a non-object node while serializing");
    }
    *node = Value::Object(Map::new());
}

/// A named leaf holding one typed value
#[derive(Debug, Clone, Default)]
pub struct Parameter<T> {
    name: String,
    value: T,
}

impl<T> Parameter<T> {
    /// Create a parameter with an initial value
    pub fn new(name: impl Into<String>, value: T) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }

    /// Create an unnamed parameter, which maps to the bare value of its node
    pub fn anonymous(value: T) -> Self {
        Self::new("", value)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut T {
        &mut self.value
    }

    pub fn set(&mut self, value: T) {
        self.value = value;
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

impl<T: Default> Parameter<T> {
    /// Create a parameter holding `T::default()`
    pub fn with_default(name: impl Into<String>) -> Self {
        Self::new(name, T::default())
    }
}

impl<T: Clone> Parameter<T> {
    pub fn get(&self) -> T {
        self.value.clone()
    }
}

impl<T: ParamValue> Param for Parameter<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn type_name(&self) -> Cow<'static, str> {
        T::type_name()
    }

    fn to_document(&self) -> Value {
        self.value.to_document()
    }

    fn load_document(&mut self, node: &Value, mode: LoadMode) -> std::result::Result<(), CodecError> {
        self.value.load_document(node, mode)
    }

    fn render(&self) -> String {
        self.value.render()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl<T> Deref for Parameter<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> DerefMut for Parameter<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T: PartialEq> PartialEq for Parameter<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.value == other.value
    }
}

impl<T: ParamValue> fmt::Display for Parameter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.value.render())
        } else {
            write!(f, "{} = {}", self.name, self.value.render())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_serialize_named() {
        let port = Parameter::new("port", 8080i64);
        let mut doc = json!({});
        port.serialize(&mut doc);
        assert_eq!(doc, json!({"port": 8080}));
    }

    #[test]
    fn test_serialize_anonymous_replaces_node() {
        let test = Parameter::anonymous("This is a test".to_string());
        let mut doc = json!({});
        test.serialize(&mut doc);
        assert_eq!(doc, json!("This is a test"));
    }

    #[test]
    fn test_lenient_missing_keeps_value() {
        let mut host = Parameter::new("host", "localhost".to_string());
        host.load(&json!({"port": 1}), LoadMode::Lenient).unwrap();
        assert_eq!(host.value(), "localhost");
    }

    #[test]
    fn test_strict_missing_fails() {
        let mut host = Parameter::new("host", "localhost".to_string());
        let err = host.load_in(&json!({}), LoadMode::Strict, Some("net")).unwrap_err();
        match err {
            RegistryError::MissingKey { name, group } => {
                assert_eq!(name, "host");
                assert_eq!(group.as_deref(), Some("net"));
            }
            other => panic!("Expected MissingKey, got {:?}", other),
        }
        assert_eq!(host.value(), "localhost");
    }

    #[test]
    fn test_mismatch_fatal_in_both_modes() {
        for mode in [LoadMode::Lenient, LoadMode::Strict] {
            let mut port = Parameter::new("port", 8080i64);
            let err = port.load(&json!({"port": "eighty"}), mode).unwrap_err();
            match err {
                RegistryError::TypeMismatch { name, expected, .. } => {
                    assert_eq!(name, "port");
                    assert_eq!(expected, "i64");
                }
                other => panic!("Expected TypeMismatch, got {:?}", other),
            }
            assert_eq!(*port, 8080);
        }
    }

    #[test]
    fn test_anonymous_loads_bare_value() {
        let mut value = Parameter::anonymous(0u32);
        value.load(&json!(17), LoadMode::Strict).unwrap();
        assert_eq!(value.get(), 17);

        let err = value.load(&Value::Null, LoadMode::Strict).unwrap_err();
        assert!(matches!(err, RegistryError::MissingKey { .. }));
    }

    #[test]
    fn test_deref_and_display() {
        let mut pi = Parameter::new("pi", 3.0f64);
        *pi += 0.5;
        assert_eq!(pi.get(), 3.5);
        assert_eq!(pi.to_string(), "pi = 3.5");
        assert_eq!(Parameter::anonymous(true).to_string(), "true");
    }

    #[test]
    fn test_equality_compares_name_and_value() {
        assert_eq!(Parameter::new("a", 1u8), Parameter::new("a", 1u8));
        assert_ne!(Parameter::new("a", 1u8), Parameter::new("b", 1u8));
        assert_ne!(Parameter::new("a", 1u8), Parameter::new("a", 2u8));
    }

    #[test]
    fn test_load_mode_from_bool() {
        assert_eq!(LoadMode::from(true), LoadMode::Strict);
        assert_eq!(LoadMode::from(false), LoadMode::Lenient);
        assert_eq!(LoadMode::default(), LoadMode::Lenient);
    }
}
