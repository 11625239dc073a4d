//! Parameter Registry
//!
//! Owns a root [`Group`] and is the unit callers construct, read, mutate,
//! and load or save as a whole.
//!
//! The registry is not synchronized. To let readers keep a stable snapshot
//! while new values arrive, load into a freshly built registry and swap it
//! in only when the load succeeds.

use std::fmt;
use std::marker::PhantomData;

use serde_json::Value;
use tracing::debug;

use crate::codec::ParamValue;
use crate::config::OutputFormat;
use crate::error::Result;
use crate::group::Group;
use crate::param::{LoadMode, Parameter};

/// Typed handle to a parameter, addressed by a dotted path from the root.
///
/// Path segments name subgroups; anonymous subgroups are looked through.
///
/// ```
/// use familiar_params::ParamKey;
///
/// const PORT: ParamKey<i64> = ParamKey::new("net.port");
/// assert_eq!(PORT.path(), "net.port");
/// ```
pub struct ParamKey<T> {
    path: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ParamKey<T> {
    pub const fn new(path: &'static str) -> Self {
        Self {
            path,
            _marker: PhantomData,
        }
    }

    pub fn path(&self) -> &'static str {
        self.path
    }
}

impl<T> Clone for ParamKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ParamKey<T> {}

impl<T> fmt::Debug for ParamKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ParamKey").field(&self.path).finish()
    }
}

/// A tree of parameter groups with one root
#[derive(Debug, Default)]
pub struct Registry {
    root: Group,
}

impl Registry {
    pub fn new(root: Group) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Group {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Group {
        &mut self.root
    }

    pub fn into_root(self) -> Group {
        self.root
    }

    /// Serialize the whole tree into a fresh document
    pub fn serialize(&self) -> Value {
        debug!(root = self.root.name(), "serializing registry");
        self.root.to_document()
    }

    /// Load the whole tree from a document.
    ///
    /// A failed strict load may leave part of the tree updated.
    pub fn load(&mut self, doc: &Value, mode: LoadMode) -> Result<()> {
        debug!(root = self.root.name(), ?mode, "loading registry");
        self.root.load(doc, mode)
    }

    /// Parse JSON text and load it
    pub fn load_str(&mut self, text: &str, mode: LoadMode) -> Result<()> {
        let doc: Value = serde_json::from_str(text)?;
        self.load(&doc, mode)
    }

    /// Serialize the tree as JSON text
    pub fn to_json_string(&self, format: OutputFormat) -> Result<String> {
        let doc = self.serialize();
        let text = match format {
            OutputFormat::Pretty => serde_json::to_string_pretty(&doc)?,
            OutputFormat::Compact => serde_json::to_string(&doc)?,
        };
        Ok(text)
    }

    pub fn parameter<T: ParamValue>(&self, key: &ParamKey<T>) -> Result<&Parameter<T>> {
        self.root.lookup(key.path)
    }

    pub fn parameter_mut<T: ParamValue>(&mut self, key: &ParamKey<T>) -> Result<&mut Parameter<T>> {
        self.root.lookup_mut(key.path)
    }

    pub fn get<T: ParamValue>(&self, key: &ParamKey<T>) -> Result<&T> {
        self.parameter(key).map(Parameter::value)
    }

    pub fn get_mut<T: ParamValue>(&mut self, key: &ParamKey<T>) -> Result<&mut T> {
        self.parameter_mut(key).map(Parameter::value_mut)
    }

    pub fn set<T: ParamValue>(&mut self, key: &ParamKey<T>, value: T) -> Result<()> {
        self.parameter_mut(key)?.set(value);
        Ok(())
    }
}

impl fmt::Display for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}
