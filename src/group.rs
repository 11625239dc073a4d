//! Parameter groups
//!
//! A [`Group`] owns its parameters and subgroups. Children are adopted
//! explicitly with [`Group::add_param`] / [`Group::add_group`] (or the
//! `with_*` builder forms), so the whole tree is owned by its root and no
//! child ever points back at its parent.
//!
//! ## Document scope
//!
//! A named group maps to an object at its own key. An anonymous group is
//! transparent: its members are written straight into the enclosing object.
//! The members that end up in one document object form a *scope*: a group's
//! own members plus, transitively, the members of its anonymous subgroups.
//! Within a scope parameter names must be unique and subgroup names must be
//! unique; adopting a child that would break this is an error.
//!
//! A scope holding an anonymous parameter maps to that parameter's bare
//! value instead of an object.
//!
//! A parameter and a subgroup may share a name. The subgroup keeps the
//! object at that key and the parameter's value is stored inside it under
//! [`SHARED_VALUE_KEY`]:
//!
//! ```text
//! {"limits": {"$value": 10, "soft": 5}}
//! ```

use std::collections::HashSet;
use std::fmt;

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::codec::ParamValue;
use crate::error::{node_kind, RegistryError, Result};
use crate::param::{object_slot, write_entry, LoadMode, Param, Parameter};

/// Key holding a parameter's value inside a subgroup of the same name
pub const SHARED_VALUE_KEY: &str = "$value";

/// A named composite node holding parameters and subgroups
#[derive(Debug, Default)]
pub struct Group {
    name: String,
    params: IndexMap<String, Box<dyn Param>>,
    subgroups: IndexMap<String, Group>,
    /// Anonymous subgroups, flattened into this group's scope
    transparent: Vec<Group>,
}

/// Members sharing one document object
#[derive(Default)]
struct Scope<'a> {
    params: Vec<&'a dyn Param>,
    groups: Vec<&'a Group>,
}

#[derive(Default)]
struct ScopeMut<'a> {
    params: Vec<&'a mut Box<dyn Param>>,
    groups: Vec<&'a mut Group>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// An anonymous group, typically the root of a tree
    pub fn root() -> Self {
        Self::default()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_anonymous(&self) -> bool {
        self.name.is_empty()
    }

    /// Adopt a parameter
    pub fn add_param<T: ParamValue>(&mut self, param: Parameter<T>) -> Result<()> {
        self.check_adopt(&[param.name()], &[])?;
        self.params.insert(param.name().to_string(), Box::new(param));
        Ok(())
    }

    /// Adopt a subgroup. Anonymous subgroups are merged into this scope.
    pub fn add_group(&mut self, group: Group) -> Result<()> {
        if group.is_anonymous() {
            let scope = group.scope();
            let params: Vec<&str> = scope.params.iter().map(|p| p.name()).collect();
            let groups: Vec<&str> = scope.groups.iter().map(|g| g.name()).collect();
            self.check_adopt(&params, &groups)?;
            self.transparent.push(group);
        } else {
            self.check_adopt(&[], &[group.name()])?;
            self.subgroups.insert(group.name.clone(), group);
        }
        Ok(())
    }

    /// Builder form of [`Group::add_param`]
    pub fn with_param<T: ParamValue>(mut self, param: Parameter<T>) -> Result<Self> {
        self.add_param(param)?;
        Ok(self)
    }

    /// Builder form of [`Group::add_group`]
    pub fn with_group(mut self, group: Group) -> Result<Self> {
        self.add_group(group)?;
        Ok(self)
    }

    fn check_adopt(&self, params: &[&str], groups: &[&str]) -> Result<()> {
        let scope = self.scope();
        let has_anonymous = scope.params.iter().any(|p| p.name().is_empty());
        let incoming = params.len() + groups.len();
        let existing = scope.params.len() + scope.groups.len();
        if incoming > 0
            && existing > 0
            && (has_anonymous || params.iter().any(|name| name.is_empty()))
        {
            return Err(RegistryError::AnonymousConflict {
                group: self.name.clone(),
            });
        }

        if let Some(name) = params.iter().find(|name| **name == SHARED_VALUE_KEY) {
            return Err(self.duplicate(name));
        }
        let taken: HashSet<&str> = scope.params.iter().map(|p| p.name()).collect();
        if let Some(name) = params.iter().find(|name| taken.contains(*name)) {
            return Err(self.duplicate(name));
        }
        let taken: HashSet<&str> = scope.groups.iter().map(|g| g.name()).collect();
        if let Some(name) = groups.iter().find(|name| taken.contains(*name)) {
            return Err(self.duplicate(name));
        }
        Ok(())
    }

    fn duplicate(&self, name: &str) -> RegistryError {
        RegistryError::DuplicateName {
            name: name.to_string(),
            group: self.name.clone(),
        }
    }

    fn scope(&self) -> Scope<'_> {
        let mut scope = Scope::default();
        self.collect_scope(&mut scope);
        scope
    }

    fn collect_scope<'a>(&'a self, scope: &mut Scope<'a>) {
        scope.params.extend(self.params.values().map(|p| &**p));
        scope.groups.extend(self.subgroups.values());
        for group in &self.transparent {
            group.collect_scope(scope);
        }
    }

    fn collect_scope_mut<'a>(&'a mut self, scope: &mut ScopeMut<'a>) {
        scope.params.extend(self.params.values_mut());
        scope.groups.extend(self.subgroups.values_mut());
        for group in &mut self.transparent {
            group.collect_scope_mut(scope);
        }
    }

    /// Whether this group's document node is a bare value rather than an object
    pub(crate) fn holds_bare_value(&self) -> bool {
        self.scope().params.iter().any(|p| p.name().is_empty())
    }

    /// Parameters in this group's scope, in declaration order
    pub fn params(&self) -> impl Iterator<Item = &dyn Param> {
        self.scope().params.into_iter()
    }

    /// Named subgroups in this group's scope, in declaration order
    pub fn subgroups(&self) -> impl Iterator<Item = &Group> {
        self.scope().groups.into_iter()
    }

    fn find_param(&self, name: &str) -> Option<&dyn Param> {
        match self.params.get(name) {
            Some(param) => Some(&**param),
            None => self.transparent.iter().find_map(|g| g.find_param(name)),
        }
    }

    fn find_param_mut(&mut self, name: &str) -> Option<&mut Box<dyn Param>> {
        if self.params.contains_key(name) {
            return self.params.get_mut(name);
        }
        self.transparent
            .iter_mut()
            .find_map(|g| g.find_param_mut(name))
    }

    fn find_group(&self, name: &str) -> Option<&Group> {
        match self.subgroups.get(name) {
            Some(group) => Some(group),
            None => self.transparent.iter().find_map(|g| g.find_group(name)),
        }
    }

    fn find_group_mut(&mut self, name: &str) -> Option<&mut Group> {
        if self.subgroups.contains_key(name) {
            return self.subgroups.get_mut(name);
        }
        self.transparent
            .iter_mut()
            .find_map(|g| g.find_group_mut(name))
    }

    /// The type-erased handle of a parameter in this scope
    pub fn handle(&self, name: &str) -> Result<&dyn Param> {
        self.find_param(name)
            .ok_or_else(|| RegistryError::UnknownParameter(name.to_string()))
    }

    /// A parameter in this scope, narrowed to its concrete type
    pub fn param<T: ParamValue>(&self, name: &str) -> Result<&Parameter<T>> {
        let handle = self.handle(name)?;
        handle
            .as_any()
            .downcast_ref::<Parameter<T>>()
            .ok_or_else(|| wrong_type::<T>(handle))
    }

    /// Mutable form of [`Group::param`]
    pub fn param_mut<T: ParamValue>(&mut self, name: &str) -> Result<&mut Parameter<T>> {
        let handle = self
            .find_param_mut(name)
            .ok_or_else(|| RegistryError::UnknownParameter(name.to_string()))?;
        let error = wrong_type::<T>(&**handle);
        handle
            .as_any_mut()
            .downcast_mut::<Parameter<T>>()
            .ok_or(error)
    }

    /// Copy out a parameter's value
    pub fn get_parameter_value<T: ParamValue + Clone>(&self, name: &str) -> Result<T> {
        self.param::<T>(name).map(Parameter::get)
    }

    /// Overwrite a parameter's value
    pub fn set_parameter_value<T: ParamValue>(&mut self, name: &str, value: T) -> Result<()> {
        self.param_mut::<T>(name)?.set(value);
        Ok(())
    }

    /// A named subgroup in this scope
    pub fn subgroup(&self, name: &str) -> Result<&Group> {
        self.find_group(name)
            .ok_or_else(|| RegistryError::UnknownGroup(name.to_string()))
    }

    pub fn subgroup_mut(&mut self, name: &str) -> Result<&mut Group> {
        self.find_group_mut(name)
            .ok_or_else(|| RegistryError::UnknownGroup(name.to_string()))
    }

    /// Resolve a dotted path such as `"net.port"` relative to this group
    pub fn lookup<T: ParamValue>(&self, path: &str) -> Result<&Parameter<T>> {
        let (groups, leaf) = split_path(path);
        let mut group = self;
        for segment in groups.into_iter().flat_map(|g| g.split('.')) {
            group = group.subgroup(segment)?;
        }
        group.param::<T>(leaf)
    }

    /// Mutable form of [`Group::lookup`]
    pub fn lookup_mut<T: ParamValue>(&mut self, path: &str) -> Result<&mut Parameter<T>> {
        let (groups, leaf) = split_path(path);
        let mut group = self;
        for segment in groups.into_iter().flat_map(|g| g.split('.')) {
            group = group.subgroup_mut(segment)?;
        }
        group.param_mut::<T>(leaf)
    }

    /// Write this group into `into`, nested under its name unless anonymous
    pub fn serialize(&self, into: &mut Value) {
        if self.is_anonymous() {
            self.serialize_members(into);
        } else {
            self.serialize_members(object_slot(into, &self.name));
        }
    }

    /// Write this group's members directly into `into`
    pub fn serialize_members(&self, into: &mut Value) {
        let scope = self.scope();
        let shared: HashSet<&str> = scope.groups.iter().map(|g| g.name()).collect();
        for param in &scope.params {
            trace!(parameter = param.name(), "serializing");
            if shared.contains(param.name()) {
                write_entry(
                    object_slot(into, param.name()),
                    SHARED_VALUE_KEY,
                    param.to_document(),
                );
            } else {
                param.serialize(into);
            }
        }
        for group in &scope.groups {
            group.serialize(into);
        }
    }

    /// Serialize into a fresh document
    pub fn to_document(&self) -> Value {
        let mut doc = Value::Object(Map::new());
        self.serialize(&mut doc);
        doc
    }

    /// Load this group from `from`, reading its own key unless anonymous.
    ///
    /// Strict mode stops at the first error. Lenient mode skips absent
    /// entries, attempts every child, and reports the first type error.
    pub fn load(&mut self, from: &Value, mode: LoadMode) -> Result<()> {
        self.load_in(from, mode, "")
    }

    /// Load this group's members directly from `from`
    pub fn load_members(&mut self, from: &Value, mode: LoadMode) -> Result<()> {
        self.load_members_in(from, mode, "")
    }

    fn load_in(&mut self, from: &Value, mode: LoadMode, parent: &str) -> Result<()> {
        if self.is_anonymous() {
            return self.load_members_in(from, mode, parent);
        }

        let path = join_path(parent, &self.name);
        match from.get(&self.name) {
            None if mode.is_strict() => Err(RegistryError::MissingGroup { name: path }),
            None => {
                debug!(group = %path, "not in document, keeping current values");
                Ok(())
            }
            Some(node) if !node.is_object() && !self.holds_bare_value() => {
                Err(RegistryError::GroupTypeMismatch {
                    name: path,
                    found: node_kind(node),
                })
            }
            Some(node) => self.load_members_in(node, mode, &path),
        }
    }

    fn load_members_in(&mut self, from: &Value, mode: LoadMode, path: &str) -> Result<()> {
        let mut scope = ScopeMut::default();
        self.collect_scope_mut(&mut scope);
        let shared: HashSet<String> = scope.groups.iter().map(|g| g.name.clone()).collect();
        let group = Some(path);
        let mut first_error = None;

        for param in scope.params.iter_mut() {
            trace!(parameter = param.name(), group = path, "loading");
            let result = if shared.contains(param.name()) {
                let entry = from
                    .get(param.name())
                    .and_then(|node| node.get(SHARED_VALUE_KEY));
                param.load_entry(entry, mode, group)
            } else {
                param.load_in(from, mode, group)
            };
            if let Err(e) = result {
                if mode.is_strict() {
                    return Err(e);
                }
                first_error.get_or_insert(e);
            }
        }

        for subgroup in scope.groups.iter_mut() {
            if let Err(e) = subgroup.load_in(from, mode, path) {
                if mode.is_strict() {
                    return Err(e);
                }
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

fn wrong_type<T: ParamValue>(handle: &dyn Param) -> RegistryError {
    RegistryError::WrongType {
        name: handle.name().to_string(),
        actual: handle.type_name().into_owned(),
        requested: std::any::type_name::<T>(),
    }
}

fn split_path(path: &str) -> (Option<&str>, &str) {
    match path.rsplit_once('.') {
        Some((groups, leaf)) => (Some(groups), leaf),
        None => (None, path),
    }
}

fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", parent, name)
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_anonymous() {
            writeln!(f, "<{}>", self.name)?;
        }
        let scope = self.scope();
        for param in &scope.params {
            if param.name().is_empty() {
                writeln!(f, "\t{}", param.render())?;
            } else {
                writeln!(f, "\t{} = {}", param.name(), param.render())?;
            }
        }
        for group in &scope.groups {
            writeln!(f, "{}", group)?;
        }
        if !self.is_anonymous() {
            write!(f, "</{}>", self.name)?;
        }
        Ok(())
    }
}
