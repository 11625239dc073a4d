//! Lists of structured records
//!
//! A [`RecordList`] is a parameter value holding an ordered list of groups
//! that all share one shape, e.g. a list of servers. It maps to a document
//! array with one object per record; the record's own name is never written,
//! array position identifies it instead.
//!
//! Loading throws the current records away and builds one fresh record per
//! array element from the list's shape factory.

use std::borrow::Cow;

use serde_json::Value;
use tracing::debug;

use crate::codec::{CodecError, ParamValue};
use crate::error::{node_kind, RegistryError, Result};
use crate::group::Group;
use crate::param::LoadMode;

/// Builds an empty record with its default values
pub type RecordShape = fn() -> Result<Group>;

/// Owned, homogeneous list of group-shaped records
#[derive(Debug)]
pub struct RecordList {
    shape: RecordShape,
    records: Vec<Group>,
}

impl RecordList {
    /// An empty list whose records are built by `shape`
    pub fn new(shape: RecordShape) -> Self {
        Self {
            shape,
            records: Vec::new(),
        }
    }

    /// A list pre-populated with `count` default records
    pub fn with_records(shape: RecordShape, count: usize) -> Result<Self> {
        let mut list = Self::new(shape);
        for _ in 0..count {
            list.push_default()?;
        }
        Ok(list)
    }

    /// Build a default record, append it, and return it for editing
    pub fn push_default(&mut self) -> Result<&mut Group> {
        let record = (self.shape)()?;
        self.records.push(record);
        let last = self.records.len() - 1;
        Ok(&mut self.records[last])
    }

    pub fn records(&self) -> &[Group] {
        &self.records
    }

    pub fn records_mut(&mut self) -> &mut [Group] {
        &mut self.records
    }

    pub fn get(&self, index: usize) -> Option<&Group> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Group> {
        self.records.iter()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    fn load_record(&self, index: usize, node: &Value, mode: LoadMode) -> Result<Group> {
        let mut record = (self.shape)()?;
        if !node.is_object() && !record.holds_bare_value() {
            let name = if record.is_anonymous() {
                format!("record {}", index)
            } else {
                record.name().to_string()
            };
            return Err(RegistryError::GroupTypeMismatch {
                name,
                found: node_kind(node),
            });
        }
        record.load_members(node, mode)?;
        Ok(record)
    }
}

impl<'a> IntoIterator for &'a RecordList {
    type Item = &'a Group;
    type IntoIter = std::slice::Iter<'a, Group>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl ParamValue for RecordList {
    fn type_name() -> Cow<'static, str> {
        Cow::Borrowed("array of records")
    }

    fn to_document(&self) -> Value {
        Value::Array(
            self.records
                .iter()
                .map(|record| {
                    let mut element = Value::Object(serde_json::Map::new());
                    record.serialize_members(&mut element);
                    element
                })
                .collect(),
        )
    }

    fn load_document(&mut self, node: &Value, mode: LoadMode) -> std::result::Result<(), CodecError> {
        let elements = node.as_array().ok_or_else(|| CodecError::Mismatch {
            expected: Self::type_name(),
            detail: format!("found {}", node_kind(node)),
        })?;

        debug!(previous = self.records.len(), incoming = elements.len(), "replacing records");
        self.records.clear();
        for (index, element) in elements.iter().enumerate() {
            let record = self
                .load_record(index, element, mode)
                .map_err(|source| CodecError::Record { index, source })?;
            self.records.push(record);
        }
        Ok(())
    }

    fn render(&self) -> String {
        let items: Vec<String> = self.records.iter().map(|r| r.to_string()).collect();
        format!("[{}]", items.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::{Param, Parameter};
    use serde_json::json;

    fn server() -> Result<Group> {
        Group::new("server")
            .with_param(Parameter::new("host", "localhost".to_string()))?
            .with_param(Parameter::new("port", 80u16))
    }

    fn hosts(list: &RecordList) -> Vec<String> {
        list.iter()
            .map(|r| r.get_parameter_value::<String>("host").unwrap())
            .collect()
    }

    #[test]
    fn test_serialize_drops_record_names() {
        let mut list = RecordList::with_records(server, 2).unwrap();
        list.records_mut()[1].set_parameter_value("port", 8080u16).unwrap();

        assert_eq!(
            list.to_document(),
            json!([
                {"host": "localhost", "port": 80},
                {"host": "localhost", "port": 8080}
            ])
        );
    }

    #[test]
    fn test_load_replaces_records_in_order() {
        let mut list = Parameter::new("servers", RecordList::with_records(server, 2).unwrap());
        let doc = json!({"servers": [
            {"host": "a", "port": 1},
            {"host": "b", "port": 2},
            {"host": "c", "port": 3}
        ]});

        list.load(&doc, LoadMode::Strict).unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(hosts(&list), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_lenient_records_keep_shape_defaults() {
        let mut list = RecordList::new(server);
        list.load_document(&json!([{"host": "a"}, {}]), LoadMode::Lenient)
            .unwrap();
        assert_eq!(hosts(&list), vec!["a", "localhost"]);
        assert_eq!(list.records()[0].get_parameter_value::<u16>("port").unwrap(), 80);
    }

    #[test]
    fn test_strict_record_failure_wraps_cause() {
        let mut servers = Parameter::new("servers", RecordList::new(server));
        let doc = json!({"servers": [{"host": "a", "port": 1}, {"host": "b"}]});

        let err = servers.load(&doc, LoadMode::Strict).unwrap_err();
        match err {
            RegistryError::RecordElement { parameter, index, source } => {
                assert_eq!(parameter, "servers");
                assert_eq!(index, 1);
                assert!(matches!(*source, RegistryError::MissingKey { ref name, .. } if name == "port"));
            }
            other => panic!("Expected RecordElement, got {:?}", other),
        }
        // the record before the failing element stays loaded
        assert_eq!(hosts(&servers), vec!["a"]);
    }

    #[test]
    fn test_non_object_element_fails() {
        let mut list = RecordList::new(server);
        for mode in [LoadMode::Lenient, LoadMode::Strict] {
            let err = list
                .load_document(&json!([{"host": "a", "port": 80}, 7]), mode)
                .unwrap_err();
            match err {
                CodecError::Record { index, source } => {
                    assert_eq!(index, 1);
                    assert!(matches!(source, RegistryError::GroupTypeMismatch { found: "number", .. }));
                }
                other => panic!("Expected Record, got {:?}", other),
            }
        }
    }

    fn counter() -> Result<Group> {
        Group::root().with_param(Parameter::anonymous(0u32))
    }

    #[test]
    fn test_bare_value_records_round_trip() {
        let list = RecordList::with_records(counter, 2).unwrap();
        assert_eq!(list.to_document(), json!([0, 0]));

        let mut loaded = RecordList::new(counter);
        loaded.load_document(&json!([4, 5, 6]), LoadMode::Strict).unwrap();
        let values: Vec<u32> = loaded
            .iter()
            .map(|r| r.get_parameter_value::<u32>("").unwrap())
            .collect();
        assert_eq!(values, vec![4, 5, 6]);
        assert_eq!(loaded.to_document(), json!([4, 5, 6]));
    }

    #[test]
    fn test_not_an_array_is_mismatch() {
        let mut servers = Parameter::new("servers", RecordList::new(server));
        let err = servers
            .load(&json!({"servers": {"host": "a"}}), LoadMode::Lenient)
            .unwrap_err();
        assert!(matches!(err, RegistryError::TypeMismatch { ref expected, .. } if expected == "array of records"));
    }
}
