//! Error types for the parameter registry

use thiserror::Error;

/// Result type for registry operations
pub type Result<T> = std::result::Result<T, RegistryError>;

/// Parameter registry errors
#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Could not find setting for parameter \"{name}\"{}", in_group(.group))]
    MissingKey { name: String, group: Option<String> },

    #[error("Could not find definitions for parameter group \"{name}\"")]
    MissingGroup { name: String },

    #[error("Parameter \"{name}\"{} expects {expected}: {detail}", in_group(.group))]
    TypeMismatch {
        name: String,
        group: Option<String>,
        expected: String,
        detail: String,
    },

    #[error("Parameter group \"{name}\" expects an object, found {found}")]
    GroupTypeMismatch { name: String, found: &'static str },

    #[error("Record {index} of \"{parameter}\" failed to load: {source}")]
    RecordElement {
        parameter: String,
        index: usize,
        #[source]
        source: Box<RegistryError>,
    },

    #[error("Name \"{name}\" is already registered in group \"{group}\"")]
    DuplicateName { name: String, group: String },

    #[error("Anonymous parameter must be the only member of group \"{group}\"")]
    AnonymousConflict { group: String },

    #[error("Unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("Unknown parameter group: {0}")]
    UnknownGroup(String),

    #[error("Parameter \"{name}\" holds {actual}, not {requested}")]
    WrongType {
        name: String,
        actual: String,
        requested: &'static str,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn in_group(group: &Option<String>) -> String {
    match group {
        Some(g) if !g.is_empty() => format!(" from group \"{}\"", g),
        _ => String::new(),
    }
}

/// Describe the kind of a document node for error messages
pub(crate) fn node_kind(node: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match node {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_message() {
        let err = RegistryError::MissingKey {
            name: "host".to_string(),
            group: Some("net".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Could not find setting for parameter \"host\" from group \"net\""
        );

        let err = RegistryError::MissingKey { name: "host".to_string(), group: None };
        assert_eq!(err.to_string(), "Could not find setting for parameter \"host\"");
    }

    #[test]
    fn test_record_element_keeps_source() {
        use std::error::Error;

        let err = RegistryError::RecordElement {
            parameter: "servers".to_string(),
            index: 2,
            source: Box::new(RegistryError::MissingGroup { name: "tls".to_string() }),
        };
        assert!(err.to_string().starts_with("Record 2 of \"servers\""));
        assert!(err.source().is_some());
    }
}
