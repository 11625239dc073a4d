//! Familiar Parameter Registry
//!
//! A typed, hierarchical parameter registry: named, strongly-typed leaf values
//! ([`Parameter`]) organized into named composite nodes ([`Group`]), loaded
//! from and saved to JSON documents without per-field (de)serialization code.
//!
//! ## Features
//!
//! - **Typed Leaves**: Strings, booleans, integers, floats, integer-backed enums, and lists of them
//! - **Type Erasure**: Groups hold parameters of any value type behind one [`Param`] handle
//! - **Transparent Groups**: Anonymous groups flatten into their parent's document object
//! - **Strict/Lenient Loads**: Missing entries fail or are skipped; wrong types always fail
//! - **Record Lists**: Homogeneous lists of group-shaped records mapped to JSON arrays
//!
//! ## Example
//!
//! ```
//! use familiar_params::{Group, LoadMode, ParamKey, Parameter, Registry};
//! use serde_json::json;
//!
//! const PORT: ParamKey<i64> = ParamKey::new("net.port");
//!
//! let net = Group::new("net")
//!     .with_param(Parameter::new("host", "localhost".to_string()))?
//!     .with_param(Parameter::new("port", 8080i64))?;
//! let mut registry = Registry::new(Group::root().with_group(net)?);
//!
//! assert_eq!(
//!     registry.serialize(),
//!     json!({"net": {"host": "localhost", "port": 8080}})
//! );
//!
//! registry.load(&json!({"net": {"port": 9090}}), LoadMode::Lenient)?;
//! assert_eq!(*registry.get(&PORT)?, 9090);
//!
//! assert!(registry.load(&json!({"net": {"port": 9090}}), LoadMode::Strict).is_err());
//! # Ok::<(), familiar_params::RegistryError>(())
//! ```

pub mod codec;
pub mod config;
pub mod demo;
pub mod error;
pub mod group;
pub mod param;
pub mod records;
pub mod registry;

pub use codec::{CodecError, ParamValue};
pub use config::{OutputFormat, ParamsConfig};
pub use error::{RegistryError, Result};
pub use group::{Group, SHARED_VALUE_KEY};
pub use param::{LoadMode, Param, Parameter};
pub use records::{RecordList, RecordShape};
pub use registry::{ParamKey, Registry};

#[doc(hidden)]
pub mod __private {
    pub use serde_json::Value;
}
