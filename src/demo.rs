//! Demonstration schema
//!
//! Two nested settings groups under a named root plus a list of server
//! records. Used by the `params` binary and the integration tests.

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::error::Result;
use crate::group::Group;
use crate::param::Parameter;
use crate::records::RecordList;
use crate::registry::Registry;

/// An enumeration stored as its integer value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize_repr, Deserialize_repr)]
#[repr(u8)]
pub enum ExampleEnum {
    #[default]
    E0 = 0,
    E1 = 1,
    E2 = 2,
}

crate::scalar_param!(ExampleEnum => "ExampleEnum");

/// Typed handles into [`parent_settings`], relative to its root
pub mod keys {
    use super::ExampleEnum;
    use crate::records::RecordList;
    use crate::registry::ParamKey;

    pub const TEST: ParamKey<String> = ParamKey::new("mySettings1.test");
    pub const ENUM_PROPERTY: ParamKey<ExampleEnum> = ParamKey::new("mySettings1.enum_property");
    pub const UINT: ParamKey<u32> = ParamKey::new("mySettings2.uint");
    pub const PI: ParamKey<f64> = ParamKey::new("mySettings2.pi");
    pub const NUMBERS: ParamKey<Vec<f64>> = ParamKey::new("mySettings2.numbers");
    pub const SERVERS: ParamKey<RecordList> = ParamKey::new("servers");
}

/// Shape of one entry in the `servers` list
pub fn server() -> Result<Group> {
    Group::new("server")
        .with_param(Parameter::new("host", "localhost".to_string()))?
        .with_param(Parameter::new("port", 8080u16))?
        .with_param(Parameter::new("tls", false))
}

/// The `mainSettings` tree
pub fn parent_settings() -> Result<Group> {
    let my_settings1 = Group::new("mySettings1")
        .with_param(Parameter::new("test", "Value".to_string()))?
        .with_param(Parameter::new("enum_property", ExampleEnum::E1))?;

    let my_settings2 = Group::new("mySettings2")
        .with_param(Parameter::new("uint", 123u32))?
        .with_param(Parameter::new("pi", std::f64::consts::PI))?
        .with_param(Parameter::new("numbers", vec![0.0, 1.0, 2.0, 3.0]))?;

    Group::new("mainSettings")
        .with_group(my_settings1)?
        .with_group(my_settings2)?
        .with_param(Parameter::new("servers", RecordList::new(server)))
}

/// A registry holding [`parent_settings`]
pub fn registry() -> Result<Registry> {
    Ok(Registry::new(parent_settings()?))
}
