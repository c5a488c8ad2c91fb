// Object-model wire types
//
// Replies from `/api/mo/...` come wrapped as `{"imdata": [{<class>: {...}}]}`
// where every object is `{"attributes": {...}, "children": [{<class>: ...}]}`.
// These types cover only the shape the client inspects.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::Error;

/// IEEE 802.1Q VLAN identifier (1-4094).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub struct VlanId(u16);

impl VlanId {
    pub const MIN: u16 = 1;
    pub const MAX: u16 = 4094;

    pub fn new(id: u16) -> Result<Self, Error> {
        if (Self::MIN..=Self::MAX).contains(&id) {
            Ok(Self(id))
        } else {
            Err(Error::Validation {
                field: "vlan".into(),
                reason: format!("{id} is outside {}-{}", Self::MIN, Self::MAX),
            })
        }
    }

    pub fn get(self) -> u16 {
        self.0
    }

    /// Bridge-domain encapsulation string, e.g. `vlan-10`.
    pub fn encap(self) -> String {
        format!("vlan-{}", self.0)
    }

    /// Routed interface name, e.g. `vlan10`.
    pub fn interface_name(self) -> String {
        format!("vlan{}", self.0)
    }
}

impl TryFrom<u16> for VlanId {
    type Error = Error;

    fn try_from(id: u16) -> Result<Self, Self::Error> {
        Self::new(id)
    }
}

impl From<VlanId> for u16 {
    fn from(id: VlanId) -> Self {
        id.0
    }
}

impl fmt::Display for VlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Administrative state of an interface.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum AdminState {
    #[default]
    Up,
    Down,
}

/// `{"imdata": [...]}` reply envelope.
#[derive(Debug, Default, Deserialize)]
pub struct ImData {
    #[serde(default)]
    pub imdata: Vec<MoEntry>,
}

/// One `{<class>: <object>}` map.
pub type MoEntry = BTreeMap<String, MoObject>;

/// A managed object: attributes plus class-keyed children.
#[derive(Debug, Default, Deserialize)]
pub struct MoObject {
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub children: Vec<MoEntry>,
}

impl MoObject {
    /// String attribute, if present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).and_then(serde_json::Value::as_str)
    }
}

impl ImData {
    /// Every top-level object of the given class.
    pub fn objects<'a>(&'a self, class: &'a str) -> impl Iterator<Item = &'a MoObject> + 'a {
        self.imdata.iter().filter_map(move |entry| entry.get(class))
    }

    /// Children of every top-level `class` object that are themselves of
    /// class `child_class`, matched by key rather than position.
    pub fn children_of<'a>(
        &'a self,
        class: &'a str,
        child_class: &'a str,
    ) -> impl Iterator<Item = &'a MoObject> + 'a {
        self.objects(class)
            .flat_map(|object| object.children.iter())
            .filter_map(move |child| child.get(child_class))
    }

    /// `imdata[0].error.attributes.text`, the device's error message.
    pub fn error_text(&self) -> Option<&str> {
        self.objects("error").find_map(|err| err.attr("text"))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn vlan_bounds() {
        assert!(VlanId::new(0).is_err());
        assert!(VlanId::new(4095).is_err());
        assert_eq!(VlanId::new(1).unwrap().get(), 1);
        assert_eq!(VlanId::new(4094).unwrap().get(), 4094);
    }

    #[test]
    fn vlan_names() {
        let vlan = VlanId::new(25).unwrap();
        assert_eq!(vlan.encap(), "vlan-25");
        assert_eq!(vlan.interface_name(), "vlan25");
        assert_eq!(vlan.to_string(), "25");
    }

    #[test]
    fn admin_state_strings() {
        assert_eq!(AdminState::Up.to_string(), "up");
        assert_eq!("down".parse::<AdminState>().unwrap(), AdminState::Down);
    }

    #[test]
    fn error_text_is_extracted() {
        let tree: ImData = serde_json::from_value(json!({
            "totalCount": "1",
            "imdata": [{
                "error": {
                    "attributes": { "code": "400", "text": "Invalid encap vlan-9999" }
                }
            }]
        }))
        .unwrap();
        assert_eq!(tree.error_text(), Some("Invalid encap vlan-9999"));
    }

    #[test]
    fn children_matched_by_class_key() {
        let tree: ImData = serde_json::from_value(json!({
            "imdata": [{
                "interfaceEntity": {
                    "children": [
                        { "sviIf": { "attributes": { "id": "vlan5" } } },
                        { "l1PhysIf": { "attributes": { "id": "eth1/1" } } },
                        { "l1PhysIf": { "attributes": { "id": "eth1/2" } } }
                    ]
                }
            }]
        }))
        .unwrap();

        let ids: Vec<_> = tree
            .children_of("interfaceEntity", "l1PhysIf")
            .filter_map(|o| o.attr("id"))
            .collect();
        assert_eq!(ids, ["eth1/1", "eth1/2"]);
    }
}
