// Interface endpoints: SVI creation, IPv4 address assignment, listing.

use ipnet::Ipv4Net;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::Error;
use crate::models::{AdminState, ImData, VlanId};
use crate::session::DeviceSession;

pub const SYSTEM_PATH: &str = "/api/mo/sys.json";
pub const INTERFACE_TREE_PATH: &str = "/api/mo/sys/intf.json?rsp-subtree=children";

/// Routing domain that SVI addresses are placed in.
pub const DEFAULT_DOMAIN: &str = "default";

/// `topSystem` document creating one `sviIf`.
pub fn svi_document(vlan: VlanId, admin_state: AdminState) -> Value {
    json!({
        "topSystem": {
            "children": [{
                "interfaceEntity": {
                    "children": [{
                        "sviIf": {
                            "attributes": {
                                "id": vlan.interface_name(),
                                "adminSt": admin_state.to_string(),
                            }
                        }
                    }]
                }
            }]
        }
    })
}

/// `topSystem` document assigning `address` to `interface` in the default VRF.
pub fn address_document(interface: &str, address: &Ipv4Net) -> Value {
    json!({
        "topSystem": {
            "children": [{
                "ipv4Entity": {
                    "children": [{
                        "ipv4Inst": {
                            "children": [{
                                "ipv4Dom": {
                                    "attributes": { "name": DEFAULT_DOMAIN },
                                    "children": [{
                                        "ipv4If": {
                                            "attributes": { "id": interface },
                                            "children": [{
                                                "ipv4Addr": {
                                                    "attributes": { "addr": address.to_string() }
                                                }
                                            }]
                                        }
                                    }]
                                }
                            }]
                        }
                    }]
                }
            }]
        }
    })
}

impl DeviceSession {
    /// Create a routed VLAN interface and give it an address.
    ///
    /// Two non-atomic steps: `sviIf` creation, then
    /// [`set_interface_address`](Self::set_interface_address). The address is
    /// only posted if the interface was created; if the second step fails the
    /// interface is left on the device without an address.
    pub async fn create_svi(
        &self,
        vlan: VlanId,
        address: &Ipv4Net,
        admin_state: AdminState,
    ) -> Result<(), Error> {
        let name = vlan.interface_name();
        debug!(interface = %name, %address, %admin_state, "creating SVI");

        self.post(SYSTEM_PATH, &svi_document(vlan, admin_state))
            .await?
            .error_for_status(&format!("create interface {name}"))?;

        self.set_interface_address(&name, address)
            .await
            .inspect_err(|e| warn!(interface = %name, error = %e, "interface created without address"))
    }

    /// Assign an IPv4 address to an existing interface (e.g. `vlan101`, `eth1/96`).
    ///
    /// `POST /api/mo/sys.json` with an `ipv4Entity` subtree.
    pub async fn set_interface_address(
        &self,
        interface: &str,
        address: &Ipv4Net,
    ) -> Result<(), Error> {
        debug!(interface, %address, "assigning address");
        self.post(SYSTEM_PATH, &address_document(interface, address))
            .await?
            .error_for_status(&format!("assign {address} to {interface}"))?;
        Ok(())
    }

    /// IDs of every interface of class `kind` (e.g. `l1PhysIf`, `sviIf`).
    ///
    /// `GET /api/mo/sys/intf.json?rsp-subtree=children`
    pub async fn list_interfaces(&self, kind: &str) -> Result<Vec<String>, Error> {
        debug!(kind, "listing interfaces");
        let reply = self
            .get(INTERFACE_TREE_PATH)
            .await?
            .error_for_status("interface query")?;
        let tree: ImData = reply.json()?;
        Ok(tree
            .children_of("interfaceEntity", kind)
            .filter_map(|object| object.attr("id"))
            .map(String::from)
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn svi_document_shape() {
        let doc = svi_document(VlanId::new(5).unwrap(), AdminState::Up);
        assert_eq!(
            doc["topSystem"]["children"][0]["interfaceEntity"]["children"][0]["sviIf"]["attributes"],
            json!({ "id": "vlan5", "adminSt": "up" })
        );
    }

    #[test]
    fn address_document_keeps_prefix() {
        let addr: Ipv4Net = "10.0.0.5/30".parse().unwrap();
        let doc = address_document("vlan5", &addr);
        let dom = &doc["topSystem"]["children"][0]["ipv4Entity"]["children"][0]["ipv4Inst"]
            ["children"][0]["ipv4Dom"];
        assert_eq!(dom["attributes"]["name"], "default");
        let intf = &dom["children"][0]["ipv4If"];
        assert_eq!(intf["attributes"]["id"], "vlan5");
        assert_eq!(
            intf["children"][0]["ipv4Addr"]["attributes"]["addr"],
            "10.0.0.5/30"
        );
    }
}
