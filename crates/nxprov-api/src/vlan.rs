// Layer-2 VLAN (bridge domain) endpoints

use serde_json::{Value, json};
use tracing::debug;

use crate::error::Error;
use crate::models::VlanId;
use crate::session::DeviceSession;

pub const BRIDGE_DOMAIN_PATH: &str = "/api/mo/sys/bd.json";

/// `bdEntity` document creating one `l2BD` with the given encap and name.
pub fn vlan_document(vlan: VlanId, description: &str) -> Value {
    json!({
        "bdEntity": {
            "children": [{
                "l2BD": {
                    "attributes": {
                        "fabEncap": vlan.encap(),
                        "name": description,
                    }
                }
            }]
        }
    })
}

impl DeviceSession {
    /// Create a VLAN.
    ///
    /// `POST /api/mo/sys/bd.json`. Success iff the device answers 2xx.
    pub async fn create_vlan(&self, vlan: VlanId, description: &str) -> Result<(), Error> {
        debug!(%vlan, description, "creating VLAN");
        self.post(BRIDGE_DOMAIN_PATH, &vlan_document(vlan, description))
            .await?
            .error_for_status(&format!("create VLAN {vlan}"))?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn document_shape() {
        let doc = vlan_document(VlanId::new(10).unwrap(), "auto-generated vlan-10");
        assert_eq!(
            doc,
            json!({
                "bdEntity": {
                    "children": [{
                        "l2BD": {
                            "attributes": {
                                "fabEncap": "vlan-10",
                                "name": "auto-generated vlan-10"
                            }
                        }
                    }]
                }
            })
        );
    }
}
