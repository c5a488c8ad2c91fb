// ── Provisioning plan ──
//
// What the workflow creates: which feature to require, which VLAN ids, which
// of them get SVIs, and how SVI addresses are allocated. `Default` is the
// stock run; the config file may override any field.

use std::collections::BTreeSet;
use std::net::Ipv4Addr;

use nxprov_api::{AdminState, VlanId};
use serde::{Deserialize, Serialize};

use crate::allocator::AddressAllocator;
use crate::error::CoreError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvisioningPlan {
    /// Feature-manager class key checked in `fmEntity`.
    pub feature_key: String,
    /// Name passed to `feature <name>` on the command API.
    pub feature_cli_name: String,
    /// Attempts at enabling the feature before giving up.
    pub enable_attempts: u32,

    /// VLAN ids: `vlan_start..vlan_end` by `vlan_step` (end exclusive).
    pub vlan_start: u16,
    pub vlan_end: u16,
    pub vlan_step: u16,
    /// Description is this prefix followed by the VLAN id.
    pub description_prefix: String,

    /// SVI ids: `svi_start..svi_end` by `svi_step` (end exclusive).
    pub svi_start: u16,
    pub svi_end: u16,
    pub svi_step: u16,
    pub svi_admin_state: AdminState,

    pub base_address: Ipv4Addr,
    pub address_step: u32,
    pub prefix_len: u8,
}

impl Default for ProvisioningPlan {
    fn default() -> Self {
        Self {
            feature_key: "fmInterfaceVlan".into(),
            feature_cli_name: "interface-vlan".into(),
            enable_attempts: 3,
            vlan_start: 5,
            vlan_end: 255,
            vlan_step: 5,
            description_prefix: "auto-generated vlan-".into(),
            svi_start: 5,
            svi_end: 55,
            svi_step: 5,
            svi_admin_state: AdminState::Up,
            base_address: Ipv4Addr::new(10, 0, 0, 1),
            address_step: 4,
            prefix_len: 30,
        }
    }
}

fn id_range(start: u16, end: u16, step: u16, what: &str) -> Result<Vec<VlanId>, CoreError> {
    if step == 0 {
        return Err(CoreError::ValidationFailed {
            message: format!("{what} step must be greater than zero"),
        });
    }
    (start..end)
        .step_by(usize::from(step))
        .map(|id| VlanId::new(id).map_err(CoreError::from))
        .collect()
}

impl ProvisioningPlan {
    /// VLAN ids to create, in order.
    pub fn vlan_ids(&self) -> Result<Vec<VlanId>, CoreError> {
        id_range(self.vlan_start, self.vlan_end, self.vlan_step, "VLAN")
    }

    /// VLAN ids that get an SVI, in order.
    pub fn svi_ids(&self) -> Result<Vec<VlanId>, CoreError> {
        id_range(self.svi_start, self.svi_end, self.svi_step, "SVI")
    }

    pub fn description(&self, vlan: VlanId) -> String {
        format!("{}{vlan}", self.description_prefix)
    }

    /// Fresh address cursor for one run.
    pub fn allocator(&self) -> Result<AddressAllocator, CoreError> {
        AddressAllocator::new(self.base_address, self.address_step, self.prefix_len)
    }

    /// Check every field before any request is sent.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.feature_key.is_empty() || self.feature_cli_name.is_empty() {
            return Err(CoreError::ValidationFailed {
                message: "feature names must not be empty".into(),
            });
        }
        if self.enable_attempts == 0 {
            return Err(CoreError::ValidationFailed {
                message: "enable_attempts must be at least 1".into(),
            });
        }

        let vlans = self.vlan_ids()?;
        if vlans.is_empty() {
            return Err(CoreError::ValidationFailed {
                message: "VLAN range is empty".into(),
            });
        }

        let created: BTreeSet<_> = vlans.into_iter().collect();
        let svis = self.svi_ids()?;
        if let Some(orphan) = svis.iter().find(|id| !created.contains(*id)) {
            return Err(CoreError::ValidationFailed {
                message: format!("SVI for VLAN {orphan} has no VLAN in the plan"),
            });
        }

        // Every SVI must get an address.
        let mut allocator = self.allocator()?;
        for _ in &svis {
            allocator.allocate()?;
        }
        Ok(())
    }
}
