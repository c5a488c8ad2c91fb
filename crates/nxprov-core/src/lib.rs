//! Provisioning logic between `nxprov-api` and the CLI.
//!
//! - **[`ProvisioningWorkflow`]** — owns a [`DeviceSession`] and runs the
//!   fixed login → feature → VLANs → SVIs → logout sequence, tolerating
//!   per-object failures and always logging out once logged in.
//! - **[`ProvisioningPlan`]** — the VLAN/SVI ranges, feature names and
//!   address parameters for a run.
//! - **[`AddressAllocator`]** — successive SVI addresses with a fixed prefix.
//! - **[`ProvisionReport`]** — per-object outcomes and the terminal stage.

pub mod allocator;
pub mod error;
pub mod plan;
pub mod workflow;

// ── Primary re-exports ──────────────────────────────────────────────
pub use allocator::AddressAllocator;
pub use error::CoreError;
pub use plan::ProvisioningPlan;
pub use workflow::{
    AbortReason, FeatureOutcome, LogoutOutcome, Progress, ProvisionReport, ProvisioningWorkflow,
    Stage, SviOutcome, VlanOutcome,
};

// ── Re-exports from nxprov-api ──────────────────────────────────────
pub use nxprov_api::{
    AdminState, Connection, Credentials, DeviceSession, Ipv4Net, Protocol, TransportConfig, VlanId,
};
