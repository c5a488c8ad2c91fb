// nxprov-api: Async Rust client for the NX-API object model and command API
//
// `DeviceSession` owns the HTTP clients for one switch. Endpoint groups are
// inherent methods spread across `aaa`, `feature`, `command`, `vlan` and
// `interface`.

pub mod aaa;
pub mod auth;
pub mod command;
pub mod connection;
pub mod error;
pub mod feature;
pub mod interface;
pub mod models;
pub mod session;
pub mod transport;
pub mod vlan;

pub use auth::AuthStrategy;
pub use connection::{Connection, Credentials, Protocol};
pub use error::Error;
pub use feature::{Feature, FeatureState};
pub use ipnet::Ipv4Net;
pub use models::{AdminState, ImData, MoObject, VlanId};
pub use session::{DeviceSession, Reply};
pub use transport::{TlsMode, TransportConfig};
