// Feature manager endpoints
//
// Reads `fmEntity` children to learn a feature's admin state; enabling goes
// through the command API because the object model cannot toggle features.

use serde::Serialize;
use strum::{Display, EnumString};
use tracing::{debug, info};

use crate::error::Error;
use crate::models::ImData;
use crate::session::DeviceSession;

pub const FEATURE_TREE_PATH: &str =
    "/api/mo/sys/fm.json?rsp-subtree=full&rsp-prop-include=config-only";

/// Administrative state of a platform feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize)]
#[strum(serialize_all = "lowercase")]
pub enum FeatureState {
    Enabled,
    Disabled,
    /// Absent from the feature list, or an `adminSt` value we don't model.
    Unknown,
}

impl FeatureState {
    fn from_admin_st(value: &str) -> Self {
        match value {
            "enabled" => Self::Enabled,
            "disabled" => Self::Disabled,
            _ => Self::Unknown,
        }
    }
}

/// A feature as last reported by the device. Never cached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feature {
    /// Feature-manager class key, e.g. `fmInterfaceVlan`.
    pub name: String,
    pub admin_state: FeatureState,
}

impl Feature {
    pub fn is_enabled(&self) -> bool {
        self.admin_state == FeatureState::Enabled
    }
}

/// Find `name` among the children of every `fmEntity`, by key.
pub fn find_feature(tree: &ImData, name: &str) -> Feature {
    let admin_state = tree
        .children_of("fmEntity", name)
        .find_map(|object| object.attr("adminSt"))
        .map_or(FeatureState::Unknown, FeatureState::from_admin_st);

    Feature {
        name: name.to_owned(),
        admin_state,
    }
}

impl DeviceSession {
    /// Query the device for a feature's admin state.
    ///
    /// `GET /api/mo/sys/fm.json?rsp-subtree=full&rsp-prop-include=config-only`
    pub async fn feature_state(&self, feature: &str) -> Result<Feature, Error> {
        debug!(feature, "querying feature state");
        let reply = self
            .get(FEATURE_TREE_PATH)
            .await?
            .error_for_status("feature query")?;
        let tree: ImData = reply.json()?;
        let found = find_feature(&tree, feature);
        debug!(feature, state = %found.admin_state, "feature state");
        Ok(found)
    }

    /// `true` only if the feature is listed and `adminSt == "enabled"`.
    ///
    /// An absent feature is `Ok(false)`, not an error.
    pub async fn is_feature_enabled(&self, feature: &str) -> Result<bool, Error> {
        Ok(self.feature_state(feature).await?.is_enabled())
    }

    /// Enable a feature via `conf t` + `feature <cli_name>` on the command API.
    ///
    /// One attempt; the caller owns the retry policy.
    pub async fn enable_feature(&self, cli_name: &str) -> Result<(), Error> {
        info!(feature = cli_name, "enabling feature through the command API");
        self.run_cli(&["conf t".to_owned(), format!("feature {cli_name}")])
            .await?;
        info!(feature = cli_name, "feature enabled");
        Ok(())
    }
}
