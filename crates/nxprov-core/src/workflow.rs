// ── Provisioning workflow ──
//
// Drives one session through login, feature check/enable, VLAN creation,
// SVI creation and logout. Device failures never escape as errors: each is
// logged, forwarded to the progress callback and recorded in the report.
// Once login has succeeded, logout is attempted on every path.

use std::fmt;

use ipnet::Ipv4Net;
use nxprov_api::{DeviceSession, VlanId};
use serde::Serialize;
use strum::Display;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::plan::ProvisioningPlan;

/// Workflow states, in the order they are reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, Serialize)]
pub enum Stage {
    Start,
    LoggedIn,
    FeatureChecked,
    VlansCreated,
    SvisCreated,
    LoggedOut,
    Done,
    Aborted,
}

/// Why a run did not finish cleanly. The first reason wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AbortReason {
    LoginFailed { message: String },
    FeatureUnavailable { feature: String, attempts: u32 },
    VlansIncomplete { failed: usize },
    SvisIncomplete { failed: usize },
    AddressSpaceExhausted { message: String },
    LogoutFailed { message: String },
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LoginFailed { message } => write!(f, "login failed: {message}"),
            Self::FeatureUnavailable { feature, attempts } => {
                write!(f, "feature '{feature}' not enabled after {attempts} attempt(s)")
            }
            Self::VlansIncomplete { failed } => write!(f, "{failed} VLAN(s) could not be created"),
            Self::SvisIncomplete { failed } => write!(f, "{failed} SVI(s) could not be created"),
            Self::AddressSpaceExhausted { message } | Self::LogoutFailed { message } => {
                f.write_str(message)
            }
        }
    }
}

/// Result of the feature stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum FeatureOutcome {
    NotChecked,
    AlreadyEnabled,
    Enabled { attempts: u32 },
    Failed { attempts: u32, last_error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LogoutOutcome {
    NotAttempted,
    LoggedOut,
    Failed { message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VlanOutcome {
    pub vlan: VlanId,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SviOutcome {
    pub vlan: VlanId,
    pub address: Ipv4Net,
    pub error: Option<String>,
}

/// Everything a run did, for printing and for the exit code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionReport {
    /// `Done` or `Aborted`.
    pub final_stage: Stage,
    /// Furthest non-terminal stage reached.
    pub reached: Stage,
    pub feature: FeatureOutcome,
    pub vlans: Vec<VlanOutcome>,
    pub svis: Vec<SviOutcome>,
    /// `true` when SVI creation was skipped because a VLAN failed.
    pub svis_skipped: bool,
    pub logout: LogoutOutcome,
    pub abort: Option<AbortReason>,
}

impl ProvisionReport {
    fn new() -> Self {
        Self {
            final_stage: Stage::Start,
            reached: Stage::Start,
            feature: FeatureOutcome::NotChecked,
            vlans: Vec::new(),
            svis: Vec::new(),
            svis_skipped: false,
            logout: LogoutOutcome::NotAttempted,
            abort: None,
        }
    }

    fn abort(&mut self, reason: AbortReason) {
        if self.abort.is_none() {
            self.abort = Some(reason);
        }
    }

    pub fn is_success(&self) -> bool {
        self.final_stage == Stage::Done
    }

    pub fn all_vlans_ok(&self) -> bool {
        self.vlans.iter().all(|v| v.error.is_none())
    }

    pub fn failed_vlans(&self) -> Vec<VlanId> {
        self.vlans
            .iter()
            .filter(|v| v.error.is_some())
            .map(|v| v.vlan)
            .collect()
    }

    pub fn failed_svis(&self) -> Vec<VlanId> {
        self.svis
            .iter()
            .filter(|s| s.error.is_some())
            .map(|s| s.vlan)
            .collect()
    }
}

/// Progress notifications, in the order they happen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    LoginFailed { message: String },
    LoggedIn,
    InterfacesListed { kind: String, names: Vec<String> },
    InterfaceListFailed { kind: String, message: String },
    FeatureQueryFailed { feature: String, message: String },
    FeatureAlreadyEnabled { feature: String },
    FeatureEnableAttempt { feature: String, attempt: u32, max: u32 },
    FeatureEnableFailed {
        feature: String,
        attempt: u32,
        message: String,
        /// Timeout, refused connection or 5xx: likely to clear on its own.
        transient: bool,
    },
    FeatureEnabled { feature: String, attempts: u32 },
    FeatureUnavailable { feature: String, attempts: u32 },
    VlanCreated { vlan: VlanId },
    VlanFailed { vlan: VlanId, message: String },
    SvisSkipped { failed_vlans: usize },
    SviCreated { vlan: VlanId, address: Ipv4Net },
    SviFailed { vlan: VlanId, address: Ipv4Net, message: String },
    AddressSpaceExhausted { message: String },
    LoggedOut,
    LogoutFailed { message: String },
}

/// One-shot provisioning run over an owned session.
///
/// The session is moved in, so it cannot be shared with another workflow
/// and is dropped when the run ends.
pub struct ProvisioningWorkflow {
    session: DeviceSession,
    plan: ProvisioningPlan,
    list_kind: Option<String>,
}

impl ProvisioningWorkflow {
    /// Validate the plan and take ownership of the session.
    pub fn new(session: DeviceSession, plan: ProvisioningPlan) -> Result<Self, CoreError> {
        plan.validate()?;
        Ok(Self {
            session,
            plan,
            list_kind: None,
        })
    }

    /// List interfaces of class `kind` right after login, before anything
    /// is created. A failed listing is reported but does not stop the run.
    pub fn list_interfaces_first(mut self, kind: impl Into<String>) -> Self {
        self.list_kind = Some(kind.into());
        self
    }

    pub fn session(&self) -> &DeviceSession {
        &self.session
    }

    pub fn plan(&self) -> &ProvisioningPlan {
        &self.plan
    }

    /// Run without progress callbacks.
    pub async fn run(self) -> ProvisionReport {
        self.run_with(|_| {}).await
    }

    /// Run the full sequence, reporting each step to `on_progress`.
    pub async fn run_with(self, mut on_progress: impl FnMut(&Progress)) -> ProvisionReport {
        let mut report = ProvisionReport::new();

        // Start → LoggedIn
        if let Err(e) = self.session.login().await {
            warn!(error = %e, "login failed");
            let message = e.to_string();
            on_progress(&Progress::LoginFailed {
                message: message.clone(),
            });
            report.abort(AbortReason::LoginFailed { message });
            report.final_stage = Stage::Aborted;
            return report;
        }
        report.reached = Stage::LoggedIn;
        info!("logged in to {}", self.session.base_url());
        on_progress(&Progress::LoggedIn);

        if let Some(kind) = &self.list_kind {
            match self.session.list_interfaces(kind).await {
                Ok(names) => on_progress(&Progress::InterfacesListed {
                    kind: kind.clone(),
                    names,
                }),
                Err(e) => {
                    warn!(kind, error = %e, "interface listing failed");
                    on_progress(&Progress::InterfaceListFailed {
                        kind: kind.clone(),
                        message: e.to_string(),
                    });
                }
            }
        }

        self.provision(&mut report, &mut on_progress).await;

        // → LoggedOut, whatever happened above.
        match self.session.logout().await {
            Ok(()) => {
                report.logout = LogoutOutcome::LoggedOut;
                report.reached = Stage::LoggedOut;
                info!("logged out");
                on_progress(&Progress::LoggedOut);
            }
            Err(e) => {
                warn!(error = %e, "logout failed");
                let message = e.to_string();
                on_progress(&Progress::LogoutFailed {
                    message: message.clone(),
                });
                report.logout = LogoutOutcome::Failed {
                    message: message.clone(),
                };
                report.abort(AbortReason::LogoutFailed { message });
            }
        }

        report.final_stage = if report.abort.is_none() {
            Stage::Done
        } else {
            Stage::Aborted
        };
        report
    }

    /// Stages between login and logout.
    async fn provision(&self, report: &mut ProvisionReport, on_progress: &mut impl FnMut(&Progress)) {
        // LoggedIn → FeatureChecked
        if !self.ensure_feature(report, on_progress).await {
            return;
        }
        report.reached = Stage::FeatureChecked;

        // FeatureChecked → VlansCreated
        self.create_vlans(report, on_progress).await;
        report.reached = Stage::VlansCreated;

        if !report.all_vlans_ok() {
            let failed = report.failed_vlans().len();
            warn!(failed, "VLAN creation incomplete, skipping SVIs");
            report.svis_skipped = true;
            on_progress(&Progress::SvisSkipped {
                failed_vlans: failed,
            });
            report.abort(AbortReason::VlansIncomplete { failed });
            return;
        }

        // VlansCreated → SvisCreated
        self.create_svis(report, on_progress).await;
        report.reached = Stage::SvisCreated;

        let failed = report.failed_svis().len();
        if failed > 0 {
            report.abort(AbortReason::SvisIncomplete { failed });
        }
    }

    /// Check the feature and enable it with bounded retries if needed.
    async fn ensure_feature(
        &self,
        report: &mut ProvisionReport,
        on_progress: &mut impl FnMut(&Progress),
    ) -> bool {
        let key = &self.plan.feature_key;
        let cli_name = &self.plan.feature_cli_name;

        match self.session.is_feature_enabled(key).await {
            Ok(true) => {
                info!(feature = %key, "feature already enabled");
                report.feature = FeatureOutcome::AlreadyEnabled;
                on_progress(&Progress::FeatureAlreadyEnabled {
                    feature: key.clone(),
                });
                return true;
            }
            Ok(false) => debug!(feature = %key, "feature not enabled"),
            Err(e) => {
                // Treated as "not enabled": enabling an enabled feature is harmless.
                warn!(feature = %key, error = %e, "feature query failed");
                on_progress(&Progress::FeatureQueryFailed {
                    feature: key.clone(),
                    message: e.to_string(),
                });
            }
        }

        let max = self.plan.enable_attempts;
        let mut last_error = String::new();
        for attempt in 1..=max {
            on_progress(&Progress::FeatureEnableAttempt {
                feature: cli_name.clone(),
                attempt,
                max,
            });
            match self.session.enable_feature(cli_name).await {
                Ok(()) => {
                    report.feature = FeatureOutcome::Enabled { attempts: attempt };
                    on_progress(&Progress::FeatureEnabled {
                        feature: cli_name.clone(),
                        attempts: attempt,
                    });
                    return true;
                }
                Err(e) => {
                    let transient = e.is_transient();
                    warn!(
                        feature = %cli_name,
                        attempt,
                        max,
                        transient,
                        status = ?e.status(),
                        error = %e,
                        "enable attempt failed"
                    );
                    last_error = e.to_string();
                    on_progress(&Progress::FeatureEnableFailed {
                        feature: cli_name.clone(),
                        attempt,
                        message: last_error.clone(),
                        transient,
                    });
                }
            }
        }

        report.feature = FeatureOutcome::Failed {
            attempts: max,
            last_error,
        };
        on_progress(&Progress::FeatureUnavailable {
            feature: cli_name.clone(),
            attempts: max,
        });
        report.abort(AbortReason::FeatureUnavailable {
            feature: cli_name.clone(),
            attempts: max,
        });
        false
    }

    /// Create every VLAN in the plan; failures never stop the loop.
    async fn create_vlans(&self, report: &mut ProvisionReport, on_progress: &mut impl FnMut(&Progress)) {
        // The plan was validated in `new`, so the range is sound.
        let vlans = self.plan.vlan_ids().unwrap_or_default();
        info!(count = vlans.len(), "creating VLANs");

        for vlan in vlans {
            let description = self.plan.description(vlan);
            match self.session.create_vlan(vlan, &description).await {
                Ok(()) => {
                    on_progress(&Progress::VlanCreated { vlan });
                    report.vlans.push(VlanOutcome { vlan, error: None });
                }
                Err(e) => {
                    warn!(%vlan, error = %e, "failed to create VLAN");
                    let message = e.to_string();
                    on_progress(&Progress::VlanFailed {
                        vlan,
                        message: message.clone(),
                    });
                    report.vlans.push(VlanOutcome {
                        vlan,
                        error: Some(message),
                    });
                }
            }
        }
    }

    /// Create SVIs with freshly allocated addresses.
    async fn create_svis(&self, report: &mut ProvisionReport, on_progress: &mut impl FnMut(&Progress)) {
        let svis = self.plan.svi_ids().unwrap_or_default();
        let mut allocator = match self.plan.allocator() {
            Ok(allocator) => allocator,
            Err(e) => {
                let message = e.to_string();
                on_progress(&Progress::AddressSpaceExhausted {
                    message: message.clone(),
                });
                report.abort(AbortReason::AddressSpaceExhausted { message });
                return;
            }
        };
        info!(count = svis.len(), "creating SVIs");

        for vlan in svis {
            let address = match allocator.allocate() {
                Ok(address) => address,
                Err(e) => {
                    warn!(%vlan, error = %e, "no address left for SVI");
                    let message = e.to_string();
                    on_progress(&Progress::AddressSpaceExhausted {
                        message: message.clone(),
                    });
                    report.abort(AbortReason::AddressSpaceExhausted { message });
                    return;
                }
            };

            match self
                .session
                .create_svi(vlan, &address, self.plan.svi_admin_state)
                .await
            {
                Ok(()) => {
                    on_progress(&Progress::SviCreated { vlan, address });
                    report.svis.push(SviOutcome {
                        vlan,
                        address,
                        error: None,
                    });
                }
                Err(e) => {
                    warn!(%vlan, %address, error = %e, "failed to create SVI");
                    let message = e.to_string();
                    on_progress(&Progress::SviFailed {
                        vlan,
                        address,
                        message: message.clone(),
                    });
                    report.svis.push(SviOutcome {
                        vlan,
                        address,
                        error: Some(message),
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_are_ordered() {
        assert!(Stage::Start < Stage::LoggedIn);
        assert!(Stage::LoggedIn < Stage::FeatureChecked);
        assert!(Stage::FeatureChecked < Stage::VlansCreated);
        assert!(Stage::VlansCreated < Stage::SvisCreated);
        assert!(Stage::SvisCreated < Stage::LoggedOut);
    }

    #[test]
    fn first_abort_reason_wins() {
        let mut report = ProvisionReport::new();
        report.abort(AbortReason::VlansIncomplete { failed: 1 });
        report.abort(AbortReason::LogoutFailed {
            message: "x".into(),
        });
        assert_eq!(report.abort, Some(AbortReason::VlansIncomplete { failed: 1 }));
    }

    #[test]
    fn abort_reasons_read_as_sentences() {
        assert_eq!(
            AbortReason::FeatureUnavailable {
                feature: "interface-vlan".into(),
                attempts: 3,
            }
            .to_string(),
            "feature 'interface-vlan' not enabled after 3 attempt(s)"
        );
        assert_eq!(
            AbortReason::VlansIncomplete { failed: 2 }.to_string(),
            "2 VLAN(s) could not be created"
        );
    }

    #[test]
    fn empty_report_has_all_vlans_ok() {
        let report = ProvisionReport::new();
        assert!(report.all_vlans_ok());
        assert!(!report.is_success());
    }
}
