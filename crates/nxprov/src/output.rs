//! Human-readable progress and summary lines on stdout.

use std::io::{self, IsTerminal};

use owo_colors::OwoColorize;

use nxprov_core::{FeatureOutcome, LogoutOutcome, Progress, ProvisionReport};

/// Color only when stdout is a terminal and `NO_COLOR` is unset.
pub fn should_color() -> bool {
    io::stdout().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Ok,
    Warn,
    Fail,
    Info,
}

pub struct Printer {
    color: bool,
}

impl Printer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, tone: Tone, text: &str) -> String {
        if !self.color {
            return text.to_owned();
        }
        match tone {
            Tone::Ok => text.green().to_string(),
            Tone::Warn => text.yellow().to_string(),
            Tone::Fail => text.red().bold().to_string(),
            Tone::Info => text.cyan().to_string(),
        }
    }

    fn line(&self, tone: Tone, tag: &str, message: &str) {
        println!("{} {message}", self.paint(tone, tag));
    }

    /// One line per workflow step.
    pub fn progress(&self, event: &Progress) {
        match event {
            Progress::LoginFailed { message } => self.line(Tone::Fail, "[fail]", message),
            Progress::LoggedIn => self.line(Tone::Ok, "[ ok ]", "logged in"),
            Progress::InterfacesListed { kind, names } => {
                self.line(Tone::Info, "[info]", &format!("{} {kind} interface(s)", names.len()));
                for name in names {
                    println!("       {name}");
                }
            }
            Progress::InterfaceListFailed { kind, message } => {
                self.line(Tone::Warn, "[warn]", &format!("listing {kind}: {message}"));
            }
            Progress::FeatureQueryFailed { feature, message } => self.line(
                Tone::Warn,
                "[warn]",
                &format!("could not read {feature} state, enabling anyway: {message}"),
            ),
            Progress::FeatureAlreadyEnabled { feature } => {
                self.line(Tone::Ok, "[ ok ]", &format!("{feature} already enabled"));
            }
            Progress::FeatureEnableAttempt { feature, attempt, max } => self.line(
                Tone::Info,
                "[info]",
                &format!("enabling feature {feature} (attempt {attempt}/{max})"),
            ),
            Progress::FeatureEnableFailed {
                attempt,
                message,
                transient,
                ..
            } => {
                let hint = if *transient { " (transient)" } else { "" };
                self.line(
                    Tone::Warn,
                    "[warn]",
                    &format!("attempt {attempt} failed{hint}: {message}"),
                );
            }
            Progress::FeatureEnabled { feature, .. } => {
                self.line(Tone::Ok, "[ ok ]", &format!("feature {feature} enabled"));
            }
            Progress::FeatureUnavailable { feature, attempts } => self.line(
                Tone::Fail,
                "[fail]",
                &format!("feature {feature} still disabled after {attempts} attempt(s)"),
            ),
            Progress::VlanCreated { vlan } => {
                self.line(Tone::Ok, "[ ok ]", &format!("VLAN {vlan} created"));
            }
            Progress::VlanFailed { vlan, message } => {
                self.line(Tone::Fail, "[fail]", &format!("VLAN {vlan}: {message}"));
            }
            Progress::SvisSkipped { failed_vlans } => self.line(
                Tone::Warn,
                "[skip]",
                &format!("SVIs not created, {failed_vlans} VLAN(s) failed"),
            ),
            Progress::SviCreated { vlan, address } => {
                self.line(Tone::Ok, "[ ok ]", &format!("SVI vlan{vlan} {address}"));
            }
            Progress::SviFailed { vlan, address, message } => self.line(
                Tone::Fail,
                "[fail]",
                &format!("SVI vlan{vlan} {address}: {message}"),
            ),
            Progress::AddressSpaceExhausted { message } => {
                self.line(Tone::Fail, "[fail]", message);
            }
            Progress::LoggedOut => self.line(Tone::Ok, "[ ok ]", "logged out"),
            Progress::LogoutFailed { message } => {
                self.line(Tone::Fail, "[fail]", &format!("logout: {message}"));
            }
        }
    }

    /// Totals after the run.
    pub fn summary(&self, report: &ProvisionReport) {
        let vlans_ok = report.vlans.len() - report.failed_vlans().len();
        let svis_ok = report.svis.len() - report.failed_svis().len();
        let feature = match &report.feature {
            FeatureOutcome::NotChecked => "not checked".to_owned(),
            FeatureOutcome::AlreadyEnabled => "already enabled".to_owned(),
            FeatureOutcome::Enabled { attempts } => format!("enabled after {attempts} attempt(s)"),
            FeatureOutcome::Failed { attempts, .. } => format!("failed after {attempts} attempt(s)"),
        };
        let logout = match &report.logout {
            LogoutOutcome::NotAttempted => "not attempted",
            LogoutOutcome::LoggedOut => "ok",
            LogoutOutcome::Failed { .. } => "failed",
        };

        println!();
        println!("feature: {feature}");
        println!("VLANs:   {vlans_ok}/{} created", report.vlans.len());
        if report.svis_skipped {
            println!("SVIs:    skipped");
        } else {
            println!("SVIs:    {svis_ok}/{} created", report.svis.len());
        }
        println!("logout:  {logout}");

        let (tone, verdict) = if report.is_success() {
            (Tone::Ok, "DONE")
        } else {
            (Tone::Fail, "ABORTED")
        };
        println!("{} (stage reached: {})", self.paint(tone, verdict), report.reached);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_output_has_no_escapes() {
        let printer = Printer::new(false);
        assert_eq!(printer.paint(Tone::Fail, "[fail]"), "[fail]");
    }

    #[test]
    fn colored_output_wraps_text() {
        let printer = Printer::new(true);
        let painted = printer.paint(Tone::Ok, "[ ok ]");
        assert!(painted.contains("[ ok ]"));
        assert!(painted.starts_with('\u{1b}'));
    }
}
