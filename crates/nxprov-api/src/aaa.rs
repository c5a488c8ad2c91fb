// AAA login/logout
//
// `aaaLogin` sets the session cookie in the client's jar; every later
// object-model call carries it automatically. `aaaLogout` invalidates it.

use secrecy::ExposeSecret;
use serde_json::json;
use tracing::debug;

use crate::error::Error;
use crate::session::DeviceSession;

pub const AAA_LOGIN_PATH: &str = "/api/aaaLogin.json";
pub const AAA_LOGOUT_PATH: &str = "/api/aaaLogout.json";

impl DeviceSession {
    /// Authenticate the session with the connection's credentials.
    ///
    /// `POST /api/aaaLogin.json` with
    /// `{"aaaUser": {"attributes": {"name": ..., "pwd": ...}}}`.
    /// Single attempt; any non-2xx reply is an [`Error::Authentication`].
    pub async fn login(&self) -> Result<(), Error> {
        let credentials = self.connection().credentials();
        debug!(user = %credentials.username, "logging in at {}", self.base_url());

        let body = json!({
            "aaaUser": {
                "attributes": {
                    "name": credentials.username,
                    "pwd": credentials.password.expose_secret(),
                }
            }
        });

        let reply = self.post(AAA_LOGIN_PATH, &body).await?;
        if !reply.is_success() {
            return Err(Error::Authentication {
                message: format!(
                    "login failed (HTTP {}): {}",
                    reply.status(),
                    reply.error_text().unwrap_or_default()
                ),
            });
        }

        debug!("login successful");
        Ok(())
    }

    /// End the session.
    ///
    /// `POST /api/aaaLogout.json` with `{"aaaUser": {"attributes": {"name": ...}}}`.
    /// On success the session is closed and cannot be reused.
    pub async fn logout(&self) -> Result<(), Error> {
        let username = &self.connection().credentials().username;
        debug!(user = %username, "logging out");

        let body = json!({
            "aaaUser": {
                "attributes": {
                    "name": username,
                }
            }
        });

        let reply = self.post(AAA_LOGOUT_PATH, &body).await?;
        if !reply.is_success() {
            return Err(Error::Authentication {
                message: format!(
                    "logout failed (HTTP {}): {}",
                    reply.status(),
                    reply.error_text().unwrap_or_default()
                ),
            });
        }

        self.mark_closed();
        debug!("logout complete");
        Ok(())
    }
}
