// Device session
//
// Wraps two `reqwest::Client`s bound to one switch: a cookie-carrying client
// for the object-model API and a jar-less client for the Basic-auth command
// API. Endpoint groups (aaa, feature, vlan, interface) are inherent methods
// in their own files so this module stays about transport mechanics.

use std::sync::atomic::{AtomicBool, Ordering};

use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::auth::AuthStrategy;
use crate::connection::Connection;
use crate::error::Error;
use crate::models::ImData;
use crate::transport::TransportConfig;

const JSON_RPC_CONTENT_TYPE: &str = "application/json-rpc";

/// Status and body of a device reply.
///
/// Non-2xx replies are still `Ok` at this level; the endpoint methods decide
/// what counts as failure.
#[derive(Debug, Clone)]
pub struct Reply {
    status: StatusCode,
    body: String,
}

impl Reply {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Deserialize the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        serde_json::from_str(&self.body).map_err(|e| {
            let preview: String = self.body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: self.body.clone(),
            }
        })
    }

    /// The device's error message (`imdata[0].error.attributes.text`), if
    /// the body carries one.
    pub fn error_text(&self) -> Option<String> {
        serde_json::from_str::<ImData>(&self.body)
            .ok()
            .and_then(|tree| tree.error_text().map(String::from))
    }

    /// Turn a non-2xx reply into `Error::Api`, prefixed with `action`.
    pub fn error_for_status(self, action: &str) -> Result<Self, Error> {
        if self.is_success() {
            return Ok(self);
        }
        let detail = self.error_text().unwrap_or_else(|| {
            self.body.trim().chars().take(200).collect()
        });
        Err(Error::Api {
            status: self.status.as_u16(),
            message: if detail.is_empty() {
                format!("{action} failed")
            } else {
                format!("{action} failed: {detail}")
            },
        })
    }
}

/// Stateful HTTP session to one switch.
///
/// Not `Clone`: the cookie jar and login state belong to exactly one owner.
/// Once [`logout`](Self::logout) succeeds every object-model call fails with
/// [`Error::SessionClosed`].
pub struct DeviceSession {
    connection: Connection,
    base_url: String,
    http: reqwest::Client,
    basic_http: reqwest::Client,
    closed: AtomicBool,
}

impl DeviceSession {
    /// Build a session from a connection using its TLS policy and no timeout.
    pub fn new(connection: Connection) -> Result<Self, Error> {
        let transport = TransportConfig::for_connection(&connection);
        Self::with_transport(connection, &transport)
    }

    /// Build a session with explicit transport settings.
    ///
    /// A cookie jar is added for the session client if the config has none;
    /// the command-API client never gets one.
    pub fn with_transport(connection: Connection, transport: &TransportConfig) -> Result<Self, Error> {
        let base_url = connection.base_url();
        // Surface a malformed base before any request is attempted.
        Url::parse(&base_url)?;

        let session_config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let http = session_config.build_client()?;
        let basic_http = transport.clone().without_cookie_jar().build_client()?;
        transport.announce(&base_url);

        Ok(Self {
            connection,
            base_url,
            http,
            basic_http,
            closed: AtomicBool::new(false),
        })
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// `{protocol}://{host}:{port}`.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `true` once logout has succeeded.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub(crate) fn mark_closed(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    /// Full request URL for an API path such as `/api/mo/sys.json`.
    pub fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(Url::parse(&format!("{}{path}", self.base_url))?)
    }

    fn ensure_open(&self, strategy: AuthStrategy) -> Result<(), Error> {
        if strategy == AuthStrategy::Session && self.is_closed() {
            return Err(Error::SessionClosed);
        }
        Ok(())
    }

    // ── Request helpers ──────────────────────────────────────────────

    /// GET an object-model path over the cookie session.
    pub async fn get(&self, path: &str) -> Result<Reply, Error> {
        self.ensure_open(AuthStrategy::Session)?;
        let url = self.url(path)?;
        debug!("GET {}", url);

        let resp = self.http.get(url).send().await.map_err(|e| {
            debug!(path, error = %e, "unable to reach device");
            Error::Transport(e)
        })?;

        Self::read_reply(resp).await
    }

    /// POST a JSON document to an object-model path over the cookie session.
    pub async fn post(&self, path: &str, body: &(impl Serialize + Sync)) -> Result<Reply, Error> {
        self.ensure_open(AuthStrategy::Session)?;
        let url = self.url(path)?;
        debug!("POST {}", url);
        if tracing::enabled!(tracing::Level::TRACE) {
            trace!(body = %serde_json::to_string(body).unwrap_or_default(), "request body");
        }

        let resp = self.http.post(url).json(body).send().await.map_err(|e| {
            debug!(path, error = %e, "unable to reach device");
            Error::Transport(e)
        })?;

        Self::read_reply(resp).await
    }

    /// POST a JSON-RPC batch to the command API with Basic auth.
    ///
    /// Bypasses the session cookie entirely; works whether or not the
    /// object-model session is logged in.
    pub async fn post_json_rpc(
        &self,
        path: &str,
        batch: &(impl Serialize + Sync),
    ) -> Result<Reply, Error> {
        self.ensure_open(AuthStrategy::Basic)?;
        let url = self.url(path)?;
        debug!("POST {} (json-rpc)", url);

        let payload = serde_json::to_vec(batch).map_err(|e| Error::Deserialization {
            message: format!("failed to encode JSON-RPC batch: {e}"),
            body: String::new(),
        })?;
        let credentials = self.connection.credentials();

        let resp = self
            .basic_http
            .post(url)
            .basic_auth(
                &credentials.username,
                Some(credentials.password.expose_secret()),
            )
            .header(CONTENT_TYPE, JSON_RPC_CONTENT_TYPE)
            .body(payload)
            .send()
            .await
            .map_err(|e| {
                debug!(path, error = %e, "unable to reach command API");
                Error::Transport(e)
            })?;

        Self::read_reply(resp).await
    }

    async fn read_reply(resp: reqwest::Response) -> Result<Reply, Error> {
        let status = resp.status();
        let body = resp.text().await.map_err(Error::Transport)?;
        trace!(%status, len = body.len(), "reply");
        Ok(Reply { status, body })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::connection::{Credentials, Protocol};

    fn session() -> DeviceSession {
        let conn = Connection::new(
            "10.0.0.10",
            10180,
            Protocol::Http,
            true,
            Credentials::new("admin", "pw"),
        )
        .unwrap();
        DeviceSession::new(conn).unwrap()
    }

    #[test]
    fn url_joins_base_and_path() {
        let s = session();
        assert_eq!(s.base_url(), "http://10.0.0.10:10180");
        assert_eq!(
            s.url("/api/mo/sys.json").unwrap().as_str(),
            "http://10.0.0.10:10180/api/mo/sys.json"
        );
    }

    #[test]
    fn closed_session_rejects_object_model_calls() {
        let s = session();
        s.mark_closed();
        assert!(matches!(
            s.ensure_open(AuthStrategy::Session),
            Err(Error::SessionClosed)
        ));
        assert!(s.ensure_open(AuthStrategy::Basic).is_ok());
    }

    #[test]
    fn error_for_status_prefers_device_text() {
        let reply = Reply::new(
            StatusCode::BAD_REQUEST,
            r#"{"imdata":[{"error":{"attributes":{"code":"107","text":"bad request"}}}]}"#,
        );
        match reply.error_for_status("create vlan") {
            Err(Error::Api { status, message }) => {
                assert_eq!(status, 400);
                assert_eq!(message, "create vlan failed: bad request");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn error_for_status_passes_success_through() {
        let reply = Reply::new(StatusCode::OK, "{}");
        assert!(reply.error_for_status("anything").is_ok());
    }
}
