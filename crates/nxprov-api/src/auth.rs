/// Which authentication mechanism a request rides on.
///
/// Marker enum (no data) -- the credentials live in
/// [`Connection`](crate::Connection). The switch exposes two APIs with
/// different auth: the object model trusts the `APIC-cookie` set by
/// `aaaLogin`, while the JSON-RPC command API wants HTTP Basic on every
/// request. Each strategy is served by its own `reqwest::Client` so the two
/// never leak into each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStrategy {
    /// Cookie-based session established by `aaaLogin`.
    Session,
    /// HTTP Basic credentials attached to each request.
    Basic,
}
