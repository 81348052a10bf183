//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are described as plain data. `TranslationsClient`
//! builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network itself; a `Transport` (or the host, when driving the
//! `build_*` / `parse_response` pair directly) performs the round-trip.
//!
//! All fields use owned types (`String`, `Vec`) so values can be queued,
//! recorded and replayed in tests without lifetime concerns.

/// HTTP method for a request. Only the verbs the translations API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Put,
    Patch,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
        }
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// First value of the header `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// An HTTP response described as plain data.
///
/// Non-2xx statuses are still responses: mapping them onto the error
/// taxonomy is the client's job, not the transport's.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}
