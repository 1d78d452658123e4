//! HTTP values exchanged with AnkiConnect, described as plain data.
//!
//! # Design
//! `RemoteClient` builds an `HttpRequest` and parses an `HttpResponse`
//! without touching the network itself; a `Transport` executes the
//! round-trip in between. Keeping the envelope logic free of I/O lets the
//! unit tests and the JSON test vectors exercise it without a live Anki.
//!
//! AnkiConnect accepts every action as a JSON POST to its root URL, so a
//! request carries no method or path of its own.

/// An HTTP POST request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

/// An HTTP response described as plain data.
///
/// Produced by a `Transport` and handed to `RemoteClient::parse_response`.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// A 200 response carrying `body`, the usual shape of an AnkiConnect reply.
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            headers: Vec::new(),
            body: body.into(),
        }
    }
}
