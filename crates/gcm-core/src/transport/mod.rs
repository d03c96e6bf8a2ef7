//! HTTP POST to the gateway.
//!
//! The core never performs I/O itself; [`GcmClient`](crate::client::GcmClient)
//! goes through a [`Transport`]. [`CurlTransport`] is the libcurl-backed
//! default. Network failures come back as the transport's own error type.

mod http;
mod parse;

pub use http::CurlTransport;

/// One gateway request.
#[derive(Clone)]
pub struct PostRequest {
    pub url: String,
    pub api_key: String,
    pub content_type: &'static str,
    pub body: String,
}

impl std::fmt::Debug for PostRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostRequest")
            .field("url", &self.url)
            .field("content_type", &self.content_type)
            .field("body_len", &self.body.len())
            .finish()
    }
}

/// Raw gateway reply: status, headers, body text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawReply {
    pub status: u32,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RawReply {
    pub fn new(status: u32, body: impl Into<String>) -> Self {
        RawReply {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// First header value with the given name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// `Retry-After` in whole seconds, if present and at least 1.
    pub fn retry_after(&self) -> Option<u64> {
        self.header("Retry-After")
            .and_then(parse::parse_retry_after)
    }
}

/// Something that can POST a request to the gateway.
pub trait Transport {
    type Error: std::error::Error + 'static;

    fn post(&self, request: &PostRequest) -> Result<RawReply, Self::Error>;
}

impl<T: Transport + ?Sized> Transport for &T {
    type Error = T::Error;

    fn post(&self, request: &PostRequest) -> Result<RawReply, Self::Error> {
        (**self).post(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_is_case_insensitive() {
        let reply = RawReply::new(200, "").with_header("retry-after", "120");
        assert_eq!(reply.header("Retry-After"), Some("120"));
        assert_eq!(reply.retry_after(), Some(120));
    }

    #[test]
    fn retry_after_absent_or_unusable() {
        assert_eq!(RawReply::new(503, "").retry_after(), None);
        let zero = RawReply::new(503, "").with_header("Retry-After", "0");
        assert_eq!(zero.retry_after(), None);
        let date = RawReply::new(503, "").with_header("Retry-After", "Wed, 21 Oct 2015 07:28:00 GMT");
        assert_eq!(date.retry_after(), None);
    }

    #[test]
    fn debug_hides_api_key() {
        let req = PostRequest {
            url: "https://gw.test/send".into(),
            api_key: "secret".into(),
            content_type: "application/json",
            body: "{}".into(),
        };
        assert!(!format!("{req:?}").contains("secret"));
    }
}
