//! libcurl-backed transport.

use std::str;
use std::time::Duration;

use super::{parse, PostRequest, RawReply, Transport};

/// Blocking POST through libcurl. Call from `spawn_blocking` if used from async code.
#[derive(Debug, Clone)]
pub struct CurlTransport {
    pub connect_timeout: Duration,
    pub timeout: Duration,
}

impl Default for CurlTransport {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            timeout: Duration::from_secs(30),
        }
    }
}

impl CurlTransport {
    pub fn new(connect_timeout: Duration, timeout: Duration) -> Self {
        Self {
            connect_timeout,
            timeout,
        }
    }
}

impl Transport for CurlTransport {
    type Error = curl::Error;

    fn post(&self, request: &PostRequest) -> Result<RawReply, curl::Error> {
        let mut header_lines: Vec<String> = Vec::new();
        let mut body: Vec<u8> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(&request.url)?;
        easy.post(true)?;
        easy.post_fields_copy(request.body.as_bytes())?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;

        let mut list = curl::easy::List::new();
        list.append(&format!("Content-Type: {}", request.content_type))?;
        list.append(&format!("Authorization: key={}", request.api_key))?;
        // Keep libcurl from sending `Expect: 100-continue` on larger bodies.
        list.append("Expect:")?;
        easy.http_headers(list)?;

        {
            let mut transfer = easy.transfer();
            transfer.header_function(|data| {
                if let Ok(s) = str::from_utf8(data) {
                    header_lines.push(s.trim_end().to_string());
                }
                true
            })?;
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let status = easy.response_code()?;
        tracing::debug!(url = %request.url, status, bytes = body.len(), "gateway replied");

        Ok(RawReply {
            status,
            headers: parse::parse_header_lines(&header_lines),
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}
