//! Parse raw HTTP response header lines.

/// Split collected header lines into `(name, value)` pairs.
///
/// Status lines and blank separators are skipped. When the response went
/// through an interim `100 Continue`, only the headers after the last
/// status line are kept.
pub(crate) fn parse_header_lines(lines: &[String]) -> Vec<(String, String)> {
    let mut headers = Vec::new();
    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.starts_with("HTTP/") {
            headers.clear();
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_string(), value.trim().to_string()));
        }
    }
    headers
}

/// `Retry-After` as delta-seconds. HTTP-dates and values below 1 are ignored.
pub(crate) fn parse_retry_after(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok().filter(|secs| *secs >= 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_lines_into_pairs() {
        let lines = [
            "HTTP/1.1 200 OK".to_string(),
            "Content-Type: application/json; charset=UTF-8".to_string(),
            "Retry-After: 30".to_string(),
            "".to_string(),
        ];
        let headers = parse_header_lines(&lines);
        assert_eq!(
            headers,
            vec![
                (
                    "Content-Type".to_string(),
                    "application/json; charset=UTF-8".to_string()
                ),
                ("Retry-After".to_string(), "30".to_string()),
            ]
        );
    }

    #[test]
    fn interim_response_headers_dropped() {
        let lines = [
            "HTTP/1.1 100 Continue".to_string(),
            "X-Interim: 1".to_string(),
            "HTTP/1.1 503 Service Unavailable".to_string(),
            "Retry-After: 5".to_string(),
        ];
        let headers = parse_header_lines(&lines);
        assert_eq!(headers, vec![("Retry-After".to_string(), "5".to_string())]);
    }

    #[test]
    fn retry_after_values() {
        assert_eq!(parse_retry_after(" 10 "), Some(10));
        assert_eq!(parse_retry_after("0"), None);
        assert_eq!(parse_retry_after("-3"), None);
        assert_eq!(parse_retry_after("1.5"), None);
    }
}
