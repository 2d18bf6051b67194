//! Utility functions and helpers.

pub mod http;

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

/// Absolute http(s) URL, ending at whitespace, a double quote or a backslash.
static URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s"\\]+"#).expect("Invalid URL regex"));

/// Extract the `host:port` pair a URL connects to.
pub fn socket_target(url_str: &str) -> Option<String> {
    let url = Url::parse(url_str).ok()?;
    let host = url.host_str()?;
    let port = url.port_or_known_default()?;
    Some(format!("{host}:{port}"))
}

/// Find the first absolute http(s) URL in a raw response body.
///
/// The URL ends at whitespace, a double quote or a backslash, which is how
/// it appears inside an escaped RPC string.
pub fn extract_first_url(text: &str) -> Option<String> {
    URL_REGEX.find(text).map(|m| m.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_socket_target_uses_default_port() {
        assert_eq!(
            socket_target("https://cas.example.org/"),
            Some("cas.example.org:443".to_string())
        );
        assert_eq!(
            socket_target("http://127.0.0.1:8080/x"),
            Some("127.0.0.1:8080".to_string())
        );
    }

    #[test]
    fn test_extract_first_url_from_rpc_body() {
        let body = r#"//OK[1,["https://ade.example/feed.ics?data=abc","https://second"],0,7]"#;
        assert_eq!(
            extract_first_url(body),
            Some("https://ade.example/feed.ics?data=abc".to_string())
        );
    }

    #[test]
    fn test_extract_first_url_stops_at_backslash() {
        let body = r#"//OK["http://ade.example/jsp/custom/modules/plannings/anonymous_cal.jsp?data=1\x3D"]"#;
        assert_eq!(
            extract_first_url(body),
            Some("http://ade.example/jsp/custom/modules/plannings/anonymous_cal.jsp?data=1".to_string())
        );
    }

    #[test]
    fn test_extract_first_url_none() {
        assert_eq!(extract_first_url("//EX[2,1,\"error\"]"), None);
    }
}
