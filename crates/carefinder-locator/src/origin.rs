//! Secure-context check for device geolocation.
//!
//! Browsers only expose geolocation to secure contexts: `https` pages and
//! pages served from the local machine during development.

use std::net::IpAddr;

use reqwest::Url;

/// Returns `true` when `origin` is `https`, or `http` on a loopback host
/// (`localhost`, `*.localhost`, `127.0.0.0/8`, `::1`).
///
/// Unparseable origins are treated as insecure.
#[must_use]
pub fn is_secure_origin(origin: &str) -> bool {
    let Ok(url) = Url::parse(origin.trim()) else {
        tracing::debug!(origin, "origin is not a valid URL; treating as insecure");
        return false;
    };

    match url.scheme() {
        "https" => true,
        "http" => url.host_str().is_some_and(is_loopback_host),
        _ => false,
    }
}

fn is_loopback_host(host: &str) -> bool {
    // IPv6 hosts come back bracketed, e.g. `[::1]`.
    let bare = host.trim_start_matches('[').trim_end_matches(']');
    if let Ok(ip) = bare.parse::<IpAddr>() {
        return ip.is_loopback();
    }
    let domain = bare.to_ascii_lowercase();
    domain == "localhost" || domain.ends_with(".localhost")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn https_is_secure() {
        assert!(is_secure_origin("https://care.example.org"));
        assert!(is_secure_origin("https://203.0.113.7:8443"));
    }

    #[test]
    fn local_development_hosts_are_secure() {
        assert!(is_secure_origin("http://localhost:5173"));
        assert!(is_secure_origin("http://LOCALHOST"));
        assert!(is_secure_origin("http://app.localhost:3000"));
        assert!(is_secure_origin("http://127.0.0.1:8080"));
        assert!(is_secure_origin("http://127.8.9.10"));
        assert!(is_secure_origin("http://[::1]:5173"));
    }

    #[test]
    fn plain_http_on_public_host_is_insecure() {
        assert!(!is_secure_origin("http://care.example.org"));
        assert!(!is_secure_origin("http://192.168.1.20:5173"));
        assert!(!is_secure_origin("http://localhost.example.org"));
    }

    #[test]
    fn other_schemes_and_garbage_are_insecure() {
        assert!(!is_secure_origin("ftp://localhost"));
        assert!(!is_secure_origin("file:///tmp/index.html"));
        assert!(!is_secure_origin("not an origin"));
        assert!(!is_secure_origin(""));
    }
}
