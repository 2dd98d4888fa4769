//! Host label canonicalization
//!
//! Zone listings may report hosts fully qualified (`www.example.com.` or
//! `www.example.com`) while configuration uses short labels (`www`). Both
//! sides are compared in short form. The apex is the empty string.

/// Strip the owning domain from a host label
///
/// Matching is case-sensitive and suffix-only. Both the trailing-dot and the
/// plain form are handled. A label that is already short comes back unchanged,
/// which makes the function idempotent.
///
/// ```
/// use livedns_core::hostname::normalize_host;
///
/// assert_eq!(normalize_host("www.example.com.", "example.com"), "www");
/// assert_eq!(normalize_host("www.example.com", "example.com"), "www");
/// assert_eq!(normalize_host("example.com.", "example.com"), "");
/// assert_eq!(normalize_host("www", "example.com"), "www");
/// ```
pub fn normalize_host(host: &str, domain: &str) -> String {
    let domain = domain.strip_suffix('.').unwrap_or(domain);
    if domain.is_empty() {
        return host.to_string();
    }

    let unrooted = host.strip_suffix('.').unwrap_or(host);
    if unrooted == domain {
        return String::new();
    }

    match unrooted
        .strip_suffix(domain)
        .and_then(|prefix| prefix.strip_suffix('.'))
    {
        Some(short) if !short.is_empty() => short.to_string(),
        _ => host.to_string(),
    }
}

/// Log-friendly name for a short host: the apex is shown as the domain itself
pub fn display_host<'a>(host: &'a str, domain: &'a str) -> &'a str {
    if host.is_empty() { domain } else { host }
}
