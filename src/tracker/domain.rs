/// Label used when a tracked url has no readable host.
pub const UNKNOWN_DOMAIN: &str = "unknown";

pub const DEFAULT_TRACKED_DOMAINS: [&str; 3] = ["facebook.com", "twitter.com", "instagram.com"];

/// Allow-list of domains whose time is tracked.
///
/// Matching is plain substring containment over the whole url, so
/// `https://evil-facebook.com.attacker.net` counts as `facebook.com`. This is deliberately kept
/// permissive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedDomains {
    domains: Vec<String>,
}

impl Default for TrackedDomains {
    fn default() -> Self {
        Self::new(DEFAULT_TRACKED_DOMAINS)
    }
}

impl TrackedDomains {
    pub fn new(domains: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            domains: domains.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_tracked(&self, url: &str) -> bool {
        self.domains.iter().any(|domain| url.contains(domain.as_str()))
    }
}

/// Extracts the host component of an http(s) url. Port and credentials stay attached, the same
/// way the browser reports them. Anything without an `http://` or `https://` prefix, or with an
/// empty host, yields [UNKNOWN_DOMAIN].
pub fn extract_domain(url: &str) -> &str {
    let Some(rest) = strip_http_scheme(url) else {
        return UNKNOWN_DOMAIN;
    };
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    match &rest[..end] {
        "" => UNKNOWN_DOMAIN,
        host => host,
    }
}

fn strip_http_scheme(url: &str) -> Option<&str> {
    ["https://", "http://"].into_iter().find_map(|scheme| {
        url.get(..scheme.len())
            .filter(|prefix| prefix.eq_ignore_ascii_case(scheme))
            .map(|_| &url[scheme.len()..])
    })
}
