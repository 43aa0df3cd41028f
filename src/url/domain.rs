use std::fmt;
use url::Url;

/// Top-level labels dropped from a host when naming its report directory
const DROPPED_SUFFIXES: &[&str] = &[
    "com", "br", "net", "org", "info", "io", "gov", "edu", "co", "me", "biz", "mil", "tv", "cc",
];

/// Extracts the domain from a URL
///
/// Returns the lowercase host, or None when the URL has no host.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use linksweep::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// The authority that same-site links must match to be considered in-domain
///
/// Two URLs share a scope when their hosts are equal and their explicit
/// ports are equal. `Url` drops a port that matches the scheme default, so
/// `https://example.com:443/` has no explicit port. The scheme itself is not
/// compared, so `http://` and `https://` links to the same host are both
/// in scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DomainScope {
    host: String,
    port: Option<u16>,
}

impl DomainScope {
    /// Derives the scope from a URL, or None when it has no host
    pub fn from_url(url: &Url) -> Option<Self> {
        let host = extract_domain(url)?;
        Some(Self {
            host,
            port: url.port(),
        })
    }

    /// Returns the lowercase host
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns true if the URL belongs to this scope
    pub fn contains(&self, url: &Url) -> bool {
        match url.host_str() {
            Some(host) => {
                host.eq_ignore_ascii_case(&self.host) && url.port() == self.port
            }
            None => false,
        }
    }

    /// Returns the directory name used for this scope's reports
    pub fn site_dir_name(&self) -> String {
        site_dir_name(&self.to_string())
    }
}

impl fmt::Display for DomainScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.port {
            Some(port) => write!(f, "{}:{}", self.host, port),
            None => write!(f, "{}", self.host),
        }
    }
}

/// Builds a filesystem-safe directory name for a site authority
///
/// Drops a leading `www.` and trailing common top-level labels, then
/// replaces anything outside `[A-Za-z0-9]` with `_`.
pub fn site_dir_name(authority: &str) -> String {
    let authority = authority.to_lowercase();
    let authority = authority.strip_prefix("www.").unwrap_or(&authority);

    let (host, port) = match authority.rsplit_once(':') {
        Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) => (host, Some(port)),
        _ => (authority, None),
    };

    let mut labels: Vec<&str> = host.split('.').collect();
    let is_ip = labels.iter().all(|l| l.chars().all(|c| c.is_ascii_digit()));
    if !is_ip {
        while labels.len() > 1 && labels.last().is_some_and(|l| DROPPED_SUFFIXES.contains(l)) {
            labels.pop();
        }
    }

    let mut name = labels.join(".");
    if let Some(port) = port {
        name.push(':');
        name.push_str(port);
    }

    sanitize_for_filename(&name)
}

/// Replaces every character outside `[A-Za-z0-9]` with `_`
pub fn sanitize_for_filename(value: &str) -> String {
    value
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
