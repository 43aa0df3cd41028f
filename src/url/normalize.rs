use crate::{UrlError, UrlResult};
use url::Url;

/// Parses a user-supplied start URL
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace
/// 2. Prefix `https://` when no `http://` or `https://` scheme is given
/// 3. Parse; reject anything that is not HTTP(S) or has no host
/// 4. Remove the fragment
///
/// # Examples
///
/// ```
/// use linksweep::url::normalize_start_url;
///
/// let url = normalize_start_url("example.com").unwrap();
/// assert_eq!(url.as_str(), "https://example.com/");
/// ```
pub fn normalize_start_url(input: &str) -> UrlResult<Url> {
    let input = input.trim();
    if input.is_empty() {
        return Err(UrlError::Parse("empty URL".to_string()));
    }

    let lowered = input.to_ascii_lowercase();
    let candidate = if lowered.starts_with("http://") || lowered.starts_with("https://") {
        input.to_string()
    } else if let Some((scheme, _)) = input.split_once("://") {
        return Err(UrlError::InvalidScheme(format!(
            "Only HTTP and HTTPS schemes are supported, got: {}",
            scheme
        )));
    } else {
        format!("https://{}", input)
    };

    let mut url = Url::parse(&candidate).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingDomain);
    }

    url.set_fragment(None);
    Ok(url)
}

/// Canonicalizes a resolved link for de-duplication and verification
///
/// Only the fragment is removed: it is never sent to the server, so links
/// differing only in their fragment verify identically.
pub fn normalize_link(mut url: Url) -> Url {
    url.set_fragment(None);
    url
}
