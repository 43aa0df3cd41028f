//! XML sitemap resolution
//!
//! A sitemap index (`<sitemapindex>`) lists child sitemaps; a sitemap
//! (`<urlset>`) lists pages. Both keep their URLs in `<loc>` elements.
//!
//! Parsing is namespace-aware: whatever namespace the root element resolves
//! to is the one `<loc>` must be in. Extension elements such as
//! `<image:loc>` live in another namespace and are ignored.

use crate::crawler::fetcher::first_line;
use crate::url::sanitize_for_filename;
use crate::{Result, SweepError};
use quick_xml::events::Event;
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;
use reqwest::Client;
use url::Url;

/// Path requested when a sitemap URL names only a site
pub const DEFAULT_SITEMAP_PATH: &str = "/sitemap_index.xml";

/// What a sitemap document lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SitemapKind {
    /// `<sitemapindex>`: locations are child sitemaps
    Index,
    /// `<urlset>`: locations are pages
    UrlSet,
}

/// A URL taken from a sitemap document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapEntry {
    pub url: Url,
    pub kind: SitemapKind,
}

impl SitemapEntry {
    /// Directory name used for this entry's reports, from its file name
    ///
    /// `https://example.com/post-sitemap.xml` becomes `post_sitemap`.
    pub fn dir_name(&self) -> String {
        let file = self
            .url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .filter(|segment| !segment.is_empty())
            .unwrap_or("sitemap");

        let file = file.strip_suffix(".gz").unwrap_or(file);
        let stem = file.strip_suffix(".xml").unwrap_or(file);

        sanitize_for_filename(stem)
    }
}

/// A parsed sitemap document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapDocument {
    pub kind: SitemapKind,

    /// Locations in document order, resolved against the document URL
    pub locations: Vec<Url>,
}

/// Parses a sitemap or sitemap index document
///
/// Relative or unparsable `<loc>` values are resolved against `base`;
/// those that still fail are skipped.
pub fn parse_sitemap(xml: &str, base: &Url) -> std::result::Result<SitemapDocument, String> {
    let mut reader = NsReader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut root: Option<(SitemapKind, Option<Vec<u8>>)> = None;
    let mut current_loc: Option<String> = None;
    let mut raw_locations = Vec::new();

    loop {
        buf.clear();
        let (ns, event) = reader
            .read_resolved_event_into(&mut buf)
            .map_err(|e| format!("invalid XML: {}", e))?;

        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let resolved = namespace_of(&ns)?;
                let local = e.local_name();

                if root.is_none() {
                    let kind = match local.as_ref() {
                        b"sitemapindex" => SitemapKind::Index,
                        b"urlset" => SitemapKind::UrlSet,
                        other => {
                            return Err(format!(
                                "unexpected root element <{}>",
                                String::from_utf8_lossy(other)
                            ))
                        }
                    };
                    tracing::trace!("Sitemap root {:?} in namespace {:?}", kind, resolved);
                    root = Some((kind, resolved));
                } else if local.as_ref() == b"loc"
                    && matches!(event, Event::Start(_))
                    && root.as_ref().map(|(_, root_ns)| root_ns) == Some(&resolved)
                {
                    current_loc = Some(String::new());
                }
            }
            Event::Text(ref t) => {
                if let Some(loc) = current_loc.as_mut() {
                    let text = t.unescape().map_err(|e| e.to_string())?;
                    loc.push_str(&text);
                }
            }
            Event::CData(ref c) => {
                if let Some(loc) = current_loc.as_mut() {
                    loc.push_str(&String::from_utf8_lossy(c));
                }
            }
            Event::End(ref e) => {
                if e.local_name().as_ref() == b"loc" {
                    if let Some(loc) = current_loc.take() {
                        raw_locations.push(loc);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    let (kind, _) = root.ok_or_else(|| "document has no root element".to_string())?;

    let locations = raw_locations
        .iter()
        .filter_map(|loc| {
            let loc = loc.trim();
            if loc.is_empty() {
                return None;
            }
            match base.join(loc) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url),
                _ => {
                    tracing::debug!("Skipping unusable sitemap location: {}", loc);
                    None
                }
            }
        })
        .collect();

    Ok(SitemapDocument { kind, locations })
}

fn namespace_of(ns: &ResolveResult) -> std::result::Result<Option<Vec<u8>>, String> {
    match ns {
        ResolveResult::Bound(namespace) => Ok(Some(namespace.0.to_vec())),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(format!(
            "undeclared namespace prefix '{}'",
            String::from_utf8_lossy(prefix)
        )),
    }
}

/// Completes a sitemap URL that names only a site
///
/// `https://example.com` and `https://example.com/` become
/// `https://example.com/sitemap_index.xml`; anything with a path is kept.
pub fn default_sitemap_url(mut url: Url) -> Url {
    if url.path().is_empty() || url.path() == "/" {
        url.set_path(DEFAULT_SITEMAP_PATH);
    }
    url
}

/// Fetches sitemap documents over HTTP
#[derive(Debug, Clone)]
pub struct SitemapResolver {
    client: Client,
}

impl SitemapResolver {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Resolves a sitemap index into its child sitemaps
    ///
    /// A top-level `<urlset>` resolves to a single entry for the document
    /// itself. Any failure is a [`SweepError::SitemapFetch`].
    pub async fn resolve_index(&self, index_url: &Url) -> Result<Vec<SitemapEntry>> {
        let document = self
            .fetch_document(index_url)
            .await
            .map_err(|message| SweepError::SitemapFetch {
                url: index_url.to_string(),
                message,
            })?;

        let entries = match document.kind {
            SitemapKind::Index => document
                .locations
                .into_iter()
                .map(|url| SitemapEntry {
                    url,
                    kind: SitemapKind::UrlSet,
                })
                .collect(),
            SitemapKind::UrlSet => vec![SitemapEntry {
                url: index_url.clone(),
                kind: SitemapKind::UrlSet,
            }],
        };

        tracing::info!("Sitemap {} lists {} child sitemap(s)", index_url, entries.len());
        Ok(entries)
    }

    /// Resolves a child sitemap into the pages it lists
    ///
    /// Any failure, including finding a nested index, is a
    /// [`SweepError::ChildSitemap`].
    pub async fn resolve_pages(&self, sitemap_url: &Url) -> Result<Vec<Url>> {
        let child_error = |message: String| SweepError::ChildSitemap {
            url: sitemap_url.to_string(),
            message,
        };

        let document = self.fetch_document(sitemap_url).await.map_err(child_error)?;

        match document.kind {
            SitemapKind::UrlSet => {
                tracing::debug!(
                    "Sitemap {} lists {} page(s)",
                    sitemap_url,
                    document.locations.len()
                );
                Ok(document.locations)
            }
            SitemapKind::Index => Err(child_error(
                "nested sitemap index is not supported".to_string(),
            )),
        }
    }

    async fn fetch_document(&self, url: &Url) -> std::result::Result<SitemapDocument, String> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| first_line(&e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP status {}", status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| first_line(&e.to_string()))?;

        parse_sitemap(&body, url)
    }
}
