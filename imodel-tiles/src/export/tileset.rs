//! Tileset URL resolution.
//!
//! An export's mesh link points at a blob container and usually carries a
//! SAS query string (`?sv=..&sig=..`) granting read access. The tileset root
//! lives at `<container>/tileset.json`, reachable with the same grant, so the
//! query string is carried over byte for byte: same parameters, same order,
//! nothing re-encoded or dropped.

use std::fmt;

use reqwest::Url;
use thiserror::Error;

/// File name of the tileset root manifest.
pub const TILESET_FILE: &str = "tileset.json";

/// Errors resolving a tileset URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TilesetUrlError {
    /// The mesh link is empty.
    #[error("mesh link is empty")]
    Empty,

    /// The mesh link (or a resource URI) does not form a valid URL.
    #[error("invalid URL '{link}': {reason}")]
    InvalidUrl { link: String, reason: String },

    /// The mesh link is not an http(s) URL.
    #[error("unsupported URL scheme '{scheme}' in '{link}'")]
    UnsupportedScheme { link: String, scheme: String },
}

/// URL of a tileset root, with the access query of its mesh link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TilesetUrl {
    url: String,
}

/// Derives the tileset URL from a mesh link.
///
/// `https://x/y?sig=1` becomes `https://x/y/tileset.json?sig=1`; a link
/// without a query gets no trailing `?`. A `#fragment` is dropped.
pub fn resolve_tileset_url(mesh_link: &str) -> Result<TilesetUrl, TilesetUrlError> {
    let link = mesh_link.trim();
    if link.is_empty() {
        return Err(TilesetUrlError::Empty);
    }

    let without_fragment = link.split_once('#').map_or(link, |(before, _)| before);
    let (base, query) = without_fragment
        .split_once('?')
        .unwrap_or((without_fragment, ""));

    let mut url = String::with_capacity(base.len() + TILESET_FILE.len() + query.len() + 2);
    url.push_str(base);
    url.push('/');
    url.push_str(TILESET_FILE);
    if !query.is_empty() {
        url.push('?');
        url.push_str(query);
    }

    let parsed = Url::parse(&url).map_err(|e| TilesetUrlError::InvalidUrl {
        link: mesh_link.to_string(),
        reason: e.to_string(),
    })?;
    if !is_http(&parsed) {
        return Err(TilesetUrlError::UnsupportedScheme {
            link: mesh_link.to_string(),
            scheme: parsed.scheme().to_string(),
        });
    }

    Ok(TilesetUrl { url })
}

impl TilesetUrl {
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// The raw access query (without `?`), if the mesh link had one.
    pub fn access_query(&self) -> Option<&str> {
        self.url
            .split_once('?')
            .map(|(_, query)| query)
            .filter(|query| !query.is_empty())
    }

    /// Prepares a tile resource URI for fetching.
    ///
    /// Relative URIs are resolved against the tileset URL. For http(s)
    /// targets, every access parameter whose key the target does not already
    /// carry with a non-empty value is appended, raw and in order. Other schemes (`data:`, `blob:`)
    /// are returned untouched.
    pub fn sign_resource(&self, uri: &str) -> Result<String, TilesetUrlError> {
        let base = Url::parse(&self.url).map_err(|e| TilesetUrlError::InvalidUrl {
            link: self.url.clone(),
            reason: e.to_string(),
        })?;
        let mut target = base.join(uri).map_err(|e| TilesetUrlError::InvalidUrl {
            link: uri.to_string(),
            reason: e.to_string(),
        })?;

        if !is_http(&target) {
            return Ok(uri.to_string());
        }
        let Some(access) = self.access_query() else {
            return Ok(target.into());
        };

        let existing = target.query().unwrap_or("").to_string();
        let present: Vec<&str> = query_pairs(&existing)
            .filter(|pair| pair.split_once('=').is_some_and(|(_, value)| !value.is_empty()))
            .map(pair_key)
            .collect();
        let missing: Vec<&str> = query_pairs(access)
            .filter(|pair| !present.contains(&pair_key(pair)))
            .collect();

        if missing.is_empty() {
            return Ok(target.into());
        }

        let mut query = existing.clone();
        for pair in missing {
            if !query.is_empty() {
                query.push('&');
            }
            query.push_str(pair);
        }
        target.set_query(Some(&query));
        Ok(target.into())
    }
}

impl fmt::Display for TilesetUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

impl AsRef<str> for TilesetUrl {
    fn as_ref(&self) -> &str {
        &self.url
    }
}

fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

fn query_pairs(query: &str) -> impl Iterator<Item = &str> {
    query.split('&').filter(|pair| !pair.is_empty())
}

fn pair_key(pair: &str) -> &str {
    pair.split_once('=').map_or(pair, |(key, _)| key)
}
