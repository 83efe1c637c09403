//! Page metadata fetching for URL-addressed contents.
//!
//! Fetches an arbitrary web page, follows redirects and extracts a title and
//! preview image from Open Graph tags, falling back to the document title.
//! Extracted values are sanitized to lengths that fit the contents table.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, warn};
use unicode_normalization::UnicodeNormalization;
use url::Url;

use crate::{AppError, AppResult, config::MetaFetchConfig};

/// User agent sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Reviewboard/0.1";

/// Title used when a page has neither an Open Graph title nor a `<title>`.
pub const UNTITLED: &str = "untitled";

/// Maximum title length in code points before truncation.
pub const MAX_TITLE_CHARS: usize = 512;

/// Maximum accepted image URL length in code points.
pub const MAX_IMAGE_URL_CHARS: usize = 4096;

const ELLIPSIS: char = '…';

/// Metadata extracted from a fetched page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    /// URL after following redirects.
    pub final_url: String,
    /// Sanitized page title, never empty.
    pub title: String,
    /// Preview image URL, empty when the page has none or it was too long.
    pub image_url: String,
}

/// Page metadata fetcher configuration.
#[derive(Debug, Clone)]
pub struct PageMetaConfig {
    /// User agent string.
    pub user_agent: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Maximum number of body bytes read from the response.
    pub max_body_bytes: usize,
}

impl Default for PageMetaConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 15,
            max_body_bytes: 1024 * 1024, // 1MB
        }
    }
}

impl From<&MetaFetchConfig> for PageMetaConfig {
    fn from(config: &MetaFetchConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            timeout_secs: config.timeout_secs,
            max_body_bytes: config.max_body_bytes,
        }
    }
}

static META_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<meta\b[^>]*>").expect("valid meta tag regex"));

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)([a-z][a-z0-9_:.-]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#)
        .expect("valid attribute regex")
});

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid title regex"));

/// Fetches and sanitizes page metadata.
#[derive(Clone)]
pub struct PageMetaFetcher {
    client: Client,
    config: PageMetaConfig,
}

impl PageMetaFetcher {
    /// Create a fetcher with its own HTTP client.
    pub fn new(config: PageMetaConfig) -> AppResult<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    /// Fetch `raw_url` and extract its metadata.
    ///
    /// Transport failures, timeouts and non-success statuses all surface as
    /// [`AppError::MetadataFetchFailed`]; no partial result is returned.
    pub async fn fetch(&self, raw_url: &str) -> AppResult<PageMeta> {
        let url = normalize_url(raw_url)?;

        let mut response = self.client.get(url.clone()).send().await.map_err(|e| {
            warn!(url = %url, error = %e, "Page fetch failed");
            AppError::MetadataFetchFailed(format!("{url}: {e}"))
        })?;

        let final_url = response.url().clone();
        let status = response.status();
        if !status.is_success() {
            debug!(url = %url, final_url = %final_url, status = %status, "Page returned non-success status");
            return Err(AppError::MetadataFetchFailed(format!(
                "{final_url} returned {status}"
            )));
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| {
            warn!(url = %final_url, error = %e, "Failed to read page body");
            AppError::MetadataFetchFailed(format!("{final_url}: {e}"))
        })? {
            let remaining = self.config.max_body_bytes.saturating_sub(body.len());
            body.extend_from_slice(&chunk[..chunk.len().min(remaining)]);
            if body.len() >= self.config.max_body_bytes {
                break;
            }
        }
        let html = String::from_utf8_lossy(&body);

        let title = extract_title(&html).unwrap_or_else(|| UNTITLED.to_string());

        let image_url = extract_image(&html, &final_url)
            .map(|raw| sanitize_image_url(&raw))
            .unwrap_or_default();

        debug!(url = %url, final_url = %final_url, title = %title, "Fetched page metadata");

        Ok(PageMeta {
            final_url: final_url.to_string(),
            title,
            image_url,
        })
    }
}

/// Trim the input and prepend `https://` when no scheme is given.
pub fn normalize_url(raw: &str) -> AppResult<Url> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(AppError::MetadataFetchFailed("URL is empty".to_string()));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };

    let url = Url::parse(&candidate)
        .map_err(|e| AppError::MetadataFetchFailed(format!("{trimmed}: {e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AppError::MetadataFetchFailed(format!(
            "unsupported scheme: {other}"
        ))),
    }
}

/// Normalize a raw title for storage.
///
/// Applies canonical composition, drops control characters other than
/// newline, carriage return and tab, trims, and truncates to
/// [`MAX_TITLE_CHARS`] code points with a trailing ellipsis.
#[must_use]
pub fn sanitize_title(raw: &str) -> String {
    let cleaned: String = raw
        .nfc()
        .filter(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'))
        .collect();
    let cleaned = cleaned.trim();

    if cleaned.chars().count() > MAX_TITLE_CHARS {
        let mut truncated: String = cleaned.chars().take(MAX_TITLE_CHARS).collect();
        truncated.push(ELLIPSIS);
        truncated
    } else {
        cleaned.to_string()
    }
}

/// Trim an image URL, discarding it entirely if it is too long.
///
/// A truncated URL would point at a broken asset, so an over-long value
/// becomes the empty string instead.
#[must_use]
pub fn sanitize_image_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.chars().count() <= MAX_IMAGE_URL_CHARS {
        trimmed.to_string()
    } else {
        String::new()
    }
}

/// Content of the first `<meta property=...>` tag with a non-blank value.
fn meta_property(html: &str, property: &str) -> Option<String> {
    META_TAG_RE.find_iter(html).find_map(|tag| {
        let mut matches_property = false;
        let mut content = None;

        for cap in ATTR_RE.captures_iter(tag.as_str()) {
            let name = cap.get(1).map_or("", |m| m.as_str());
            let value = cap
                .get(2)
                .or_else(|| cap.get(3))
                .or_else(|| cap.get(4))
                .map_or("", |m| m.as_str());

            if name.eq_ignore_ascii_case("property") && value.eq_ignore_ascii_case(property) {
                matches_property = true;
            } else if name.eq_ignore_ascii_case("content") {
                content = Some(value);
            }
        }

        content
            .filter(|_| matches_property)
            .map(decode_html_entities)
            .filter(|c| !c.trim().is_empty())
    })
}

/// Extract the sanitized page title: `og:title`, then `<title>`.
///
/// A candidate that sanitizes to nothing counts as missing.
fn extract_title(html: &str) -> Option<String> {
    let usable = |raw: String| Some(sanitize_title(&raw)).filter(|t| !t.is_empty());

    meta_property(html, "og:title")
        .and_then(usable)
        .or_else(|| {
            TITLE_RE
                .captures(html)
                .and_then(|cap| cap.get(1))
                .map(|m| decode_html_entities(m.as_str()))
                .and_then(usable)
        })
}

/// Extract the `og:image` URL, resolved against the page URL.
fn extract_image(html: &str, base_url: &Url) -> Option<String> {
    let raw = meta_property(html, "og:image")?;
    base_url.join(raw.trim()).ok().map(|u| u.to_string())
}

/// Decode common HTML entities.
fn decode_html_entities(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&apos;", "'")
        .replace("&#x2F;", "/")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
