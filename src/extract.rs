use std::path::PathBuf;

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::{debug, info, warn};
use url::Url;

use crate::caption::resolve_caption;
use crate::config::{NameSource, ScrapeConfig};
use crate::fetch::HttpClient;
use crate::filename::{desired_name_from_caption, desired_name_from_url};
use crate::models::{
    FailedImage, FailureKind, ImageElement, Page, ResolvedImage, RunSummary, SavedImage,
    SkippedImage,
};
use crate::persist::{ensure_directory, save_image};
use crate::resolve::{is_absolute, resolve};

// ── Selectors ────────────────────────────────────────────────────────────────

static IMG_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());

// ── Error types ──────────────────────────────────────────────────────────────

/// Failures that end the run.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("invalid page URL {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("request for {url} failed: {reason}")]
    Request { url: String, reason: String },
    #[error("{url} returned HTTP {status}")]
    Upstream { url: String, status: u16 },
    #[error("{url} did not return HTML (content type {content_type:?})")]
    NotHtml { url: String, content_type: String },
    #[error("could not create {}: {source}", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not build HTTP client: {0}")]
    Client(String),
}

/// Failures that only cost one image.
#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("download of {url} failed: {reason}")]
    Fetch { url: String, reason: String },
    #[error("could not write {}: {source}", .path.display())]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ImageError {
    pub fn kind(&self) -> FailureKind {
        match self {
            ImageError::Fetch { .. } => FailureKind::Fetch,
            ImageError::Persist { .. } => FailureKind::Persist,
        }
    }
}

// ── Discovery result ─────────────────────────────────────────────────────────

/// Every `<img>` on a page, split into usable and skipped references.
#[derive(Debug, Default)]
pub struct Discovery {
    pub discovered: usize,
    pub images: Vec<ResolvedImage>,
    pub skipped: Vec<SkippedImage>,
}

// ── Public API ───────────────────────────────────────────────────────────────

/// Fetch `page_url`, then download every usable image into
/// `config.directory` with a caption sidecar next to each one.
///
/// Only page-level problems are returned as errors. Images that fail are
/// logged and recorded in the summary.
pub async fn scrape_page(
    page_url: &str,
    config: &ScrapeConfig,
) -> Result<RunSummary, ExtractionError> {
    let url = validate_url(page_url)?;
    let client = HttpClient::new(config)?;

    info!(url = %url, "fetching page");
    let page = client.fetch_page(&url).await?;

    let discovery = discover_images(&page);
    info!(
        found = discovery.discovered,
        usable = discovery.images.len(),
        "found images"
    );

    ensure_directory(&config.directory).await?;

    let mut saved = Vec::new();
    let mut failed = Vec::new();

    for image in discovery.images {
        match download_image(&client, config, &image).await {
            Ok(record) => {
                info!(url = %image.url, path = %record.path.display(), "downloaded");
                saved.push(record);
            }
            Err(e) => {
                warn!(url = %image.url, error = %e, "skipping image");
                failed.push(FailedImage {
                    ordinal: image.ordinal,
                    url: image.url.to_string(),
                    kind: e.kind(),
                    message: e.to_string(),
                });
            }
        }
    }

    Ok(RunSummary {
        page_url: page.url.to_string(),
        directory: config.directory.clone(),
        discovered: discovery.discovered,
        saved,
        skipped: discovery.skipped,
        failed,
    })
}

// ── URL validation ───────────────────────────────────────────────────────────

fn validate_url(url: &str) -> Result<Url, ExtractionError> {
    let invalid = |reason: &str| ExtractionError::InvalidUrl {
        url: url.to_string(),
        reason: reason.to_string(),
    };

    let parsed = Url::parse(url.trim()).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid("only http and https URLs can be fetched"));
    }
    if !is_absolute(&parsed) {
        return Err(invalid("URL has no host"));
    }
    Ok(parsed)
}

// ── Discovery ────────────────────────────────────────────────────────────────

/// Walk the page's `<img>` elements in document order and resolve URL and
/// caption for each from the same element.
///
/// The ordinal counts every `<img>`, skipped ones included.
pub fn discover_images(page: &Page) -> Discovery {
    let document = Html::parse_document(&page.html);
    let mut discovery = Discovery::default();

    for (ordinal, el) in document.select(&IMG_SEL).enumerate() {
        discovery.discovered += 1;
        let element = ImageElement::new(el);
        let src = element.src();

        match src.and_then(|s| resolve(&page.url, s)) {
            Some(url) => discovery.images.push(ResolvedImage {
                caption: resolve_caption(&element, ordinal),
                url,
                ordinal,
            }),
            None => {
                debug!(ordinal, src = ?src, "no usable image URL");
                discovery.skipped.push(SkippedImage {
                    ordinal,
                    src: src.map(str::to_string),
                });
            }
        }
    }

    discovery
}

// ── Per-image download ───────────────────────────────────────────────────────

async fn download_image(
    client: &HttpClient,
    config: &ScrapeConfig,
    image: &ResolvedImage,
) -> Result<SavedImage, ImageError> {
    debug!(url = %image.url, caption = %image.caption, "downloading");
    let bytes = client.fetch_image(&image.url).await?;

    let desired_name = match config.name_from {
        NameSource::Url => desired_name_from_url(&image.url),
        NameSource::Caption => desired_name_from_caption(&image.caption),
    };

    let persisted = save_image(&config.directory, &desired_name, bytes, &image.caption).await?;

    Ok(SavedImage {
        ordinal: image.ordinal,
        url: image.url.to_string(),
        caption: image.caption.clone(),
        path: persisted.path,
        caption_path: persisted.caption_path,
        bytes: persisted.bytes,
    })
}
