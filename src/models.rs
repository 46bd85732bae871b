use std::path::PathBuf;

use scraper::ElementRef;
use serde::Serialize;
use url::Url;

/// A fetched page: the HTML text and the URL it was served from.
#[derive(Debug)]
pub struct Page {
    pub url: Url,
    pub html: String,
}

/// One `<img>` found in a parsed document.
#[derive(Debug, Clone, Copy)]
pub struct ImageElement<'a> {
    pub element: ElementRef<'a>,
}

impl<'a> ImageElement<'a> {
    pub fn new(element: ElementRef<'a>) -> Self {
        Self { element }
    }

    /// Raw image reference. `data-src` only stands in when `src` is missing
    /// altogether; an empty `src` is kept as-is.
    pub fn src(&self) -> Option<&'a str> {
        let v = self.element.value();
        v.attr("src").or_else(|| v.attr("data-src"))
    }

    pub fn alt(&self) -> Option<&'a str> {
        self.element.value().attr("alt")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    pub url: Url,
    pub caption: String,
    pub ordinal: usize,
}

#[derive(Debug)]
pub struct DownloadResult {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Serialize, Clone)]
pub struct SavedImage {
    pub ordinal: usize,
    pub url: String,
    pub caption: String,
    pub path: PathBuf,
    pub caption_path: PathBuf,
    pub bytes: usize,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct SkippedImage {
    pub ordinal: usize,
    pub src: Option<String>,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Fetch,
    Persist,
}

#[derive(Debug, Serialize, Clone)]
pub struct FailedImage {
    pub ordinal: usize,
    pub url: String,
    pub kind: FailureKind,
    pub message: String,
}

/// What one run did, image by image.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub page_url: String,
    pub directory: PathBuf,
    pub discovered: usize,
    pub saved: Vec<SavedImage>,
    pub skipped: Vec<SkippedImage>,
    pub failed: Vec<FailedImage>,
}

impl RunSummary {
    pub fn downloaded(&self) -> usize {
        self.saved.len()
    }
}
