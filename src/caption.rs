use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};

use crate::models::ImageElement;

static FIGCAPTION_SEL: Lazy<Selector> = Lazy::new(|| Selector::parse("figcaption").unwrap());

/// One tier of the caption fallback chain.
pub type CaptionStrategy = fn(&ImageElement<'_>, usize) -> Option<String>;

/// Tiers in priority order. The last one always yields a value.
pub const CAPTION_CHAIN: &[CaptionStrategy] = &[alt_text, figcaption_text, placeholder];

pub fn resolve_caption(image: &ImageElement<'_>, ordinal: usize) -> String {
    CAPTION_CHAIN
        .iter()
        .find_map(|strategy| strategy(image, ordinal))
        .unwrap_or_else(|| placeholder_for(ordinal))
}

pub fn alt_text(image: &ImageElement<'_>, _ordinal: usize) -> Option<String> {
    image.alt().and_then(non_blank)
}

pub fn figcaption_text(image: &ImageElement<'_>, _ordinal: usize) -> Option<String> {
    let container = enclosing_container(image.element)?;
    let figcaption = container.select(&FIGCAPTION_SEL).next()?;
    non_blank(&figcaption.text().collect::<String>())
}

pub fn placeholder(_image: &ImageElement<'_>, ordinal: usize) -> Option<String> {
    Some(placeholder_for(ordinal))
}

pub fn placeholder_for(ordinal: usize) -> String {
    format!("Image_{ordinal}")
}

// Nearest <figure> ancestor, otherwise the direct parent element.
fn enclosing_container(el: ElementRef<'_>) -> Option<ElementRef<'_>> {
    el.ancestors()
        .filter_map(ElementRef::wrap)
        .find(|ancestor| ancestor.value().name() == "figure")
        .or_else(|| el.parent().and_then(ElementRef::wrap))
}

fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
