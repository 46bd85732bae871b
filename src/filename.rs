//! Local file naming: desired names from captions or URLs, and collision-free
//! paths inside the destination directory.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

pub const DEFAULT_EXTENSION: &str = ".jpg";
pub const DEFAULT_STEM: &str = "image";
pub const SIDECAR_SUFFIX: &str = ".txt";
// Byte caps keep `stem_N.ext.txt` under the usual 255-byte name limit.
const MAX_STEM_BYTES: usize = 200;
const MAX_EXT_BYTES: usize = 16;

static UNSAFE_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[/\\:*?"<>|\x00-\x1f\x7f]|\s"#).unwrap());

static UNDERSCORE_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"_{2,}").unwrap());

/// Name taken from the caption: whitespace becomes `_` and the extension is
/// always [`DEFAULT_EXTENSION`].
pub fn desired_name_from_caption(caption: &str) -> String {
    let cleaned = clean_component(caption);
    let stem = truncate_bytes(&cleaned, MAX_STEM_BYTES);
    let stem = if stem.is_empty() { DEFAULT_STEM } else { stem };
    format!("{stem}{DEFAULT_EXTENSION}")
}

/// Name taken from the last path segment of the URL, or `image.jpg` when the
/// path ends in `/` or is otherwise unusable.
pub fn desired_name_from_url(url: &Url) -> String {
    let basename = url
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .map(clean_component)
        .unwrap_or_default();
    if basename.is_empty() {
        return format!("{DEFAULT_STEM}{DEFAULT_EXTENSION}");
    }

    let (stem, ext) = split_name(&basename);
    format!(
        "{}{}",
        truncate_bytes(stem, MAX_STEM_BYTES),
        truncate_bytes(ext, MAX_EXT_BYTES)
    )
}

/// Split into stem and extension. The extension keeps its dot; dots leading
/// the name belong to the stem, so `.hidden` has no extension.
pub fn split_name(name: &str) -> (&str, &str) {
    let leading_dots = name.len() - name.trim_start_matches('.').len();
    match name[leading_dots..].rfind('.') {
        Some(idx) => name.split_at(leading_dots + idx),
        None => (name, ""),
    }
}

/// Pick a path in `directory` that does not exist yet, starting from
/// `desired_name` and trying `stem_1`, `stem_2`, ... on collision.
///
/// A candidate counts as taken when either the image path or its caption
/// sidecar exists, so writing both never replaces an earlier file.
///
/// The existence check and the later write are separate steps, so two
/// processes writing into the same directory can still race. Callers should
/// allocate right before writing and keep to one writer per directory.
pub fn allocate(directory: &Path, desired_name: &str) -> PathBuf {
    let candidate = directory.join(desired_name);
    if is_free(&candidate) {
        return candidate;
    }

    let (stem, ext) = split_name(desired_name);
    let mut counter = 1usize;
    loop {
        let candidate = directory.join(format!("{stem}_{counter}{ext}"));
        if is_free(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

fn is_free(image_path: &Path) -> bool {
    !image_path.exists() && !sidecar_path(image_path).exists()
}

/// Companion caption file: the image path with [`SIDECAR_SUFFIX`] appended.
pub fn sidecar_path(image_path: &Path) -> PathBuf {
    let mut name = OsString::from(image_path.as_os_str());
    name.push(SIDECAR_SUFFIX);
    PathBuf::from(name)
}

fn clean_component(value: &str) -> String {
    let replaced = UNSAFE_CHARS_RE.replace_all(value, "_");
    let collapsed = UNDERSCORE_RUN_RE.replace_all(&replaced, "_");
    collapsed
        .trim_start_matches(|c| c == '_' || c == '.')
        .trim_end_matches('_')
        .to_string()
}

// Longest prefix of at most `max` bytes that ends on a char boundary.
fn truncate_bytes(value: &str, max: usize) -> &str {
    if value.len() <= max {
        return value;
    }
    let mut end = max;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}
