use url::Url;

const DATA_SCHEME: &str = "data:";

/// Turn a raw `src` value into an absolute image URL.
///
/// Empty references and inline `data:` images yield `None`, as does any
/// join result without both a scheme and a host (`javascript:`, `mailto:`).
pub fn resolve(base_url: &Url, candidate: &str) -> Option<Url> {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return None;
    }
    if candidate
        .get(..DATA_SCHEME.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(DATA_SCHEME))
    {
        return None;
    }

    let joined = base_url.join(candidate).ok()?;
    is_absolute(&joined).then_some(joined)
}

pub fn is_absolute(url: &Url) -> bool {
    !url.scheme().is_empty() && url.host_str().is_some_and(|h| !h.is_empty())
}
