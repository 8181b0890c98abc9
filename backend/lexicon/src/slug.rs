use std::sync::LazyLock;

use regex::Regex;

use crate::error::LexiconError;

static STRIP: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9\s-]").expect("slug strip pattern"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern"));
static HYPHENS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"-+").expect("hyphen pattern"));

/// Lowercase, URL-safe identifier for a display string.
///
/// Underscores count as whitespace so the output alphabet is exactly `[a-z0-9-]`.
/// Only blank input is rejected; input with nothing sluggable (`"!!!"`) yields `""`.
pub fn slugify(raw: &str) -> Result<String, LexiconError> {
    let lowered = raw.to_lowercase().replace('_', " ");
    let trimmed = lowered.trim();

    if trimmed.is_empty() {
        return Err(LexiconError::EmptyName);
    }

    let collapsed = WHITESPACE.replace_all(trimmed, " ");
    let stripped = STRIP.replace_all(&collapsed, "");
    let hyphenated = WHITESPACE.replace_all(stripped.trim(), "-");
    let slug = HYPHENS.replace_all(&hyphenated, "-");

    Ok(slug.trim_matches('-').to_string())
}
