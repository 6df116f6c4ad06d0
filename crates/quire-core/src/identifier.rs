//! DOI and article slug generation
//!
//! DOI slugs have the shape `<prefix>/<code>.<year>.<sequence>` where the
//! sequence is a per-year monotonic counter. Article slugs are the
//! URL-safe form of the DOI concatenated with a slugified title, made
//! unique by probing with numeric suffixes.

use crate::error::{QuireError, Result};

/// Maximum suffix probes before article slug generation gives up
pub const MAX_SLUG_ATTEMPTS: u32 = 50;

/// Format a DOI slug for the given namespace and sequence number
pub fn doi_slug(prefix: &str, journal_code: &str, year: i32, sequence: u32) -> String {
    format!("{}/{}.{}.{}", prefix, journal_code, year, sequence)
}

/// Lowercase a title and collapse non-alphanumeric runs to single hyphens
pub fn slugify(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_hyphen = true;
    for c in text.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            last_hyphen = false;
        } else if !last_hyphen {
            out.push('-');
            last_hyphen = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}

/// Build the base article slug from a DOI slug and the manuscript title.
///
/// Path separators and dots in the DOI become hyphens so the result is a
/// single URL path segment.
pub fn article_slug_base(doi: &str, title: &str) -> String {
    let doi_part: String = doi
        .chars()
        .map(|c| if c == '/' || c == '.' { '-' } else { c })
        .collect();
    let title_part = slugify(title);
    if title_part.is_empty() {
        doi_part
    } else {
        format!("{}-{}", doi_part, title_part)
    }
}

/// Find a unique article slug by probing `base`, then `base-1`, `base-2`,
/// … up to [`MAX_SLUG_ATTEMPTS`] suffixes.
///
/// `exists` reports whether a candidate is already taken. Exhausting the
/// attempt budget is a hard error for the publish operation, never a
/// silent truncation.
pub fn unique_article_slug<F>(base: &str, mut exists: F) -> Result<String>
where
    F: FnMut(&str) -> Result<bool>,
{
    if !exists(base)? {
        return Ok(base.to_string());
    }
    for suffix in 1..=MAX_SLUG_ATTEMPTS {
        let candidate = format!("{}-{}", base, suffix);
        if !exists(&candidate)? {
            return Ok(candidate);
        }
    }
    Err(QuireError::Collision(format!(
        "could not find a unique article slug for '{}' after {} attempts",
        base, MAX_SLUG_ATTEMPTS
    )))
}
