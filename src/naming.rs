//! Deterministic post naming.
//!
//! Every published post gets its identity — slug, post filename, image
//! filename, display date — from exactly one place: [`derive_identity`].
//! The derivation is a pure function of the post title and the run date, so
//! re-running with the same title on the same day produces the same names.
//!
//! ## Naming Scheme
//!
//! ```text
//! title     "The Future of Rust: What You Need to Know"
//! slug      "the-future-of-rust-what-you-need-to-know"
//! post      "2025-03-01-the-future-of-rust-what-you-need-to-know.html"
//! image     "blog-the-future-of-rust-what-you-need-to-know-2025-03-01.jpg"
//! display   "Mar 1, 2025"
//! ```
//!
//! Two titles that slugify identically on the same day collide. There is no
//! collision detection — the second run overwrites the first.

use chrono::NaiveDate;

/// Stable naming derived from a post title and a run date.
///
/// Filenames embed both slug and ISO date; `display_date` is only ever shown
/// as text in rendered documents and is never parsed back.
#[derive(Debug, Clone, PartialEq)]
pub struct PostIdentity {
    /// Calendar date, `YYYY-MM-DD`.
    pub iso_date: String,
    /// Human-readable short date, e.g. `Mar 1, 2025`.
    pub display_date: String,
    /// URL-safe derivation of the title. May be empty for titles with no
    /// alphanumeric characters — still a valid (degenerate) name.
    pub slug: String,
    /// `blog-{slug}-{iso_date}.jpg`
    pub image_filename: String,
    /// `{iso_date}-{slug}.html`
    pub post_filename: String,
}

/// Derive the full naming identity for a post.
pub fn derive_identity(title: &str, date: NaiveDate) -> PostIdentity {
    let slug = slugify(title);
    let iso_date = date.format("%Y-%m-%d").to_string();
    let display_date = date.format("%b %-d, %Y").to_string();
    let post_filename = format!("{iso_date}-{slug}.html");
    let image_filename = format!("blog-{slug}-{iso_date}.jpg");
    PostIdentity {
        iso_date,
        display_date,
        slug,
        image_filename,
        post_filename,
    }
}

/// Lowercase the title and collapse every maximal run of characters outside
/// `[a-z0-9]` into a single `-`, with no leading or trailing separator.
pub fn slugify(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}
