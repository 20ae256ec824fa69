//! Index listing mutation.
//!
//! The index document carries a grid of entry cards, newest first. Each run
//! builds one self-contained [`ListingEntry`] fragment (cover image, linked
//! title, summary, date) and grafts it in as the grid's *first* child. The
//! feed is reverse-chronological purely by insertion order — no stored
//! timestamps are compared, and existing entries are never touched.
//!
//! A document without the grid signature is a recoverable condition: the
//! caller logs [`MissingContainerError`] and skips the index update. The
//! post itself still publishes.

use maud::html;
use scraper::Html;
use thiserror::Error;

use crate::content::GeneratedContent;
use crate::dom::{self, Anchor};
use crate::naming::PostIdentity;

pub const LISTING_GRID: Anchor = Anchor {
    name: "listing grid",
    css: "div.blog-grid.collection-list",
};

/// The index document does not contain the listing grid.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("listing grid not found in index document")]
pub struct MissingContainerError;

/// A rendered entry card, detached from any document. Ownership of its
/// position belongs to the grid it gets inserted into.
#[derive(Debug, Clone)]
pub struct ListingEntry {
    markup: String,
}

impl ListingEntry {
    /// Build the entry fragment for a freshly synthesized post.
    pub fn new(content: &GeneratedContent, identity: &PostIdentity) -> Self {
        let markup = html! {
            div.blog-item role="listitem" {
                a.blog-item-link href=(identity.post_filename) {
                    img.blog-item-image
                        src=(identity.image_filename)
                        alt=(content.title)
                        loading="lazy";
                }
                h3.blog-item-title { (content.title) }
                p.blog-item-summary { (content.meta_description) }
                p.blog-item-date { (identity.display_date) }
            }
        }
        .into_string();
        Self { markup }
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }
}

/// Insert the entry as the first child of the listing grid.
///
/// On [`MissingContainerError`] the document is left untouched.
pub fn insert_entry(doc: &mut Html, entry: &ListingEntry) -> Result<(), MissingContainerError> {
    let grid = dom::locate(doc, &LISTING_GRID).ok_or(MissingContainerError)?;
    dom::prepend_html(doc, grid, entry.markup());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::naming::derive_identity;
    use chrono::NaiveDate;
    use scraper::Selector;

    const INDEX: &str = r#"<!DOCTYPE html>
<html>
<head><title>AutoBlog</title></head>
<body>
  <div class="blog-grid collection-list" role="list">
  </div>
</body>
</html>"#;

    fn entry(title: &str) -> ListingEntry {
        let content = GeneratedContent {
            title: title.to_string(),
            body_markup: "<p>body</p>".to_string(),
            meta_description: format!("About {title}."),
        };
        let identity = derive_identity(title, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        ListingEntry::new(&content, &identity)
    }

    fn grid_titles(doc: &Html) -> Vec<String> {
        let selector = Selector::parse("div.blog-grid h3.blog-item-title").unwrap();
        // Document-level select yields allocation order, which diverges from
        // document order once nodes are grafted in. Walk from the root.
        doc.root_element()
            .select(&selector)
            .map(|el| el.text().collect::<String>())
            .collect()
    }

    #[test]
    fn entry_fragment_is_self_contained() {
        let e = entry("First Post");
        assert!(e.markup().contains(r#"href="2025-03-01-first-post.html""#));
        assert!(e.markup().contains(r#"src="blog-first-post-2025-03-01.jpg""#));
        assert!(e.markup().contains("First Post"));
        assert!(e.markup().contains("Mar 1, 2025"));
    }

    #[test]
    fn insert_into_empty_grid() {
        let mut doc = Html::parse_document(INDEX);
        insert_entry(&mut doc, &entry("Only Post")).unwrap();
        assert_eq!(grid_titles(&doc), vec!["Only Post"]);
    }

    #[test]
    fn newest_entry_comes_first() {
        let mut doc = Html::parse_document(INDEX);
        insert_entry(&mut doc, &entry("E1")).unwrap();
        insert_entry(&mut doc, &entry("E2")).unwrap();
        assert_eq!(grid_titles(&doc), vec!["E2", "E1"]);

        // The serialized markup agrees with the traversal.
        let out = dom::serialize(&doc);
        assert!(out.find("E2").unwrap() < out.find("E1").unwrap());
    }

    #[test]
    fn grafted_entries_traverse_in_document_order() {
        let mut doc = Html::parse_document(INDEX);
        insert_entry(&mut doc, &entry("E1")).unwrap();
        insert_entry(&mut doc, &entry("E2")).unwrap();
        insert_entry(&mut doc, &entry("E3")).unwrap();

        // Both views of the mutated tree must agree: tree-order traversal
        // and a clean re-parse of the serialized output.
        let reparsed = Html::parse_document(&dom::serialize(&doc));
        assert_eq!(grid_titles(&doc), grid_titles(&reparsed));
        assert_eq!(grid_titles(&doc), vec!["E3", "E2", "E1"]);
    }

    #[test]
    fn existing_entries_are_undisturbed() {
        let seeded = INDEX.replace(
            r#"<div class="blog-grid collection-list" role="list">"#,
            r#"<div class="blog-grid collection-list" role="list"><div class="blog-item"><h3 class="blog-item-title">Old</h3></div>"#,
        );
        let mut doc = Html::parse_document(&seeded);
        insert_entry(&mut doc, &entry("New")).unwrap();
        assert_eq!(grid_titles(&doc), vec!["New", "Old"]);
    }

    #[test]
    fn missing_grid_leaves_document_unchanged() {
        let no_grid = INDEX.replace("blog-grid collection-list", "plain-list");
        let mut doc = Html::parse_document(&no_grid);
        let before = dom::serialize(&doc);
        assert_eq!(
            insert_entry(&mut doc, &entry("X")),
            Err(MissingContainerError)
        );
        assert_eq!(dom::serialize(&doc), before);
    }
}
