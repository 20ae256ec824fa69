//! Post template mutation.
//!
//! Takes the base post template as a parsed document and rewrites it in
//! place into a standalone post page. Layout is preserved; only the anchored
//! fragments change:
//!
//! ```text
//! <title>                          → "{title} | {site_name}"
//! <h1>                (hero)       → "{title}"
//! img[alt=cover]                   → src = derived image filename
//! img[alt=inline]                  → src = derived image filename
//! div.blog-content.rich-text       → children replaced wholesale:
//!     1. the container's own leading <img>   (preserved subtree)
//!     2. the container's own leading <h2>    (preserved subtree)
//!     3. <div class="post-body"> with the synthesized body grafted inside
//!     4. <p class="post-date">{display date} • By AutoBlog Bot</p>
//! ```
//!
//! The container holds exactly those 4 children after mutation, however
//! large the body markup is.
//!
//! ## Failing Loudly
//!
//! Every anchor is required. A template missing any of them makes
//! [`render_post`] return [`TemplateStructureError`] naming the missing
//! anchor; the caller writes nothing. A malformed document is never
//! silently produced.

use ego_tree::NodeId;
use maud::{PreEscaped, html};
use scraper::Html;
use thiserror::Error;

use crate::content::GeneratedContent;
use crate::dom::{self, Anchor};
use crate::naming::PostIdentity;

/// Byline appended after the display date on every post.
pub const BYLINE: &str = "By AutoBlog Bot";

pub const PAGE_TITLE: Anchor = Anchor {
    name: "page title",
    css: "title",
};
pub const HERO_TITLE: Anchor = Anchor {
    name: "hero title",
    css: "h1",
};
pub const COVER_IMAGE: Anchor = Anchor {
    name: "cover image",
    css: r#"img[alt="Blog cover image"]"#,
};
pub const INLINE_IMAGE: Anchor = Anchor {
    name: "inline content image",
    css: r#"img[alt="Blog inline image"]"#,
};
pub const CONTENT_CONTAINER: Anchor = Anchor {
    name: "content container",
    css: "div.blog-content.rich-text",
};

/// A required template anchor was absent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("template structure invalid: missing {anchor}")]
pub struct TemplateStructureError {
    pub anchor: &'static str,
}

fn require(doc: &Html, anchor: &Anchor) -> Result<NodeId, TemplateStructureError> {
    dom::locate(doc, anchor).ok_or(TemplateStructureError {
        anchor: anchor.name,
    })
}

/// The resolved node handles behind every required anchor, looked up once
/// per document. Resolution *is* validation: a successful resolve means the
/// template has everything a render needs.
struct PostAnchors {
    page_title: NodeId,
    hero_title: NodeId,
    cover_image: NodeId,
    inline_image: NodeId,
    container: NodeId,
    lead_image: NodeId,
    lead_heading: NodeId,
}

impl PostAnchors {
    fn resolve(doc: &Html) -> Result<Self, TemplateStructureError> {
        let container = require(doc, &CONTENT_CONTAINER)?;
        Ok(Self {
            page_title: require(doc, &PAGE_TITLE)?,
            hero_title: require(doc, &HERO_TITLE)?,
            cover_image: require(doc, &COVER_IMAGE)?,
            inline_image: require(doc, &INLINE_IMAGE)?,
            container,
            lead_image: dom::leading_child_element(doc, container, "img").ok_or(
                TemplateStructureError {
                    anchor: "content container lead image",
                },
            )?,
            lead_heading: dom::leading_child_element(doc, container, "h2").ok_or(
                TemplateStructureError {
                    anchor: "content container lead heading",
                },
            )?,
        })
    }
}

/// Validate that a base template carries every anchor [`render_post`] needs.
///
/// Run by the `check` command; [`render_post`] performs the same resolution
/// itself before touching the document.
pub fn validate_template(doc: &Html) -> Result<(), TemplateStructureError> {
    PostAnchors::resolve(doc).map(|_| ())
}

/// Mutate the base template into the post document.
///
/// Mutation is explicit and total: on success the passed document *is* the
/// post page; on error it must be discarded.
pub fn render_post(
    doc: &mut Html,
    content: &GeneratedContent,
    identity: &PostIdentity,
    site_name: &str,
) -> Result<(), TemplateStructureError> {
    let anchors = PostAnchors::resolve(doc)?;

    dom::set_text(
        doc,
        anchors.page_title,
        &format!("{} | {site_name}", content.title),
    );
    dom::set_text(doc, anchors.hero_title, &content.title);
    for (id, anchor) in [
        (anchors.cover_image, &COVER_IMAGE),
        (anchors.inline_image, &INLINE_IMAGE),
    ] {
        if !dom::set_attr(doc, id, "src", &identity.image_filename) {
            return Err(TemplateStructureError {
                anchor: anchor.name,
            });
        }
    }

    // The preserved subtrees survive the wholesale child replacement below.
    dom::clear_children(doc, anchors.container);
    dom::append_existing(doc, anchors.container, anchors.lead_image);
    dom::append_existing(doc, anchors.container, anchors.lead_heading);

    let tail = html! {
        div.post-body { (PreEscaped(&content.body_markup)) }
        p.post-date { (identity.display_date) " • " (BYLINE) }
    }
    .into_string();
    dom::append_html(doc, anchors.container, &tail);

    Ok(())
}
