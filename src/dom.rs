//! HTML document surgery.
//!
//! Wraps `scraper`'s parsed tree with the small set of mutations the
//! pipeline needs: locate a node by a stable CSS signature, rewrite its text
//! or an attribute, clear its children, and graft freshly parsed fragments
//! into it.
//!
//! ## Anchor Contract
//!
//! Template nodes are never found ad hoc. Each required location is a named
//! [`Anchor`] — a CSS signature plus a human-readable name — and lookups
//! return `Option<NodeId>` so callers decide whether absence is fatal
//! ([`crate::render`]) or recoverable ([`crate::listing`]). A lookup can
//! never silently yield a node that is then blindly mutated.
//!
//! ## Node IDs
//!
//! All mutation goes through `ego_tree::NodeId` handles captured from
//! selector matches. IDs stay valid across detach/re-attach, which is what
//! lets the content rewrite preserve existing subtrees while replacing the
//! rest of a container.

use ego_tree::{NodeId, NodeRef};
use scraper::node::Node;
use scraper::{Html, Selector};

/// A named structural location in a document.
///
/// `css` is a fixed signature (tag / attribute / class set); `name` is what
/// error messages call the anchor when it is missing.
#[derive(Debug, Clone, Copy)]
pub struct Anchor {
    pub name: &'static str,
    pub css: &'static str,
}

/// Find the first node matching the anchor's signature.
pub fn locate(doc: &Html, anchor: &Anchor) -> Option<NodeId> {
    // Anchor selectors are compile-time constants; parse cannot fail.
    let selector = Selector::parse(anchor.css).unwrap();
    doc.select(&selector).next().map(|el| el.id())
}

/// First direct child of `parent` that is an element with the given tag.
pub fn leading_child_element(doc: &Html, parent: NodeId, tag: &str) -> Option<NodeId> {
    doc.tree.get(parent)?.children().find_map(|child| {
        child
            .value()
            .as_element()
            .is_some_and(|el| el.name() == tag)
            .then(|| child.id())
    })
}

/// Replace the node's children with a single text node.
pub fn set_text(doc: &mut Html, id: NodeId, text: &str) {
    clear_children(doc, id);
    if let Some(mut node) = doc.tree.get_mut(id) {
        node.append(Node::Text(scraper::node::Text { text: text.into() }));
    }
}

/// Overwrite an existing attribute value. Returns `false` if the node is not
/// an element or does not carry the attribute — callers treat that as a
/// structural defect, not something to paper over.
pub fn set_attr(doc: &mut Html, id: NodeId, name: &str, value: &str) -> bool {
    let Some(mut node) = doc.tree.get_mut(id) else {
        return false;
    };
    if let Node::Element(el) = node.value() {
        for (attr_name, attr_value) in el.attrs.iter_mut() {
            if &*attr_name.local == name {
                *attr_value = value.into();
                return true;
            }
        }
    }
    false
}

/// Detach every child of `id`. Detached subtrees stay in the arena and can
/// be re-attached by ID.
pub fn clear_children(doc: &mut Html, id: NodeId) {
    while let Some(child_id) = doc
        .tree
        .get(id)
        .and_then(|node| node.first_child())
        .map(|child| child.id())
    {
        if let Some(mut child) = doc.tree.get_mut(child_id) {
            child.detach();
        }
    }
}

/// Re-attach a (detached) node as the last child of `parent`.
pub fn append_existing(doc: &mut Html, parent: NodeId, child: NodeId) {
    if let Some(mut node) = doc.tree.get_mut(parent) {
        node.append_id(child);
    }
}

/// Parse `markup` as a fragment and graft its top-level nodes at the end of
/// `parent`'s child list, in order.
pub fn append_html(doc: &mut Html, parent: NodeId, markup: &str) {
    let fragment = Html::parse_fragment(markup);
    for child in fragment.root_element().children() {
        copy_subtree(doc, parent, child, Attach::Append);
    }
}

/// Parse `markup` as a fragment and graft its top-level nodes at the *front*
/// of `parent`'s child list, preserving fragment order and leaving existing
/// children undisturbed.
pub fn prepend_html(doc: &mut Html, parent: NodeId, markup: &str) {
    let fragment = Html::parse_fragment(markup);
    let top_level: Vec<NodeRef<'_, Node>> = fragment.root_element().children().collect();
    // Prepend in reverse so the fragment's first node ends up first.
    for child in top_level.into_iter().rev() {
        copy_subtree(doc, parent, child, Attach::Prepend);
    }
}

/// Serialize the whole document back to markup.
///
/// Emits a standard HTML5 doctype followed by the root element. Comments
/// outside the root element are not round-tripped.
pub fn serialize(doc: &Html) -> String {
    format!("<!DOCTYPE html>{}", doc.root_element().html())
}

enum Attach {
    Append,
    Prepend,
}

/// Deep-copy a node from another tree under `parent`. The root of the copy
/// is attached per `mode`; descendants are always appended in order.
fn copy_subtree(doc: &mut Html, parent: NodeId, source: NodeRef<'_, Node>, mode: Attach) {
    let new_id = {
        let Some(mut node) = doc.tree.get_mut(parent) else {
            return;
        };
        let value = source.value().clone();
        match mode {
            Attach::Append => node.append(value).id(),
            Attach::Prepend => node.prepend(value).id(),
        }
    };
    for child in source.children() {
        copy_subtree(doc, new_id, child, Attach::Append);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTAINER: Anchor = Anchor {
        name: "container",
        css: "div.box",
    };

    fn doc(body: &str) -> Html {
        Html::parse_document(&format!("<html><head></head><body>{body}</body></html>"))
    }

    fn inner(doc: &Html, anchor: &Anchor) -> String {
        let selector = Selector::parse(anchor.css).unwrap();
        doc.select(&selector).next().unwrap().inner_html()
    }

    #[test]
    fn locate_finds_by_class_signature() {
        let d = doc(r#"<div class="other"></div><div class="box">x</div>"#);
        assert!(locate(&d, &CONTAINER).is_some());
    }

    #[test]
    fn locate_absent_returns_none() {
        let d = doc("<p>nothing here</p>");
        assert!(locate(&d, &CONTAINER).is_none());
    }

    #[test]
    fn set_text_replaces_children() {
        let mut d = doc(r#"<div class="box"><span>old</span> text</div>"#);
        let id = locate(&d, &CONTAINER).unwrap();
        set_text(&mut d, id, "new title");
        assert_eq!(inner(&d, &CONTAINER), "new title");
    }

    #[test]
    fn set_text_escapes_markup() {
        let mut d = doc(r#"<div class="box"></div>"#);
        let id = locate(&d, &CONTAINER).unwrap();
        set_text(&mut d, id, "a < b");
        assert_eq!(inner(&d, &CONTAINER), "a &lt; b");
    }

    #[test]
    fn set_attr_overwrites_existing() {
        let mut d = doc(r#"<div class="box"><img src="old.jpg" alt="pic"></div>"#);
        let img = locate(
            &d,
            &Anchor {
                name: "img",
                css: "img",
            },
        )
        .unwrap();
        assert!(set_attr(&mut d, img, "src", "new.jpg"));
        assert!(inner(&d, &CONTAINER).contains(r#"src="new.jpg""#));
    }

    #[test]
    fn set_attr_missing_attribute_reports_false() {
        let mut d = doc(r#"<div class="box"><img alt="pic"></div>"#);
        let img = locate(
            &d,
            &Anchor {
                name: "img",
                css: "img",
            },
        )
        .unwrap();
        assert!(!set_attr(&mut d, img, "src", "new.jpg"));
    }

    #[test]
    fn append_html_grafts_fragment_in_order() {
        let mut d = doc(r#"<div class="box"></div>"#);
        let id = locate(&d, &CONTAINER).unwrap();
        append_html(&mut d, id, "<p>one</p><p>two</p>");
        assert_eq!(inner(&d, &CONTAINER), "<p>one</p><p>two</p>");
    }

    #[test]
    fn prepend_html_puts_fragment_first_without_disturbing_children() {
        let mut d = doc(r#"<div class="box"><p>old</p></div>"#);
        let id = locate(&d, &CONTAINER).unwrap();
        prepend_html(&mut d, id, "<p>a</p><p>b</p>");
        assert_eq!(inner(&d, &CONTAINER), "<p>a</p><p>b</p><p>old</p>");
    }

    #[test]
    fn clear_then_reattach_preserves_subtree() {
        let mut d = doc(r#"<div class="box"><img src="x.jpg"><p>gone</p></div>"#);
        let id = locate(&d, &CONTAINER).unwrap();
        let img = leading_child_element(&d, id, "img").unwrap();
        clear_children(&mut d, id);
        append_existing(&mut d, id, img);
        assert_eq!(inner(&d, &CONTAINER), r#"<img src="x.jpg">"#);
    }

    #[test]
    fn leading_child_element_skips_text_and_other_tags() {
        let d = doc(r#"<div class="box"> text <span>s</span><h2>head</h2></div>"#);
        let id = locate(&d, &CONTAINER).unwrap();
        assert!(leading_child_element(&d, id, "h2").is_some());
        assert!(leading_child_element(&d, id, "img").is_none());
    }
}
