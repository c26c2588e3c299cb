//! Project cards.
//!
//! A card is a pure function of its record. The class names below are also
//! what [`read_card`] decodes, so the modal can open a card from the DOM alone.

use crate::config::{FolioConfig, IconConfig};
use crate::detail::{self, non_empty, DETAIL_CLASS};
use crate::dom::{Document, El, NodeId, NodeKind};
use crate::models::project::{ProjectImage, ProjectLink, ProjectRecord};

pub const CARD_CLASS: &str = "project-card";
pub const TRIGGER_CLASS: &str = "details-trigger";

/// Rendering knobs shared by cards and the modal.
#[derive(Debug, Clone, PartialEq)]
pub struct CardOptions {
    pub placeholder_thumbnail: String,
    pub details_label: String,
    pub icons: IconConfig,
}

impl Default for CardOptions {
    fn default() -> Self {
        Self::from_config(&FolioConfig::default())
    }
}

impl CardOptions {
    pub fn from_config(config: &FolioConfig) -> Self {
        CardOptions {
            placeholder_thumbnail: config.cards.placeholder_thumbnail.clone(),
            details_label: config.cards.details_label.clone(),
            icons: config.icons.clone(),
        }
    }
}

pub fn card_view(record: &ProjectRecord, opts: &CardOptions) -> El {
    let mut card = El::new("div")
        .class(&format!("no-blinking-curser {}", CARD_CLASS))
        .attr("draggable", "false")
        .attr_opt("data-project-id", record.id.as_deref().filter(|s| !s.is_empty()));
    if !record.tags.is_empty() {
        card = card.attr("data-tags", record.tags.join(","));
    }

    let thumb = El::new("img")
        .attr("src", record.thumbnail(&opts.placeholder_thumbnail))
        .attr("alt", record.thumbnail_alt())
        .attr("draggable", "false");

    let mut text = El::new("p");
    if !record.card_description().is_empty() {
        text = text.text(record.card_description());
    }
    let text = text.text(" ").child(
        El::new("a")
            .attr("href", "#")
            .class(TRIGGER_CLASS)
            .attr("draggable", "false")
            .text(opts.details_label.as_str()),
    );
    let description = El::new("div")
        .class("description")
        .child(El::new("h3").text(record.display_title()))
        .child(El::new("time").text(record.time()))
        .child(text);

    let skills = El::new("div")
        .class("no-copy skill-list")
        .children(record.skills.iter().map(|s| skill_view(s)));
    let footer = El::new("div")
        .class("no-copy card-footer")
        .children(record.links.iter().map(|l| link_view(l, &opts.icons)));

    card.child(thumb)
        .child(description)
        .child(skills)
        .child(footer)
        .child(detail::encode(record, opts))
}

pub fn render_card(doc: &mut Document, record: &ProjectRecord, opts: &CardOptions) -> NodeId {
    doc.build(&card_view(record, opts).into())
}

pub fn skill_view(skill: &str) -> El {
    El::new("div").class("item").text(skill)
}

/// `<a class="link">` with the icon and label defaulted from the link type.
pub fn link_view(link: &ProjectLink, icons: &IconConfig) -> El {
    let label = link.label();
    let icon = link.icon(icons).map(|src| {
        El::new("img")
            .attr("src", src)
            .attr("alt", link.label.as_deref().unwrap_or(""))
            .attr("draggable", "false")
    });
    El::new("a")
        .class("link")
        .attr("href", link.href())
        .attr("title", link.tooltip())
        .attr_opt("target", link.target())
        .child_opt(icon)
        .text(format!(" {}", label))
}

/// Re-derive a record from a rendered card.
///
/// Visible text comes from the card itself (the card description lands in
/// `summary`); images, captions and the long description come from the
/// embedded detail template. A card without template images falls back to
/// its thumbnail as the only image.
pub fn read_card(doc: &Document, card: NodeId) -> ProjectRecord {
    let mut record = match doc.find(card, |el| el.tag() == "template" && el.has_class(DETAIL_CLASS)) {
        Some(tpl) => detail::decode(doc, tpl),
        None => ProjectRecord::default(),
    };

    record.id = non_empty(doc.attr(card, "data-project-id"));
    record.tags = doc
        .attr(card, "data-tags")
        .map(|t| {
            t.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    if let Some(desc) = doc.find_by_class(card, "description") {
        record.title = doc
            .find_by_tag(desc, "h3")
            .and_then(|n| non_empty(Some(doc.text_content(n).trim())));
        record.time = doc
            .find_by_tag(desc, "time")
            .and_then(|n| non_empty(Some(doc.text_content(n).trim())));
        record.summary = doc
            .find_by_tag(desc, "p")
            .and_then(|p| non_empty(Some(text_without_links(doc, p).trim())));
    }

    if let Some(list) = doc.find_by_class(card, "skill-list") {
        record.skills = doc
            .find_all(list, |el| el.has_class("item"))
            .into_iter()
            .map(|n| doc.text_content(n).trim().to_string())
            .collect();
    }

    if let Some(footer) = doc.find_by_class(card, "card-footer") {
        record.links = doc
            .find_all(footer, |el| el.tag() == "a")
            .into_iter()
            .map(|a| {
                let icon = doc.find_by_tag(a, "img");
                ProjectLink {
                    href: non_empty(doc.attr(a, "href")),
                    label: non_empty(Some(doc.text_content(a).trim())),
                    title: non_empty(doc.attr(a, "title")),
                    target: non_empty(doc.attr(a, "target")),
                    icon: icon.and_then(|i| non_empty(doc.attr(i, "src"))),
                    link_type: None,
                }
            })
            .collect();
    }

    if record.images.is_empty() {
        if let Some(img) = doc.find_by_tag(card, "img") {
            record.images.push(ProjectImage {
                alt: non_empty(doc.attr(img, "alt")),
                ..ProjectImage::new(doc.attr(img, "src").unwrap_or(""))
            });
        }
    }
    record
}

/// Text of `scope` with every `<a>` subtree left out.
fn text_without_links(doc: &Document, scope: NodeId) -> String {
    let mut out = String::new();
    for id in doc.descendants(scope) {
        if let NodeKind::Text(t) = doc.kind(id) {
            if doc.closest(id, |el| el.tag() == "a").map_or(true, |a| !doc.contains(scope, a)) {
                out.push_str(t);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(v: serde_json::Value) -> ProjectRecord {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn test_card_from_name_and_description() {
        let mut doc = Document::new();
        let card = render_card(
            &mut doc,
            &record(json!({"name": "Solo", "description": "Only a description"})),
            &CardOptions::default(),
        );
        let rec = read_card(&doc, card);
        assert_eq!(rec.title.as_deref(), Some("Solo"));
        assert_eq!(rec.summary.as_deref(), Some("Only a description"));
        let h3 = doc.find_by_tag(card, "h3").unwrap();
        assert_eq!(doc.text_content(h3), "Solo");
    }

    #[test]
    fn test_card_contract_classes() {
        let mut doc = Document::new();
        let card = render_card(
            &mut doc,
            &record(json!({"id": 7, "title": "T", "skills": ["a"], "tags": ["web", "rust"]})),
            &CardOptions::default(),
        );
        assert!(doc.has_class(card, CARD_CLASS));
        assert_eq!(doc.attr(card, "data-project-id"), Some("7"));
        assert_eq!(doc.attr(card, "data-tags"), Some("web,rust"));
        assert!(doc.find_by_class(card, "skill-list").is_some());
        assert!(doc.find_by_class(card, "card-footer").is_some());
        assert!(doc.find_by_class(card, TRIGGER_CLASS).is_some());
        let first = doc.element_children(card)[0];
        assert_eq!(doc.tag(first), Some("img"));
        assert_eq!(doc.attr(first, "src"), Some("assets/Wow-gif.gif"));
    }

    #[test]
    fn test_github_link_defaults() {
        let view = link_view(
            &serde_json::from_value(json!({"href": "https://github.com/me/x", "type": "github"})).unwrap(),
            &IconConfig::default(),
        );
        let icon = view.elements("img").next().unwrap();
        assert_eq!(icon.get_attr("src"), Some("icons/github.svg"));
        assert_eq!(view.own_text(), " Github");
        assert_eq!(view.get_attr("href"), Some("https://github.com/me/x"));
    }

    #[test]
    fn test_read_card_prefers_template_images() {
        let mut doc = Document::new();
        let card = render_card(
            &mut doc,
            &record(json!({
                "title": "Gallery",
                "thumbnail": "thumb.png",
                "summary": "card text",
                "description": "modal text",
                "images": [{"src": "1.png"}, {"src": "2.png", "caption": "two"}],
                "links": [{"href": "https://x.dev", "type": "website"}]
            })),
            &CardOptions::default(),
        );
        let rec = read_card(&doc, card);
        assert_eq!(rec.images.len(), 2);
        assert_eq!(rec.images[1].caption(), Some("two"));
        assert_eq!(rec.modal_description(), "modal text");
        assert_eq!(rec.card_description(), "card text");
        assert_eq!(rec.links[0].label(), "Website");
        assert_eq!(rec.links[0].icon.as_deref(), Some("icons/globe.svg"));
    }

    #[test]
    fn test_read_card_without_template_uses_thumbnail() {
        let mut doc = Document::new();
        let frag = crate::dom::parse::parse_fragment(
            &mut doc,
            r##"<div class="project-card"><img src="only.png" alt="Only"><div class="description"><h3>Hand made</h3><p>Text <a class="details-trigger" href="#">Details</a></p></div></div>"##,
        );
        let rec = read_card(&doc, frag.roots[0]);
        assert_eq!(rec.title.as_deref(), Some("Hand made"));
        assert_eq!(rec.summary.as_deref(), Some("Text"));
        assert_eq!(rec.images.len(), 1);
        assert_eq!(rec.images[0].src(), "only.png");
        assert!(rec.skills.is_empty());
        assert!(rec.links.is_empty());
    }
}
