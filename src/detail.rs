//! The inert detail template embedded in every project card.
//!
//! It is a fixed serialization of the modal-relevant part of a record, so a
//! card can be opened in the modal even when the JSON it came from is gone:
//!
//! ```text
//! <template class="project-detail">
//!   <div class="detail">
//!     <div class="images"><img src alt [data-caption]>…</div>
//!     <div class="info">
//!       <h3>title</h3><time>time</time><p>modal description</p>
//!       <div class="skills"><span>skill</span>…</div>
//!       <div class="links"><a href title [target] [data-icon] [data-type]>label</a>…</div>
//!     </div>
//!   </div>
//! </template>
//! ```

use crate::cards::CardOptions;
use crate::dom::{Document, El, Fragment, NodeId};
use crate::models::project::{ProjectImage, ProjectLink, ProjectRecord};

pub const DETAIL_CLASS: &str = "project-detail";

pub fn encode(record: &ProjectRecord, opts: &CardOptions) -> El {
    let images = El::new("div").class("images").children(record.gallery_images().map(|img| {
        El::new("img")
            .attr("src", img.src())
            .attr("alt", img.alt())
            .attr_opt("data-caption", img.caption())
    }));

    let skills = El::new("div")
        .class("skills")
        .children(record.skills.iter().map(|s| El::new("span").text(s.as_str())));

    let links = El::new("div").class("links").children(record.links.iter().map(|l| {
        El::new("a")
            .attr("href", l.href())
            .attr("title", l.tooltip())
            .attr_opt("target", l.target())
            .attr_opt("data-icon", l.icon(&opts.icons))
            .attr_opt("data-type", l.link_type.as_deref().filter(|t| !t.is_empty()))
            .text(l.label())
    }));

    let info = El::new("div")
        .class("info")
        .child(El::new("h3").text(record.display_title()))
        .child(El::new("time").text(record.time()))
        .child(El::new("p").text(record.modal_description()))
        .child(skills)
        .child(links);

    El::new("template")
        .class(DETAIL_CLASS)
        .child(El::new("div").class("detail").child(images).child(info))
}

/// Decode a detail template back into a record. Missing parts decode as
/// absent fields or empty lists.
pub fn decode(doc: &Document, template: NodeId) -> ProjectRecord {
    let content = Fragment {
        roots: doc.template_content(template).to_vec(),
    };
    let mut record = ProjectRecord::default();

    let image_nodes = match content.find(doc, |el| el.has_class("images")) {
        Some(wrap) => doc.find_all(wrap, |el| el.tag() == "img"),
        None => all_in(doc, &content, "img"),
    };
    record.images = image_nodes
        .into_iter()
        .map(|img| ProjectImage {
            src: non_empty(doc.attr(img, "src")),
            alt: non_empty(doc.attr(img, "alt")),
            caption: non_empty(doc.attr(img, "data-caption")),
        })
        .filter(|img| !img.src().is_empty())
        .collect();

    let Some(info) = content.find(doc, |el| el.has_class("info")) else {
        return record;
    };
    record.title = child_text(doc, info, "h3");
    record.time = child_text(doc, info, "time");
    record.description = child_text(doc, info, "p");

    if let Some(skills) = doc.find_by_class(info, "skills") {
        record.skills = doc
            .find_all(skills, |el| el.tag() == "span")
            .into_iter()
            .map(|s| doc.text_content(s).trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }
    if let Some(links) = doc.find_by_class(info, "links") {
        record.links = doc
            .find_all(links, |el| el.tag() == "a")
            .into_iter()
            .map(|a| ProjectLink {
                href: non_empty(doc.attr(a, "href")),
                label: non_empty(Some(doc.text_content(a).trim())),
                title: non_empty(doc.attr(a, "title")),
                target: non_empty(doc.attr(a, "target")),
                icon: non_empty(doc.attr(a, "data-icon")),
                link_type: non_empty(doc.attr(a, "data-type")),
            })
            .collect();
    }
    record
}

fn all_in(doc: &Document, content: &Fragment, tag: &str) -> Vec<NodeId> {
    let mut out = Vec::new();
    for root in &content.roots {
        if doc.tag(*root) == Some(tag) {
            out.push(*root);
        }
        out.extend(doc.find_all(*root, |el| el.tag() == tag));
    }
    out
}

fn child_text(doc: &Document, scope: NodeId, tag: &str) -> Option<String> {
    doc.find_by_tag(scope, tag)
        .and_then(|n| non_empty(Some(doc.text_content(n).trim())))
}

pub(crate) fn non_empty(s: Option<&str>) -> Option<String> {
    s.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
