use std::sync::mpsc;

use crate::cards::{render_card, CardOptions};
use crate::dom::{Document, NodeId};
use crate::error::FolioError;
use crate::fetch::{load_json, Fetch};
use crate::models::project::{GalleryDocument, ProjectRecord};

/// Attribute naming a container's project data file.
pub const SOURCE_ATTR: &str = "data-projects-src";
/// Attribute restricting a container to projects carrying one tag.
pub const TAG_ATTR: &str = "data-projects-tag";

/// A card that was inserted, with the record it was rendered from.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedCard {
    pub card: NodeId,
    pub record: ProjectRecord,
}

/// A container to populate and the data file it reads.
#[derive(Debug, Clone, PartialEq)]
pub struct GalleryTarget {
    pub container: NodeId,
    pub url: String,
}

pub struct GalleryLoader<'a> {
    fetcher: &'a dyn Fetch,
    opts: &'a CardOptions,
}

impl<'a> GalleryLoader<'a> {
    pub fn new(fetcher: &'a dyn Fetch, opts: &'a CardOptions) -> Self {
        GalleryLoader { fetcher, opts }
    }

    /// Fetch one gallery document and render it into `container`.
    pub fn load_and_render(
        &self,
        doc: &mut Document,
        container: NodeId,
        url: &str,
    ) -> Result<Vec<RenderedCard>, FolioError> {
        let value = load_json(self.fetcher, url)?;
        Ok(self.render_document(doc, container, &GalleryDocument::from_value(&value)))
    }

    /// Apply style overrides, filter by the container's tag, append cards in
    /// document order.
    pub fn render_document(
        &self,
        doc: &mut Document,
        container: NodeId,
        gallery: &GalleryDocument,
    ) -> Vec<RenderedCard> {
        apply_styles(doc, container, &gallery.styles);

        let filter = doc
            .attr(container, TAG_ATTR)
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);

        let mut rendered = Vec::new();
        for record in &gallery.projects {
            if let Some(tag) = &filter {
                if !record.has_tag(tag) {
                    continue;
                }
            }
            let card = render_card(doc, record, self.opts);
            doc.append_child(container, card);
            rendered.push(RenderedCard {
                card,
                record: record.clone(),
            });
        }
        rendered
    }

    /// Populate every discovered container. Data files are fetched in
    /// parallel; each container is rendered as soon as its own fetch
    /// completes, and a failed fetch only leaves that container empty.
    pub fn init_auto(&self, doc: &mut Document, targets: &[GalleryTarget]) -> Vec<RenderedCard> {
        let mut rendered = Vec::new();
        let (tx, rx) = mpsc::channel();
        let fetcher = self.fetcher;

        std::thread::scope(|s| {
            for (i, target) in targets.iter().enumerate() {
                let tx = tx.clone();
                s.spawn(move || {
                    let _ = tx.send((i, load_json(fetcher, &target.url)));
                });
            }
            drop(tx);

            for (i, result) in rx {
                let target = &targets[i];
                match result {
                    Ok(value) => {
                        let cards = self.render_document(
                            doc,
                            target.container,
                            &GalleryDocument::from_value(&value),
                        );
                        log::info!("[gallery] rendered {} card(s) from {}", cards.len(), target.url);
                        rendered.extend(cards);
                    }
                    Err(e) => log::warn!("[gallery] failed to load {}: {}", target.url, e),
                }
            }
        });
        rendered
    }
}

/// Find gallery containers: the legacy fixed-id container (if present) and
/// every element declaring a data source. Each container appears once; its
/// own source attribute wins over the legacy default.
pub fn discover(doc: &Document, legacy_id: &str, legacy_src: &str) -> Vec<GalleryTarget> {
    let mut targets = Vec::new();
    if let Some(legacy) = doc.get_element_by_id(legacy_id) {
        let url = doc
            .attr(legacy, SOURCE_ATTR)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(legacy_src);
        targets.push(GalleryTarget {
            container: legacy,
            url: url.to_string(),
        });
    }
    for el in doc.find_all(doc.body(), |el| {
        el.attr(SOURCE_ATTR).map(|s| !s.trim().is_empty()).unwrap_or(false)
    }) {
        if targets.iter().any(|t| t.container == el) {
            continue;
        }
        if let Some(url) = doc.attr(el, SOURCE_ATTR) {
            targets.push(GalleryTarget {
                container: el,
                url: url.trim().to_string(),
            });
        }
    }
    targets
}

/// Set CSS custom properties on the container's inline style.
pub fn apply_styles(doc: &mut Document, container: NodeId, styles: &[(String, String)]) {
    for (name, value) in styles {
        doc.set_style_property(container, name, value);
    }
}
