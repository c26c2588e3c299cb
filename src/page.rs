use std::collections::HashMap;

use crate::cards::{CardOptions, CARD_CLASS, TRIGGER_CLASS};
use crate::config::FolioConfig;
use crate::dom::parse::parse_fragment;
use crate::dom::{Document, NodeId};
use crate::fetch::Fetch;
use crate::gallery::{self, GalleryLoader};
use crate::models::project::ProjectRecord;
use crate::modal::input::{Action, Key, ModalInput};
use crate::modal::ProjectModal;
use crate::sections::{SectionComposer, SectionOutcome};

/// Attribute on the sections host naming its configuration document.
pub const SECTIONS_SRC_ATTR: &str = "data-sections-src";

/// Turn a full HTML page into a document. The contents of its `<body>` (and
/// the body's attributes) become the document body; anything outside the
/// body is dropped. Markup without a body is taken as body content.
pub fn document_from_html(html: &str) -> Document {
    let mut doc = Document::new();
    let frag = parse_fragment(&mut doc, html);
    let body = doc.body();
    match frag.find(&doc, |el| el.tag() == "body") {
        Some(src_body) => {
            let attrs = doc
                .element(src_body)
                .map(|el| el.attrs().to_vec())
                .unwrap_or_default();
            for (k, v) in attrs {
                doc.set_attr(body, &k, &v);
            }
            for child in doc.children(src_body).to_vec() {
                doc.append_child(body, child);
            }
        }
        None => frag.append_to(&mut doc, body),
    }
    doc
}

/// A bootstrapped page: the document plus the widgets wired into it.
pub struct Page {
    pub doc: Document,
    pub config: FolioConfig,
    pub sections: Vec<SectionOutcome>,
    modal: Option<ProjectModal>,
    records: HashMap<NodeId, ProjectRecord>,
}

impl Page {
    pub fn bootstrap(doc: Document, fetcher: &dyn Fetch, config: FolioConfig) -> Self {
        let mut page = Page {
            doc,
            config,
            sections: Vec::new(),
            modal: None,
            records: HashMap::new(),
        };
        let opts = CardOptions::from_config(&page.config);

        page.stamp_year();

        let host_id = page.config.page.sections_host_id.clone();
        if let Some(host) = page.doc.get_element_by_id(&host_id) {
            let src = page
                .doc
                .attr(host, SECTIONS_SRC_ATTR)
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(&page.config.page.sections_src)
                .to_string();
            let composer = SectionComposer::new(fetcher, host, &src);
            page.sections = composer.load(&mut page.doc, |_, host| {
                log::debug!("[page] sections host #{} is stable", host);
            });
        } else {
            log::info!("[page] no #{} host, skipping sections", host_id);
        }

        let targets = gallery::discover(
            &page.doc,
            &page.config.page.legacy_gallery_id,
            &page.config.page.legacy_gallery_src,
        );
        let loader = GalleryLoader::new(fetcher, &opts);
        for rendered in loader.init_auto(&mut page.doc, &targets) {
            page.records.insert(rendered.card, rendered.record);
        }

        if let Some(root) = page.doc.get_element_by_id(&page.config.page.modal_id) {
            match ProjectModal::bind(&page.doc, root, page.config.icons.clone()) {
                Ok(modal) => page.modal = Some(modal),
                Err(e) => log::warn!("[page] modal unavailable: {}", e),
            }
        }

        log::info!(
            "[page] ready: {} section(s), {} card(s), modal {}",
            page.sections.len(),
            page.records.len(),
            if page.modal.is_some() { "bound" } else { "absent" }
        );
        page
    }

    fn stamp_year(&mut self) {
        if let Some(el) = self.doc.get_element_by_id(&self.config.page.year_id) {
            let year = chrono::Local::now().format("%Y").to_string();
            self.doc.set_text_content(el, &year);
        }
    }

    pub fn modal(&self) -> Option<&ProjectModal> {
        self.modal.as_ref()
    }

    /// The record a card was rendered from, when it came from gallery data.
    pub fn record_for(&self, card: NodeId) -> Option<&ProjectRecord> {
        self.records.get(&card)
    }

    /// Open a card in the modal, preferring the record it was rendered from.
    pub fn open_card(&mut self, card: NodeId) -> bool {
        let Some(modal) = self.modal.as_mut() else {
            return false;
        };
        match self.records.get(&card) {
            Some(record) => modal.open(&mut self.doc, record),
            None => modal.open_from_card(&mut self.doc, card),
        }
        true
    }

    /// Route a pointer click. A click on a card's thumbnail or its details
    /// link opens that card; anything else goes to the modal while it is
    /// open. The returned action is what the modal did with the click.
    pub fn click(&mut self, target: NodeId, offset_x: f64, width: f64) -> Action {
        if let Some(card) = self.card_for_click(target) {
            self.open_card(card);
            return Action::Ignore;
        }
        let Some(modal) = self.modal.as_mut() else {
            return Action::Ignore;
        };
        match modal.classify_click(&self.doc, target, offset_x, width) {
            Some(region) => modal.handle(&mut self.doc, ModalInput::Click(region)),
            None => Action::Ignore,
        }
    }

    pub fn key(&mut self, key: Key) -> Action {
        match self.modal.as_mut() {
            Some(modal) => modal.handle(&mut self.doc, ModalInput::Key(key)),
            None => Action::Ignore,
        }
    }

    fn card_for_click(&self, target: NodeId) -> Option<NodeId> {
        let doc = &self.doc;
        if let Some(img) = doc.closest(target, |el| el.tag() == "img") {
            if let Some(parent) = doc.parent(img) {
                if doc.has_class(parent, CARD_CLASS) {
                    return Some(parent);
                }
            }
        }
        let trigger = doc.closest(target, |el| el.tag() == "a" && el.has_class(TRIGGER_CLASS))?;
        doc.closest(trigger, |el| el.has_class(CARD_CLASS))
    }
}
