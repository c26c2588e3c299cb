//! Project detail modal with an image gallery.
//!
//! One [`ProjectModal`] owns one modal subtree and all of its state. It is
//! opened from a record or from a rendered card, navigated through
//! [`ProjectModal::handle`], and closed with focus handed back to whatever
//! had it before.

pub mod input;

use crate::cards::{link_view, read_card, skill_view};
use crate::config::IconConfig;
use crate::dom::{Document, El, NodeId};
use crate::error::FolioError;
use crate::models::project::{ProjectImage, ProjectRecord};

use input::{action_for, Action, ModalInput, Region};

/// Class put on `<body>` while the modal is open.
pub const BODY_LOCK_CLASS: &str = "modal-open";

/// The fixed parts of the modal markup.
#[derive(Debug, Clone, PartialEq)]
pub struct ModalSlots {
    pub dialog: Option<NodeId>,
    pub title: NodeId,
    pub time: Option<NodeId>,
    pub desc: NodeId,
    pub skills: NodeId,
    pub links: NodeId,
    pub viewport: Option<NodeId>,
    pub track: NodeId,
    pub prev: Option<NodeId>,
    pub next: Option<NodeId>,
    pub caption: Option<NodeId>,
    pub close: NodeId,
}

impl ModalSlots {
    pub fn locate(doc: &Document, root: NodeId) -> Result<Self, FolioError> {
        let required = |class: &str| {
            doc.find_by_class(root, class)
                .ok_or_else(|| FolioError::Structure(format!("modal is missing .{}", class)))
        };
        let title = doc
            .find_by_id(root, "project-modal-title")
            .or_else(|| doc.find_by_class(root, "modal__title"))
            .ok_or_else(|| FolioError::Structure("modal is missing its title".into()))?;

        Ok(ModalSlots {
            dialog: doc.find_by_class(root, "modal__dialog"),
            title,
            time: doc.find_by_class(root, "modal__time"),
            desc: required("modal__desc")?,
            skills: required("modal__skills")?,
            links: required("modal__links")?,
            viewport: doc.find_by_class(root, "gallery__viewport"),
            track: required("gallery__track")?,
            prev: doc.find_by_class(root, "gallery__prev"),
            next: doc.find_by_class(root, "gallery__next"),
            caption: doc.find_by_class(root, "gallery__caption"),
            close: required("modal__close")?,
        })
    }
}

/// Everything the modal remembers between inputs. Rebuilt on every open.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModalState {
    pub is_open: bool,
    pub current_index: usize,
    pub images: Vec<ProjectImage>,
    pub default_description: String,
    pub last_focused: Option<NodeId>,
}

pub struct ProjectModal {
    root: NodeId,
    slots: ModalSlots,
    state: ModalState,
    icons: IconConfig,
}

impl ProjectModal {
    pub fn bind(doc: &Document, root: NodeId, icons: IconConfig) -> Result<Self, FolioError> {
        let slots = ModalSlots::locate(doc, root)?;
        Ok(ProjectModal {
            root,
            slots,
            state: ModalState::default(),
            icons,
        })
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn slots(&self) -> &ModalSlots {
        &self.slots
    }

    pub fn state(&self) -> &ModalState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        self.state.is_open
    }

    /// Current horizontal track offset, in percent of the viewport width.
    pub fn offset_percent(&self) -> i64 {
        -(self.state.current_index as i64) * 100
    }

    /// Open with a structured record.
    pub fn open(&mut self, doc: &mut Document, record: &ProjectRecord) {
        self.fill(doc, record);
        self.reveal(doc);
    }

    /// Open with a record decoded from a rendered card.
    pub fn open_from_card(&mut self, doc: &mut Document, card: NodeId) {
        let record = read_card(doc, card);
        self.open(doc, &record);
    }

    pub fn close(&mut self, doc: &mut Document) {
        doc.set_hidden(self.root, true);
        doc.set_attr(self.root, "aria-hidden", "true");
        let body = doc.body();
        doc.remove_class(body, BODY_LOCK_CLASS);
        self.state.is_open = false;

        if let Some(prev) = self.state.last_focused.take() {
            if !doc.focus(prev) {
                log::debug!("[modal] previous focus target is gone, leaving focus alone");
                if doc.active_element().map_or(false, |a| doc.contains(self.root, a)) {
                    doc.blur();
                }
            }
        } else if doc.active_element().map_or(false, |a| doc.contains(self.root, a)) {
            doc.blur();
        }
    }

    /// Move the gallery cursor, clamped to the available images.
    pub fn set_index(&mut self, doc: &mut Document, index: isize) {
        let count = self.state.images.len();
        let idx = if count == 0 {
            0
        } else {
            index.clamp(0, count as isize - 1) as usize
        };
        self.state.current_index = idx;

        doc.set_style_property(
            self.slots.track,
            "transform",
            &format!("translateX({}%)", self.offset_percent()),
        );

        let visibility = if count > 1 { "visible" } else { "hidden" };
        for control in [self.slots.prev, self.slots.next].into_iter().flatten() {
            doc.set_style_property(control, "visibility", visibility);
        }

        let caption = self
            .state
            .images
            .get(idx)
            .and_then(|img| img.caption())
            .unwrap_or("")
            .to_string();
        if let Some(slot) = self.slots.caption {
            doc.set_text_content(slot, &caption);
            doc.set_style_property(slot, "display", if caption.is_empty() { "none" } else { "block" });
        }
        let text = if caption.is_empty() {
            self.state.default_description.clone()
        } else {
            caption
        };
        doc.set_text_content(self.slots.desc, &text);
    }

    /// Feed one input through the table and apply the result.
    pub fn handle(&mut self, doc: &mut Document, input: ModalInput) -> Action {
        let action = action_for(self.state.is_open, input);
        match action {
            Action::Step(delta) => {
                let next = self.state.current_index as isize + delta;
                self.set_index(doc, next);
            }
            Action::Close => self.close(doc),
            Action::Ignore => {}
        }
        action
    }

    /// Work out which region a click on `target` hit. `offset_x` and `width`
    /// describe the pointer position within the image viewport. Returns
    /// `None` for targets outside the modal.
    pub fn classify_click(
        &self,
        doc: &Document,
        target: NodeId,
        offset_x: f64,
        width: f64,
    ) -> Option<Region> {
        if target == self.root {
            return Some(Region::Backdrop);
        }
        if !doc.contains(self.root, target) {
            return None;
        }
        let within = |slot: Option<NodeId>| slot.map_or(false, |s| doc.contains(s, target));
        let region = if within(self.slots.prev) {
            Region::Prev
        } else if within(self.slots.next) {
            Region::Next
        } else if within(Some(self.slots.close)) {
            Region::Close
        } else if within(self.slots.viewport) {
            Region::Viewport { offset_x, width }
        } else {
            Region::Dialog
        };
        Some(region)
    }

    fn fill(&mut self, doc: &mut Document, record: &ProjectRecord) {
        doc.set_text_content(self.slots.title, record.display_title());
        if let Some(time) = self.slots.time {
            doc.set_text_content(time, record.time());
        }
        self.state.default_description = record.modal_description().to_string();
        doc.set_text_content(self.slots.desc, &self.state.default_description);

        doc.clear_children(self.slots.skills);
        for skill in &record.skills {
            let item = doc.build(&skill_view(skill).into());
            doc.append_child(self.slots.skills, item);
        }

        doc.clear_children(self.slots.links);
        for link in &record.links {
            let a = doc.build(&link_view(link, &self.icons).into());
            doc.append_child(self.slots.links, a);
        }

        self.state.images = record.gallery_images().cloned().collect();
        doc.clear_children(self.slots.track);
        for img in &self.state.images {
            let view = El::new("img")
                .class("gallery__img")
                .attr("loading", "lazy")
                .attr("src", img.src())
                .attr("alt", img.alt());
            let node = doc.build(&view.into());
            doc.append_child(self.slots.track, node);
        }
        self.set_index(doc, 0);
    }

    fn reveal(&mut self, doc: &mut Document) {
        let active = doc.active_element();
        let focus_inside = active.map_or(false, |a| doc.contains(self.root, a));
        // Reopening from inside the modal keeps the original focus target.
        if !(self.state.is_open && focus_inside) {
            self.state.last_focused = active;
        }

        let body = doc.body();
        doc.add_class(body, BODY_LOCK_CLASS);
        doc.set_hidden(self.root, false);
        doc.set_attr(self.root, "aria-hidden", "false");
        self.state.is_open = true;

        if !doc.focus(self.slots.close) {
            log::debug!("[modal] close control cannot take focus");
        }
    }
}
