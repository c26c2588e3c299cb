use super::{Document, Element, NodeId};

/// Class of the layout wrapper every composed section gets.
pub const CONTAINER_CLASS: &str = "container";

/// Detached top-level nodes produced by parsing, inserted as a unit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    pub roots: Vec<NodeId>,
}

impl Fragment {
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// First element matching `pred`, in document order across all roots.
    pub fn find(&self, doc: &Document, pred: impl Fn(&Element) -> bool) -> Option<NodeId> {
        for root in &self.roots {
            if doc.element(*root).map(&pred).unwrap_or(false) {
                return Some(*root);
            }
            if let Some(found) = doc.find(*root, &pred) {
                return Some(found);
            }
        }
        None
    }

    pub fn first_section(&self, doc: &Document) -> Option<NodeId> {
        self.find(doc, |el| el.tag() == "section")
    }

    /// Move every root under `parent`, preserving order.
    pub fn append_to(self, doc: &mut Document, parent: NodeId) {
        for root in self.roots {
            doc.append_child(parent, root);
        }
    }
}

/// Give the fragment's section the supplied id when it has none.
/// Returns whether the id was assigned.
pub fn assign_section_id(doc: &mut Document, frag: &Fragment, id: Option<&str>) -> bool {
    let (Some(sec), Some(id)) = (frag.first_section(doc), id.filter(|s| !s.is_empty())) else {
        return false;
    };
    if doc.attr(sec, "id").map(|v| !v.is_empty()).unwrap_or(false) {
        return false;
    }
    doc.set_attr(sec, "id", id);
    true
}

/// Give the fragment's section a stable id and a direct `.container` child.
///
/// Without a container, one is created and every existing child of the
/// section (text included) is moved into it. A fragment without a section
/// is left as it was. Returns whether anything changed.
pub fn normalize_section(doc: &mut Document, frag: &Fragment, id: Option<&str>) -> bool {
    let Some(sec) = frag.first_section(doc) else {
        log::debug!("[dom] no <section> in fragment, inserting as-is");
        return false;
    };
    let mut changed = assign_section_id(doc, frag, id);

    let has_container = doc
        .element_children(sec)
        .into_iter()
        .any(|c| doc.has_class(c, CONTAINER_CLASS));
    if !has_container {
        let wrap = doc.create_element("div");
        doc.set_attr(wrap, "class", CONTAINER_CLASS);
        let children = doc.children(sec).to_vec();
        for child in children {
            doc.append_child(wrap, child);
        }
        doc.append_child(sec, wrap);
        changed = true;
    }
    changed
}
