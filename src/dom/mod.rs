//! In-memory document tree.
//!
//! Nodes live in an arena owned by [`Document`] and are addressed by [`NodeId`].
//! A node with no parent is detached; detached subtrees are what fragments are
//! made of. `<template>` children are inert: tree walks, queries and
//! `text_content` never descend into them, only [`Document::template_content`]
//! does.

pub mod builder;
pub mod fragment;
pub mod parse;

pub use builder::{El, VNode};
pub use fragment::Fragment;

pub type NodeId = usize;

/// Elements that never have children or a closing tag.
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Elements that can take keyboard focus without a tabindex.
const FOCUSABLE_TAGS: &[&str] = &["button", "input", "select", "textarea", "summary"];

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    tag: String,
    attrs: Vec<(String, String)>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Element {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn attrs(&self) -> &[(String, String)] {
        &self.attrs
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    pub fn is_void(&self) -> bool {
        VOID_ELEMENTS.contains(&self.tag.as_str())
    }

    fn set_attr(&mut self, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        match self.attrs.iter_mut().find(|(k, _)| *k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => self.attrs.push((name, value.to_string())),
        }
    }

    fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(k, _)| k != name);
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// One page worth of nodes plus the focus cursor.
///
/// The arena only grows. Removing or replacing nodes detaches them but keeps
/// their slots, so a `NodeId` never refers to a different node later on. A
/// long-lived document that is rewritten often (the modal refills its slots
/// on every open) holds on to the replaced nodes until it is dropped.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    body: NodeId,
    active: Option<NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut doc = Document {
            nodes: Vec::new(),
            body: 0,
            active: None,
        };
        doc.body = doc.create_element("body");
        doc
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    // ── Construction ────────────────────────────────────

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element(Element::new(tag)))
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        self.nodes.push(Node {
            kind,
            parent: None,
            children: Vec::new(),
        });
        self.nodes.len() - 1
    }

    // ── Structure ───────────────────────────────────────

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id].kind
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id].kind {
            NodeKind::Element(el) => Some(el),
            NodeKind::Text(_) => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[id].kind {
            NodeKind::Element(el) => Some(el),
            NodeKind::Text(_) => None,
        }
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(Element::tag)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id].children
    }

    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes[id]
            .children
            .iter()
            .copied()
            .filter(|c| self.element(*c).is_some())
            .collect()
    }

    /// Append `child` as the last child of `parent`, moving it if it was attached elsewhere.
    /// Void elements and text nodes refuse children.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent == child || self.contains(child, parent) {
            log::warn!("[dom] refusing to append a node into its own subtree");
            return;
        }
        match self.element(parent) {
            Some(el) if !el.is_void() => {}
            _ => return,
        }
        self.unlink(child);
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].children.push(child);
    }

    pub fn detach(&mut self, id: NodeId) {
        self.unlink(id);
        if let Some(active) = self.active {
            if self.contains(id, active) {
                self.active = None;
            }
        }
    }

    fn unlink(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id].parent.take() {
            self.nodes[parent].children.retain(|c| *c != id);
        }
    }

    pub fn clear_children(&mut self, id: NodeId) {
        let children = std::mem::take(&mut self.nodes[id].children);
        for child in children {
            self.nodes[child].parent = None;
            if let Some(active) = self.active {
                if self.contains(child, active) {
                    self.active = None;
                }
            }
        }
    }

    /// True when `node` is `ancestor` or lies beneath it.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cur = Some(node);
        while let Some(n) = cur {
            if n == ancestor {
                return true;
            }
            cur = self.nodes[n].parent;
        }
        false
    }

    pub fn is_connected(&self, id: NodeId) -> bool {
        self.contains(self.body, id)
    }

    // ── Attributes ──────────────────────────────────────

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|el| el.attr(name))
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) {
        if let Some(el) = self.element_mut(id) {
            el.set_attr(name, value);
        }
    }

    pub fn remove_attr(&mut self, id: NodeId, name: &str) {
        if let Some(el) = self.element_mut(id) {
            el.remove_attr(name);
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.element(id).map(|el| el.has_class(class)).unwrap_or(false)
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        if self.has_class(id, class) {
            return;
        }
        let current = self.attr(id, "class").unwrap_or("").trim().to_string();
        let next = if current.is_empty() {
            class.to_string()
        } else {
            format!("{} {}", current, class)
        };
        self.set_attr(id, "class", &next);
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) {
        let Some(el) = self.element(id) else { return };
        if !el.has_class(class) {
            return;
        }
        let next = el
            .classes()
            .filter(|c| *c != class)
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attr(id, "class", &next);
    }

    pub fn is_hidden(&self, id: NodeId) -> bool {
        self.attr(id, "hidden").is_some()
    }

    pub fn set_hidden(&mut self, id: NodeId, hidden: bool) {
        if hidden {
            self.set_attr(id, "hidden", "");
        } else {
            self.remove_attr(id, "hidden");
        }
    }

    /// Read one declaration from the inline `style` attribute.
    pub fn style_property(&self, id: NodeId, name: &str) -> Option<String> {
        parse_style(self.attr(id, "style").unwrap_or(""))
            .into_iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    /// Set (or replace) one declaration in the inline `style` attribute.
    pub fn set_style_property(&mut self, id: NodeId, name: &str, value: &str) {
        let mut decls = parse_style(self.attr(id, "style").unwrap_or(""));
        match decls.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => decls.push((name.to_string(), value.to_string())),
        }
        let style = decls
            .iter()
            .map(|(k, v)| format!("{}: {};", k, v))
            .collect::<Vec<_>>()
            .join(" ");
        self.set_attr(id, "style", &style);
    }

    // ── Text ────────────────────────────────────────────

    /// Concatenated text of the subtree, skipping inert template content.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id].kind {
            NodeKind::Text(t) => out.push_str(t),
            NodeKind::Element(el) if el.tag == "template" => {}
            NodeKind::Element(_) => {
                for child in &self.nodes[id].children {
                    self.collect_text(*child, out);
                }
            }
        }
    }

    /// Replace all children with a single text node (no node when `text` is empty).
    pub fn set_text_content(&mut self, id: NodeId, text: &str) {
        self.clear_children(id);
        if !text.is_empty() {
            let t = self.create_text(text);
            self.append_child(id, t);
        }
    }

    // ── Queries ─────────────────────────────────────────

    /// Pre-order descendants of `scope` (excluding `scope`), not entering templates.
    pub fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.walk(scope, &mut out);
        out
    }

    fn walk(&self, id: NodeId, out: &mut Vec<NodeId>) {
        if self.tag(id) == Some("template") {
            return;
        }
        for child in &self.nodes[id].children {
            out.push(*child);
            self.walk(*child, out);
        }
    }

    pub fn find(&self, scope: NodeId, pred: impl Fn(&Element) -> bool) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|id| self.element(*id).map(&pred).unwrap_or(false))
    }

    pub fn find_all(&self, scope: NodeId, pred: impl Fn(&Element) -> bool) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|id| self.element(*id).map(&pred).unwrap_or(false))
            .collect()
    }

    pub fn find_by_class(&self, scope: NodeId, class: &str) -> Option<NodeId> {
        self.find(scope, |el| el.has_class(class))
    }

    pub fn find_by_tag(&self, scope: NodeId, tag: &str) -> Option<NodeId> {
        self.find(scope, |el| el.tag() == tag)
    }

    pub fn find_by_id(&self, scope: NodeId, id: &str) -> Option<NodeId> {
        self.find(scope, |el| el.attr("id") == Some(id))
    }

    /// Look up an attached element by its `id` attribute.
    pub fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        self.find_by_id(self.body, id)
    }

    /// Nearest inclusive ancestor matching `pred`.
    pub fn closest(&self, id: NodeId, pred: impl Fn(&Element) -> bool) -> Option<NodeId> {
        let mut cur = Some(id);
        while let Some(n) = cur {
            if self.element(n).map(&pred).unwrap_or(false) {
                return Some(n);
            }
            cur = self.nodes[n].parent;
        }
        None
    }

    /// Inert content of a `<template>` element; empty for anything else.
    pub fn template_content(&self, id: NodeId) -> &[NodeId] {
        if self.tag(id) == Some("template") {
            &self.nodes[id].children
        } else {
            &[]
        }
    }

    // ── Focus ───────────────────────────────────────────

    pub fn active_element(&self) -> Option<NodeId> {
        self.active
    }

    pub fn is_focusable(&self, id: NodeId) -> bool {
        let Some(el) = self.element(id) else {
            return false;
        };
        if el.attr("disabled").is_some() || self.is_hidden(id) {
            return false;
        }
        el.attr("tabindex").is_some()
            || FOCUSABLE_TAGS.contains(&el.tag())
            || (el.tag() == "a" && el.attr("href").is_some())
    }

    /// Move focus to `id`. Fails (leaving focus untouched) for detached or
    /// unfocusable nodes.
    pub fn focus(&mut self, id: NodeId) -> bool {
        if !self.is_connected(id) || !self.is_focusable(id) {
            return false;
        }
        self.active = Some(id);
        true
    }

    pub fn blur(&mut self) {
        self.active = None;
    }

    // ── Serialization ───────────────────────────────────

    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_html(id, &mut out);
        out
    }

    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for child in &self.nodes[id].children {
            self.write_html(*child, &mut out);
        }
        out
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        match &self.nodes[id].kind {
            NodeKind::Text(t) => out.push_str(&html_escape(t)),
            NodeKind::Element(el) => {
                out.push('<');
                out.push_str(&el.tag);
                for (k, v) in &el.attrs {
                    out.push(' ');
                    out.push_str(k);
                    if !v.is_empty() {
                        out.push_str("=\"");
                        out.push_str(&html_escape(v));
                        out.push('"');
                    }
                }
                out.push('>');
                if el.is_void() {
                    return;
                }
                for child in &self.nodes[id].children {
                    match &self.nodes[*child].kind {
                        // CSS is raw text; escaping would change its meaning.
                        NodeKind::Text(t) if el.tag == "style" => out.push_str(t),
                        _ => self.write_html(*child, out),
                    }
                }
                out.push_str("</");
                out.push_str(&el.tag);
                out.push('>');
            }
        }
    }
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn parse_style(style: &str) -> Vec<(String, String)> {
    style
        .split(';')
        .filter_map(|decl| {
            let (k, v) = decl.split_once(':')?;
            let k = k.trim();
            if k.is_empty() {
                return None;
            }
            Some((k.to_string(), v.trim().to_string()))
        })
        .collect()
}
