use super::{Document, NodeId};

/// Owned description of a subtree, built without touching a [`Document`].
#[derive(Debug, Clone, PartialEq)]
pub enum VNode {
    Element(El),
    Text(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct El {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<VNode>,
}

impl El {
    pub fn new(tag: &str) -> Self {
        El {
            tag: tag.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attrs.push((name.to_string(), value.into()));
        self
    }

    /// Set the attribute only when a value is present.
    pub fn attr_opt(self, name: &str, value: Option<&str>) -> Self {
        match value {
            Some(v) => self.attr(name, v),
            None => self,
        }
    }

    pub fn class(self, class: &str) -> Self {
        self.attr("class", class)
    }

    pub fn child(mut self, child: impl Into<VNode>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn child_opt(self, child: Option<El>) -> Self {
        match child {
            Some(c) => self.child(c),
            None => self,
        }
    }

    pub fn children(mut self, children: impl IntoIterator<Item = El>) -> Self {
        self.children
            .extend(children.into_iter().map(VNode::Element));
        self
    }

    pub fn text(self, text: impl Into<String>) -> Self {
        self.child(VNode::Text(text.into()))
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Direct element children with the given tag.
    pub fn elements<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a El> {
        self.children.iter().filter_map(move |c| match c {
            VNode::Element(el) if el.tag == tag => Some(el),
            _ => None,
        })
    }

    /// Concatenated text of the direct text children.
    pub fn own_text(&self) -> String {
        self.children
            .iter()
            .filter_map(|c| match c {
                VNode::Text(t) => Some(t.as_str()),
                VNode::Element(_) => None,
            })
            .collect()
    }
}

impl From<El> for VNode {
    fn from(el: El) -> Self {
        VNode::Element(el)
    }
}

impl From<&str> for VNode {
    fn from(text: &str) -> Self {
        VNode::Text(text.to_string())
    }
}

impl From<String> for VNode {
    fn from(text: String) -> Self {
        VNode::Text(text)
    }
}

impl Document {
    /// Materialize a description into detached nodes; returns the root.
    pub fn build(&mut self, node: &VNode) -> NodeId {
        match node {
            VNode::Text(t) => self.create_text(t),
            VNode::Element(el) => {
                let id = self.create_element(&el.tag);
                for (k, v) in &el.attrs {
                    self.set_attr(id, k, v);
                }
                for child in &el.children {
                    let c = self.build(child);
                    self.append_child(id, c);
                }
                id
            }
        }
    }
}
