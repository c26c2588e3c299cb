use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{opt_string, present};

/// One entry of the sections configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SectionItem {
    #[serde(default, deserialize_with = "opt_string")]
    pub id: Option<String>,
    /// Complete, already-structured fragment.
    #[serde(default, deserialize_with = "opt_string")]
    pub src: Option<String>,
    /// Fragment that still needs section normalization.
    #[serde(default, deserialize_with = "opt_string")]
    pub template: Option<String>,
    /// Literal markup, normalized like a template.
    #[serde(default, deserialize_with = "opt_string")]
    pub html: Option<String>,
}

/// Where an item's markup comes from, in resolution order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SectionSource<'a> {
    Fragment(&'a str),
    Template(&'a str),
    Inline(&'a str),
}

impl SectionItem {
    pub fn source(&self) -> Option<SectionSource<'_>> {
        if let Some(src) = present(&self.src) {
            Some(SectionSource::Fragment(src))
        } else if let Some(tpl) = present(&self.template) {
            Some(SectionSource::Template(tpl))
        } else {
            present(&self.html).map(SectionSource::Inline)
        }
    }

    pub fn id(&self) -> Option<&str> {
        present(&self.id)
    }

    /// What to call this item in diagnostics.
    pub fn label(&self) -> String {
        match self.source() {
            Some(SectionSource::Fragment(url)) | Some(SectionSource::Template(url)) => url.to_string(),
            Some(SectionSource::Inline(_)) => "[inline html]".to_string(),
            None => match self.id() {
                Some(id) => format!("[no source: {}]", id),
                None => "[no source]".to_string(),
            },
        }
    }
}

/// Read a sections document: a bare array or `{ "sections": [...] }`.
/// Entries that are not objects come back as source-less items so the
/// composer skips them with a diagnostic.
pub fn parse_section_list(value: &Value) -> Vec<SectionItem> {
    let list: &[Value] = match value {
        Value::Array(items) => items.as_slice(),
        Value::Object(obj) => match obj.get("sections") {
            Some(Value::Array(items)) => items.as_slice(),
            _ => &[],
        },
        _ => &[],
    };
    list.iter()
        .map(|v| serde_json::from_value(v.clone()).unwrap_or_default())
        .collect()
}
