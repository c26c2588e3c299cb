//! Project records and gallery documents.
//!
//! Several record fields are aliases or fall back to one another. The
//! resolution order for each is fixed here and nowhere else; empty strings
//! count as absent:
//!
//! | field             | order                                               |
//! |-------------------|-----------------------------------------------------|
//! | title             | `title`, `name`, `"Project"`                        |
//! | card description  | `summary`, `description`, `""`                      |
//! | modal description | `description`, `summary`, `""`                      |
//! | thumbnail         | `thumbnail`, `images[0].src`, `image`, placeholder  |
//! | thumbnail alt     | `images[0].alt`, `title`, `name`, `"Preview"`       |
//! | link href         | `href`, `"#"`                                       |
//! | link label        | `label`, capitalized `type`, `"Link"`               |
//! | link icon         | `icon`, icon for `type`, none                       |
//! | link tooltip      | `title`, `label`, `""`                              |

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{lenient_vec, opt_string, present};
use crate::config::IconConfig;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProjectImage {
    #[serde(default, deserialize_with = "opt_string")]
    pub src: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub alt: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub caption: Option<String>,
}

impl ProjectImage {
    pub fn new(src: &str) -> Self {
        ProjectImage {
            src: Some(src.to_string()),
            ..Default::default()
        }
    }

    pub fn src(&self) -> &str {
        present(&self.src).unwrap_or("")
    }

    pub fn alt(&self) -> &str {
        present(&self.alt).unwrap_or("")
    }

    pub fn caption(&self) -> Option<&str> {
        present(&self.caption)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProjectLink {
    #[serde(default, deserialize_with = "opt_string")]
    pub href: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub label: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub target: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub icon: Option<String>,
    #[serde(default, rename = "type", deserialize_with = "opt_string")]
    pub link_type: Option<String>,
}

impl ProjectLink {
    pub fn href(&self) -> &str {
        present(&self.href).unwrap_or("#")
    }

    pub fn label(&self) -> String {
        if let Some(label) = present(&self.label) {
            return label.to_string();
        }
        match present(&self.link_type) {
            Some(t) => capitalize(t),
            None => "Link".to_string(),
        }
    }

    pub fn icon<'a>(&'a self, icons: &'a IconConfig) -> Option<&'a str> {
        present(&self.icon).or_else(|| present(&self.link_type).and_then(|t| icons.for_type(t)))
    }

    pub fn tooltip(&self) -> &str {
        present(&self.title).or(present(&self.label)).unwrap_or("")
    }

    pub fn target(&self) -> Option<&str> {
        present(&self.target)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ProjectRecord {
    #[serde(default, deserialize_with = "opt_string")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub time: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "opt_string")]
    pub thumbnail: Option<String>,
    /// Legacy single preview image.
    #[serde(default, deserialize_with = "opt_string")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub images: Vec<ProjectImage>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub links: Vec<ProjectLink>,
    #[serde(default, deserialize_with = "lenient_vec")]
    pub tags: Vec<String>,
}

impl ProjectRecord {
    pub fn display_title(&self) -> &str {
        present(&self.title)
            .or(present(&self.name))
            .unwrap_or("Project")
    }

    pub fn time(&self) -> &str {
        present(&self.time).unwrap_or("")
    }

    pub fn card_description(&self) -> &str {
        present(&self.summary)
            .or(present(&self.description))
            .unwrap_or("")
    }

    pub fn modal_description(&self) -> &str {
        present(&self.description)
            .or(present(&self.summary))
            .unwrap_or("")
    }

    pub fn thumbnail<'a>(&'a self, placeholder: &'a str) -> &'a str {
        present(&self.thumbnail)
            .or_else(|| self.images.first().and_then(|img| present(&img.src)))
            .or(present(&self.image))
            .unwrap_or(placeholder)
    }

    pub fn thumbnail_alt(&self) -> &str {
        self.images
            .first()
            .and_then(|img| present(&img.alt))
            .or(present(&self.title))
            .or(present(&self.name))
            .unwrap_or("Preview")
    }

    /// Images that can actually be shown (non-empty `src`), in order.
    pub fn gallery_images(&self) -> impl Iterator<Item = &ProjectImage> {
        self.images.iter().filter(|img| !img.src().is_empty())
    }

    /// Case-insensitive exact match against any tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        let wanted = tag.trim().to_lowercase();
        self.tags.iter().any(|t| t.trim().to_lowercase() == wanted)
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// A decoded gallery data file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GalleryDocument {
    pub projects: Vec<ProjectRecord>,
    /// CSS custom properties to set on the container before rendering.
    pub styles: Vec<(String, String)>,
}

impl GalleryDocument {
    /// Accepts a bare array of records or `{ projects, styles | widgetStyles }`.
    /// Records and style values that do not decode are skipped with a warning.
    pub fn from_value(value: &Value) -> Self {
        let (projects, styles): (&[Value], Option<&Value>) = match value {
            Value::Array(items) => (items.as_slice(), None),
            Value::Object(obj) => {
                let projects: &[Value] = match obj.get("projects") {
                    Some(Value::Array(items)) => items.as_slice(),
                    _ => &[],
                };
                let styles = obj
                    .get("styles")
                    .filter(|v| v.is_object())
                    .or_else(|| obj.get("widgetStyles").filter(|v| v.is_object()));
                (projects, styles)
            }
            _ => {
                log::warn!("[gallery] project document is neither an array nor an object");
                (&[], None)
            }
        };

        let projects = projects
            .iter()
            .enumerate()
            .filter_map(|(i, v)| match serde_json::from_value::<ProjectRecord>(v.clone()) {
                Ok(p) => Some(p),
                Err(e) => {
                    log::warn!("[gallery] skipping project #{}: {}", i, e);
                    None
                }
            })
            .collect();

        let mut style_list = Vec::new();
        if let Some(Value::Object(map)) = styles {
            for (k, v) in map {
                match v.as_str() {
                    Some(s) => style_list.push((k.clone(), s.to_string())),
                    None => log::warn!("[gallery] ignoring non-string style value for {}", k),
                }
            }
        }

        GalleryDocument {
            projects,
            styles: style_list,
        }
    }
}
