use std::path::Path;

use serde::Deserialize;

/// Default location of the config file, relative to the working directory.
pub const CONFIG_FILE: &str = "folio.toml";

/// Site settings read from `folio.toml`. Every key is optional.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct FolioConfig {
    /// Directory or http(s) URL the site is served from.
    pub base: String,
    /// Page the bootstrap starts from, relative to `base`.
    pub index: String,
    pub timeout_secs: u64,
    pub page: PageConfig,
    pub cards: CardConfig,
    pub icons: IconConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct PageConfig {
    pub sections_host_id: String,
    pub sections_src: String,
    pub legacy_gallery_id: String,
    pub legacy_gallery_src: String,
    pub modal_id: String,
    pub year_id: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct CardConfig {
    pub placeholder_thumbnail: String,
    pub details_label: String,
}

/// Icons used for links that name a `type` but no explicit icon.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct IconConfig {
    pub website: String,
    pub github: String,
}

impl Default for FolioConfig {
    fn default() -> Self {
        FolioConfig {
            base: ".".to_string(),
            index: "index.html".to_string(),
            timeout_secs: 15,
            page: PageConfig::default(),
            cards: CardConfig::default(),
            icons: IconConfig::default(),
        }
    }
}

impl Default for PageConfig {
    fn default() -> Self {
        PageConfig {
            sections_host_id: "app-main".to_string(),
            sections_src: "data/sections.json".to_string(),
            legacy_gallery_id: "project-gallery-json".to_string(),
            legacy_gallery_src: "data/projects.json".to_string(),
            modal_id: "project-modal".to_string(),
            year_id: "y".to_string(),
        }
    }
}

impl Default for CardConfig {
    fn default() -> Self {
        CardConfig {
            placeholder_thumbnail: "assets/Wow-gif.gif".to_string(),
            details_label: "Details".to_string(),
        }
    }
}

impl Default for IconConfig {
    fn default() -> Self {
        IconConfig {
            website: "icons/globe.svg".to_string(),
            github: "icons/github.svg".to_string(),
        }
    }
}

impl IconConfig {
    /// Icon for a link `type`, if the type is one we know.
    pub fn for_type(&self, link_type: &str) -> Option<&str> {
        match link_type {
            "website" => Some(&self.website),
            "github" | "repo" => Some(&self.github),
            _ => None,
        }
    }
}

impl FolioConfig {
    /// Read the config from `FOLIO_CONFIG` (or `folio.toml`), then apply
    /// `FOLIO_BASE`. A missing file means defaults; a broken one is logged
    /// and ignored.
    pub fn load() -> Self {
        let path = std::env::var("FOLIO_CONFIG").unwrap_or_else(|_| CONFIG_FILE.to_string());
        let mut config = Self::from_file(Path::new(&path));
        if let Ok(base) = std::env::var("FOLIO_BASE") {
            if !base.trim().is_empty() {
                config.base = base.trim().to_string();
            }
        }
        config
    }

    pub fn from_file(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(s) => Self::parse(&s).unwrap_or_else(|e| {
                log::warn!("[config] {} is invalid ({}), using defaults", path.display(), e);
                Self::default()
            }),
            Err(_) => {
                log::info!("[config] {} not found, using defaults", path.display());
                Self::default()
            }
        }
    }

    pub fn parse(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| e.to_string())
    }

    pub fn is_remote(&self) -> bool {
        self.base.starts_with("http://") || self.base.starts_with("https://")
    }
}
