use std::fmt;

/// Every failure the composition pipeline can report.
/// None of these are fatal to a page: callers log them and carry on.
#[derive(Debug, Clone, PartialEq)]
pub enum FolioError {
    /// Network/file failure, non-success status, or undecodable JSON.
    Load { url: String, reason: String },
    /// A configuration entry that cannot be acted on.
    Configuration(String),
    /// Markup missing the structure an operation expects.
    Structure(String),
}

impl FolioError {
    pub fn load(url: &str, reason: impl Into<String>) -> Self {
        FolioError::Load {
            url: url.to_string(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FolioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FolioError::Load { url, reason } => write!(f, "Failed to load {}: {}", url, reason),
            FolioError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            FolioError::Structure(msg) => write!(f, "Structure error: {}", msg),
        }
    }
}

impl std::error::Error for FolioError {}
