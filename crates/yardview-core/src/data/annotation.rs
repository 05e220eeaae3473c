use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A note attached to an equipment tag.
///
/// Text storage and editing belong to the application; the scene only uses
/// annotations to place label overlays above their equipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub tag: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

impl Annotation {
    pub fn new(tag: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            text: text.into(),
            created_at: Utc::now(),
        }
    }

    /// Label text as drawn: first line only, trimmed.
    pub fn headline(&self) -> &str {
        self.text.lines().next().unwrap_or("").trim()
    }
}
