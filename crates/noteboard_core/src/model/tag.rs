//! Tag domain model.
//!
//! # Invariants
//! - Tag ids are unique; uniqueness is owned by the gateway.
//! - `color` is a `#RGB` or `#RRGGBB` hex string.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

static HEX_COLOR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#(?:[0-9a-fA-F]{3}|[0-9a-fA-F]{6})$").expect("valid hex color regex")
});

/// Opaque tag identifier issued by the gateway.
pub type TagId = String;

/// Named, colored label attachable to many notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub color: String,
}

/// Create request: a tag without id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagInput {
    pub name: String,
    pub color: String,
}

/// Validation failure for tag input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagValidationError {
    BlankName,
    InvalidColor(String),
}

impl Display for TagValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "tag name cannot be blank"),
            Self::InvalidColor(value) => {
                write!(f, "tag color must be a #RGB or #RRGGBB hex string, got `{value}`")
            }
        }
    }
}

impl Error for TagValidationError {}

impl TagInput {
    /// Unvalidated input; call `validate` before sending.
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: color.into(),
        }
    }

    /// Trims the name and checks the color format.
    pub fn validate(&self) -> Result<Self, TagValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(TagValidationError::BlankName);
        }
        let color = self.color.trim();
        if !HEX_COLOR_RE.is_match(color) {
            return Err(TagValidationError::InvalidColor(self.color.clone()));
        }
        Ok(Self {
            name: name.to_string(),
            color: color.to_string(),
        })
    }
}
