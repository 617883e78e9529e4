use serde::{Deserialize, Serialize};

/// A single text segment inside a content block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Part {
    /// The text content.
    pub text: String,
}

/// A role-free content block made of one or more parts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Content {
    /// The parts of this block.
    pub parts: Vec<Part>,
}

impl Content {
    /// Create a content block holding a single text part.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            parts: vec![Part { text: text.into() }],
        }
    }
}
