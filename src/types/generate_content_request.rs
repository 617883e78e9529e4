use serde::{Deserialize, Serialize};

use crate::types::Content;

/// Body of a `generateContent` call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerateContentRequest {
    /// Content blocks in the order the model should read them.
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    /// Create a single-turn request for `prompt`.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            contents: vec![Content::text(prompt)],
        }
    }

    /// Prepend a system instruction block when one is set.
    ///
    /// The API has no role on these blocks, so the instruction is marked inline
    /// with a `[SYSTEM]: ` prefix.
    pub fn with_system_instruction(mut self, instruction: Option<&str>) -> Self {
        if let Some(instruction) = instruction {
            self.contents
                .insert(0, Content::text(format!("[SYSTEM]: {instruction}")));
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn single_turn_request() {
        let request = GenerateContentRequest::new("What is Rust?");
        assert_eq!(
            to_value(&request).unwrap(),
            json!({"contents": [{"parts": [{"text": "What is Rust?"}]}]})
        );
    }

    #[test]
    fn system_instruction_is_first_block() {
        let request =
            GenerateContentRequest::new("Hi").with_system_instruction(Some("Talk like a pirate"));
        assert_eq!(
            to_value(&request).unwrap(),
            json!({"contents": [
                {"parts": [{"text": "[SYSTEM]: Talk like a pirate"}]},
                {"parts": [{"text": "Hi"}]},
            ]})
        );
    }

    #[test]
    fn no_system_instruction() {
        let request = GenerateContentRequest::new("Hi").with_system_instruction(None);
        assert_eq!(request.contents.len(), 1);
    }
}
