use std::fmt;

use crate::types::GenerateContentResponse;

/// Text shown in place of a reply when the response body has no text.
pub const NO_VALID_RESPONSE: &str = "⚠️ No valid response from Gemini.";

/// The outcome of a successful (HTTP 200) exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Text extracted from the first candidate, trimmed.
    Text(String),

    /// The body did not have the expected shape.
    ///
    /// Displays as [`NO_VALID_RESPONSE`] and is recorded like any other reply.
    Malformed,
}

impl Reply {
    /// Parse a 200 response body.
    ///
    /// Never fails: anything without `candidates[0].content.parts[0].text`,
    /// including bodies that are not JSON at all, becomes [`Reply::Malformed`].
    pub fn from_body(body: &str) -> Self {
        serde_json::from_str::<GenerateContentResponse>(body)
            .ok()
            .and_then(|response| response.text().map(|text| text.trim().to_string()))
            .map(Reply::Text)
            .unwrap_or(Reply::Malformed)
    }

    /// The text to show and record for this reply.
    pub fn as_str(&self) -> &str {
        match self {
            Reply::Text(text) => text,
            Reply::Malformed => NO_VALID_RESPONSE,
        }
    }

    /// Returns true if the response body could not be read.
    pub fn is_malformed(&self) -> bool {
        matches!(self, Reply::Malformed)
    }

    /// Returns true if there is nothing to show.
    pub fn is_empty(&self) -> bool {
        self.as_str().is_empty()
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_is_trimmed() {
        let body = r#"{"candidates": [{"content": {"parts": [{"text": "\n  Hello there!  \n"}]}}]}"#;
        assert_eq!(Reply::from_body(body), Reply::Text("Hello there!".to_string()));
    }

    #[test]
    fn missing_candidates_is_sentinel() {
        let reply = Reply::from_body(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#);
        assert!(reply.is_malformed());
        assert_eq!(reply.as_str(), NO_VALID_RESPONSE);
        assert_eq!(reply.to_string(), NO_VALID_RESPONSE);
    }

    #[test]
    fn wrong_types_are_sentinel() {
        assert!(Reply::from_body(r#"{"candidates": "nope"}"#).is_malformed());
        assert!(Reply::from_body(r#"{"candidates": [{"content": {"parts": [{"text": 7}]}}]}"#).is_malformed());
    }

    #[test]
    fn non_json_is_sentinel() {
        assert!(Reply::from_body("<html>oops</html>").is_malformed());
        assert!(Reply::from_body("").is_malformed());
    }

    #[test]
    fn whitespace_only_text_is_empty() {
        let body = r#"{"candidates": [{"content": {"parts": [{"text": "   "}]}}]}"#;
        let reply = Reply::from_body(body);
        assert!(!reply.is_malformed());
        assert!(reply.is_empty());
    }
}
