use serde::Deserialize;

/// Response body of a `generateContent` call.
///
/// Every field is optional so that an unexpected shape still deserializes and
/// can be reported as "no text" instead of a hard error.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct GenerateContentResponse {
    /// Generated candidates; the first one is used.
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

/// A single generated candidate.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Candidate {
    /// Generated content.
    #[serde(default)]
    pub content: Option<CandidateContent>,
}

/// Content of a generated candidate.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct CandidateContent {
    /// Generated parts.
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

/// A generated part. Non-text parts have no `text`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct CandidatePart {
    /// Generated text.
    #[serde(default)]
    pub text: Option<String>,
}

impl GenerateContentResponse {
    /// The text of `candidates[0].content.parts[0]`, if present.
    pub fn text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}
