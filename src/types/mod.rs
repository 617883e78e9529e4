// Public modules
pub mod content;
pub mod generate_content_request;
pub mod generate_content_response;
pub mod model;
pub mod reply;

// Re-exports
pub use content::{Content, Part};
pub use generate_content_request::GenerateContentRequest;
pub use generate_content_response::{
    Candidate, CandidateContent, CandidatePart, GenerateContentResponse,
};
pub use model::Model;
pub use reply::{NO_VALID_RESPONSE, Reply};
