use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// A Gemini model that the client is allowed to talk to.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Model {
    /// Gemini 1.5 Flash
    #[default]
    Gemini15Flash,

    /// Gemini 1.5 Pro
    Gemini15Pro,
}

impl Model {
    /// Every supported model, in the order they are listed to users.
    pub const ALL: [Model; 2] = [Model::Gemini15Flash, Model::Gemini15Pro];

    /// The identifier used in the API path.
    pub fn as_str(&self) -> &'static str {
        match self {
            Model::Gemini15Flash => "gemini-1.5-flash",
            Model::Gemini15Pro => "gemini-1.5-pro",
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Model {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Model::ALL
            .into_iter()
            .find(|model| model.as_str() == s)
            .ok_or_else(|| Error::unsupported_model(s))
    }
}
