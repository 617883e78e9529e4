//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior.

use std::time::Duration;

use arrrg_derive::CommandLine;
use tracing::warn;

use crate::client::{DEFAULT_TIMEOUT, RetryPolicy};
use crate::types::Model;

/// Command-line arguments for the terminallynx tool.
#[derive(CommandLine, Debug, Default, PartialEq, Eq)]
pub struct ChatArgs {
    /// Model to start with.
    #[arrrg(optional, "Model to use (default: gemini-1.5-flash)", "MODEL")]
    pub model: Option<String>,

    /// System instruction to start with.
    #[arrrg(optional, "System instruction for the conversation", "TEXT")]
    pub system: Option<String>,

    /// Attempts per prompt.
    #[arrrg(optional, "Attempts per prompt (default: 3)", "N")]
    pub max_attempts: Option<u32>,

    /// Pause between attempts.
    #[arrrg(optional, "Seconds between attempts (default: 2)", "SECS")]
    pub retry_delay_secs: Option<u64>,

    /// HTTP timeout.
    #[arrrg(optional, "Request timeout in seconds (default: 30)", "SECS")]
    pub timeout_secs: Option<u64>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,
}

/// Configuration for a chat session.
///
/// Resolved from command-line arguments with defaults filled in.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// The model to start with.
    pub model: Model,

    /// Optional system instruction to start with.
    pub system_instruction: Option<String>,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// Attempts per prompt, including the first.
    pub max_attempts: u32,

    /// Pause between attempts.
    pub retry_delay: Duration,

    /// HTTP request timeout.
    pub timeout: Duration,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Model: gemini-1.5-flash
    /// - Attempts: 3, two seconds apart
    /// - Timeout: 30 seconds
    /// - Color: enabled
    pub fn new() -> Self {
        let retry = RetryPolicy::default();
        Self {
            model: Model::default(),
            system_instruction: None,
            use_color: true,
            max_attempts: retry.max_attempts(),
            retry_delay: retry.delay(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: Model) -> Self {
        self.model = model;
        self
    }

    /// Sets the system instruction.
    pub fn with_system_instruction(mut self, instruction: String) -> Self {
        self.system_instruction = Some(instruction);
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Sets the number of attempts per prompt.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Sets the pause between attempts.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Sets the HTTP timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// The retry policy described by this configuration.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, self.retry_delay)
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        let model = match args.model {
            Some(name) => name.parse::<Model>().unwrap_or_else(|err| {
                warn!("{err}; using {}", Model::default());
                Model::default()
            }),
            None => Model::default(),
        };

        let defaults = ChatConfig::new();
        ChatConfig {
            model,
            system_instruction: args.system.filter(|s| !s.trim().is_empty()),
            use_color: !args.no_color,
            max_attempts: args.max_attempts.unwrap_or(defaults.max_attempts),
            retry_delay: args
                .retry_delay_secs
                .map_or(defaults.retry_delay, Duration::from_secs),
            timeout: args
                .timeout_secs
                .map_or(defaults.timeout, Duration::from_secs),
        }
    }
}
