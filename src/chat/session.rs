//! Core chat session management.
//!
//! This module provides the `ChatSession` struct which owns the conversation
//! state and sends prompts through the Gemini client.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::Gemini;
use crate::chat::config::ChatConfig;
use crate::error::{Error, Result};
use crate::types::{GenerateContentRequest, Model, Reply};

/// One prompt and the reply it produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    /// What the user typed.
    pub prompt: String,
    /// What was shown back.
    pub reply: String,
}

/// A chat session that owns conversation state and API interactions.
///
/// Nothing here is persisted; the session lives as long as the process.
pub struct ChatSession {
    client: Gemini,
    model: Model,
    system_instruction: Option<String>,
    last_reply: Option<String>,
    history: Vec<Exchange>,
}

impl ChatSession {
    /// Creates a new chat session with the given client and configuration.
    pub fn new(client: Gemini, config: ChatConfig) -> Self {
        Self {
            client,
            model: config.model,
            system_instruction: config.system_instruction,
            last_reply: None,
            history: Vec::new(),
        }
    }

    /// Returns the current model.
    pub fn model(&self) -> Model {
        self.model
    }

    /// Switches to the model called `name`.
    ///
    /// Anything outside the allow-list leaves the session unchanged and
    /// returns [`Error::UnsupportedModel`], whose message lists the choices.
    pub fn set_model(&mut self, name: &str) -> Result<Model> {
        self.model = name.parse()?;
        Ok(self.model)
    }

    /// Returns the current system instruction, if any.
    pub fn system_instruction(&self) -> Option<&str> {
        self.system_instruction.as_deref()
    }

    /// Sets or clears the system instruction used by later prompts.
    pub fn set_system_instruction(&mut self, instruction: Option<String>) {
        self.system_instruction = instruction;
    }

    /// Returns the most recent recorded reply.
    pub fn last_reply(&self) -> Option<&str> {
        self.last_reply.as_deref()
    }

    /// Returns every recorded exchange, oldest first.
    pub fn history(&self) -> &[Exchange] {
        &self.history
    }

    /// Builds the request body for `prompt` from the current state.
    pub fn build_request(&self, prompt: &str) -> GenerateContentRequest {
        GenerateContentRequest::new(prompt).with_system_instruction(self.system_instruction())
    }

    /// Sends `prompt` without recording anything.
    pub async fn query(&self, prompt: &str) -> Result<Reply> {
        let request = self.build_request(prompt);
        self.client.generate(self.model, &request).await
    }

    /// Sends `prompt` and records the exchange on success.
    ///
    /// Failed requests leave history and the last reply untouched. A malformed
    /// response is recorded with its placeholder text; an empty one is not.
    pub async fn send(&mut self, prompt: &str) -> Result<Reply> {
        let reply = self.query(prompt).await?;
        self.record(prompt, &reply);
        Ok(reply)
    }

    fn record(&mut self, prompt: &str, reply: &Reply) {
        if reply.is_empty() {
            return;
        }
        let text = reply.as_str().to_string();
        self.history.push(Exchange {
            prompt: prompt.to_string(),
            reply: text.clone(),
        });
        self.last_reply = Some(text);
    }

    /// Writes the last reply verbatim to `path`, replacing any existing file.
    ///
    /// Returns `Ok(false)` without touching the filesystem when there is no
    /// reply yet.
    pub fn save_reply_to<P: AsRef<Path>>(&self, path: P) -> Result<bool> {
        let Some(reply) = self.last_reply() else {
            return Ok(false);
        };
        write_file(path.as_ref(), reply).map_err(|err| Error::io("Error saving file", err))?;
        Ok(true)
    }

    /// Writes the whole conversation to `path`, replacing any existing file.
    pub fn export_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_file(path.as_ref(), &self.transcript())
            .map_err(|err| Error::io("Error exporting file", err))
    }

    /// The conversation as `USER:`/`GEMINI:` blocks separated by blank lines.
    pub fn transcript(&self) -> String {
        self.history
            .iter()
            .map(|exchange| format!("USER: {}\nGEMINI: {}\n\n", exchange.prompt, exchange.reply))
            .collect()
    }
}

fn write_file(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(contents.as_bytes())?;
    writer.flush()
}
