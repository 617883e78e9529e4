//! Chat application module for interactive conversations with Gemini.
//!
//! This module provides a REPL chat interface built on top of the client.
//! It supports:
//!
//! - Switching between the supported models
//! - A system instruction prepended to every prompt
//! - Saving the last reply and exporting the whole conversation
//! - Reviewing past exchanges
//!
//! # Architecture
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: Conversation state and API interaction
//! - [`commands`]: Input classification and slash command parsing
//! - [`repl`]: Dispatch of each input line against a session

mod commands;
mod config;
mod repl;
mod session;

pub use crate::render::{PlainTextRenderer, Renderer};
pub use commands::{COMMANDS, ChatCommand, Input, parse_command, parse_input};
pub use config::{ChatArgs, ChatConfig};
pub use repl::{Flow, handle_command, handle_line};
pub use session::{ChatSession, Exchange};
