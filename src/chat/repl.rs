//! Dispatch of classified input lines against a chat session.
//!
//! Reading lines from the terminal is left to the caller; everything after
//! that happens here so it can be driven from tests.

use crate::chat::commands::{COMMANDS, ChatCommand, Input, parse_input};
use crate::chat::session::ChatSession;
use crate::render::Renderer;

/// Whether the loop should keep reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line.
    Continue,
    /// The user asked to leave.
    Quit,
}

/// Handles one line of user input.
///
/// No failure escapes this function: request and file errors are rendered
/// and the loop continues.
pub async fn handle_line(
    session: &mut ChatSession,
    line: &str,
    renderer: &mut dyn Renderer,
) -> Flow {
    match parse_input(line) {
        Input::Empty => Flow::Continue,
        Input::Quit => {
            renderer.print_goodbye();
            Flow::Quit
        }
        Input::Command(command) => {
            handle_command(session, command, renderer);
            Flow::Continue
        }
        Input::Prompt(prompt) => {
            send_prompt(session, &prompt, renderer).await;
            Flow::Continue
        }
    }
}

/// Applies a slash command to the session.
pub fn handle_command(session: &mut ChatSession, command: ChatCommand, renderer: &mut dyn Renderer) {
    match command {
        ChatCommand::Help => renderer.print_help(COMMANDS),
        ChatCommand::Model(name) => match session.set_model(&name) {
            Ok(model) => renderer.print_info(&format!("Switched to model: {model}")),
            Err(err) => renderer.print_error(&err.to_string()),
        },
        ChatCommand::Save(path) => match session.save_reply_to(&path) {
            Ok(true) => renderer.print_info(&format!("Reply saved to {path}")),
            Ok(false) => renderer.print_warning("No reply to save yet."),
            Err(err) => renderer.print_error(&err.to_string()),
        },
        ChatCommand::Export(path) => match session.export_to(&path) {
            Ok(()) => renderer.print_info(&format!("Conversation exported to {path}")),
            Err(err) => renderer.print_error(&err.to_string()),
        },
        ChatCommand::History => {
            if session.history().is_empty() {
                renderer.print_warning("No history yet.");
            }
            for (index, exchange) in session.history().iter().enumerate() {
                renderer.print_exchange(index + 1, exchange);
            }
        }
        ChatCommand::System(instruction) => {
            renderer.print_info(&format!("System instruction set: {instruction}"));
            session.set_system_instruction(Some(instruction));
        }
        ChatCommand::Usage(hint) => renderer.print_warning(&format!("Usage: {hint}")),
    }
}

async fn send_prompt(session: &mut ChatSession, prompt: &str, renderer: &mut dyn Renderer) {
    renderer.start_thinking();
    let result = session.send(prompt).await;
    renderer.finish_thinking();
    match result {
        Ok(reply) if reply.is_empty() => renderer.print_warning("Gemini returned an empty reply."),
        Ok(reply) => renderer.print_reply(reply.as_str()),
        Err(err) => renderer.print_error(&err.to_string()),
    }
}
