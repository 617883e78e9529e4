//! Input classification and slash command parsing.
//!
//! Every line typed at the prompt is one of: nothing, an exit request, a
//! slash command, or a prompt for the model.

/// A parsed chat command.
///
/// These commands control the chat session and are not sent to the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    /// Display help information.
    Help,

    /// Switch to another model.
    Model(String),

    /// Save the last reply to a file.
    Save(String),

    /// Export the whole conversation to a file.
    Export(String),

    /// Show past exchanges.
    History,

    /// Set the system instruction.
    System(String),

    /// A command was missing its argument; carries the usage hint.
    Usage(&'static str),
}

/// A classified line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Blank line.
    Empty,

    /// `exit` or `quit`, in any case.
    Quit,

    /// A recognized slash command.
    Command(ChatCommand),

    /// Anything else is sent to the model.
    Prompt(String),
}

/// Command reference rows shown by `/help`.
pub const COMMANDS: &[(&str, &str)] = &[
    (
        "/model NAME",
        "Switch model (gemini-1.5-flash / gemini-1.5-pro)",
    ),
    ("/save FILE", "Save last reply to file"),
    ("/export FILE", "Export full conversation to file"),
    ("/history", "Show past conversation"),
    ("/system TEXT", "Set a system instruction/persona"),
    ("/help", "Show this help menu"),
    ("exit/quit", "Exit the program"),
];

/// Classifies one line of user input.
///
/// Slash text that is not a known command is treated as a prompt.
pub fn parse_input(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        Input::Empty
    } else if line.eq_ignore_ascii_case("exit") || line.eq_ignore_ascii_case("quit") {
        Input::Quit
    } else if let Some(command) = parse_command(line) {
        Input::Command(command)
    } else {
        Input::Prompt(line.to_string())
    }
}

/// Parses user input for slash commands.
///
/// A line is a command when it starts with one of the command names; the
/// match is case-sensitive and checked in a fixed order, so `/helpme` is
/// still `/help`. The argument is everything after the first run of
/// whitespace. Returns `None` if the input should be treated as a regular
/// prompt.
///
/// # Examples
///
/// ```
/// # use terminallynx::chat::{ChatCommand, parse_command};
/// assert_eq!(parse_command("/history"), Some(ChatCommand::History));
/// assert!(parse_command("/model gemini-1.5-pro").is_some());
/// assert!(parse_command("Hello, Gemini!").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();
    let argument = input
        .split_once(char::is_whitespace)
        .map(|(_, rest)| rest.trim())
        .filter(|rest| !rest.is_empty())
        .map(str::to_string);

    let result = if input.starts_with("/help") {
        ChatCommand::Help
    } else if input.starts_with("/model") {
        argument.map_or(ChatCommand::Usage("/model MODEL_NAME"), ChatCommand::Model)
    } else if input.starts_with("/save") {
        argument.map_or(ChatCommand::Usage("/save filename.txt"), ChatCommand::Save)
    } else if input.starts_with("/export") {
        argument.map_or(
            ChatCommand::Usage("/export filename.txt"),
            ChatCommand::Export,
        )
    } else if input.starts_with("/history") {
        ChatCommand::History
    } else if input.starts_with("/system") {
        argument.map_or(ChatCommand::Usage("/system TEXT"), ChatCommand::System)
    } else {
        return None;
    };

    Some(result)
}
