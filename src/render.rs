//! Output rendering for the chat loop.
//!
//! This module provides the renderer trait and a plain-text implementation
//! that writes to stdout/stderr with optional ANSI styling.

use std::io::{self, Stdout, Write};

use crate::chat::Exchange;
use crate::types::Model;

/// ANSI escape code for bold text.
const ANSI_BOLD: &str = "\x1b[1m";

/// ANSI escape code for dim text (used for the thinking indicator).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code to clear the current line.
const ANSI_CLEAR_LINE: &str = "\r\x1b[2K";

/// ANSI escape code for red text (errors).
const ANSI_RED: &str = "\x1b[31m";

/// ANSI escape code for green text (replies).
const ANSI_GREEN: &str = "\x1b[32m";

/// ANSI escape code for yellow text (warnings, user prompts).
const ANSI_YELLOW: &str = "\x1b[33m";

/// ANSI escape code for blue text (banner).
const ANSI_BLUE: &str = "\x1b[34m";

/// ANSI escape code for magenta text (history).
const ANSI_MAGENTA: &str = "\x1b[35m";

/// ANSI escape code for cyan text (informational messages).
const ANSI_CYAN: &str = "\x1b[36m";

/// Trait for rendering chat output.
///
/// The chat loop never prints directly; everything the user sees goes through
/// a renderer so that tests can capture it.
pub trait Renderer: Send {
    /// Print the welcome banner.
    fn print_banner(&mut self, model: Model);

    /// Print the command reference as `(usage, description)` rows.
    fn print_help(&mut self, commands: &[(&str, &str)]);

    /// Called before a request is sent.
    fn start_thinking(&mut self) {}

    /// Called once the request has resolved, successfully or not.
    fn finish_thinking(&mut self) {}

    /// Print a model reply.
    fn print_reply(&mut self, reply: &str);

    /// Print one past exchange; `index` starts at 1.
    fn print_exchange(&mut self, index: usize, exchange: &Exchange);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Print a warning.
    fn print_warning(&mut self, warning: &str);

    /// Print an error message.
    fn print_error(&mut self, error: &str);

    /// Print the farewell message.
    fn print_goodbye(&mut self);
}

/// Plain text renderer with optional ANSI styling.
pub struct PlainTextRenderer {
    stdout: Stdout,
    use_color: bool,
    thinking: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self {
            stdout: io::stdout(),
            use_color,
            thinking: false,
        }
    }

    fn flush(&mut self) {
        let _ = self.stdout.flush();
    }

    fn paint(&self, color: &str, text: &str) -> String {
        if self.use_color {
            format!("{color}{text}{ANSI_RESET}")
        } else {
            text.to_string()
        }
    }

    fn heading(&self, color: &str, title: &str) -> String {
        let rule = format!("── {title} ──");
        if self.use_color {
            format!("{color}{ANSI_BOLD}{rule}{ANSI_RESET}")
        } else {
            rule
        }
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for PlainTextRenderer {
    fn print_banner(&mut self, model: Model) {
        println!("{}", self.heading(ANSI_BLUE, "Info"));
        println!("{}", self.paint(ANSI_CYAN, "Welcome to the Gemini CLI Browser"));
        println!("Model: {model}");
        println!("Type {} to quit", self.paint(ANSI_YELLOW, "exit"));
        println!("Type {} for commands\n", self.paint(ANSI_YELLOW, "/help"));
    }

    fn print_help(&mut self, commands: &[(&str, &str)]) {
        let width = commands.iter().map(|(usage, _)| usage.len()).max().unwrap_or(0);
        println!("{}", self.heading(ANSI_CYAN, "Available Commands"));
        for (usage, description) in commands {
            let padded = format!("{usage:<width$}");
            println!("  {}  {}", self.paint(ANSI_CYAN, &padded), description);
        }
    }

    fn start_thinking(&mut self) {
        if self.use_color {
            print!("{ANSI_DIM}Thinking...{ANSI_RESET}");
            self.thinking = true;
            self.flush();
        }
    }

    fn finish_thinking(&mut self) {
        if self.thinking {
            print!("{ANSI_CLEAR_LINE}");
            self.thinking = false;
            self.flush();
        }
    }

    fn print_reply(&mut self, reply: &str) {
        println!("{}", self.heading(ANSI_GREEN, "Gemini Reply"));
        println!("{reply}\n");
    }

    fn print_exchange(&mut self, index: usize, exchange: &Exchange) {
        println!("{}", self.heading(ANSI_MAGENTA, &format!("Exchange {index}")));
        println!("{} {}\n", self.paint(ANSI_YELLOW, "You:"), exchange.prompt);
        println!("{} {}\n", self.paint(ANSI_GREEN, "Gemini:"), exchange.reply);
    }

    fn print_info(&mut self, info: &str) {
        println!("{}", self.paint(ANSI_CYAN, info));
    }

    fn print_warning(&mut self, warning: &str) {
        println!("{}", self.paint(ANSI_YELLOW, warning));
    }

    fn print_error(&mut self, error: &str) {
        self.finish_thinking();
        eprintln!("{}", self.paint(ANSI_RED, &format!("Error: {error}")));
    }

    fn print_goodbye(&mut self) {
        println!("{}", self.paint(ANSI_RED, "Goodbye!"));
        self.flush();
    }
}
