//! Interactive terminal client for the Gemini API.
//!
//! # Usage
//!
//! ```bash
//! # GEMINI_API_KEY may also come from a .env file in the working directory
//! export GEMINI_API_KEY=...
//! terminallynx
//!
//! # Start on the pro model with a persona
//! terminallynx --model gemini-1.5-pro --system "You are a terse reviewer"
//! ```
//!
//! # Commands
//!
//! - `/help` - Show available commands
//! - `/model <name>` - Switch model
//! - `/save <file>` - Save the last reply
//! - `/export <file>` - Export the conversation
//! - `/history` - Show past exchanges
//! - `/system <text>` - Set a system instruction
//! - `exit` or `quit` - Leave

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing_subscriber::EnvFilter;

use terminallynx::Gemini;
use terminallynx::chat::{
    ChatArgs, ChatConfig, ChatSession, Flow, PlainTextRenderer, Renderer, handle_line,
};

const DEFAULT_LOG_FILTER: &str = "terminallynx=warn,reqwest=warn";

/// Main entry point for the terminallynx application.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let (args, _) = ChatArgs::from_command_line_relaxed("terminallynx [OPTIONS]");
    let config = ChatConfig::from(args);
    let mut renderer = PlainTextRenderer::with_color(config.use_color);

    let client = match Gemini::with_options(None, None, Some(config.timeout)) {
        Ok(client) => client.with_retry_policy(config.retry_policy()),
        Err(err) => {
            renderer.print_error(&err.to_string());
            std::process::exit(1);
        }
    };
    let mut session = ChatSession::new(client, config);
    let mut rl = DefaultEditor::new()?;

    renderer.print_banner(session.model());

    loop {
        match rl.readline(">>> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if !trimmed.is_empty() {
                    rl.add_history_entry(trimmed).ok();
                }
                if handle_line(&mut session, trimmed, &mut renderer).await == Flow::Quit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at the prompt discards the line
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                renderer.print_goodbye();
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}
