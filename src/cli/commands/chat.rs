//! Interactive chat command.

use super::open_components;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::Result;
use crate::pipeline::{Assistant, Session};
use console::style;
use std::io::{self, BufRead, Write};

/// Run the interactive chat command.
pub async fn run_chat(settings: Settings) -> Result<()> {
    // Pre-flight checks
    if let Err(e) = preflight::check(Operation::Ask) {
        Output::error(&format!("{}", e));
        Output::info("Run 'roost doctor' for detailed diagnostics.");
        return Err(e);
    }

    let (store, embedder) = open_components(&settings)?;
    let assistant = Assistant::from_settings(&settings, store, embedder)?;

    // Session lives for the duration of the chat loop and is dropped on exit.
    let mut session = Session::new();

    println!("\n{}", style("Roost Chat").bold().cyan());
    println!(
        "{}\n",
        style("Ask about poultry farming, or 'exit' to quit. Use 'clear' to reset conversation.")
            .dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = input.trim();

        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            Output::info("Goodbye!");
            break;
        }

        if input.eq_ignore_ascii_case("clear") {
            session.clear();
            Output::info("Conversation history cleared.");
            continue;
        }

        match assistant.answer(&mut session, input).await {
            Ok(composite) => {
                println!(
                    "\n{}\n{}\n",
                    style("Roost:").cyan().bold(),
                    composite.render()
                );
            }
            Err(e) => {
                Output::error(&format!("Error: {}", e));
            }
        }
    }

    Ok(())
}
