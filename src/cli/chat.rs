use anyhow::{Context, Result};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::chat::{ChatSession, ClearOutcome, DisplayMessage, MessageKind, SendOutcome};
use crate::core::AppConfig;

use super::{api_client, session_store};

const CLEAR_HINT: &str = "This conversation is getting long. Type /clear to start fresh.";

/// Formats a message for the terminal with citations as a numbered
/// list under the text.
pub fn render_message(msg: &DisplayMessage, leader_name: Option<&str>) -> String {
    let mut out = match msg.kind {
        MessageKind::User => format!("You: {}", msg.text),
        MessageKind::Ai => format!("{}: {}", leader_name.unwrap_or("Leader"), msg.text),
        // Error text carries its own wording
        MessageKind::Error => msg.text.clone(),
        MessageKind::System => format!("System: {}", msg.text),
    };
    if !msg.citations.is_empty() {
        out.push_str("\n  Citations:");
        for (i, citation) in msg.citations.iter().enumerate() {
            out.push_str(&format!("\n  [{}] {}", i + 1, citation));
        }
    }
    out
}

fn print_from(session: &ChatSession, printed: &mut usize, skip_user: bool) {
    let messages = session.messages();
    let leader_name = session.leader_name();
    for msg in messages.iter().skip(*printed) {
        // The user's own line is already on screen
        if skip_user && msg.kind == MessageKind::User {
            continue;
        }
        println!("{}\n", render_message(msg, leader_name.as_deref()));
    }
    *printed = messages.len();
}

pub async fn run(config: &AppConfig, leader_id: &str) -> Result<()> {
    let mut rl = DefaultEditor::new().context("Editor failed")?;

    let session = ChatSession::builder(api_client(config), session_store(config).await, leader_id)
        .clear_prompt_threshold(config.clear_prompt_threshold)
        .build();

    session
        .open()
        .await
        .context("Not authorized, check LEADERCHAT_AUTH_TOKEN")?;

    let mut printed = 0;
    let mut hinted = false;
    print_from(&session, &mut printed, false);

    loop {
        let readline = rl.readline(">>> ");
        match readline {
            Ok(line) => {
                let line = line.trim();
                match line {
                    "" => continue,
                    "/quit" | "/exit" => break,
                    "/clear" => {
                        let outcome = session.clear().await?;
                        if outcome == ClearOutcome::Cleared {
                            printed = 0;
                            hinted = false;
                        }
                        print_from(&session, &mut printed, false);
                    }
                    _ => {
                        let _ = rl.add_history_entry(line);
                        match session.send(line).await? {
                            SendOutcome::Busy => println!("Still waiting on the last reply."),
                            _ => print_from(&session, &mut printed, true),
                        }
                        if !hinted && session.should_prompt_clear() {
                            println!("{}\n", CLEAR_HINT);
                            hinted = true;
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}
