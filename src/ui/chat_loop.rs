//! Line-oriented interactive chat loop.
//!
//! Each input line is either a slash command, handled in place, or a message
//! that runs one turn of the session with the reply streamed to the terminal.

use std::error::Error;
use std::io::{self, Write};

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::commands::{process_input, CommandResult};
use crate::core::app::App;
use crate::core::persona::USER_ICON;
use crate::core::session::TurnOutcome;
use crate::ui::terminal::TerminalSink;

pub async fn run_chat(mut app: App) -> Result<(), Box<dyn Error>> {
    let stdin = BufReader::new(tokio::io::stdin());
    run_chat_with(&mut app, stdin, io::stdout()).await
}

/// Drive the chat loop until `/quit` or end of input.
pub async fn run_chat_with<R, W>(app: &mut App, input: R, mut out: W) -> Result<(), Box<dyn Error>>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    writeln!(out, "{}", app.status_line())?;
    writeln!(out, "Type /help for commands, /quit to leave.")?;

    loop {
        write!(out, "{USER_ICON} > ")?;
        out.flush()?;
        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };

        match process_input(app, &line) {
            CommandResult::Continue => {}
            CommandResult::Notice(text) => writeln!(out, "{text}")?,
            CommandResult::Quit => break,
            CommandResult::ProcessAsMessage(text) => {
                if text.trim().is_empty() {
                    continue;
                }
                send_message(app, &text, &mut out).await?;
            }
        }
    }

    debug!(
        messages = app.session.history().len(),
        "chat loop finished"
    );
    Ok(())
}

async fn send_message<W: Write>(app: &mut App, text: &str, out: &mut W) -> io::Result<()> {
    write!(out, "{} ", app.session.active_persona().icon)?;
    out.flush()?;

    let mut sink = TerminalSink::new(&mut *out);
    let outcome = app.session.submit(text, &mut sink).await;
    match outcome {
        Ok(TurnOutcome::Busy) => writeln!(out, "⏳ Still answering the previous message."),
        Ok(_) => Ok(()),
        Err(err) => writeln!(out, "\n❌ {err}"),
    }
}
