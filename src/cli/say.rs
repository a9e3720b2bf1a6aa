//! TUI-less "say" command

use std::error::Error;
use std::io::{self, Write};
use std::sync::Arc;

use crate::cli::resolve_session_or_exit;
use crate::core::app::{App, AppInitConfig};
use crate::core::chat_stream::HttpCompletionClient;
use crate::core::config::Config;
use crate::core::session::{TurnError, TurnOutcome};
use crate::ui::terminal::TerminalSink;

pub async fn run_say(prompt: Vec<String>, init: AppInitConfig) -> Result<(), Box<dyn Error>> {
    let prompt = prompt.join(" ");
    if prompt.trim().is_empty() {
        eprintln!("Usage: gyaan say <prompt>");
        std::process::exit(1);
    }

    let config = Config::load()?;
    let session = resolve_session_or_exit(&config);
    let mut app = App::new(Arc::new(HttpCompletionClient::new(session)), &config, &init)?;

    match say(&mut app, &prompt, io::stdout()).await? {
        TurnOutcome::Failed(err) => {
            eprintln!("❌ Error: {err}");
            std::process::exit(1);
        }
        _ => Ok(()),
    }
}

/// Run a single turn, writing the reply to `out` as it arrives.
pub(crate) async fn say<W: Write>(
    app: &mut App,
    prompt: &str,
    out: W,
) -> Result<TurnOutcome, TurnError> {
    let mut sink = TerminalSink::plain(out);
    app.session.submit(prompt, &mut sink).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::app::tests::create_test_app_with;
    use crate::core::chat_stream::CompletionError;
    use crate::core::session::tests::ScriptedClient;

    #[tokio::test]
    async fn prints_reply_without_marker() {
        let client = ScriptedClient::new();
        client.reply(&["Arr", ", scurvy!"]);
        let mut app = create_test_app_with(client.clone());
        app.session.set_persona("Grumpy Pirate").unwrap();

        let mut out = Vec::new();
        let outcome = say(&mut app, "hello", &mut out).await.unwrap();

        assert_eq!(outcome, TurnOutcome::Completed("Arr, scurvy!".to_string()));
        assert_eq!(String::from_utf8(out).unwrap(), "Arr, scurvy!\n");
        let call = &client.calls()[0];
        assert_eq!(
            call.context[0].content,
            "You are a grumpy pirate captain. complain about scurvy often."
        );
    }

    #[tokio::test]
    async fn reports_failure_to_caller() {
        let client = ScriptedClient::new();
        client.refuse(CompletionError::Status {
            status: 401,
            message: "API Error: Invalid API Key".to_string(),
        });
        let mut app = create_test_app_with(client);

        let mut out = Vec::new();
        let outcome = say(&mut app, "hello", &mut out).await.unwrap();

        assert!(matches!(outcome, TurnOutcome::Failed(CompletionError::Status { status: 401, .. })));
        assert!(out.is_empty());
    }
}
