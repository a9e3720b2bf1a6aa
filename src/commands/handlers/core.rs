use crate::commands::registry::{all_commands, CommandInvocation};
use crate::commands::CommandResult;
use crate::core::app::App;

pub(crate) fn handle_help(_app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    let width = all_commands()
        .iter()
        .map(|command| command.usage.len())
        .max()
        .unwrap_or(0);
    let mut help = String::from("Commands:");
    for command in all_commands() {
        help.push_str(&format!(
            "\n  {:<width$}  {}",
            command.usage,
            command.help,
            width = width
        ));
    }
    help.push_str("\nAnything else is sent to the assistant.");
    CommandResult::Notice(help)
}

pub(crate) fn handle_status(app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::Notice(app.status_line())
}

pub(crate) fn handle_clear(app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    app.session.clear();
    CommandResult::Notice("Conversation cleared.".to_string())
}

pub(crate) fn handle_quit(_app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    CommandResult::Quit
}
