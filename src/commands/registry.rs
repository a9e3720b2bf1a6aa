use super::CommandResult;
use crate::core::app::App;

pub type CommandHandler = fn(&mut App, CommandInvocation<'_>) -> CommandResult;

pub struct Command {
    pub name: &'static str,
    pub usage: &'static str,
    pub help: &'static str,
    pub handler: CommandHandler,
}

#[derive(Clone, Copy)]
pub struct CommandInvocation<'a> {
    pub input: &'a str,
    pub args: &'a str,
}

impl<'a> CommandInvocation<'a> {
    pub fn arg(&self, index: usize) -> Option<&'a str> {
        self.args.split_whitespace().nth(index)
    }

    pub fn args_len(&self) -> usize {
        self.args.split_whitespace().count()
    }
}

pub fn all_commands() -> &'static [Command] {
    COMMANDS
}

pub fn find_command(name: &str) -> Option<&'static Command> {
    all_commands()
        .iter()
        .find(|command| command.name.eq_ignore_ascii_case(name))
}

const COMMANDS: &[Command] = &[
    Command {
        name: "help",
        usage: "/help",
        help: "Show available commands.",
        handler: super::handlers::core::handle_help,
    },
    Command {
        name: "status",
        usage: "/status",
        help: "Show the active persona, model, temperature and message count.",
        handler: super::handlers::core::handle_status,
    },
    Command {
        name: "clear",
        usage: "/clear",
        help: "Forget the conversation so far.",
        handler: super::handlers::core::handle_clear,
    },
    Command {
        name: "export",
        usage: "/export [filename] [--force]",
        help: "Save the conversation as JSON.",
        handler: super::handlers::io::handle_export,
    },
    Command {
        name: "persona",
        usage: "/persona [name]",
        help: "List personas or switch to one.",
        handler: super::handlers::config::handle_persona,
    },
    Command {
        name: "model",
        usage: "/model [id]",
        help: "List models or switch to one.",
        handler: super::handlers::config::handle_model,
    },
    Command {
        name: "temp",
        usage: "/temp [0.0-1.0]",
        help: "Show or set the sampling temperature.",
        handler: super::handlers::config::handle_temp,
    },
    Command {
        name: "quit",
        usage: "/quit",
        help: "Leave the chat.",
        handler: super::handlers::core::handle_quit,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_names_are_unique() {
        let mut names: Vec<_> = all_commands().iter().map(|c| c.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), all_commands().len());
    }

    #[test]
    fn lookup_ignores_case() {
        assert_eq!(find_command("EXPORT").map(|c| c.name), Some("export"));
        assert!(find_command("dump").is_none());
    }

    #[test]
    fn invocation_splits_args() {
        let invocation = CommandInvocation {
            input: "/export chat.json --force",
            args: "chat.json   --force",
        };
        assert_eq!(invocation.args_len(), 2);
        assert_eq!(invocation.arg(0), Some("chat.json"));
        assert_eq!(invocation.arg(1), Some("--force"));
        assert_eq!(invocation.arg(2), None);
    }
}
