pub(super) mod config;
pub(super) mod core;
pub(super) mod io;

use crate::commands::CommandResult;

pub(super) fn usage_notice(usage: &'static str) -> CommandResult {
    CommandResult::Notice(format!("Usage: {usage}"))
}
