use super::usage_notice;
use crate::commands::registry::CommandInvocation;
use crate::commands::CommandResult;
use crate::core::app::App;

const USAGE_EXPORT: &str = "/export [filename] [--force]";
const FORCE_FLAG: &str = "--force";

pub(crate) fn handle_export(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    let mut overwrite = false;
    let mut filename = None;
    for arg in invocation.args.split_whitespace() {
        if arg == FORCE_FLAG {
            overwrite = true;
        } else if filename.is_none() {
            filename = Some(arg);
        } else {
            return usage_notice(USAGE_EXPORT);
        }
    }

    // Relative names land in the export directory; absolute paths are kept.
    match app
        .session
        .export_to_dir(&app.export_dir, filename, overwrite)
    {
        Ok(path) => CommandResult::Notice(format!(
            "Conversation exported to {} ({} messages)",
            path.display(),
            app.session.history().len()
        )),
        Err(err) => CommandResult::Notice(format!("Export failed: {err}")),
    }
}
