use super::usage_notice;
use crate::commands::registry::CommandInvocation;
use crate::commands::CommandResult;
use crate::core::app::App;
use crate::core::config::defaults::parse_temperature;

const USAGE_TEMP: &str = "/temp [0.0-1.0]";

pub(crate) fn handle_persona(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    if invocation.args.is_empty() {
        let active = app.session.settings().persona.clone();
        let mut listing = String::from("Personas:");
        for persona in app.session.personas().list() {
            let marker = if persona.name == active { "*" } else { " " };
            listing.push_str(&format!("\n {marker} {} {}", persona.icon, persona.name));
        }
        return CommandResult::Notice(listing);
    }

    match app.session.set_persona(invocation.args) {
        Ok(persona) => {
            CommandResult::Notice(format!("Persona set: {} {}", persona.icon, persona.name))
        }
        Err(err) => CommandResult::Notice(err.to_string()),
    }
}

pub(crate) fn handle_model(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    if invocation.args.is_empty() {
        let active = app.session.settings().model.clone();
        let mut listing = String::from("Models:");
        for model in &app.models {
            let marker = if model.id == active { "*" } else { " " };
            listing.push_str(&format!("\n {marker} {} ({})", model.id, model.display_name));
        }
        return CommandResult::Notice(listing);
    }

    // Ids outside the catalog are passed through; the service decides.
    let model_id = match app.find_model(invocation.args) {
        Some(model) => model.id.clone(),
        None => invocation.args.to_string(),
    };
    app.session.set_model(model_id.clone());
    CommandResult::Notice(format!("Model set: {model_id}"))
}

pub(crate) fn handle_temp(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    if invocation.args.is_empty() {
        return CommandResult::Notice(format!(
            "Temperature: {:.2}",
            app.session.settings().temperature
        ));
    }
    if invocation.args_len() != 1 {
        return usage_notice(USAGE_TEMP);
    }

    match parse_temperature(invocation.args) {
        Ok(value) => {
            let applied = app.session.set_temperature(value);
            CommandResult::Notice(format!("Temperature set: {applied:.2}"))
        }
        Err(message) => CommandResult::Notice(message),
    }
}
