//! State shared by the interactive chat loop and its slash commands.

use std::path::PathBuf;
use std::sync::Arc;

use crate::core::builtin_models::{default_model_id, model_catalog, BuiltinModel};
use crate::core::chat_stream::CompletionClient;
use crate::core::config::Config;
use crate::core::persona::{PersonaRegistry, UnknownPersonaError};
use crate::core::session::{
    clamp_temperature, SessionController, SessionSettings, DEFAULT_TEMPERATURE,
};

/// Startup choices taken from the command line. `None` falls back to the
/// config file and then to the built-in defaults.
#[derive(Debug, Clone, Default)]
pub struct AppInitConfig {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub persona: Option<String>,
}

pub struct App {
    pub session: SessionController,
    pub models: Vec<BuiltinModel>,
    pub export_dir: PathBuf,
}

/// Merge command-line choices, config defaults and built-ins.
pub fn resolve_settings(
    init: &AppInitConfig,
    config: &Config,
    personas: &PersonaRegistry,
) -> Result<SessionSettings, UnknownPersonaError> {
    let model = init
        .model
        .clone()
        .or_else(|| config.default_model.clone())
        .filter(|model| !model.trim().is_empty())
        .unwrap_or_else(default_model_id);

    let temperature = clamp_temperature(
        init.temperature
            .or(config.default_temperature)
            .unwrap_or(DEFAULT_TEMPERATURE),
    );

    let persona = match init.persona.as_deref().or(config.default_persona.as_deref()) {
        Some(name) => personas.get(name)?.name.clone(),
        None => personas.default_persona().name.clone(),
    };

    Ok(SessionSettings {
        model,
        temperature,
        persona,
    })
}

impl App {
    pub fn new(
        client: Arc<dyn CompletionClient>,
        config: &Config,
        init: &AppInitConfig,
    ) -> Result<Self, UnknownPersonaError> {
        let personas = Arc::new(PersonaRegistry::builtin());
        let settings = resolve_settings(init, config, &personas)?;
        let session = SessionController::new(client, personas, settings)?;
        Ok(Self {
            session,
            models: model_catalog(&config.models),
            export_dir: config
                .export_dir
                .clone()
                .unwrap_or_else(|| PathBuf::from(".")),
        })
    }

    pub fn find_model(&self, id: &str) -> Option<&BuiltinModel> {
        let id = id.trim();
        self.models
            .iter()
            .find(|model| model.id == id || model.id.eq_ignore_ascii_case(id))
    }

    /// One-line summary of the live settings.
    pub fn status_line(&self) -> String {
        let settings = self.session.settings();
        let persona = self.session.active_persona();
        format!(
            "Mode: {} {} | Model: {} | Temp: {:.2} | Messages: {}",
            persona.icon,
            persona.name,
            settings.model,
            settings.temperature,
            self.session.history().len()
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::session::tests::ScriptedClient;

    pub(crate) fn create_test_app() -> App {
        create_test_app_with(ScriptedClient::new())
    }

    pub(crate) fn create_test_app_with(client: Arc<ScriptedClient>) -> App {
        App::new(client, &Config::default(), &AppInitConfig::default()).expect("default app")
    }

    #[test]
    fn defaults_come_from_builtins() {
        let settings = resolve_settings(
            &AppInitConfig::default(),
            &Config::default(),
            &PersonaRegistry::builtin(),
        )
        .unwrap();
        assert_eq!(settings.model, "llama-3.3-70b-versatile");
        assert_eq!(settings.temperature, 0.7);
        assert_eq!(settings.persona, "Helpful Assistant");
    }

    #[test]
    fn command_line_overrides_config() {
        let config = Config {
            default_model: Some("llama-3.1-8b-instant".to_string()),
            default_temperature: Some(0.2),
            default_persona: Some("Zen Master".to_string()),
            ..Default::default()
        };
        let personas = PersonaRegistry::builtin();

        let settings = resolve_settings(&AppInitConfig::default(), &config, &personas).unwrap();
        assert_eq!(settings.model, "llama-3.1-8b-instant");
        assert_eq!(settings.temperature, 0.2);
        assert_eq!(settings.persona, "Zen Master");

        let init = AppInitConfig {
            model: Some("custom-model".to_string()),
            temperature: Some(3.0),
            persona: Some("grumpy pirate".to_string()),
        };
        let settings = resolve_settings(&init, &config, &personas).unwrap();
        assert_eq!(settings.model, "custom-model");
        assert_eq!(settings.temperature, 1.0);
        assert_eq!(settings.persona, "Grumpy Pirate");
    }

    #[test]
    fn unknown_persona_is_rejected_at_startup() {
        let init = AppInitConfig {
            persona: Some("Captain Nobody".to_string()),
            ..Default::default()
        };
        assert!(App::new(ScriptedClient::new(), &Config::default(), &init).is_err());
    }

    #[test]
    fn status_line_reflects_settings() {
        let app = create_test_app();
        assert_eq!(
            app.status_line(),
            "Mode: 🤖 Helpful Assistant | Model: llama-3.3-70b-versatile | Temp: 0.70 | Messages: 0"
        );
        assert!(app.find_model("LLAMA-3.1-8B-INSTANT").is_some());
        assert!(app.find_model("gpt-4o").is_none());
    }
}
