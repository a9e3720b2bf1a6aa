use crate::core::builtin_models::{default_model_id, model_catalog};
use crate::core::config::Config;
use crate::core::persona::PersonaRegistry;

pub fn list_personas(registry: &PersonaRegistry) {
    let default = &registry.default_persona().name;
    println!("Available personas:\n");
    for persona in registry.list() {
        let suffix = if &persona.name == default {
            " (default)"
        } else {
            ""
        };
        println!("  {} {}{}", persona.icon, persona.name, suffix);
    }
    println!("\n💡 Start with a persona:");
    println!("   gyaan -p \"Zen Master\"");
}

pub fn list_models(config: &Config) {
    let default = config
        .default_model
        .clone()
        .unwrap_or_else(default_model_id);
    println!("Available models:\n");
    for model in model_catalog(&config.models) {
        let suffix = if model.id == default { " (default)" } else { "" };
        println!("  • {} - {}{}", model.id, model.display_name, suffix);
    }
    println!("\n💡 Add another model with:");
    println!("   gyaan set models <model-id>");
}
