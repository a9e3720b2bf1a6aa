//! Built-in model catalog
//!
//! The models offered by the selector are loaded from `builtins/models.toml`
//! at build time. Extra ids from the user's config are appended after them.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltinModel {
    pub id: String,
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
struct BuiltinModelsConfig {
    models: Vec<BuiltinModel>,
}

/// Load built-in models from the embedded configuration
pub fn load_builtin_models() -> Vec<BuiltinModel> {
    const CONFIG_CONTENT: &str = include_str!("../builtins/models.toml");

    let config: BuiltinModelsConfig =
        toml::from_str(CONFIG_CONTENT).expect("Failed to parse builtins/models.toml");

    config.models
}

pub fn default_model_id() -> String {
    load_builtin_models()
        .into_iter()
        .next()
        .map(|model| model.id)
        .unwrap_or_default()
}

/// Built-in models followed by any extra ids, without duplicates.
pub fn model_catalog(extra: &[String]) -> Vec<BuiltinModel> {
    let mut models = load_builtin_models();
    for id in extra {
        let id = id.trim();
        if id.is_empty() || models.iter().any(|m| m.id == id) {
            continue;
        }
        models.push(BuiltinModel {
            id: id.to_string(),
            display_name: id.to_string(),
        });
    }
    models
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_builtin_models() {
        let ids: Vec<String> = load_builtin_models().into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["llama-3.3-70b-versatile", "llama-3.1-8b-instant"]);
        assert_eq!(default_model_id(), "llama-3.3-70b-versatile");
    }

    #[test]
    fn catalog_appends_extra_models_once() {
        let extra = vec![
            "mixtral-8x7b-32768".to_string(),
            "llama-3.1-8b-instant".to_string(),
            " ".to_string(),
        ];
        let catalog = model_catalog(&extra);
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog[2].id, "mixtral-8x7b-32768");
        assert_eq!(catalog[2].display_name, "mixtral-8x7b-32768");
    }
}
