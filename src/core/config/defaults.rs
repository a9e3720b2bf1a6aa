use crate::core::config::data::Config;
use crate::core::persona::PersonaRegistry;
use std::path::PathBuf;

/// Keys accepted by `gyaan set` / `gyaan unset`.
pub const CONFIG_KEYS: &[&str] = &[
    "default-model",
    "default-temperature",
    "default-persona",
    "base-url",
    "models",
    "export-dir",
];

impl Config {
    /// Set a key from its command-line spelling. Returns a confirmation line.
    pub fn set_value(
        &mut self,
        key: &str,
        value: &str,
        personas: &PersonaRegistry,
    ) -> Result<String, String> {
        let value = value.trim();
        if value.is_empty() {
            return Err(format!("A value is required for {key}"));
        }

        match key {
            "default-model" => {
                self.default_model = Some(value.to_string());
            }
            "default-temperature" => {
                let temperature = parse_temperature(value)?;
                self.default_temperature = Some(temperature);
            }
            "default-persona" => {
                let persona = personas.get(value).map_err(|e| e.to_string())?;
                self.default_persona = Some(persona.name.clone());
            }
            "base-url" => {
                self.base_url = Some(value.to_string());
            }
            "models" => {
                if !self.models.iter().any(|m| m == value) {
                    self.models.push(value.to_string());
                }
            }
            "export-dir" => {
                self.export_dir = Some(PathBuf::from(value));
            }
            _ => return Err(unknown_key(key)),
        }
        Ok(format!("Set {key} to: {value}"))
    }

    /// Unset a key. For `models`, `value` names the entry to drop; without one
    /// the whole list is cleared.
    pub fn unset_value(&mut self, key: &str, value: Option<&str>) -> Result<String, String> {
        match key {
            "default-model" => self.default_model = None,
            "default-temperature" => self.default_temperature = None,
            "default-persona" => self.default_persona = None,
            "base-url" => self.base_url = None,
            "models" => match value {
                Some(model) => {
                    let before = self.models.len();
                    self.models.retain(|m| m != model);
                    if self.models.len() == before {
                        return Err(format!("Model '{model}' is not in the models list"));
                    }
                    return Ok(format!("Removed {model} from models"));
                }
                None => self.models.clear(),
            },
            "export-dir" => self.export_dir = None,
            _ => return Err(unknown_key(key)),
        }
        Ok(format!("Unset {key}"))
    }
}

/// Parse a temperature, rejecting values outside `[0.0, 1.0]`.
pub fn parse_temperature(value: &str) -> Result<f32, String> {
    let temperature: f32 = value
        .trim()
        .parse()
        .map_err(|_| format!("Invalid temperature '{value}'; expected a number"))?;
    if !(0.0..=1.0).contains(&temperature) {
        return Err(format!(
            "Temperature {temperature} is out of range; expected 0.0 to 1.0"
        ));
    }
    Ok(temperature)
}

fn unknown_key(key: &str) -> String {
    format!(
        "Unknown config key: {key}. Valid keys: {}",
        CONFIG_KEYS.join(", ")
    )
}
