//! Built-in persona registry
//!
//! Personas are compiled into the binary from `builtins/personas.toml`. A
//! persona only supplies the system prompt synthesized at the head of each
//! request; switching personas never rewrites stored history.

use serde::Deserialize;
use std::error::Error;
use std::fmt;

/// Avatar shown next to user messages.
pub const USER_ICON: &str = "👤";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Persona {
    pub name: String,
    pub system_prompt: String,
    pub icon: String,
}

#[derive(Debug, Deserialize)]
struct BuiltinPersonaConfig {
    personas: Vec<Persona>,
}

/// Raised when a persona name is not part of the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPersonaError {
    requested: String,
    available: Vec<String>,
}

impl UnknownPersonaError {
    pub fn requested(&self) -> &str {
        &self.requested
    }
}

impl fmt::Display for UnknownPersonaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Persona '{}' not found. Available personas: {}",
            self.requested,
            self.available.join(", ")
        )
    }
}

impl Error for UnknownPersonaError {}

/// Read-only lookup of the personas a session may select.
#[derive(Debug, Clone)]
pub struct PersonaRegistry {
    personas: Vec<Persona>,
}

impl PersonaRegistry {
    /// Registry holding the personas shipped with the binary.
    pub fn builtin() -> Self {
        const CONFIG_CONTENT: &str = include_str!("../builtins/personas.toml");
        let config: BuiltinPersonaConfig =
            toml::from_str(CONFIG_CONTENT).expect("Failed to parse builtins/personas.toml");
        Self::from_personas(config.personas)
    }

    pub fn from_personas(personas: Vec<Persona>) -> Self {
        assert!(!personas.is_empty(), "persona registry cannot be empty");
        Self { personas }
    }

    /// Personas in declaration order.
    pub fn list(&self) -> &[Persona] {
        &self.personas
    }

    pub fn default_persona(&self) -> &Persona {
        &self.personas[0]
    }

    /// Look up a persona by name. Exact matches win; otherwise the name is
    /// compared ignoring ASCII case so typed commands need not match casing.
    pub fn find(&self, name: &str) -> Option<&Persona> {
        let name = name.trim();
        self.personas
            .iter()
            .find(|p| p.name == name)
            .or_else(|| self.personas.iter().find(|p| p.name.eq_ignore_ascii_case(name)))
    }

    pub fn get(&self, name: &str) -> Result<&Persona, UnknownPersonaError> {
        self.find(name).ok_or_else(|| UnknownPersonaError {
            requested: name.to_string(),
            available: self.personas.iter().map(|p| p.name.clone()).collect(),
        })
    }

    /// Resolve a persona name into its `(system_prompt, icon)` pair.
    pub fn resolve(&self, name: &str) -> Result<(&str, &str), UnknownPersonaError> {
        self.get(name)
            .map(|persona| (persona.system_prompt.as_str(), persona.icon.as_str()))
    }
}

impl Default for PersonaRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
