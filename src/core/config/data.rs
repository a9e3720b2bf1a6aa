use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Model id used when `--model` is not given
    pub default_model: Option<String>,
    /// Creativity level in `[0.0, 1.0]` used when `--temperature` is not given
    pub default_temperature: Option<f32>,
    /// Persona name used when `--persona` is not given
    pub default_persona: Option<String>,
    /// OpenAI-compatible endpoint; `GROQ_BASE_URL` takes precedence
    pub base_url: Option<String>,
    /// Extra model ids offered next to the built-in ones
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub models: Vec<String>,
    /// Directory that `/export` writes into when no path is given
    pub export_dir: Option<PathBuf>,
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
