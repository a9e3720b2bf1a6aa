use crate::core::config::Config;
use std::error::Error;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, warn};

pub const API_KEY_ENV: &str = "GROQ_API_KEY";
pub const BASE_URL_ENV: &str = "GROQ_BASE_URL";
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

const QUICK_FIXES: &[&str] = &[
    "export GROQ_API_KEY=gsk_...                      # Set your API key",
    "echo 'GROQ_API_KEY=gsk_...' >> .env              # Or keep it in a .env file",
    "export GROQ_BASE_URL=https://host/openai/v1      # Optional: another compatible endpoint",
];

/// Credentials and endpoint used for every completion call of a session.
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderSession {
    pub api_key: String,
    pub base_url: String,
}

impl fmt::Debug for ProviderSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSession")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[derive(Debug)]
pub struct ProviderResolutionError {
    message: String,
    quick_fixes: &'static [&'static str],
    exit_code: i32,
}

impl ProviderResolutionError {
    pub fn missing_authentication() -> Self {
        Self::new(
            format!(
                "❌ API Key Missing! The {API_KEY_ENV} environment variable is not set.\n\nSet it before starting a chat, or check your .env file:\n   export {API_KEY_ENV}=\"your-api-key-here\""
            ),
            QUICK_FIXES,
            2,
        )
    }

    fn new(
        message: impl Into<String>,
        quick_fixes: &'static [&'static str],
        exit_code: i32,
    ) -> Self {
        Self {
            message: message.into(),
            quick_fixes,
            exit_code,
        }
    }

    pub fn quick_fixes(&self) -> &'static [&'static str] {
        self.quick_fixes
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }
}

impl fmt::Display for ProviderResolutionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for ProviderResolutionError {}

/// Load `KEY=value` pairs from a `.env` file in the working directory or one
/// of its parents. Variables already set in the environment are kept.
pub fn load_dotenv() -> Option<PathBuf> {
    report_dotenv(dotenvy::dotenv())
}

fn report_dotenv(result: Result<PathBuf, dotenvy::Error>) -> Option<PathBuf> {
    match result {
        Ok(path) => {
            debug!(path = %path.display(), "loaded .env");
            Some(path)
        }
        Err(err) if err.not_found() => None,
        Err(err) => {
            warn!(error = %err, "ignoring unreadable .env file");
            None
        }
    }
}

/// Resolve the session credentials from the process environment.
pub fn resolve_env_session(config: &Config) -> Result<ProviderSession, ProviderResolutionError> {
    resolve_session_with(|name| std::env::var(name).ok(), config)
}

/// Resolve credentials through `lookup`. A blank key counts as missing; the
/// base URL comes from the environment, then the config, then the default.
pub fn resolve_session_with<F>(
    lookup: F,
    config: &Config,
) -> Result<ProviderSession, ProviderResolutionError>
where
    F: Fn(&str) -> Option<String>,
{
    let api_key = lookup(API_KEY_ENV)
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .ok_or_else(ProviderResolutionError::missing_authentication)?;

    let base_url = lookup(BASE_URL_ENV)
        .filter(|url| !url.trim().is_empty())
        .or_else(|| config.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    Ok(ProviderSession { api_key, base_url })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn missing_key_is_fatal_with_quick_fixes() {
        let err = resolve_session_with(env(&[]), &Config::default()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(!err.quick_fixes().is_empty());
        assert!(err.to_string().contains(API_KEY_ENV));
        assert!(err.to_string().contains(".env"));
        assert!(err.quick_fixes().iter().any(|fix| fix.contains(".env")));
    }

    #[test]
    fn dotenv_file_supplies_credentials() {
        let temp_dir = TempDir::new().expect("temp dir");
        let path = temp_dir.path().join(".env");
        std::fs::write(
            &path,
            "# local secrets\nGROQ_API_KEY=gsk_from_file\nGROQ_BASE_URL=\"http://127.0.0.1:9/v1\"\n",
        )
        .unwrap();

        let vars: HashMap<String, String> = dotenvy::from_path_iter(&path)
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        let session =
            resolve_session_with(|name| vars.get(name).cloned(), &Config::default()).unwrap();
        assert_eq!(session.api_key, "gsk_from_file");
        assert_eq!(session.base_url, "http://127.0.0.1:9/v1");
    }

    #[test]
    fn missing_dotenv_file_is_not_an_error() {
        let temp_dir = TempDir::new().expect("temp dir");
        let missing = dotenvy::from_path(temp_dir.path().join(".env")).map(|()| PathBuf::new());
        assert_eq!(report_dotenv(missing), None);

        let path = temp_dir.path().join("found.env");
        assert_eq!(report_dotenv(Ok(path.clone())), Some(path));
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let result = resolve_session_with(env(&[(API_KEY_ENV, "   ")]), &Config::default());
        assert!(result.is_err());
    }

    #[test]
    fn base_url_prefers_env_then_config_then_default() {
        let config = Config {
            base_url: Some("https://config.example/v1".to_string()),
            ..Default::default()
        };

        let session = resolve_session_with(env(&[(API_KEY_ENV, "k")]), &Config::default())
            .expect("session");
        assert_eq!(session.base_url, DEFAULT_BASE_URL);

        let session = resolve_session_with(env(&[(API_KEY_ENV, "k")]), &config).expect("session");
        assert_eq!(session.base_url, "https://config.example/v1");

        let session = resolve_session_with(
            env(&[(API_KEY_ENV, " k "), (BASE_URL_ENV, "https://env.example/v1")]),
            &config,
        )
        .expect("session");
        assert_eq!(session.base_url, "https://env.example/v1");
        assert_eq!(session.api_key, "k");
    }

    #[test]
    fn debug_output_redacts_key() {
        let session = ProviderSession {
            api_key: "secret".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        };
        assert!(!format!("{session:?}").contains("secret"));
    }
}
