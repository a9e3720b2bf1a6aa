//! Command-line interface parsing and handling
//!
//! This module handles parsing command-line arguments and executing the appropriate commands.

pub mod list;
pub mod say;

use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::cli::list::{list_models, list_personas};
use crate::cli::say::run_say;
use crate::core::app::{App, AppInitConfig};
use crate::core::chat_stream::HttpCompletionClient;
use crate::core::config::defaults::parse_temperature;
use crate::core::config::Config;
use crate::core::persona::PersonaRegistry;
use crate::core::providers::{load_dotenv, resolve_env_session, ProviderSession};
use crate::ui::chat_loop::run_chat;
use crate::utils::logging::init_tracing;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("VERGEN_GIT_SHA"),
    ", built ",
    env!("VERGEN_BUILD_DATE"),
    ")"
);

#[derive(Parser)]
#[command(name = "gyaan")]
#[command(version, long_version = LONG_VERSION)]
#[command(about = "A terminal chat client that streams replies from Groq-hosted models")]
#[command(
    long_about = "Gyaan is a line-oriented terminal chat client. Replies stream in as they are \
generated, and a persona sets the assistant's voice.\n\n\
Environment Variables:\n\
  GROQ_API_KEY      Your API key (required; also read from a .env file)\n\
  GROQ_BASE_URL     Custom API base URL (optional, defaults to https://api.groq.com/openai/v1)\n\
  RUST_LOG          Diagnostic verbosity (defaults to warn)\n\n\
Commands:\n\
  /help             List chat commands\n\
  /persona [name]   List personas or switch to one\n\
  /export [file]    Save the conversation as JSON\n\
  /quit             Leave the chat"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Model to chat with
    #[arg(short = 'm', long, global = true, value_name = "MODEL")]
    pub model: Option<String>,

    /// Sampling temperature between 0.0 and 1.0
    #[arg(short = 't', long, global = true, value_name = "TEMP", value_parser = parse_temperature)]
    pub temperature: Option<f32>,

    /// Persona to start with
    #[arg(short = 'p', long, global = true, value_name = "PERSONA")]
    pub persona: Option<String>,

    /// Write diagnostics to this file instead of stderr
    #[arg(short = 'l', long, global = true, value_name = "FILE")]
    pub log: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Send a single prompt and print the reply
    Say {
        /// Prompt text
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        prompt: Vec<String>,
    },
    /// List built-in personas
    Personas,
    /// List known models
    Models,
    /// Set configuration values, or show them when no value is given
    Set {
        /// Configuration key to set
        key: String,
        /// Value to set for the key (can be multiple words)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        value: Vec<String>,
    },
    /// Unset configuration values
    Unset {
        /// Configuration key to unset
        key: String,
        /// Entry to remove, for list-valued keys
        value: Option<String>,
    },
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_tracing(args.log.as_deref())?;
    load_dotenv();
    tokio::runtime::Runtime::new()?.block_on(async_main(args))
}

async fn async_main(args: Args) -> Result<(), Box<dyn Error>> {
    let init = AppInitConfig {
        model: args.model,
        temperature: args.temperature,
        persona: args.persona,
    };

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            let config = Config::load()?;
            let session = resolve_session_or_exit(&config);
            let client = Arc::new(HttpCompletionClient::new(session));
            let app = App::new(client, &config, &init)?;
            run_chat(app).await
        }
        Commands::Say { prompt } => run_say(prompt, init).await,
        Commands::Personas => {
            list_personas(&PersonaRegistry::builtin());
            Ok(())
        }
        Commands::Models => {
            let config = Config::load()?;
            list_models(&config);
            Ok(())
        }
        Commands::Set { key, value } => {
            let mut config = Config::load()?;
            if value.is_empty() {
                config.print_all();
                return Ok(());
            }
            match config.set_value(&key, &value.join(" "), &PersonaRegistry::builtin()) {
                Ok(message) => {
                    config.save()?;
                    println!("✅ {message}");
                    Ok(())
                }
                Err(message) => {
                    eprintln!("❌ {message}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Unset { key, value } => {
            let mut config = Config::load()?;
            match config.unset_value(&key, value.as_deref()) {
                Ok(message) => {
                    config.save()?;
                    println!("✅ {message}");
                    Ok(())
                }
                Err(message) => {
                    eprintln!("❌ {message}");
                    std::process::exit(1);
                }
            }
        }
    }
}

/// Resolve credentials from the environment, or explain the fix and exit.
pub(crate) fn resolve_session_or_exit(config: &Config) -> ProviderSession {
    match resolve_env_session(config) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("{err}");
            let fixes = err.quick_fixes();
            if !fixes.is_empty() {
                eprintln!();
                eprintln!("💡 Quick fixes:");
                for fix in fixes {
                    eprintln!("  • {fix}");
                }
            }
            std::process::exit(err.exit_code());
        }
    }
}
