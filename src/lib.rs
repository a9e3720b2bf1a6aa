//! Gyaan is a terminal chat client that streams replies from an
//! OpenAI-compatible chat completions service.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the persona registry, conversation store, completion
//!   adapter, stream assembly and the per-session controller.
//! - [`ui`] runs the line-oriented chat loop and renders streamed replies.
//! - [`commands`] implements slash-command parsing and execution used by the
//!   chat loop.
//! - [`api`] defines the chat payloads exchanged with the service.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`].

pub mod api;
pub mod cli;
pub mod commands;
pub mod core;
pub mod ui;
pub mod utils;
