pub mod app;
pub mod builtin_models;
pub mod chat_stream;
pub mod config;
pub mod conversation;
pub mod message;
pub mod persona;
pub mod providers;
pub mod session;
pub mod stream_assembler;
