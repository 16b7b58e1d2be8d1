//! flashchat is a full-screen terminal chat client for Gemini Flash models.
//!
//! The crate is organized around a small set of collaborating layers:
//! - [`core`] owns the conversation, the rotating API key pool, configuration,
//!   and the gateway that retries a prompt across keys.
//! - [`ui`] renders chat bubbles in the terminal and runs the interactive
//!   event loop that drives input, selection and copying.
//! - [`api`] defines the `generateContent` payloads exchanged with Gemini.
//! - [`utils`] holds clipboard, HTML export, logging and input helpers.
//!
//! Runtime entrypoints live in the binary crate (`src/main.rs`) and route
//! through [`crate::cli::main`], which loads configuration and dispatches into
//! [`ui::chat_loop`] for interactive sessions.

pub mod api;
pub mod cli;
pub mod core;
pub mod ui;
pub mod utils;
