//! Terminal UI layer for the interactive chat.
//!
//! - [`chat_loop`]: the event loop that reads keys, dispatches prompts through
//!   [`crate::core::gateway`], and applies replies to the session.
//! - [`state`]: selection, scrolling and status around a
//!   [`crate::core::session::ChatSession`].
//! - [`layout`], [`markdown`] and [`bidi`]: bubble composition, including
//!   right-to-left handling.
//! - [`renderer`] and [`theme`]: frame output and colors.

pub mod bidi;
pub mod chat_loop;
pub mod layout;
pub mod markdown;
pub mod renderer;
pub mod state;
pub mod theme;
