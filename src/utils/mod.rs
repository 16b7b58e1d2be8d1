pub mod clipboard;
pub mod html;
pub mod input;
pub mod logging;
pub mod url;
