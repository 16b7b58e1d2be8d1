pub mod config;
pub mod credentials;
pub mod gateway;
pub mod keyring;
pub mod message;
pub mod session;
