//! API key handling: the rotating [`CredentialPool`], the key-table
//! resolver, and the startup lookup across environment, keyring and config.

pub mod pool;
pub mod sources;
pub mod table;

pub use pool::{mask_key, CredentialPool};
pub use sources::{resolve_credentials, CredentialSource, ResolvedCredentials};
pub use table::{resolve_group, resolve_groups};
