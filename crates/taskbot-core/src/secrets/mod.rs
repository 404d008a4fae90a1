//! Secret storage abstractions
//!
//! The bridge reads its gateway credentials through a `SecretStore` so the
//! client secret never has to live in a config file:
//! - `EnvSecretStore`: environment variables written by the deployment scripts
//! - `MemorySecretStore`: in-memory, for tests

mod traits;
mod env_store;
mod memory_store;

pub use traits::{SecretStore, SecretStoreError, SecretStoreResult};
pub use env_store::EnvSecretStore;
pub use memory_store::MemorySecretStore;
