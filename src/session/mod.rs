//! Authenticated identity and its durable credential pair.

pub mod storage;
pub mod store;

pub use storage::{CredentialStore, FileStore, MemoryStore, TokenSource};
pub use store::SessionStore;
