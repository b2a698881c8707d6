//! Directory service integration.
//!
//! The reconciliation engine talks to the directory through the
//! [`DirectoryStore`] trait. Production uses the HTTP [`DirectoryClient`];
//! tests and dry-run rehearsals use [`MemoryDirectory`].

pub mod client;
pub mod error;
pub mod store;
pub mod types;

pub use client::DirectoryClient;
pub use error::DirectoryError;
pub use store::{DirectoryStore, MemoryDirectory};
pub use types::{
    normalize_directory, CustomSchemas, DirectoryUser, ExternalId, NewUser, SyncAttributes,
    UserName, UserPatch,
};
