//! # Store Collaborators
//!
//! Seams to the record store (post and settings rows) and the blob store
//! (uploaded media). The managers only see the traits; the process entry
//! point picks an implementation.
//!
//! - `SupabaseClient`: PostgREST tables and the Storage object API
//! - `MemoryRecordStore` / `MemoryBlobStore`: in-process, for tests and local runs

pub mod blob;
pub mod errors;
pub mod memory;
pub mod record;
pub mod supabase;

pub use blob::BlobStore;
pub use errors::{StoreError, StoreResult};
pub use memory::{MemoryBlobStore, MemoryRecordStore};
pub use record::{PostStore, SettingsStore};
pub use supabase::{SupabaseClient, SupabaseConfig};
