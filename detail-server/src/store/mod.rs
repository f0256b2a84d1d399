//! 本地存储
//!
//! Two browser-side stores, modelled as ports:
//!
//! - [`KeyValueStore`]: async JSON blob store (offline mirror and UI state);
//!   [`RedbKvStore`] persists to `work_dir/localforage.redb`, [`MemoryKvStore`]
//!   backs tests.
//! - [`StorageArea`]: synchronous string store shared by every
//!   [`LocalStorage`] handle. A write through one handle raises a
//!   [`StorageEvent`](shared::message::StorageEvent) on every *other* handle.

mod error;
mod kv;
mod local_storage;

pub use error::{StoreError, StoreResult};
pub use kv::{KeyValueStore, MemoryKvStore, RedbKvStore};
pub use local_storage::{
    LocalStorage, MemoryBackend, RedbBackend, StorageArea, StorageBackend, StorageEvents,
};
