//! 进程内事件总线
//!
//! Same-process counterpart of the storage-change event: a write made through
//! one local-storage handle is announced here so listeners sharing that
//! handle also refresh.

mod bus;

pub use bus::MessageBus;
pub use shared::message::{UiEvent, UiEventKind};
