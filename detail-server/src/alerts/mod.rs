//! 管理员告警
//!
//! # 通知通道
//!
//! ```text
//! AlertCenter::push_alert()
//!   ├─ LocalStorage::set_item("admin_alerts")  → StorageEvent (其他标签页)
//!   └─ MessageBus::publish(admin_alerts_updated) → UiEvent (同一进程)
//! ```
//!
//! A storage write never notifies the handle that made it, so the
//! same-process event is required for listeners sharing the writer's handle.
//! [`AlertFeed`] listens on both.
//!
//! # 状态
//!
//! `unread → read` (one-way), `unread | read → deleted`.

mod center;
mod feed;

pub use center::AlertCenter;
pub use feed::{AlertChange, AlertFeed};
