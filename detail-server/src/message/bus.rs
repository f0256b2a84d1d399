use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use shared::message::UiEvent;

const DEFAULT_CAPACITY: usize = 1024;

/// 消息总线 - UI 刷新事件广播
#[derive(Debug, Clone)]
pub struct MessageBus {
    tx: broadcast::Sender<UiEvent>,
    shutdown_token: CancellationToken,
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self {
            tx,
            shutdown_token: CancellationToken::new(),
        }
    }

    /// 发布事件，返回收到事件的订阅者数量
    ///
    /// Publishing with nobody listening is not an error.
    pub fn publish(&self, event: UiEvent) -> usize {
        tracing::debug!(kind = %event.kind, "Publishing UI event");
        self.tx.send(event).unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.tx.subscribe()
    }

    /// 获取关闭令牌
    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.shutdown_token
    }

    pub fn shutdown(&self) {
        self.shutdown_token.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::message::UiEventKind;

    #[tokio::test]
    async fn test_publish_reaches_subscribers() {
        let bus = MessageBus::new();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        assert_eq!(bus.publish(UiEvent::content_changed("homepage_content")), 2);

        for rx in [&mut rx1, &mut rx2] {
            let event = rx.recv().await.unwrap();
            assert_eq!(event.kind, UiEventKind::ContentChanged);
        }
    }

    #[test]
    fn test_publish_without_listeners() {
        let bus = MessageBus::new();
        assert_eq!(bus.publish(UiEvent::alerts_updated()), 0);
    }
}
