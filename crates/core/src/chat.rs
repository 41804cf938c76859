//! Chat transport types: inbound events and the outbound message queue.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// A chat line as delivered by the transport, already split into sender and text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEvent {
    /// Display name as shown in chat, possibly with rank tags.
    pub sender: String,
    /// Raw message text.
    pub message: String,
}

impl ChatEvent {
    /// Build an event from a sender display name and message text.
    pub fn new(sender: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            message: message.into(),
        }
    }
}

/// Something the bot wants the transport to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// Post a message into the shared chat channel.
    Chat(String),
    /// Run a client command (e.g. `party <name>`).
    ClientCommand(String),
    /// Show a message to the local operator only.
    Notice(String),
}

impl Outbound {
    /// Text payload regardless of kind.
    pub fn text(&self) -> &str {
        match self {
            Self::Chat(text) | Self::ClientCommand(text) | Self::Notice(text) => text,
        }
    }
}

/// Sending half of the outbound queue.
///
/// Unbounded so that neither the dispatcher nor a finishing fetch task ever waits on
/// the transport. Cloned into every spawned fetch task.
#[derive(Debug, Clone)]
pub struct Outbox {
    tx: UnboundedSender<Outbound>,
}

impl Outbox {
    /// Create a new queue, returning the sender and the receiver the transport drains.
    pub fn channel() -> (Self, UnboundedReceiver<Outbound>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queue an arbitrary outbound item.
    pub fn send(&self, item: Outbound) {
        if self.tx.send(item).is_err() {
            tracing::debug!("outbound queue closed; dropping message");
        }
    }

    /// Post to the shared channel.
    pub fn chat(&self, text: impl Into<String>) {
        self.send(Outbound::Chat(text.into()));
    }

    /// Run a client command.
    pub fn client_command(&self, command: impl Into<String>) {
        self.send(Outbound::ClientCommand(command.into()));
    }

    /// Show a local-only notice.
    pub fn notice(&self, text: impl Into<String>) {
        self.send(Outbound::Notice(text.into()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queued_items_arrive_in_order() {
        let (outbox, mut rx) = Outbox::channel();
        outbox.chat("one");
        outbox.notice("two");
        outbox.client_command("party steve");
        assert_eq!(rx.try_recv().unwrap(), Outbound::Chat("one".into()));
        assert_eq!(rx.try_recv().unwrap(), Outbound::Notice("two".into()));
        assert_eq!(
            rx.try_recv().unwrap(),
            Outbound::ClientCommand("party steve".into())
        );
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn sending_after_receiver_dropped_is_harmless() {
        let (outbox, rx) = Outbox::channel();
        drop(rx);
        outbox.chat("nobody listening");
    }
}
