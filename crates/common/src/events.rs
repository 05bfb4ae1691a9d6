use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::drive::{Activity, Fid};

/// An audit log entry published after a mutation completed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainEvent {
    pub node: Fid,
    pub activity: Activity,
}

/// Fire-and-forget sink for domain events
pub trait EventPublisher: Send + Sync + Debug {
    fn publish(&self, event: DomainEvent);
}

/// Drops every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPublisher;

impl EventPublisher for NoopPublisher {
    fn publish(&self, _event: DomainEvent) {}
}

/// Logs every event at debug level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingPublisher;

impl EventPublisher for TracingPublisher {
    fn publish(&self, event: DomainEvent) {
        tracing::debug!(
            node = %event.node,
            kind = %event.activity.kind(),
            actor = %event.activity.actor(),
            "drive event"
        );
    }
}

/// Forwards events into an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelPublisher {
    tx: flume::Sender<DomainEvent>,
}

impl ChannelPublisher {
    pub fn new() -> (Self, flume::Receiver<DomainEvent>) {
        let (tx, rx) = flume::unbounded();
        (Self { tx }, rx)
    }
}

impl EventPublisher for ChannelPublisher {
    fn publish(&self, event: DomainEvent) {
        // nobody listening is fine
        if self.tx.send(event).is_err() {
            tracing::trace!("event receiver dropped");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drive::{Stamp, UserId};

    #[test]
    fn test_channel_publisher() {
        let (publisher, rx) = ChannelPublisher::new();
        let event = DomainEvent {
            node: Fid::from("n1"),
            activity: Activity::Created {
                stamp: Stamp::now(&UserId::from("alice")),
                name: "docs".to_string(),
                dir: true,
            },
        };
        publisher.publish(event.clone());
        assert_eq!(rx.try_recv().unwrap(), event);

        drop(rx);
        publisher.publish(event);
    }
}
