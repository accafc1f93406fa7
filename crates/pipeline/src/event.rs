//! Ingestion input

use tokio::sync::oneshot;

/// One text event from a listener
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    /// Event line (see `line` for accepted formats)
    pub message: String,
    /// `key=value` tags
    pub tags: Vec<String>,
}

impl Event {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            tags: Vec::new(),
        }
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// Events delivered together, acknowledged once all are buffered
#[derive(Debug)]
pub struct EventBatch {
    pub events: Vec<Event>,
    ack: Option<oneshot::Sender<()>>,
}

impl EventBatch {
    /// Batch plus the receiver that resolves on acknowledgement
    pub fn new(events: Vec<Event>) -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                events,
                ack: Some(tx),
            },
            rx,
        )
    }

    /// Batch whose sender does not wait for acknowledgement
    pub fn unacknowledged(events: Vec<Event>) -> Self {
        Self { events, ack: None }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub(crate) fn acknowledge(&mut self) {
        if let Some(ack) = self.ack.take() {
            // sender may have stopped waiting
            let _ = ack.send(());
        }
    }
}
