//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! [`EventBus`] is the publish/subscribe hub for [`TemplateEvent`]s. It is
//! designed to be shared via `Arc<EventBus>` between the editor and any
//! view that lists templates.

use casetpl_core::TemplateId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// TemplateEvent
// ---------------------------------------------------------------------------

/// What happened to the template set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateChange {
    Created,
    Updated,
    Deleted,
    Imported,
}

impl TemplateChange {
    /// Dot-separated event name, e.g. `"template.created"`.
    pub fn event_type(self) -> &'static str {
        match self {
            Self::Created => "template.created",
            Self::Updated => "template.updated",
            Self::Deleted => "template.deleted",
            Self::Imported => "template.imported",
        }
    }
}

/// The template set changed; subscribers should reload their template list.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateEvent {
    pub change: TemplateChange,

    /// Id of the affected template.
    pub template_id: TemplateId,

    /// Name of the affected template, when known.
    pub template_name: Option<String>,

    /// When the event was created (UTC).
    pub timestamp: DateTime<Utc>,
}

impl TemplateEvent {
    pub fn new(change: TemplateChange, template_id: impl Into<TemplateId>) -> Self {
        Self {
            change,
            template_id: template_id.into(),
            template_name: None,
            timestamp: Utc::now(),
        }
    }

    /// Attach the template name to the event.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.template_name = Some(name.into());
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
const DEFAULT_CAPACITY: usize = 64;

/// In-process fan-out event bus.
///
/// Wraps a [`broadcast::Sender`] so that any number of subscribers can
/// independently receive every published [`TemplateEvent`].
///
/// ```rust
/// use casetpl_events::bus::{EventBus, TemplateChange, TemplateEvent};
///
/// let bus = EventBus::default();
/// let mut rx = bus.subscribe();
///
/// bus.publish(TemplateEvent::new(TemplateChange::Created, "AV1"));
/// ```
pub struct EventBus {
    sender: broadcast::Sender<TemplateEvent>,
}

impl EventBus {
    /// Create a bus with a specific channel capacity.
    ///
    /// When the buffer is full, the oldest un-consumed messages are dropped
    /// and slow receivers will observe a `RecvError::Lagged`.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// If there are no active subscribers the event is silently dropped.
    pub fn publish(&self, event: TemplateEvent) {
        tracing::debug!(
            event_type = event.change.event_type(),
            template_id = %event.template_id,
            "Publishing template event"
        );
        // Ignore the SendError: it only means there are zero receivers.
        let _ = self.sender.send(event);
    }

    /// Subscribe to all events published on this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<TemplateEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
