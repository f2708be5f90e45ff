use serde::{Deserialize, Serialize};

use patron_core::EventId;

/// Envelope for an event, carrying stream metadata.
///
/// This is the unit handed to whoever stores or publishes events.
///
/// Notes:
/// - **Append-only**: `sequence_number` is strictly increasing per aggregate and
///   equals the aggregate version right after the change it describes.
/// - `payload` is the domain event itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: EventId,
    aggregate_type: String,

    /// Position in the aggregate's event sequence.
    sequence_number: u64,

    payload: E,
}

impl<E> EventEnvelope<E> {
    pub fn new(
        event_id: EventId,
        aggregate_type: impl Into<String>,
        sequence_number: u64,
        payload: E,
    ) -> Self {
        Self {
            event_id,
            aggregate_type: aggregate_type.into(),
            sequence_number,
            payload,
        }
    }

    pub fn event_id(&self) -> EventId {
        self.event_id
    }

    pub fn aggregate_type(&self) -> &str {
        &self.aggregate_type
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}
