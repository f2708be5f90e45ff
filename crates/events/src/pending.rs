//! Per-aggregate list of events that have not been handed off yet.

use patron_core::EventId;

use crate::{Event, EventEnvelope};

/// Append-only buffer of events raised by one aggregate instance.
///
/// Events keep emission order. Draining hands them to the caller and leaves the
/// buffer empty; sequence numbers keep counting from the aggregate version, so
/// a later drain never reuses a number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEvents<E> {
    aggregate_type: &'static str,
    events: Vec<EventEnvelope<E>>,
}

impl<E: Event> PendingEvents<E> {
    pub fn new(aggregate_type: &'static str) -> Self {
        Self {
            aggregate_type,
            events: Vec::new(),
        }
    }

    /// Append `payload` at `sequence_number` and return the stored envelope.
    ///
    /// Sequence numbers must be strictly increasing within one buffer.
    pub fn record(&mut self, sequence_number: u64, payload: E) -> &EventEnvelope<E> {
        debug_assert!(
            self.events
                .last()
                .is_none_or(|last| last.sequence_number() < sequence_number),
            "event sequence must be strictly increasing"
        );

        let index = self.events.len();
        self.events.push(EventEnvelope::new(
            EventId::new(),
            self.aggregate_type,
            sequence_number,
            payload,
        ));
        &self.events[index]
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn last(&self) -> Option<&EventEnvelope<E>> {
        self.events.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EventEnvelope<E>> {
        self.events.iter()
    }

    /// Payloads only, in emission order.
    pub fn payloads(&self) -> impl Iterator<Item = &E> {
        self.events.iter().map(EventEnvelope::payload)
    }

    /// Hand every pending event to the caller.
    pub fn drain(&mut self) -> Vec<EventEnvelope<E>> {
        std::mem::take(&mut self.events)
    }
}
