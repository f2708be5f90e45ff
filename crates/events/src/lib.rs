//! Domain events: the event contract, envelopes, and the per-aggregate pending list.

pub mod envelope;
pub mod event;
pub mod pending;

pub use envelope::EventEnvelope;
pub use event::Event;
pub use pending::PendingEvents;
