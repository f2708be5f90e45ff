//! Value object trait: equality by value, not identity.

/// Marker trait for value objects.
///
/// Value objects have **no identity** and are **immutable**: to "modify" one,
/// build a new value and replace the old one wholesale. Two value objects with
/// the same attributes are equal.
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
