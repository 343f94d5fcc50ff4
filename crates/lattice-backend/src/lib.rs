//! Lattice backend protocol
//!
//! A rendering backend implements exactly one of three capability sets:
//! - `ShadowBackend` — shadow-tree aware; receives the logical tree
//!   as-is plus slot metadata (slot names, containing-slot reassignment,
//!   slot-content splices).
//! - `ComposedBackend` — sees only the flattened composed tree; offers
//!   splice primitives for batched structural edits.
//! - `DomlikeBackend` — a plain DOM-style tree; flat node insertion with
//!   fragments but no splice primitives and no explicit release.
//!
//! The tree engine is written against whichever set is active and never
//! mixes them. A missing backend is legal: the engine then runs in
//! logical-only mode and skips every backend call.

mod composed;
mod domlike;
mod recording;
mod shadow;

pub use composed::{ComposedBackend, EmptyComposedBackend};
pub use domlike::{DomlikeBackend, EmptyDomlikeBackend};
pub use recording::{RecordedCall, RecordingBackend};
pub use shadow::{EmptyShadowBackend, ShadowBackend};

/// Backend capability mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendMode {
    Shadow,
    Composed,
    Domlike,
}

/// Opaque handle to a backend-side node
///
/// Handles are minted by the backend on creation calls and are only
/// meaningful to the backend that issued them. The engine stores at most
/// one handle per logical node and releases it exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BackendNode(pub u64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_equality() {
        assert_eq!(BackendNode(3), BackendNode(3));
        assert_ne!(BackendNode(3), BackendNode(4));
    }
}
