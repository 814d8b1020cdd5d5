//! Error types for decision slots.

use thiserror::Error;

use crate::{Decision, SlotState};

/// Invariant violations surfaced by [`DecisionSlot`](crate::DecisionSlot).
///
/// Lookup misses are not errors; only the single-write contract can be broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SlotError {
	/// A terminal decision was written onto a slot that already held one.
	///
	/// Indicates that the responder delivered more than one answer for the same token.
	#[error("decision slot already holds {current}, refusing to overwrite with {attempted}")]
	AlreadyDecided {
		/// State held by the slot before the rejected write.
		current: SlotState,
		/// Decision the caller tried to write.
		attempted: Decision,
	},
}
