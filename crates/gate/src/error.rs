//! Error types for the response path.

use navlock_core::{LockId, SlotError};
use thiserror::Error;

/// Errors surfaced by [`NavigationGate::respond`](crate::NavigationGate::respond).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GateError {
	/// The authority answered the same lock more than once.
	#[error("duplicate response for lock {id}: {source}")]
	DuplicateResponse {
		/// Lock that received the second answer.
		id: LockId,
		/// Underlying slot violation.
		#[source]
		source: SlotError,
	},
}
