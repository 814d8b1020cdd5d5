//! Correlation registry mapping lock identifiers to decision slots.
//!
//! One registry belongs to one session (e.g. one web view). It is created with the
//! session and dropped with it; nothing here is process-global.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::{DecisionSlot, LockId};


/// Monotonic identifier clock. The first identifier handed out is 1.
#[derive(Debug, Default)]
struct IdClock {
	issued: AtomicU64,
}

impl IdClock {
	fn next(&self) -> LockId {
		LockId::from(self.issued.fetch_add(1, Ordering::AcqRel).wrapping_add(1))
	}
}

/// Thread-safe registry of in-flight decision slots.
///
/// Structural changes (`mint`, `remove`, `drain`) take the write lock; lookups share
/// the read lock and never observe a half-inserted entry. Identifiers are never
/// reused, so a late response for a removed slot can only miss.
#[derive(Debug, Default)]
pub struct LockRegistry {
	clock: IdClock,
	entries: RwLock<HashMap<LockId, Arc<DecisionSlot>>>,
}

impl LockRegistry {
	/// Creates an empty registry whose first identifier will be 1.
	pub fn new() -> Self {
		Self::default()
	}

	/// Allocates a fresh identifier and registers an undecided slot under it.
	///
	/// The entry is visible to [`lookup`](Self::lookup) on any thread that receives the
	/// identifier after this call returns.
	pub fn mint(&self) -> (LockId, Arc<DecisionSlot>) {
		let slot = Arc::new(DecisionSlot::new());
		let mut entries = self.entries.write();
		// Allocated under the write lock so insertion order matches identifier order.
		let id = self.clock.next();
		entries.insert(id, Arc::clone(&slot));
		tracing::trace!(%id, pending = entries.len(), "navlock.mint");
		(id, slot)
	}

	/// Returns the slot registered under `id`, if any.
	///
	/// Absence is a normal outcome: the waiter may already have given up.
	pub fn lookup(&self, id: LockId) -> Option<Arc<DecisionSlot>> {
		self.entries.read().get(&id).cloned()
	}

	/// Detaches the slot registered under `id`. Removing an absent key is a no-op.
	///
	/// References already held to the slot stay valid; only future lookups miss.
	pub fn remove(&self, id: LockId) -> Option<Arc<DecisionSlot>> {
		let mut entries = self.entries.write();
		let removed = entries.remove(&id);
		if removed.is_some() {
			tracing::trace!(%id, pending = entries.len(), "navlock.remove");
		}
		removed
	}

	/// Returns true if `id` is currently registered.
	pub fn contains(&self, id: LockId) -> bool {
		self.entries.read().contains_key(&id)
	}

	/// Number of registered slots.
	pub fn len(&self) -> usize {
		self.entries.read().len()
	}

	/// Returns true when no slot is registered.
	pub fn is_empty(&self) -> bool {
		self.entries.read().is_empty()
	}

	/// Removes every entry, returning them sorted by identifier.
	///
	/// The identifier clock keeps counting; drained identifiers are never minted again.
	pub fn drain(&self) -> Vec<(LockId, Arc<DecisionSlot>)> {
		let mut drained: Vec<_> = self.entries.write().drain().collect();
		drained.sort_unstable_by_key(|(id, _)| *id);
		if !drained.is_empty() {
			tracing::debug!(count = drained.len(), "navlock.drain");
		}
		drained
	}
}
