//! Single-write decision cell shared by one waiter and one responder.

use std::fmt;
use std::pin::pin;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tokio::sync::Notify;

use crate::{Decision, SlotError, SlotState};


/// Rendezvous cell holding the eventual decision for one correlation token.
///
/// The state lives in an atomic byte so [`read`](Self::read) never blocks. Blocked
/// waiters park on a condvar and async waiters on a [`Notify`]; both are woken after
/// the single successful [`write`](Self::write).
pub struct DecisionSlot {
	state: AtomicU8,
	/// Serializes the waiter's state check against the writer's wake-up.
	park: Mutex<()>,
	cond: Condvar,
	notify: Notify,
}

impl DecisionSlot {
	/// Creates an undecided slot.
	pub fn new() -> Self {
		Self {
			state: AtomicU8::new(SlotState::Undecided as u8),
			park: Mutex::new(()),
			cond: Condvar::new(),
			notify: Notify::new(),
		}
	}

	/// Returns the current state without blocking.
	///
	/// A terminal value observed here carries every memory effect that preceded the write.
	pub fn read(&self) -> SlotState {
		SlotState::from_raw(self.state.load(Ordering::Acquire))
	}

	/// Writes the terminal decision and wakes all waiters.
	///
	/// # Errors
	///
	/// Returns [`SlotError::AlreadyDecided`] if the slot is already terminal. The stored
	/// decision is left untouched and the violation is logged at error level.
	pub fn write(&self, decision: Decision) -> Result<(), SlotError> {
		let next = SlotState::from(decision);
		match self
			.state
			.compare_exchange(SlotState::Undecided as u8, next as u8, Ordering::AcqRel, Ordering::Acquire)
		{
			Ok(_) => {
				tracing::trace!(decision = decision.as_str(), "navlock.slot.write");
				self.wake_parked();
				self.notify.notify_waiters();
				Ok(())
			}
			Err(raw) => {
				let current = SlotState::from_raw(raw);
				tracing::error!(
					current = current.as_str(),
					attempted = decision.as_str(),
					"navlock.slot.double_write"
				);
				Err(SlotError::AlreadyDecided {
					current,
					attempted: decision,
				})
			}
		}
	}

	/// Blocks the calling thread until the slot is terminal, `deadline` passes, or
	/// `abort` returns true.
	///
	/// Spurious wake-ups are absorbed: the state and `abort` are re-checked on every
	/// wake. `abort` runs with the slot's park lock held and must not touch this slot.
	pub fn wait_until(&self, deadline: Instant, abort: impl Fn() -> bool) -> SlotState {
		let mut guard = self.park.lock();
		loop {
			let state = self.read();
			if state.is_terminal() || abort() {
				return state;
			}
			if self.cond.wait_until(&mut guard, deadline).timed_out() {
				return self.read();
			}
		}
	}

	/// Blocks the calling thread for at most `timeout` waiting for a decision.
	pub fn wait_timeout(&self, timeout: Duration) -> SlotState {
		self.wait_until(Instant::now() + timeout, || false)
	}

	/// Resolves once a decision has been written.
	///
	/// Never resolves for an abandoned slot; bound it with a timeout.
	pub async fn decided(&self) -> Decision {
		loop {
			let mut notified = pin!(self.notify.notified());
			// Register before checking so a write in between is not lost.
			notified.as_mut().enable();
			if let Some(decision) = self.read().decision() {
				return decision;
			}
			notified.await;
		}
	}

	/// Wakes blocked waiters without changing the state so they re-check `abort`.
	pub fn interrupt(&self) {
		self.wake_parked();
	}

	fn wake_parked(&self) {
		// Acquiring the lock orders this wake after any in-progress state check.
		drop(self.park.lock());
		self.cond.notify_all();
	}
}

impl Default for DecisionSlot {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for DecisionSlot {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DecisionSlot").field("state", &self.read()).finish()
	}
}
