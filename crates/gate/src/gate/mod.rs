//! Interception and response paths around one session's [`LockRegistry`].

use std::sync::Arc;
use std::time::Instant;

use navlock_core::{Decision, DecisionSlot, LockId, LockRegistry};
use tokio_util::sync::CancellationToken;

use crate::transport::{DecisionQuery, DecisionTransport, NavigationRequest};
use crate::{ConfigError, GateConfig, GateError};


/// How an intercepted navigation reached its decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resolution {
	/// The authority answered in time.
	Decided,
	/// The wait bound elapsed first.
	TimedOut,
	/// The caller's cancellation token fired first.
	Cancelled,
	/// The query could not be handed to the transport.
	DispatchFailed,
	/// The gate was disposed before or during the wait.
	Disposed,
}

impl Resolution {
	const fn as_str(self) -> &'static str {
		match self {
			Self::Decided => "decided",
			Self::TimedOut => "timed_out",
			Self::Cancelled => "cancelled",
			Self::DispatchFailed => "dispatch_failed",
			Self::Disposed => "disposed",
		}
	}
}

/// Outcome returned to the interception callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
	/// Lock minted for this navigation; `None` if the gate was already disposed.
	pub id: Option<LockId>,
	/// Decision to act on. The configured default unless `resolution` is `Decided`.
	pub decision: Decision,
	/// How the decision was reached.
	pub resolution: Resolution,
}

impl Verdict {
	/// Returns the boolean a platform's "should override" callback returns.
	#[must_use]
	pub const fn should_override(&self) -> bool {
		self.decision.should_override()
	}
}

/// Result of delivering an answer from the authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseOutcome {
	/// The decision was written into a waiting slot.
	Delivered,
	/// No slot was registered under the identifier; the answer was dropped.
	Discarded,
}

/// Registered lock that is detached from the registry when dropped.
///
/// Covers every exit from a wait, including a dropped future.
struct PendingLock<'a> {
	registry: &'a LockRegistry,
	id: LockId,
	slot: Arc<DecisionSlot>,
}

impl Drop for PendingLock<'_> {
	fn drop(&mut self) {
		self.registry.remove(self.id);
	}
}

/// Bridges synchronous navigation callbacks to an asynchronous decision authority.
///
/// One gate per session. Share it via `Arc<NavigationGate<_>>` between the thread
/// that intercepts navigations and the one that delivers answers.
pub struct NavigationGate<T> {
	registry: LockRegistry,
	config: GateConfig,
	transport: T,
	session: CancellationToken,
}

impl<T> NavigationGate<T> {
	/// Returns the active configuration.
	pub fn config(&self) -> &GateConfig {
		&self.config
	}

	/// Number of navigations currently waiting for an answer.
	pub fn pending(&self) -> usize {
		self.registry.len()
	}

	/// Returns true once [`dispose`](Self::dispose) has run.
	pub fn is_disposed(&self) -> bool {
		self.session.is_cancelled()
	}

	/// Token cancelled when the session is disposed, including when the gate is dropped.
	///
	/// Lets the authority's loop stop once nobody can receive its answers.
	pub fn session_token(&self) -> CancellationToken {
		self.session.child_token()
	}

	/// Delivers the authority's answer for `id`.
	///
	/// A missing slot is normal (the waiter timed out or the gate was disposed) and
	/// yields [`ResponseOutcome::Discarded`].
	///
	/// # Errors
	///
	/// Returns [`GateError::DuplicateResponse`] if `id` was already answered.
	pub fn respond(&self, id: LockId, decision: Decision) -> Result<ResponseOutcome, GateError> {
		let Some(slot) = self.registry.lookup(id) else {
			tracing::debug!(%id, %decision, "navlock.response.discarded");
			return Ok(ResponseOutcome::Discarded);
		};
		slot.write(decision)
			.map_err(|source| GateError::DuplicateResponse { id, source })?;
		tracing::trace!(%id, %decision, "navlock.response.delivered");
		Ok(ResponseOutcome::Delivered)
	}

	/// Tears the session down: pending waiters resolve to their default immediately
	/// and later interceptions are not dispatched. Idempotent.
	pub fn dispose(&self) {
		if self.session.is_cancelled() {
			return;
		}
		self.session.cancel();
		let drained = self.registry.drain();
		tracing::debug!(abandoned = drained.len(), "navlock.gate.disposed");
		for (_, slot) in drained {
			slot.interrupt();
		}
	}

	fn fallback(&self, id: Option<LockId>, resolution: Resolution) -> Verdict {
		Verdict {
			id,
			decision: self.config.default_decision,
			resolution,
		}
	}

	/// Detaches the lock and turns what the slot holds into a verdict.
	fn settle(&self, pending: PendingLock<'_>, abandoned: Resolution) -> Verdict {
		let id = pending.id;
		let slot = Arc::clone(&pending.slot);
		drop(pending);

		// An answer that landed while the wait was being abandoned still counts.
		if let Some(decision) = slot.read().decision() {
			return Verdict {
				id: Some(id),
				decision,
				resolution: Resolution::Decided,
			};
		}
		tracing::debug!(
			%id,
			resolution = abandoned.as_str(),
			fallback = %self.config.default_decision,
			"navlock.wait.abandoned"
		);
		self.fallback(Some(id), abandoned)
	}
}

impl<T: DecisionTransport> NavigationGate<T> {
	/// Creates a gate with its own empty registry.
	///
	/// # Errors
	///
	/// Returns [`ConfigError::ZeroTimeout`] if `config` fails [`GateConfig::validate`].
	pub fn new(config: GateConfig, transport: T) -> Result<Self, ConfigError> {
		Ok(Self {
			registry: LockRegistry::new(),
			config: config.validate()?,
			transport,
			session: CancellationToken::new(),
		})
	}

	/// Intercepts a navigation and blocks the calling thread until it is decided.
	///
	/// Meant for platform callback threads. Do not call from inside an async task;
	/// use [`intercept`](Self::intercept) there.
	pub fn intercept_blocking(&self, request: NavigationRequest) -> Verdict {
		let pending = match self.begin(request) {
			Ok(pending) => pending,
			Err(verdict) => return verdict,
		};
		let deadline = Instant::now() + self.config.timeout();
		pending.slot.wait_until(deadline, || self.session.is_cancelled());
		let abandoned = if self.session.is_cancelled() { Resolution::Disposed } else { Resolution::TimedOut };
		self.settle(pending, abandoned)
	}

	/// Intercepts a navigation and waits asynchronously until it is decided.
	pub async fn intercept(&self, request: NavigationRequest) -> Verdict {
		self.intercept_with_cancel(request, CancellationToken::new()).await
	}

	/// As [`intercept`](Self::intercept), but also abandons the wait when `cancel` fires.
	pub async fn intercept_with_cancel(&self, request: NavigationRequest, cancel: CancellationToken) -> Verdict {
		let pending = match self.begin(request) {
			Ok(pending) => pending,
			Err(verdict) => return verdict,
		};
		let abandoned = tokio::select! {
			biased;
			_ = pending.slot.decided() => Resolution::Decided,
			() = self.session.cancelled() => Resolution::Disposed,
			() = cancel.cancelled() => Resolution::Cancelled,
			() = tokio::time::sleep(self.config.timeout()) => Resolution::TimedOut,
		};
		self.settle(pending, abandoned)
	}

	/// Mints a lock and hands the query to the transport.
	fn begin(&self, request: NavigationRequest) -> Result<PendingLock<'_>, Verdict> {
		if self.session.is_cancelled() {
			return Err(self.fallback(None, Resolution::Disposed));
		}
		let (id, slot) = self.registry.mint();
		let pending = PendingLock {
			registry: &self.registry,
			id,
			slot,
		};
		// Disposal may have drained the registry between the check above and the mint.
		if self.session.is_cancelled() {
			drop(pending);
			return Err(self.fallback(Some(id), Resolution::Disposed));
		}
		tracing::trace!(%id, url = %request.url, "navlock.intercept");
		if let Err(error) = self.transport.dispatch(DecisionQuery { id, request }) {
			tracing::warn!(%id, %error, "navlock.dispatch_failed");
			drop(pending);
			return Err(self.fallback(Some(id), Resolution::DispatchFailed));
		}
		Ok(pending)
	}
}

impl<T> Drop for NavigationGate<T> {
	fn drop(&mut self) {
		self.dispose();
	}
}
