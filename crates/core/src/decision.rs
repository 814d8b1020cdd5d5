//! Values exchanged between waiters and responders.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Correlation token minted by a [`LockRegistry`](crate::LockRegistry).
///
/// Opaque to the transport: it must round-trip unchanged so the response can
/// find its slot again. Identifiers start at 1 and are never reused within a
/// registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LockId(u64);

impl LockId {
	/// Returns the raw integer carried over the transport.
	#[must_use]
	pub const fn get(self) -> u64 {
		self.0
	}
}

impl From<u64> for LockId {
	fn from(raw: u64) -> Self {
		Self(raw)
	}
}

impl fmt::Display for LockId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Terminal answer for an intercepted navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
	/// The host takes over: the platform must not load the URL itself.
	ShouldOverride,
	/// The platform proceeds with the navigation.
	DoNotOverride,
}

impl Decision {
	/// Returns the decision as the boolean a platform callback returns.
	#[must_use]
	pub const fn should_override(self) -> bool {
		matches!(self, Self::ShouldOverride)
	}

	pub(crate) const fn as_str(self) -> &'static str {
		match self {
			Self::ShouldOverride => "should_override",
			Self::DoNotOverride => "do_not_override",
		}
	}
}

impl From<bool> for Decision {
	fn from(should_override: bool) -> Self {
		if should_override { Self::ShouldOverride } else { Self::DoNotOverride }
	}
}

impl fmt::Display for Decision {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Three-valued state held by a [`DecisionSlot`](crate::DecisionSlot).
///
/// Moves from `Undecided` to exactly one terminal value and never changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SlotState {
	/// No decision has been written yet.
	Undecided = 0,
	/// Terminal: [`Decision::ShouldOverride`].
	ShouldOverride = 1,
	/// Terminal: [`Decision::DoNotOverride`].
	DoNotOverride = 2,
}

impl SlotState {
	/// Returns the terminal decision, or `None` while undecided.
	#[must_use]
	pub const fn decision(self) -> Option<Decision> {
		match self {
			Self::Undecided => None,
			Self::ShouldOverride => Some(Decision::ShouldOverride),
			Self::DoNotOverride => Some(Decision::DoNotOverride),
		}
	}

	/// Returns true once a decision has been written.
	#[must_use]
	pub const fn is_terminal(self) -> bool {
		!matches!(self, Self::Undecided)
	}

	pub(crate) const fn from_raw(raw: u8) -> Self {
		match raw {
			1 => Self::ShouldOverride,
			2 => Self::DoNotOverride,
			_ => Self::Undecided,
		}
	}

	pub(crate) const fn as_str(self) -> &'static str {
		match self {
			Self::Undecided => "undecided",
			Self::ShouldOverride => "should_override",
			Self::DoNotOverride => "do_not_override",
		}
	}
}

impl From<Decision> for SlotState {
	fn from(decision: Decision) -> Self {
		match decision {
			Decision::ShouldOverride => Self::ShouldOverride,
			Decision::DoNotOverride => Self::DoNotOverride,
		}
	}
}

impl fmt::Display for SlotState {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
