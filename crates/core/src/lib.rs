//! Correlation primitives for synchronously waiting on an asynchronous decision.
//!
//! * [`LockRegistry`]: mints correlation tokens and owns the token → slot mapping.
//! * [`DecisionSlot`]: single-write cell the waiter observes and the responder fills.
//! * [`LockId`], [`Decision`], [`SlotState`]: the values that flow between them.

#![warn(missing_docs)]

pub mod decision;
pub mod error;
pub mod registry;
pub mod slot;

pub use decision::{Decision, LockId, SlotState};
pub use error::SlotError;
pub use registry::LockRegistry;
pub use slot::DecisionSlot;
