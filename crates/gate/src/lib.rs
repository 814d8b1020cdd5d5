//! Navigation interception on top of the `navlock-core` correlation registry.
//!
//! * [`NavigationGate`]: mints a lock per intercepted navigation, hands it to the
//!   transport, waits (blocking or async) with a bound, and always cleans up.
//! * [`DecisionTransport`]: the outbound seam to the decision authority.
//! * [`GateConfig`]: wait bound and fallback decision.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod gate;
pub mod transport;

pub use config::{ConfigError, GateConfig};
pub use error::GateError;
pub use gate::{NavigationGate, Resolution, ResponseOutcome, Verdict};
pub use navlock_core::{Decision, LockId, SlotState};
pub use transport::{ChannelTransport, DecisionQuery, DecisionTransport, NavigationRequest, TransportError, channel_transport};
