//! Outbound seam between the gate and the decision authority.

use std::sync::Arc;

use navlock_core::LockId;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::mpsc;

/// An intercepted navigation awaiting a decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationRequest {
	/// Target URL.
	pub url: String,
	/// Whether the navigation targets the main frame.
	#[serde(default)]
	pub is_main_frame: bool,
	/// Whether a user gesture started the navigation.
	#[serde(default)]
	pub has_gesture: bool,
	/// Whether the navigation is a server-side redirect.
	#[serde(default)]
	pub is_redirect: bool,
}

impl NavigationRequest {
	/// Creates a main-frame request without gesture or redirect flags.
	pub fn new(url: impl Into<String>) -> Self {
		Self {
			url: url.into(),
			is_main_frame: true,
			has_gesture: false,
			is_redirect: false,
		}
	}
}

/// Message handed to the transport: the request plus the token its answer must carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionQuery {
	/// Correlation token to echo back with the decision.
	pub id: LockId,
	/// The intercepted navigation.
	pub request: NavigationRequest,
}

/// Transport failures when handing a query to the authority.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
	/// The receiving side is gone.
	#[error("decision transport closed")]
	Closed,
	/// The transport refused the query.
	#[error("decision transport rejected query: {0}")]
	Rejected(String),
}

/// Carries queries to the decision authority.
///
/// `dispatch` is called on the waiter's thread, possibly a platform callback
/// thread, and must return without waiting for the answer. The answer comes
/// back through [`NavigationGate::respond`](crate::NavigationGate::respond).
pub trait DecisionTransport: Send + Sync {
	/// Sends one query.
	fn dispatch(&self, query: DecisionQuery) -> Result<(), TransportError>;
}

impl<T: DecisionTransport + ?Sized> DecisionTransport for Arc<T> {
	fn dispatch(&self, query: DecisionQuery) -> Result<(), TransportError> {
		(**self).dispatch(query)
	}
}

impl<T: DecisionTransport + ?Sized> DecisionTransport for Box<T> {
	fn dispatch(&self, query: DecisionQuery) -> Result<(), TransportError> {
		(**self).dispatch(query)
	}
}

/// Transport backed by an unbounded tokio channel.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
	tx: mpsc::UnboundedSender<DecisionQuery>,
}

/// Creates a channel transport and the receiver the authority's loop drains.
pub fn channel_transport() -> (ChannelTransport, mpsc::UnboundedReceiver<DecisionQuery>) {
	let (tx, rx) = mpsc::unbounded_channel();
	(ChannelTransport { tx }, rx)
}

impl DecisionTransport for ChannelTransport {
	fn dispatch(&self, query: DecisionQuery) -> Result<(), TransportError> {
		self.tx.send(query).map_err(|_| TransportError::Closed)
	}
}
