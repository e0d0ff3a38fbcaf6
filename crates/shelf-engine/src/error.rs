//! # Engine Errors
//!
//! The fatal-or-operational error surface of the engine. Note what is
//! deliberately *not* here: a full shelf is a [`crate::shelf::Placement::Rejected`]
//! value, and a courier or monitor racing for an already-removed order is
//! an `Option::None`. Neither crosses the shared-lock boundary as an
//! error.

use crate::order::OrderId;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Fatal at startup; no worker is spawned.
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),
    /// The courier service has no room for another countdown. The order
    /// stays shelved and will only leave via staleness eviction.
    #[error("courier timer capacity exhausted for order {0}")]
    TimerExhausted(OrderId),
    /// The order feed failed mid-run; the run shuts down and reports it.
    #[error("order feed failed: {0}")]
    Feed(#[source] Box<dyn std::error::Error + Send + Sync>),
}
