//! Herald notice delivery.
//!
//! - [`Notifier`]: the entry points application code calls (`success`,
//!   `warning`, `exception`, ...). Resolves options, normalizes the message
//!   and hands both to the router.
//! - [`DeliveryRouter`]: decides between inline and persisted delivery and
//!   talks to the [`PersistenceGateway`](herald_core::gateway::PersistenceGateway).

pub mod notifier;
pub mod router;

#[cfg(test)]
mod test_support;

pub use notifier::{DispatchContext, Notifier};
pub use router::{DeliveryRouter, DispatchOutcome};
