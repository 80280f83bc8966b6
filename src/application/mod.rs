//! Application layer orchestrating the payment workflow.
//!
//! [`controller::PaymentWorkflow`] drives the domain state machine and the
//! gateway port. [`session`] wraps it in an actor-like pattern with `tokio`
//! channels so UI-style callers share one serialized workflow instance.

pub mod confirmation;
pub mod controller;
pub mod session;
