//! Application layer containing the polling orchestration.
//!
//! This module defines the `PaymentPoller` which acts as the primary entry
//! point for payment confirmation. Each session runs as a single `tokio`
//! task that owns the timers and delivers an ordered event stream through
//! the `PollHandle` returned to the caller.

pub mod poller;
