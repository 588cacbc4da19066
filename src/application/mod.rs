//! Application layer containing the checkout orchestration.
//!
//! This module defines the `CheckoutPipeline`, the entry point for running a
//! checkout, and the event types it publishes while it runs.

pub mod events;
pub mod pipeline;
