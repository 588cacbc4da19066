//! Progress notifications published while a checkout runs.
//!
//! The pipeline never talks to a renderer directly. It publishes
//! [`CheckoutEvent`]s to a [`CheckoutObserver`]; the presentation layer picks
//! whichever observer fits (an event channel, a log, nothing).

use crate::domain::checkout::{CheckoutFailure, Stage};
use crate::domain::voucher::VoucherCode;
use tokio::sync::mpsc;
use tracing::{info, warn};

/// For a run that reaches the stages the order is always
/// `ProgressStarted`, zero or more `StageCompleted`, `ProgressEnded`, then
/// exactly one of `Succeeded` / `Failed`. A request rejected for an
/// incomplete selection only publishes `Failed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutEvent {
    ProgressStarted,
    StageCompleted(Stage),
    ProgressEnded,
    Succeeded(VoucherCode),
    Failed(CheckoutFailure),
}

pub trait CheckoutObserver: Send + Sync {
    fn notify(&self, event: CheckoutEvent);
}

pub type CheckoutEventSender = mpsc::UnboundedSender<CheckoutEvent>;
pub type CheckoutEventReceiver = mpsc::UnboundedReceiver<CheckoutEvent>;

/// Creates a (sender, receiver) pair. The sender is itself an observer.
pub fn checkout_event_channel() -> (CheckoutEventSender, CheckoutEventReceiver) {
    mpsc::unbounded_channel()
}

impl CheckoutObserver for CheckoutEventSender {
    fn notify(&self, event: CheckoutEvent) {
        // A dropped receiver just means nobody is rendering any more.
        let _ = self.send(event);
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl CheckoutObserver for NoopObserver {
    fn notify(&self, _event: CheckoutEvent) {}
}

/// Writes every event to the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl CheckoutObserver for TracingObserver {
    fn notify(&self, event: CheckoutEvent) {
        match event {
            CheckoutEvent::ProgressStarted => info!("Processing payment..."),
            CheckoutEvent::StageCompleted(stage) => info!(stage = %stage, "Stage completed"),
            CheckoutEvent::ProgressEnded => info!("Processing finished"),
            CheckoutEvent::Succeeded(voucher) => info!(voucher = %voucher, "Voucher ready"),
            CheckoutEvent::Failed(failure) if failure.is_unexpected() => {
                warn!(error = %failure, "Checkout hit an unexpected fault")
            }
            CheckoutEvent::Failed(failure) => info!(error = %failure, "{}", failure.user_message()),
        }
    }
}
