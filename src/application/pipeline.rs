use crate::application::events::{CheckoutEvent, CheckoutObserver};
use crate::domain::checkout::{CheckoutFailure, CheckoutOutcome, CheckoutReceipt, CheckoutRequest, Stage};
use crate::domain::ports::{PaymentGatewayBox, SmsNotifierBox, StageError, VoucherIssuerBox};
use crate::domain::selection::SelectionState;
use futures_util::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Runs payment initiation, voucher generation and SMS notification in order.
///
/// `CheckoutPipeline` owns one adapter per stage. A failing stage ends the
/// run immediately; later stages are skipped and earlier ones are not undone.
/// There are no retries and no deduplication: callers that must not start two
/// runs at once guard that themselves (see `interfaces::trigger`).
pub struct CheckoutPipeline {
    gateway: PaymentGatewayBox,
    vouchers: VoucherIssuerBox,
    sms: SmsNotifierBox,
    stage_timeout: Option<Duration>,
}

impl CheckoutPipeline {
    /// Creates a new `CheckoutPipeline` instance.
    ///
    /// # Arguments
    ///
    /// * `gateway` - Stage 1, the mobile-money provider.
    /// * `vouchers` - Stage 2, the voucher issuer.
    /// * `sms` - Stage 3, the SMS notifier.
    pub fn new(gateway: PaymentGatewayBox, vouchers: VoucherIssuerBox, sms: SmsNotifierBox) -> Self {
        Self {
            gateway,
            vouchers,
            sms,
            stage_timeout: None,
        }
    }

    /// Bounds every stage. An overrun fails that stage.
    pub fn with_stage_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.stage_timeout = timeout;
        self
    }

    /// Snapshots `selection` and runs the checkout.
    ///
    /// An incomplete selection is rejected before any stage runs and without
    /// progress signals; the observer only receives the `Failed` event.
    pub async fn checkout(
        &self,
        selection: &SelectionState,
        observer: &dyn CheckoutObserver,
    ) -> CheckoutOutcome {
        match selection.snapshot() {
            Ok(request) => self.run_checkout(&request, observer).await,
            Err(failure) => {
                info!(error = %failure, "Checkout rejected");
                observer.notify(CheckoutEvent::Failed(failure.clone()));
                CheckoutOutcome::failure(failure)
            }
        }
    }

    /// Runs all three stages for `request` and resolves to an outcome.
    ///
    /// Never returns an error: every failure is folded into
    /// [`CheckoutOutcome::Failure`].
    pub async fn run_checkout(
        &self,
        request: &CheckoutRequest,
        observer: &dyn CheckoutObserver,
    ) -> CheckoutOutcome {
        info!(
            package = %request.package().package_type(),
            method = request.method().as_str(),
            amount = request.package().price(),
            "Checkout started"
        );
        observer.notify(CheckoutEvent::ProgressStarted);
        let result = self.run_stages(request, observer).await;
        observer.notify(CheckoutEvent::ProgressEnded);

        match result {
            Ok(receipt) => {
                info!(voucher = %receipt.voucher_code, transaction = %receipt.transaction_id, "Checkout succeeded");
                observer.notify(CheckoutEvent::Succeeded(receipt.voucher_code.clone()));
                CheckoutOutcome::Success(receipt)
            }
            Err(failure) => {
                if failure.is_unexpected() {
                    warn!(error = %failure, "Checkout aborted by unexpected fault");
                } else {
                    info!(error = %failure, "Checkout failed");
                }
                observer.notify(CheckoutEvent::Failed(failure.clone()));
                CheckoutOutcome::failure(failure)
            }
        }
    }

    async fn run_stages(
        &self,
        request: &CheckoutRequest,
        observer: &dyn CheckoutObserver,
    ) -> Result<CheckoutReceipt, CheckoutFailure> {
        let transaction_id = self
            .stage(Stage::PaymentInitiation, self.gateway.initiate(request))
            .await?;
        observer.notify(CheckoutEvent::StageCompleted(Stage::PaymentInitiation));

        // Payment has been collected from here on and nothing below refunds it.
        let uncompensated = |failure: CheckoutFailure| {
            warn!(
                transaction = %transaction_id,
                error = %failure,
                "Payment captured without voucher delivery"
            );
            failure
        };

        let voucher_code = self
            .stage(
                Stage::VoucherGeneration,
                self.vouchers.issue(request, &transaction_id),
            )
            .await
            .map_err(uncompensated)?;
        observer.notify(CheckoutEvent::StageCompleted(Stage::VoucherGeneration));

        let message_id = self
            .stage(
                Stage::SmsNotification,
                self.sms.send(request.phone(), &voucher_code),
            )
            .await
            .map_err(uncompensated)?;
        observer.notify(CheckoutEvent::StageCompleted(Stage::SmsNotification));

        Ok(CheckoutReceipt {
            voucher_code,
            transaction_id,
            message_id,
            request: request.clone(),
        })
    }

    async fn stage<T>(
        &self,
        stage: Stage,
        work: impl Future<Output = Result<T, StageError>>,
    ) -> Result<T, CheckoutFailure> {
        debug!(stage = %stage, "Stage started");
        let guarded = AssertUnwindSafe(work).catch_unwind();
        let result = match self.stage_timeout {
            Some(limit) => match tokio::time::timeout(limit, guarded).await {
                Ok(result) => result,
                Err(_) => {
                    return Err(CheckoutFailure::StageFailed {
                        stage,
                        reason: format!("timed out after {} ms", limit.as_millis()),
                    });
                }
            },
            None => guarded.await,
        };
        match result {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(StageError::Declined(reason))) => Err(CheckoutFailure::StageFailed { stage, reason }),
            Ok(Err(StageError::Fault(detail))) => Err(CheckoutFailure::UnexpectedFault { stage, detail }),
            Err(payload) => Err(CheckoutFailure::UnexpectedFault {
                stage,
                detail: format!("stage panicked: {}", panic_message(payload.as_ref())),
            }),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(text) = payload.downcast_ref::<&'static str>() {
        (*text).to_string()
    } else if let Some(text) = payload.downcast_ref::<String>() {
        text.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
