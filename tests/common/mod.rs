#![allow(dead_code)]

use async_trait::async_trait;
use rand::rngs::mock::StepRng;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use wifipay::application::events::{CheckoutEvent, CheckoutEventReceiver};
use wifipay::application::pipeline::CheckoutPipeline;
use wifipay::config::WifiPayConfig;
use wifipay::domain::checkout::{CheckoutRequest, MessageId, TransactionId};
use wifipay::domain::package::{Catalog, PackageType};
use wifipay::domain::payment::PaymentMethod;
use wifipay::domain::phone::PhoneNumber;
use wifipay::domain::ports::{PaymentGateway, SmsNotifier, StageError, VoucherIssuer};
use wifipay::domain::selection::SelectionState;
use wifipay::domain::voucher::VoucherCode;
use wifipay::infrastructure::simulated::{
    SimulatedMobileMoney, SimulatedSms, SimulatedVoucherIssuer, shared_rng,
};

/// Every draw is 0: any stage with a non-zero success probability succeeds.
pub fn always_succeed() -> StepRng {
    StepRng::new(0, 0)
}

/// Every draw is `u64::MAX`: any stage below probability 1.0 fails.
pub fn always_fail() -> StepRng {
    StepRng::new(u64::MAX, 0)
}

/// Reference success rates, no delays.
pub fn instant_config() -> WifiPayConfig {
    WifiPayConfig::default().instant()
}

/// Wraps a stage adapter and counts how often it is invoked.
pub struct Counting<T> {
    inner: T,
    calls: Arc<AtomicUsize>,
}

impl<T> Counting<T> {
    pub fn new(inner: T) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                inner,
                calls: calls.clone(),
            },
            calls,
        )
    }
}

#[async_trait]
impl<T: PaymentGateway> PaymentGateway for Counting<T> {
    async fn initiate(&self, request: &CheckoutRequest) -> Result<TransactionId, StageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.initiate(request).await
    }
}

#[async_trait]
impl<T: VoucherIssuer> VoucherIssuer for Counting<T> {
    async fn issue(
        &self,
        request: &CheckoutRequest,
        transaction: &TransactionId,
    ) -> Result<VoucherCode, StageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.issue(request, transaction).await
    }
}

#[async_trait]
impl<T: SmsNotifier> SmsNotifier for Counting<T> {
    async fn send(
        &self,
        phone: &PhoneNumber,
        voucher: &VoucherCode,
    ) -> Result<MessageId, StageError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.send(phone, voucher).await
    }
}

pub struct StageCalls {
    pub payment: Arc<AtomicUsize>,
    pub voucher: Arc<AtomicUsize>,
    pub sms: Arc<AtomicUsize>,
}

impl StageCalls {
    pub fn counts(&self) -> (usize, usize, usize) {
        (
            self.payment.load(Ordering::SeqCst),
            self.voucher.load(Ordering::SeqCst),
            self.sms.load(Ordering::SeqCst),
        )
    }
}

/// A simulated pipeline whose three stages are instrumented with call counters.
pub fn counting_pipeline(rng: StepRng, config: &WifiPayConfig) -> (CheckoutPipeline, StageCalls) {
    let rng = shared_rng(rng);
    let (payment, payment_calls) =
        Counting::new(SimulatedMobileMoney::new(config.payment.clone(), rng.clone()));
    let (voucher, voucher_calls) =
        Counting::new(SimulatedVoucherIssuer::new(config.voucher.clone(), rng.clone()));
    let (sms, sms_calls) = Counting::new(SimulatedSms::new(config.sms.clone(), rng));

    let pipeline = CheckoutPipeline::new(Box::new(payment), Box::new(voucher), Box::new(sms));
    let calls = StageCalls {
        payment: payment_calls,
        voucher: voucher_calls,
        sms: sms_calls,
    };
    (pipeline, calls)
}

/// One Day package, MTN, phone 770123456.
pub fn ready_selection() -> SelectionState {
    let mut selection = SelectionState::new();
    selection.set_package(
        Catalog::standard()
            .get(PackageType::OneDay)
            .cloned()
            .expect("standard catalog has a day pass"),
    );
    selection.set_method(PaymentMethod::MtnMoney);
    selection.set_phone_digits("770123456");
    selection
}

pub fn drain(mut rx: CheckoutEventReceiver) -> Vec<CheckoutEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

pub fn is_well_formed_voucher(code: &str) -> bool {
    let parts: Vec<&str> = code.split('-').collect();
    parts.len() == 3
        && parts[0] == "WFP"
        && parts[1..].iter().all(|group| {
            group.len() == 4
                && group
                    .chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        })
}
