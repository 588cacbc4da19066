use crate::application::pipeline::CheckoutPipeline;
use crate::config::{StageConfig, WifiPayConfig};
use crate::domain::checkout::{CheckoutRequest, MessageId, TransactionId};
use crate::domain::phone::PhoneNumber;
use crate::domain::ports::{PaymentGateway, SmsNotifier, StageError, VoucherIssuer};
use crate::domain::voucher::VoucherCode;
use async_trait::async_trait;
use rand::{Rng, RngCore};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// A random source shared by the simulated stages.
///
/// The lock is only taken after a stage's delay has elapsed and is released
/// before the stage returns, so it is never held across an `.await`.
pub type SharedRng<R> = Arc<Mutex<R>>;

pub fn shared_rng<R: RngCore + Send>(rng: R) -> SharedRng<R> {
    Arc::new(Mutex::new(rng))
}

static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// `<prefix><unix millis><sequence>`, unique within the process.
fn next_id(prefix: &str) -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let seq = SEQUENCE.fetch_add(1, Ordering::Relaxed) % 10_000;
    format!("{prefix}{millis}{seq:04}")
}

fn lock<R>(rng: &Mutex<R>) -> Result<MutexGuard<'_, R>, StageError> {
    rng.lock()
        .map_err(|_| StageError::Fault("random source poisoned".to_string()))
}

fn succeeds<R: RngCore>(rng: &mut R, settings: &StageConfig) -> bool {
    rng.gen_bool(settings.success_probability.clamp(0.0, 1.0))
}

/// Stands in for the MTN / Airtel collection APIs.
pub struct SimulatedMobileMoney<R> {
    settings: StageConfig,
    rng: SharedRng<R>,
}

impl<R: RngCore + Send> SimulatedMobileMoney<R> {
    pub fn new(settings: StageConfig, rng: SharedRng<R>) -> Self {
        Self { settings, rng }
    }
}

#[async_trait]
impl<R: RngCore + Send> PaymentGateway for SimulatedMobileMoney<R> {
    async fn initiate(&self, request: &CheckoutRequest) -> Result<TransactionId, StageError> {
        debug!(
            method = request.method().as_str(),
            delay_ms = self.settings.delay_ms,
            "Contacting mobile-money provider"
        );
        tokio::time::sleep(self.settings.delay()).await;

        if succeeds(&mut *lock(&self.rng)?, &self.settings) {
            Ok(TransactionId(next_id(request.method().transaction_prefix())))
        } else {
            Err(StageError::Declined("Payment initiation failed".to_string()))
        }
    }
}

/// Stands in for the access controller that mints vouchers.
pub struct SimulatedVoucherIssuer<R> {
    settings: StageConfig,
    rng: SharedRng<R>,
}

impl<R: RngCore + Send> SimulatedVoucherIssuer<R> {
    pub fn new(settings: StageConfig, rng: SharedRng<R>) -> Self {
        Self { settings, rng }
    }
}

#[async_trait]
impl<R: RngCore + Send> VoucherIssuer for SimulatedVoucherIssuer<R> {
    async fn issue(
        &self,
        _request: &CheckoutRequest,
        transaction: &TransactionId,
    ) -> Result<VoucherCode, StageError> {
        debug!(transaction = %transaction, delay_ms = self.settings.delay_ms, "Generating voucher");
        tokio::time::sleep(self.settings.delay()).await;

        let mut rng = lock(&self.rng)?;
        if succeeds(&mut *rng, &self.settings) {
            Ok(VoucherCode::generate(&mut *rng))
        } else {
            Err(StageError::Declined("Voucher generation failed".to_string()))
        }
    }
}

/// Stands in for the bulk SMS provider.
pub struct SimulatedSms<R> {
    settings: StageConfig,
    rng: SharedRng<R>,
}

impl<R: RngCore + Send> SimulatedSms<R> {
    pub fn new(settings: StageConfig, rng: SharedRng<R>) -> Self {
        Self { settings, rng }
    }
}

#[async_trait]
impl<R: RngCore + Send> SmsNotifier for SimulatedSms<R> {
    async fn send(
        &self,
        phone: &PhoneNumber,
        voucher: &VoucherCode,
    ) -> Result<MessageId, StageError> {
        debug!(phone = %phone, voucher = %voucher, delay_ms = self.settings.delay_ms, "Sending voucher SMS");
        tokio::time::sleep(self.settings.delay()).await;

        if succeeds(&mut *lock(&self.rng)?, &self.settings) {
            Ok(MessageId(next_id("SMS")))
        } else {
            Err(StageError::Declined("SMS delivery failed".to_string()))
        }
    }
}

/// Wires the three simulated stages to one random source.
pub fn simulated_pipeline<R: RngCore + Send + 'static>(
    config: &WifiPayConfig,
    rng: R,
) -> CheckoutPipeline {
    let rng = shared_rng(rng);
    CheckoutPipeline::new(
        Box::new(SimulatedMobileMoney::new(config.payment.clone(), rng.clone())),
        Box::new(SimulatedVoucherIssuer::new(config.voucher.clone(), rng.clone())),
        Box::new(SimulatedSms::new(config.sms.clone(), rng)),
    )
    .with_stage_timeout(config.stage_timeout())
}
