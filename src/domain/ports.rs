use super::checkout::{CheckoutRequest, MessageId, TransactionId};
use super::phone::PhoneNumber;
use super::voucher::VoucherCode;
use async_trait::async_trait;
use thiserror::Error;

/// How a single stage adapter can fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StageError {
    /// The provider answered and said no.
    #[error("{0}")]
    Declined(String),
    /// Something the adapter did not model went wrong.
    #[error("{0}")]
    Fault(String),
}

/// Stage 1: asks the mobile-money provider to collect the package price.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn initiate(&self, request: &CheckoutRequest) -> Result<TransactionId, StageError>;
}

/// Stage 2: mints the access voucher once payment has been collected.
#[async_trait]
pub trait VoucherIssuer: Send + Sync {
    async fn issue(
        &self,
        request: &CheckoutRequest,
        transaction: &TransactionId,
    ) -> Result<VoucherCode, StageError>;
}

/// Stage 3: texts the voucher to the customer.
#[async_trait]
pub trait SmsNotifier: Send + Sync {
    async fn send(&self, phone: &PhoneNumber, voucher: &VoucherCode)
    -> Result<MessageId, StageError>;
}

pub type PaymentGatewayBox = Box<dyn PaymentGateway>;
pub type VoucherIssuerBox = Box<dyn VoucherIssuer>;
pub type SmsNotifierBox = Box<dyn SmsNotifier>;
