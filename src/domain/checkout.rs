use super::package::PackageSelection;
use super::payment::PaymentMethod;
use super::phone::PhoneNumber;
use super::voucher::VoucherCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// One sequential step of the checkout pipeline.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    PaymentInitiation,
    VoucherGeneration,
    SmsNotification,
}

impl Stage {
    pub const ORDER: [Stage; 3] = [
        Stage::PaymentInitiation,
        Stage::VoucherGeneration,
        Stage::SmsNotification,
    ];

    /// 1-based position in the pipeline.
    pub fn number(&self) -> u8 {
        match self {
            Stage::PaymentInitiation => 1,
            Stage::VoucherGeneration => 2,
            Stage::SmsNotification => 3,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::PaymentInitiation => "payment initiation",
            Stage::VoucherGeneration => "voucher generation",
            Stage::SmsNotification => "SMS notification",
        };
        f.write_str(name)
    }
}

/// A piece of user input a checkout cannot start without.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum SelectionField {
    Phone,
    Package,
    Method,
}

impl fmt::Display for SelectionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SelectionField::Phone => "phone number",
            SelectionField::Package => "package",
            SelectionField::Method => "payment method",
        };
        f.write_str(name)
    }
}

fn join_fields(fields: &[SelectionField]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Why a checkout did not produce a voucher.
///
/// Every failure is caught at the pipeline boundary and handed back inside
/// [`CheckoutOutcome::Failure`]; none of them propagates further.
#[derive(Error, Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckoutFailure {
    #[error("incomplete selection: missing {}", join_fields(.missing))]
    IncompleteSelection { missing: Vec<SelectionField> },
    #[error("{stage} failed: {reason}")]
    StageFailed { stage: Stage, reason: String },
    #[error("unexpected fault during {stage}: {detail}")]
    UnexpectedFault { stage: Stage, detail: String },
}

impl CheckoutFailure {
    /// The stage that failed, if any stage ran at all.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            CheckoutFailure::IncompleteSelection { .. } => None,
            CheckoutFailure::StageFailed { stage, .. }
            | CheckoutFailure::UnexpectedFault { stage, .. } => Some(*stage),
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            CheckoutFailure::IncompleteSelection { .. } => "incomplete selection",
            CheckoutFailure::StageFailed { reason, .. } => reason,
            CheckoutFailure::UnexpectedFault { detail, .. } => detail,
        }
    }

    /// The message shown to the customer.
    pub fn user_message(&self) -> &'static str {
        match self {
            CheckoutFailure::IncompleteSelection { .. } => "Please complete all fields",
            _ => "Payment failed. Please try again.",
        }
    }

    pub fn is_unexpected(&self) -> bool {
        matches!(self, CheckoutFailure::UnexpectedFault { .. })
    }
}

/// An immutable snapshot of a complete selection.
#[derive(Debug, Serialize, PartialEq, Eq, Clone)]
pub struct CheckoutRequest {
    phone: PhoneNumber,
    package: PackageSelection,
    method: PaymentMethod,
}

impl CheckoutRequest {
    /// Fails with [`CheckoutFailure::IncompleteSelection`] naming every absent field.
    pub fn new(
        phone: Option<PhoneNumber>,
        package: Option<PackageSelection>,
        method: Option<PaymentMethod>,
    ) -> Result<Self, CheckoutFailure> {
        match (phone, package, method) {
            (Some(phone), Some(package), Some(method)) => Ok(Self {
                phone,
                package,
                method,
            }),
            (phone, package, method) => {
                let mut missing = Vec::new();
                if phone.is_none() {
                    missing.push(SelectionField::Phone);
                }
                if package.is_none() {
                    missing.push(SelectionField::Package);
                }
                if method.is_none() {
                    missing.push(SelectionField::Method);
                }
                Err(CheckoutFailure::IncompleteSelection { missing })
            }
        }
    }

    pub fn phone(&self) -> &PhoneNumber {
        &self.phone
    }

    pub fn package(&self) -> &PackageSelection {
        &self.package
    }

    pub fn method(&self) -> PaymentMethod {
        self.method
    }
}

/// Identifier handed back by the mobile-money provider.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone)]
#[serde(transparent)]
pub struct TransactionId(pub String);

/// Identifier of the SMS carrying the voucher.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone)]
#[serde(transparent)]
pub struct MessageId(pub String);

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything a successful checkout produced.
#[derive(Debug, Serialize, PartialEq, Eq, Clone)]
pub struct CheckoutReceipt {
    pub voucher_code: VoucherCode,
    pub transaction_id: TransactionId,
    pub message_id: MessageId,
    pub request: CheckoutRequest,
}

/// The terminal result of one pipeline run.
#[derive(Debug, Serialize, PartialEq, Eq, Clone)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CheckoutOutcome {
    Success(CheckoutReceipt),
    Failure { failure: CheckoutFailure },
}

impl CheckoutOutcome {
    pub fn failure(failure: CheckoutFailure) -> Self {
        CheckoutOutcome::Failure { failure }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, CheckoutOutcome::Success(_))
    }

    pub fn voucher_code(&self) -> Option<&VoucherCode> {
        match self {
            CheckoutOutcome::Success(receipt) => Some(&receipt.voucher_code),
            CheckoutOutcome::Failure { .. } => None,
        }
    }

    pub fn as_failure(&self) -> Option<&CheckoutFailure> {
        match self {
            CheckoutOutcome::Success(_) => None,
            CheckoutOutcome::Failure { failure } => Some(failure),
        }
    }
}
