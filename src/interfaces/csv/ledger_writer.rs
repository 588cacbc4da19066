use crate::domain::checkout::CheckoutOutcome;
use crate::domain::phone::PhoneNumber;
use crate::domain::selection::SelectionState;
use crate::error::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

/// One line of the payments table shown on the admin dashboard.
#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct PaymentRecord {
    pub id: String,
    pub phone: String,
    pub package: String,
    pub amount: Option<u32>,
    pub method: String,
    pub status: &'static str,
    pub time: String,
    pub voucher: Option<String>,
    pub stage: Option<u8>,
    pub reason: Option<String>,
}

/// Timestamp layout of the `time` column, e.g. `2025-01-03 14:30:25` (UTC).
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl PaymentRecord {
    /// Builds the record for the `sequence`-th checkout (1-based), e.g. `WFP001`,
    /// finished at `time`.
    pub fn new(
        sequence: usize,
        selection: &SelectionState,
        outcome: &CheckoutOutcome,
        country_code: &str,
        time: DateTime<Utc>,
    ) -> Self {
        let phone = match PhoneNumber::new(selection.phone_digits()) {
            Ok(phone) => phone.international(country_code),
            Err(_) => selection.phone_digits().to_string(),
        };
        let failure = outcome.as_failure();
        Self {
            id: format!("WFP{sequence:03}"),
            phone,
            package: selection
                .package()
                .map(|p| p.display_name().to_string())
                .unwrap_or_default(),
            amount: selection.package().map(|p| p.price()),
            method: selection
                .method()
                .map(|m| m.display_name().to_string())
                .unwrap_or_default(),
            status: if outcome.is_success() {
                "success"
            } else {
                "failed"
            },
            time: time.format(TIME_FORMAT).to_string(),
            voucher: outcome.voucher_code().map(|v| v.to_string()),
            stage: failure.and_then(|f| f.stage()).map(|s| s.number()),
            reason: failure.map(|f| f.to_string()),
        }
    }
}

/// Writes payment records as CSV with a header row.
pub struct LedgerWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> LedgerWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(sink),
        }
    }

    pub fn write_record(&mut self, record: &PaymentRecord) -> Result<()> {
        self.writer.serialize(record)?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
