use crate::application::events::CheckoutObserver;
use crate::application::pipeline::CheckoutPipeline;
use crate::domain::checkout::CheckoutOutcome;
use crate::domain::package::Catalog;
use crate::domain::payment::PaymentMethod;
use crate::domain::selection::SelectionState;
use crate::error::Result;
use crate::interfaces::csv::checkout_reader::{CheckoutReader, CheckoutRow};
use crate::interfaces::csv::ledger_writer::{LedgerWriter, PaymentRecord};
use chrono::Utc;
use std::collections::BTreeMap;
use std::io::{Read, Write};
use tracing::warn;

/// Counts of what a batch run did, plus the figures the admin dashboard
/// shows: collected revenue and the split between providers.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Sum of package prices over successful checkouts.
    pub revenue: u64,
    pub by_method: BTreeMap<PaymentMethod, MethodTotals>,
}

/// Per-provider share of a batch.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MethodTotals {
    pub succeeded: usize,
    pub failed: usize,
    pub revenue: u64,
}

impl BatchSummary {
    fn record(&mut self, selection: &SelectionState, outcome: &CheckoutOutcome) {
        let price = selection.package().map_or(0, |p| u64::from(p.price()));
        let method = selection.method().map(|m| self.by_method.entry(m).or_default());
        if outcome.is_success() {
            self.succeeded += 1;
            self.revenue += price;
            if let Some(totals) = method {
                totals.succeeded += 1;
                totals.revenue += price;
            }
        } else {
            self.failed += 1;
            if let Some(totals) = method {
                totals.failed += 1;
            }
        }
    }

    /// Percentage of successful checkouts paid through `method`.
    pub fn method_share(&self, method: PaymentMethod) -> f64 {
        if self.succeeded == 0 {
            return 0.0;
        }
        let succeeded = self.by_method.get(&method).map_or(0, |t| t.succeeded);
        succeeded as f64 * 100.0 / self.succeeded as f64
    }
}

/// Applies a row to a fresh selection the same way clicks would.
pub fn selection_from_row(row: &CheckoutRow, catalog: &Catalog) -> SelectionState {
    let mut selection = SelectionState::new();
    if let Some(package_type) = row.package {
        match catalog.get(package_type) {
            Some(package) => selection.set_package(package.clone()),
            None => warn!(package = %package_type, "Package not offered in catalog"),
        }
    }
    if let Some(method) = row.method {
        selection.set_method(method);
    }
    selection.set_phone_digits(&row.phone);
    selection
}

/// Runs one checkout per input row, one after another, and writes a payment
/// record for each. Rows that cannot be read are logged and skipped.
pub async fn run_batch<R: Read, W: Write>(
    pipeline: &CheckoutPipeline,
    catalog: &Catalog,
    country_code: &str,
    observer: &dyn CheckoutObserver,
    source: R,
    sink: W,
) -> Result<BatchSummary> {
    let mut summary = BatchSummary::default();
    let mut ledger = LedgerWriter::new(sink);

    for row in CheckoutReader::new(source).rows() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                warn!(error = %e, "Error reading checkout row");
                summary.skipped += 1;
                continue;
            }
        };

        let selection = selection_from_row(&row, catalog);
        let outcome = pipeline.checkout(&selection, observer).await;
        summary.record(&selection, &outcome);

        let sequence = summary.succeeded + summary.failed;
        let record = PaymentRecord::new(sequence, &selection, &outcome, country_code, Utc::now());
        ledger.write_record(&record)?;
    }

    ledger.flush()?;
    Ok(summary)
}
