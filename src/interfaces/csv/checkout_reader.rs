use crate::domain::package::PackageType;
use crate::domain::payment::PaymentMethod;
use crate::error::{Result, WifiPayError};
use serde::Deserialize;
use std::io::Read;

/// One customer's choices as captured in a batch file.
///
/// Columns may be left empty; the checkout then fails as an incomplete
/// selection instead of the row being rejected.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct CheckoutRow {
    pub package: Option<PackageType>,
    pub method: Option<PaymentMethod>,
    #[serde(default)]
    pub phone: String,
}

/// Reads checkout rows (`package,method,phone`) from a CSV source.
pub struct CheckoutReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CheckoutReader<R> {
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Lazily yields one result per data row.
    pub fn rows(self) -> impl Iterator<Item = Result<CheckoutRow>> {
        self.reader
            .into_deserialize()
            .map(|result| result.map_err(WifiPayError::from))
    }
}
