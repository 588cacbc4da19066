use crate::error::{Result, WifiPayError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Currency every catalog price is quoted in.
pub const CURRENCY: &str = "UGX";

/// The purchasable access durations.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone, Copy)]
pub enum PackageType {
    #[serde(rename = "1hour", alias = "one-hour")]
    OneHour,
    #[serde(rename = "1day", alias = "one-day")]
    OneDay,
    #[serde(rename = "1week", alias = "one-week")]
    OneWeek,
    #[serde(rename = "1month", alias = "one-month")]
    OneMonth,
}

impl PackageType {
    pub const ALL: [PackageType; 4] = [
        PackageType::OneHour,
        PackageType::OneDay,
        PackageType::OneWeek,
        PackageType::OneMonth,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PackageType::OneHour => "1hour",
            PackageType::OneDay => "1day",
            PackageType::OneWeek => "1week",
            PackageType::OneMonth => "1month",
        }
    }

    /// How long a voucher bought for this package stays valid.
    pub fn validity(&self) -> Duration {
        const HOUR: u64 = 60 * 60;
        match self {
            PackageType::OneHour => Duration::from_secs(HOUR),
            PackageType::OneDay => Duration::from_secs(24 * HOUR),
            PackageType::OneWeek => Duration::from_secs(7 * 24 * HOUR),
            PackageType::OneMonth => Duration::from_secs(30 * 24 * HOUR),
        }
    }

    pub fn validity_label(&self) -> &'static str {
        match self {
            PackageType::OneHour => "Valid for 1 hour",
            PackageType::OneDay => "Valid for 24 hours",
            PackageType::OneWeek => "Valid for 7 days",
            PackageType::OneMonth => "Valid for 30 days",
        }
    }
}

impl fmt::Display for PackageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PackageType {
    type Err = WifiPayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1hour" | "one-hour" => Ok(PackageType::OneHour),
            "1day" | "one-day" => Ok(PackageType::OneDay),
            "1week" | "one-week" => Ok(PackageType::OneWeek),
            "1month" | "one-month" => Ok(PackageType::OneMonth),
            other => Err(WifiPayError::ValidationError(format!(
                "Unknown package type: {other}"
            ))),
        }
    }
}

/// A package the user picked, consistent with one catalog entry.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone)]
#[serde(try_from = "PackageEntry")]
pub struct PackageSelection {
    package_type: PackageType,
    price: u32,
    display_name: String,
}

/// Unvalidated form of a catalog entry, as found in config files.
#[derive(Deserialize)]
struct PackageEntry {
    package_type: PackageType,
    price: u32,
    display_name: String,
}

impl TryFrom<PackageEntry> for PackageSelection {
    type Error = WifiPayError;

    fn try_from(entry: PackageEntry) -> Result<Self> {
        Self::new(entry.package_type, entry.price, entry.display_name)
    }
}

impl PackageSelection {
    pub fn new(
        package_type: PackageType,
        price: u32,
        display_name: impl Into<String>,
    ) -> Result<Self> {
        if price == 0 {
            return Err(WifiPayError::ValidationError(
                "Package price must be positive".to_string(),
            ));
        }
        Ok(Self {
            package_type,
            price,
            display_name: display_name.into(),
        })
    }

    pub fn package_type(&self) -> PackageType {
        self.package_type
    }

    pub fn price(&self) -> u32 {
        self.price
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Price rendered the way the pay button shows it, e.g. `UGX 5,000`.
    pub fn price_label(&self) -> String {
        format_price(self.price.into())
    }
}

pub fn format_price(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{CURRENCY} {grouped}")
}

/// The static list of packages on offer.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    entries: Vec<PackageSelection>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl Catalog {
    pub fn standard() -> Self {
        let entries = [
            (PackageType::OneHour, 1_000, "1 Hour"),
            (PackageType::OneDay, 5_000, "1 Day"),
            (PackageType::OneWeek, 25_000, "1 Week"),
            (PackageType::OneMonth, 80_000, "1 Month"),
        ]
        .into_iter()
        .filter_map(|(package_type, price, name)| PackageSelection::new(package_type, price, name).ok())
        .collect();
        Self { entries }
    }

    /// Builds a catalog from explicit entries, rejecting duplicate types.
    pub fn from_entries(entries: Vec<PackageSelection>) -> Result<Self> {
        for (i, entry) in entries.iter().enumerate() {
            if entries[..i]
                .iter()
                .any(|prior| prior.package_type == entry.package_type)
            {
                return Err(WifiPayError::InvalidConfig(format!(
                    "Duplicate catalog entry for {}",
                    entry.package_type
                )));
            }
        }
        Ok(Self { entries })
    }

    pub fn get(&self, package_type: PackageType) -> Option<&PackageSelection> {
        self.entries.iter().find(|e| e.package_type == package_type)
    }

    pub fn entries(&self) -> &[PackageSelection] {
        &self.entries
    }
}
