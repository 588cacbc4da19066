use crate::error::{Result, WifiPayError};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const VOUCHER_PREFIX: &str = "WFP";
pub const VOUCHER_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const GROUP_LEN: usize = 4;

/// A WiFi access code of the form `WFP-XXXX-XXXX`.
///
/// Codes are drawn at random and never checked for collisions.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Clone)]
#[serde(try_from = "String", into = "String")]
pub struct VoucherCode(String);

impl VoucherCode {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut group = || -> String {
            (0..GROUP_LEN)
                .map(|_| VOUCHER_ALPHABET[rng.gen_range(0..VOUCHER_ALPHABET.len())] as char)
                .collect()
        };
        let first = group();
        let second = group();
        Self(format!("{VOUCHER_PREFIX}-{first}-{second}"))
    }

    pub fn parse(code: &str) -> Result<Self> {
        let code = code.trim().to_ascii_uppercase();
        let mut parts = code.split('-');
        let well_formed = parts.next() == Some(VOUCHER_PREFIX)
            && parts.by_ref().take(2).all(|group| {
                group.len() == GROUP_LEN && group.bytes().all(|b| VOUCHER_ALPHABET.contains(&b))
            })
            && parts.next().is_none()
            && code.len() == VOUCHER_PREFIX.len() + 2 * (GROUP_LEN + 1);
        if well_formed {
            Ok(Self(code))
        } else {
            Err(WifiPayError::ValidationError(format!(
                "Malformed voucher code: {code}"
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for VoucherCode {
    type Err = WifiPayError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for VoucherCode {
    type Error = WifiPayError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<VoucherCode> for String {
    fn from(code: VoucherCode) -> Self {
        code.0
    }
}

impl fmt::Display for VoucherCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Remaining validity of an issued voucher, ticking down one second at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    remaining_secs: u64,
}

impl Countdown {
    pub fn new(remaining: Duration) -> Self {
        Self {
            remaining_secs: remaining.as_secs(),
        }
    }

    /// Countdown for a voucher of `validity` that was issued `elapsed` ago.
    pub fn since_issue(validity: Duration, elapsed: Duration) -> Self {
        Self::new(validity.saturating_sub(elapsed))
    }

    /// Advances one second. Returns `false` once the voucher has expired.
    pub fn tick(&mut self) -> bool {
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        !self.is_expired()
    }

    pub fn is_expired(&self) -> bool {
        self.remaining_secs == 0
    }

    pub fn remaining(&self) -> Duration {
        Duration::from_secs(self.remaining_secs)
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_expired() {
            return f.write_str("EXPIRED");
        }
        let days = self.remaining_secs / 86_400;
        let hours = (self.remaining_secs % 86_400) / 3600;
        let minutes = (self.remaining_secs % 3600) / 60;
        let seconds = self.remaining_secs % 60;
        if days > 0 {
            write!(f, "{days}d {hours:02}:{minutes:02}:{seconds:02}")
        } else {
            write!(f, "{hours:02}:{minutes:02}:{seconds:02}")
        }
    }
}
