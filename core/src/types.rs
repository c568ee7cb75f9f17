//! Shared primitive types used across the entire generator.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A stable, unique identifier for a synthetic customer.
pub type CustomerId = String;

/// The canonical run identifier.
pub type RunId = String;

/// A percentage in [0, 100]. Only constructible through validation,
/// so every rate reaching the generator is already in range.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Percent(f64);

impl Percent {
    pub const ZERO: Percent = Percent(0.0);
    pub const FULL: Percent = Percent(100.0);

    pub fn new(field: &'static str, value: f64) -> Result<Self, ConfigError> {
        if value.is_finite() && (0.0..=100.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ConfigError::PercentOutOfRange { field, value })
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// The same rate as a probability in [0, 1].
    pub fn probability(self) -> f64 {
        self.0 / 100.0
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }
}

impl TryFrom<f64> for Percent {
    type Error = ConfigError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Percent::new("percent", value)
    }
}

impl From<Percent> for f64 {
    fn from(p: Percent) -> f64 {
        p.0
    }
}

/// Round a money amount to cents. Every place that computes or
/// re-checks a line total goes through here.
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Money written as a two-decimal string, `"20.50"`, in CSV and JSON alike.
pub mod cents {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(amount: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&format_args!("{amount:.2}"))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(D::Error::custom)
    }
}
