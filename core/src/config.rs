use std::path::PathBuf;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, types::Percent};

/// Hard cap on transactions per customer; one invoice page holds this many lines.
pub const MAX_TRANSACTIONS_PER_CUSTOMER: usize = 15;

/// Everything a generation run needs, validated before the engine starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenConfig {
    pub seed: u64,
    pub num_customers: usize,
    /// Upper bound; each customer gets 1..=this many transactions.
    pub transactions_per_customer: usize,
    pub error_rate: Percent,
    pub dirty_rate: Percent,
    pub include_headers: bool,
    pub generate_transactions: bool,
    pub output_dir: PathBuf,
    pub data_dir: String,
    /// "Now" for the run. Purchase and interaction dates count back from here.
    pub as_of: NaiveDateTime,
}

impl GenConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_customers == 0 {
            return Err(ConfigError::NoCustomers);
        }
        if self.transactions_per_customer == 0
            || self.transactions_per_customer > MAX_TRANSACTIONS_PER_CUSTOMER
        {
            return Err(ConfigError::TransactionsPerCustomer {
                value: self.transactions_per_customer,
                max: MAX_TRANSACTIONS_PER_CUSTOMER,
            });
        }
        // Percent can only be built in range, but a config deserialized
        // through another path still gets re-checked here.
        Percent::new("error_rate", self.error_rate.value())?;
        Percent::new("dirty_rate", self.dirty_rate.value())?;
        Ok(())
    }

    pub fn pdf_dir(&self) -> PathBuf {
        self.output_dir.join("pdf_output")
    }

    /// Config with hardcoded defaults for use in unit tests.
    pub fn default_test() -> Self {
        Self {
            seed: 42,
            num_customers: 10,
            transactions_per_customer: 3,
            error_rate: Percent::ZERO,
            dirty_rate: Percent::ZERO,
            include_headers: true,
            generate_transactions: true,
            output_dir: PathBuf::from("."),
            data_dir: "./data".into(),
            as_of: NaiveDate::from_ymd_opt(2024, 6, 1)
                .and_then(|d| d.and_hms_opt(12, 0, 0))
                .unwrap_or_default(),
        }
    }
}
