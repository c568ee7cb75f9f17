//! Run manifest: what a generation run was asked to do and what it
//! produced, serialized to `manifest.json` beside the CSV files.
//!
//! The manifest carries no wall-clock time. Two runs with the same
//! config produce byte-identical manifests.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{
    config::GenConfig,
    error::ForgeResult,
    invoice::InvoiceOutcome,
    rng::{RngBank, StreamSlot},
    types::RunId,
};

pub const MANIFEST_FILE: &str = "manifest.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceEntry {
    pub file: Option<String>,
    #[serde(flatten)]
    pub outcome: InvoiceOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    pub run_id: RunId,
    pub seed: u64,
    pub as_of: String,
    pub num_customers: usize,
    pub transactions_per_customer: usize,
    pub error_rate: f64,
    pub dirty_rate: f64,
    pub people: usize,
    pub transactions: usize,
    pub interactions: usize,
    pub invoices: Vec<InvoiceEntry>,
}

/// Run id derived from the seed, so reruns reuse it.
pub fn derive_run_id(bank: &RngBank) -> RunId {
    let mut rng = bank.for_stream(StreamSlot::Run);
    uuid::Builder::from_random_bytes(rng.next_bytes_16())
        .into_uuid()
        .to_string()
}

impl RunManifest {
    pub fn new(run_id: RunId, config: &GenConfig) -> Self {
        Self {
            run_id,
            seed: config.seed,
            as_of: config.as_of.format("%Y-%m-%d %H:%M:%S").to_string(),
            num_customers: config.num_customers,
            transactions_per_customer: config.transactions_per_customer,
            error_rate: config.error_rate.value(),
            dirty_rate: config.dirty_rate.value(),
            people: 0,
            transactions: 0,
            interactions: 0,
            invoices: Vec::new(),
        }
    }

    pub fn error_invoices(&self) -> usize {
        self.invoices.iter().filter(|e| e.outcome.has_errors).count()
    }

    pub fn distorted_invoices(&self) -> usize {
        self.invoices.iter().filter(|e| e.outcome.is_distorted()).count()
    }

    pub fn to_json(&self) -> ForgeResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write(&self, dir: &Path) -> ForgeResult<()> {
        let path = dir.join(MANIFEST_FILE);
        std::fs::write(&path, self.to_json()?)?;
        log::info!("manifest: wrote {}", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> ForgeResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
        Ok(serde_json::from_str(&content)?)
    }
}
