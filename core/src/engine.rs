//! The generation engine.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Population        (people)
//!   2. Transactions      (per customer, shared error decision)
//!   3. Social            (interactions between people)
//!   4. CSV export
//!   5. Invoices          (one page per customer with transactions)
//!   6. Manifest
//!
//! RULES:
//!   - Stages 1-3 each draw from their own RNG stream.
//!   - Every invoice draws from streams keyed by its customer index, so
//!     one invoice's randomness never depends on another's.
//!   - Stages never read files; reference tables come in already loaded.

use std::path::PathBuf;

use crate::{
    config::GenConfig,
    csv_export::{
        write_csv, PEOPLE_FILE, PEOPLE_HEADER, SOCIAL_FILE, SOCIAL_HEADER, TRANSACTIONS_FILE,
        TRANSACTIONS_HEADER,
    },
    distortion::DocumentDistorter,
    error::ForgeResult,
    invoice::{InvoiceContext, InvoiceOutcome, InvoiceRenderer, PAGE_HEIGHT, PAGE_WIDTH},
    manifest::{derive_run_id, InvoiceEntry, RunManifest},
    pdf::PdfSurface,
    population::{generate_population, Person},
    reference::ReferenceTables,
    rng::{RngBank, StreamSlot},
    social::{generate_interactions, SocialInteraction},
    surface::{RecordingSurface, Surface},
    transaction::{generate_customer_transactions, CustomerBatch, Transaction},
    types::RunId,
};

/// Every record a run produces before anything is rendered.
#[derive(Debug, Clone)]
pub struct GeneratedRecords {
    pub people: Vec<Person>,
    /// Parallel to `people`. Empty when transactions are disabled.
    pub batches: Vec<CustomerBatch>,
    pub interactions: Vec<SocialInteraction>,
}

impl GeneratedRecords {
    pub fn transactions(&self) -> Vec<Transaction> {
        self.batches
            .iter()
            .flat_map(|b| b.transactions.iter().cloned())
            .collect()
    }

    pub fn transaction_count(&self) -> usize {
        self.batches.iter().map(|b| b.transactions.len()).sum()
    }
}

/// End-of-run figures printed by the CLI.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: RunId,
    pub total_invoices: usize,
    pub error_invoices: usize,
    pub distorted_invoices: usize,
    pub invoices: Vec<InvoiceOutcome>,
}

impl RunSummary {
    fn from_manifest(manifest: &RunManifest) -> Self {
        Self {
            run_id:             manifest.run_id.clone(),
            total_invoices:     manifest.invoices.len(),
            error_invoices:     manifest.error_invoices(),
            distorted_invoices: manifest.distorted_invoices(),
            invoices:           manifest.invoices.iter().map(|e| e.outcome.clone()).collect(),
        }
    }

    /// Share of invoices with at least one calculation error, 0-100.
    pub fn error_percentage(&self) -> f64 {
        if self.total_invoices == 0 {
            0.0
        } else {
            self.error_invoices as f64 / self.total_invoices as f64 * 100.0
        }
    }
}

pub struct GenerationEngine {
    pub run_id: RunId,
    config:     GenConfig,
    tables:     ReferenceTables,
    rng_bank:   RngBank,
}

impl GenerationEngine {
    /// Validates the config up front; a bad config never starts a run.
    pub fn new(config: GenConfig, tables: ReferenceTables) -> ForgeResult<Self> {
        config.validate()?;
        let rng_bank = RngBank::new(config.seed);
        let run_id = derive_run_id(&rng_bank);
        Ok(Self {
            run_id,
            config,
            tables,
            rng_bank,
        })
    }

    pub fn config(&self) -> &GenConfig {
        &self.config
    }

    /// Stages 1-3. Pure: no filesystem access.
    pub fn generate_records(&self) -> GeneratedRecords {
        let mut population_rng = self.rng_bank.for_stream(StreamSlot::Population);
        let people = generate_population(self.config.num_customers, &mut population_rng, &self.tables);

        let batches = if self.config.generate_transactions {
            let mut txn_rng = self.rng_bank.for_stream(StreamSlot::Transaction);
            let batches: Vec<CustomerBatch> = people
                .iter()
                .map(|p| {
                    generate_customer_transactions(
                        &p.customer_id,
                        self.config.transactions_per_customer,
                        self.config.error_rate,
                        self.config.as_of,
                        &mut txn_rng,
                    )
                })
                .collect();
            log::info!(
                "transactions: generated {} lines for {} customers",
                batches.iter().map(|b| b.transactions.len()).sum::<usize>(),
                batches.len()
            );
            batches
        } else {
            log::info!("transactions: disabled");
            Vec::new()
        };

        let mut social_rng = self.rng_bank.for_stream(StreamSlot::Social);
        let interactions = generate_interactions(&people, self.config.as_of, &mut social_rng);

        GeneratedRecords {
            people,
            batches,
            interactions,
        }
    }

    fn write_csvs(&self, records: &GeneratedRecords) -> ForgeResult<()> {
        let dir = &self.config.output_dir;
        let headers = self.config.include_headers;
        write_csv(&dir.join(PEOPLE_FILE), PEOPLE_HEADER, &records.people, headers)?;
        if self.config.generate_transactions {
            write_csv(
                &dir.join(TRANSACTIONS_FILE),
                TRANSACTIONS_HEADER,
                &records.transactions(),
                headers,
            )?;
        }
        write_csv(&dir.join(SOCIAL_FILE), SOCIAL_HEADER, &records.interactions, headers)?;
        log::info!("csv: wrote output files to {}", dir.display());
        Ok(())
    }

    /// Stage 5. `new_surface` builds a blank page, `finish` consumes the
    /// drawn page and returns the file it went to, if any.
    fn render_invoices<S, F>(
        &self,
        records: &GeneratedRecords,
        new_surface: impl Fn() -> S,
        mut finish: F,
    ) -> ForgeResult<Vec<InvoiceEntry>>
    where
        S: Surface,
        F: FnMut(&Person, S) -> ForgeResult<Option<String>>,
    {
        let renderer = InvoiceRenderer::new(InvoiceContext {
            tables:    &self.tables,
            distorter: DocumentDistorter::new(self.config.dirty_rate),
            as_of:     self.config.as_of,
        });

        let mut entries = Vec::new();
        for (index, (person, batch)) in records.people.iter().zip(&records.batches).enumerate() {
            if batch.transactions.is_empty() {
                log::warn!("invoice: skipping customer {} with no transactions", person.customer_id);
                continue;
            }

            let mut layout_rng = self.rng_bank.for_stream_at(StreamSlot::Invoice, index as u64);
            let mut distortion_rng = self.rng_bank.for_stream_at(StreamSlot::Distortion, index as u64);
            let mut surface = new_surface();
            let outcome = renderer.render(
                &mut surface,
                person,
                &batch.transactions,
                &mut layout_rng,
                &mut distortion_rng,
            );
            let file = finish(person, surface)?;

            log::debug!(
                "invoice: customer={} lines={} errors={} distorted={}",
                outcome.customer_id,
                batch.transactions.len(),
                outcome.has_errors,
                outcome.is_distorted()
            );
            entries.push(InvoiceEntry { file, outcome });
        }

        if records.batches.is_empty() {
            log::warn!("invoice: no transactions generated, no invoices rendered");
        }
        Ok(entries)
    }

    fn manifest_for(&self, records: &GeneratedRecords, invoices: Vec<InvoiceEntry>) -> RunManifest {
        let mut manifest = RunManifest::new(self.run_id.clone(), &self.config);
        manifest.people = records.people.len();
        manifest.transactions = records.transaction_count();
        manifest.interactions = records.interactions.len();
        manifest.invoices = invoices;
        manifest
    }

    /// Full run: CSVs, one PDF per invoice and the manifest.
    pub fn run(&self) -> ForgeResult<RunSummary> {
        log::info!(
            "engine: run {} seed={} customers={}",
            self.run_id,
            self.config.seed,
            self.config.num_customers
        );

        let records = self.generate_records();

        std::fs::create_dir_all(&self.config.output_dir)?;
        self.write_csvs(&records)?;

        let pdf_dir: PathBuf = self.config.pdf_dir();
        std::fs::create_dir_all(&pdf_dir)?;
        let invoices = self.render_invoices(
            &records,
            || PdfSurface::new(PAGE_WIDTH, PAGE_HEIGHT),
            |person: &Person, surface: PdfSurface| {
                let file_name = format!("invoice_{}.pdf", person.customer_id);
                surface.save(&pdf_dir.join(&file_name))?;
                Ok(Some(file_name))
            },
        )?;

        let manifest = self.manifest_for(&records, invoices);
        manifest.write(&self.config.output_dir)?;

        let summary = RunSummary::from_manifest(&manifest);
        log::info!(
            "engine: rendered {} invoices, {} with errors, {} distorted",
            summary.total_invoices,
            summary.error_invoices,
            summary.distorted_invoices
        );
        Ok(summary)
    }

    /// Same generation and rendering as [`run`](Self::run), drawn onto
    /// in-memory surfaces. Touches no files.
    pub fn dry_run(&self) -> ForgeResult<(RunManifest, RunSummary)> {
        let records = self.generate_records();
        let invoices = self.render_invoices(
            &records,
            || RecordingSurface::new(PAGE_WIDTH, PAGE_HEIGHT),
            |_: &Person, _: RecordingSurface| Ok(None),
        )?;
        let manifest = self.manifest_for(&records, invoices);
        let summary = RunSummary::from_manifest(&manifest);
        log::info!(
            "engine: dry run of {} invoices, {} with errors",
            summary.total_invoices,
            summary.error_invoices
        );
        Ok((manifest, summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ForgeError, types::Percent};

    fn engine(config: GenConfig) -> GenerationEngine {
        GenerationEngine::new(config, ReferenceTables::builtin()).unwrap()
    }

    #[test]
    fn invalid_config_is_rejected_before_any_work() {
        let mut config = GenConfig::default_test();
        config.num_customers = 0;
        let result = GenerationEngine::new(config, ReferenceTables::builtin());
        assert!(matches!(result, Err(ForgeError::Config(_))));
    }

    #[test]
    fn records_line_up_with_people() {
        let records = engine(GenConfig::default_test()).generate_records();
        assert_eq!(records.people.len(), 10);
        assert_eq!(records.batches.len(), 10);
        assert_eq!(records.interactions.len(), 20);
        for (person, batch) in records.people.iter().zip(&records.batches) {
            assert_eq!(person.customer_id, batch.customer_id);
            assert!((1..=3).contains(&batch.transactions.len()));
        }
    }

    #[test]
    fn dry_run_renders_one_invoice_per_customer() {
        let (manifest, summary) = engine(GenConfig::default_test()).dry_run().unwrap();
        assert_eq!(summary.total_invoices, 10);
        assert_eq!(summary.error_invoices, 0);
        assert_eq!(summary.distorted_invoices, 0);
        assert!(manifest.invoices.iter().all(|e| e.file.is_none()));
    }

    #[test]
    fn disabled_transactions_render_no_invoices() {
        let mut config = GenConfig::default_test();
        config.generate_transactions = false;
        let (manifest, summary) = engine(config).dry_run().unwrap();
        assert_eq!(summary.total_invoices, 0);
        assert_eq!(manifest.transactions, 0);
        assert_eq!(manifest.people, 10);
    }

    #[test]
    fn full_error_rate_flags_every_invoice() {
        let mut config = GenConfig::default_test();
        config.error_rate = Percent::FULL;
        let (_, summary) = engine(config).dry_run().unwrap();
        assert_eq!(summary.error_invoices, summary.total_invoices);
        assert_eq!(summary.error_percentage(), 100.0);
    }

    #[test]
    fn empty_summary_reports_zero_percent() {
        let summary = RunSummary {
            run_id:             "r".into(),
            total_invoices:     0,
            error_invoices:     0,
            distorted_invoices: 0,
            invoices:           Vec::new(),
        };
        assert_eq!(summary.error_percentage(), 0.0);
    }
}
