//! invoice-forge: generate synthetic customers, transactions, social
//! interactions and one PDF invoice per customer.
//!
//! Usage:
//!   invoice-forge --num-customers 100 --error-rate 10 --dirty-rate 25
//!   invoice-forge --seed 7 --output-dir out --dry-run

use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use invoice_forge_core::{
    config::{GenConfig, MAX_TRANSACTIONS_PER_CUSTOMER},
    engine::{GenerationEngine, RunSummary},
    reference::ReferenceTables,
    types::Percent,
};

#[derive(Parser, Debug)]
#[command(name = "invoice-forge")]
#[command(about = "Generate synthetic invoice test data with optional errors and page wear")]
struct Args {
    /// Number of customers to generate
    #[arg(long, default_value_t = 10)]
    num_customers: usize,

    /// Maximum transactions per customer (1-15)
    #[arg(long, default_value_t = 3)]
    transactions_per_customer: usize,

    /// Percentage of customers whose invoices carry calculation errors (0-100)
    #[arg(long, default_value_t = 0.0)]
    error_rate: f64,

    /// Percentage of invoices that get visual distortions (0-100)
    #[arg(long, default_value_t = 0.0)]
    dirty_rate: f64,

    /// Omit header rows from the CSV files
    #[arg(long)]
    no_headers: bool,

    /// Skip transaction generation (no transactions CSV, no invoices)
    #[arg(long)]
    no_transactions: bool,

    /// Master seed; the same seed reproduces the same run
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Directory for CSV files, pdf_output/ and manifest.json
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Directory holding reference/tables.json
    #[arg(long, default_value = "./data")]
    data_dir: String,

    /// Generate and render in memory only, write nothing
    #[arg(long)]
    dry_run: bool,
}

impl Args {
    fn into_config(self) -> Result<(GenConfig, bool)> {
        let config = GenConfig {
            seed: self.seed,
            num_customers: self.num_customers,
            transactions_per_customer: self.transactions_per_customer,
            error_rate: Percent::new("error_rate", self.error_rate)?,
            dirty_rate: Percent::new("dirty_rate", self.dirty_rate)?,
            include_headers: !self.no_headers,
            generate_transactions: !self.no_transactions,
            output_dir: self.output_dir,
            data_dir: self.data_dir,
            as_of: chrono::Local::now().naive_local(),
        };
        config.validate()?;
        Ok((config, self.dry_run))
    }
}

/// Tables from `<data_dir>/reference/tables.json`, or the built-in
/// lists when that file does not exist.
fn load_tables(data_dir: &str) -> Result<ReferenceTables> {
    let path = Path::new(data_dir).join("reference").join("tables.json");
    if path.exists() {
        Ok(ReferenceTables::load(data_dir)?)
    } else {
        log::warn!("{} not found, using built-in reference tables", path.display());
        Ok(ReferenceTables::builtin())
    }
}

fn print_config(config: &GenConfig, dry_run: bool) {
    println!("invoice-forge");
    println!("  customers:          {}", config.num_customers);
    println!(
        "  max transactions:   {} (cap {MAX_TRANSACTIONS_PER_CUSTOMER})",
        config.transactions_per_customer
    );
    println!("  error rate:         {}%", config.error_rate.value());
    println!("  dirty rate:         {}%", config.dirty_rate.value());
    println!("  headers:            {}", config.include_headers);
    println!("  transactions:       {}", config.generate_transactions);
    println!("  seed:               {}", config.seed);
    println!("  output dir:         {}", config.output_dir.display());
    println!("  data dir:           {}", config.data_dir);
    if dry_run {
        println!("  mode:               dry run");
    }
    println!();
}

fn print_summary(summary: &RunSummary) {
    println!(
        "Generated {} invoices, {} ({:.1}%) contain calculation errors.",
        summary.total_invoices,
        summary.error_invoices,
        summary.error_percentage()
    );
    println!("{} invoices received visual distortions.", summary.distorted_invoices);
    println!("Run id: {}", summary.run_id);
}

fn main() -> Result<()> {
    env_logger::init();

    let (config, dry_run) = Args::parse().into_config()?;
    print_config(&config, dry_run);

    let started = Instant::now();
    let tables = load_tables(&config.data_dir)?;
    let engine = GenerationEngine::new(config, tables)?;

    let summary = if dry_run {
        engine.dry_run()?.1
    } else {
        engine.run()?
    };

    print_summary(&summary);
    println!("Execution time: {:.2} seconds", started.elapsed().as_secs_f64());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_parse_into_a_valid_config() {
        let (config, dry_run) = Args::parse_from(["invoice-forge"]).into_config().unwrap();
        assert_eq!(config.num_customers, 10);
        assert_eq!(config.transactions_per_customer, 3);
        assert_eq!(config.seed, 42);
        assert!(config.include_headers);
        assert!(config.generate_transactions);
        assert!(!dry_run);
    }

    #[test]
    fn out_of_range_rates_are_rejected() {
        let args = Args::parse_from(["invoice-forge", "--error-rate", "150"]);
        assert!(args.into_config().is_err());
        let args = Args::parse_from(["invoice-forge", "--dirty-rate=-1"]);
        assert!(args.into_config().is_err());
    }

    #[test]
    fn transaction_cap_is_enforced() {
        let args = Args::parse_from(["invoice-forge", "--transactions-per-customer", "16"]);
        assert!(args.into_config().is_err());
        let args = Args::parse_from(["invoice-forge", "--num-customers", "0"]);
        assert!(args.into_config().is_err());
    }

    #[test]
    fn flags_toggle_switches() {
        let (config, dry_run) =
            Args::parse_from(["invoice-forge", "--no-headers", "--no-transactions", "--dry-run"])
                .into_config()
                .unwrap();
        assert!(!config.include_headers);
        assert!(!config.generate_transactions);
        assert!(dry_run);
    }
}
