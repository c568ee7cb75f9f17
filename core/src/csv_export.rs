//! CSV files for people, transactions and social interactions.
//!
//! Columns come from each record's serde field names. The header
//! constants spell out the same names so that a file with no rows still
//! gets its header line.

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::ForgeResult;

pub const PEOPLE_HEADER: &str = "customer_id,first_name,last_name,street,city,state,zip,phone,email,job";
pub const TRANSACTIONS_HEADER: &str = "customer_id,orderid,purchasedatetime,transactiontotal,numberofitems,productcode,productcategory,cc_number,price_per_unit";
pub const SOCIAL_HEADER: &str = "interaction_id,person1_id,person2_id,interaction_type,interaction_date";

pub const PEOPLE_FILE: &str = "output_people.csv";
pub const TRANSACTIONS_FILE: &str = "output_transactions.csv";
pub const SOCIAL_FILE: &str = "output_social.csv";

/// Write the optional header and then one line per row.
pub fn write_rows<W: Write, R: Serialize>(
    writer: &mut csv::Writer<W>,
    header: &str,
    rows: &[R],
    include_header: bool,
) -> ForgeResult<()> {
    if include_header {
        writer.write_record(header.split(','))?;
    }
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_csv<R: Serialize>(
    path: &Path,
    header: &str,
    rows: &[R],
    include_header: bool,
) -> ForgeResult<()> {
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    write_rows(&mut writer, header, rows, include_header)?;
    log::info!("csv: wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}
