//! Deterministic identity and address generation from the reference tables.
//!
//! All generation is deterministic (same stream seed = same output).

use serde::{Deserialize, Serialize};

use crate::{reference::ReferenceTables, rng::StreamRng};

const LOWER_ALNUM: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const UPPER_ALNUM: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const EMAIL_DOMAINS: &[&str] = &["gmail.com", "yahoo.com", "hotmail.com", "outlook.com", "example.com"];
const EMAIL_SEPARATORS: &[&str] = &["", ".", "_"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
}

/// Stateless namespace over the reference tables.
pub struct NameGenerator;

impl NameGenerator {
    /// 16-character lowercase alphanumeric identifier.
    pub fn generate_id(rng: &mut StreamRng) -> String {
        Self::random_string(rng, LOWER_ALNUM, 16)
    }

    /// 8-character uppercase alphanumeric order identifier.
    pub fn generate_order_id(rng: &mut StreamRng) -> String {
        Self::random_string(rng, UPPER_ALNUM, 8)
    }

    /// First name after a 50/50 gender draw.
    pub fn generate_first_name<'t>(rng: &mut StreamRng, tables: &'t ReferenceTables) -> &'t str {
        let names = if rng.chance(0.5) {
            &tables.first_names_male
        } else {
            &tables.first_names_female
        };
        rng.pick(names).as_str()
    }

    pub fn generate_last_name<'t>(rng: &mut StreamRng, tables: &'t ReferenceTables) -> &'t str {
        rng.pick(&tables.last_names).as_str()
    }

    /// `XXX-XXX-XXXX`
    pub fn generate_phone(rng: &mut StreamRng) -> String {
        format!(
            "{}-{}-{}",
            rng.range_inclusive(100, 999),
            rng.range_inclusive(100, 999),
            rng.range_inclusive(1000, 9999)
        )
    }

    pub fn generate_email(rng: &mut StreamRng, first_name: &str, last_name: &str) -> String {
        let separator = rng.pick(EMAIL_SEPARATORS);
        let domain = rng.pick(EMAIL_DOMAINS);
        format!(
            "{}{separator}{}@{domain}",
            first_name.to_lowercase(),
            last_name.to_lowercase()
        )
    }

    pub fn generate_zip(rng: &mut StreamRng) -> String {
        rng.range_inclusive(10000, 99999).to_string()
    }

    /// House number plus a street from the table.
    pub fn generate_street(rng: &mut StreamRng, tables: &ReferenceTables) -> String {
        let number = rng.range_inclusive(100, 9999);
        format!("{number} {}", rng.pick(&tables.streets))
    }

    /// Full business address; postal code comes from the table.
    pub fn generate_address(rng: &mut StreamRng, tables: &ReferenceTables) -> Address {
        Address {
            street: Self::generate_street(rng, tables),
            city: rng.pick(&tables.cities).clone(),
            state: rng.pick(&tables.states).clone(),
            postal_code: rng.pick(&tables.postal_codes).clone(),
        }
    }

    pub fn generate_company<'t>(rng: &mut StreamRng, tables: &'t ReferenceTables) -> &'t str {
        rng.pick(&tables.companies).as_str()
    }

    fn random_string(rng: &mut StreamRng, alphabet: &[u8], len: usize) -> String {
        (0..len).map(|_| *rng.pick(alphabet) as char).collect()
    }
}
