use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{
    error_injector::{compute_transaction_total, decide_customer_has_error},
    name_generator::NameGenerator,
    rng::StreamRng,
    types::{cents, round_cents, CustomerId, Percent},
};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
/// Purchases fall within this many days before `as_of`.
pub const LOOKBACK_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub customer_id: CustomerId,
    #[serde(rename = "orderid")]
    pub order_id: String,
    #[serde(rename = "purchasedatetime")]
    pub purchase_timestamp: String,
    #[serde(rename = "transactiontotal", with = "cents")]
    pub total: f64,
    #[serde(rename = "numberofitems")]
    pub unit_count: u32,
    #[serde(rename = "productcode")]
    pub product_code: String,
    #[serde(rename = "productcategory")]
    pub product_category: String,
    #[serde(rename = "cc_number")]
    pub payment_card_number: String,
    #[serde(with = "cents")]
    pub price_per_unit: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProductCategory {
    pub name: &'static str,
    pub code: &'static str,
    pub min_price: f64,
    pub max_price: f64,
    pub min_units: u32,
    pub max_units: u32,
}

pub const PRODUCT_CATEGORIES: [ProductCategory; 5] = [
    ProductCategory { name: "Electronics", code: "ELEC", min_price: 100.0, max_price: 2000.0, min_units: 1, max_units: 3 },
    ProductCategory { name: "Books", code: "BOOK", min_price: 10.0, max_price: 100.0, min_units: 1, max_units: 5 },
    ProductCategory { name: "Clothing", code: "CLTH", min_price: 20.0, max_price: 200.0, min_units: 1, max_units: 4 },
    ProductCategory { name: "Home & Garden", code: "HOME", min_price: 50.0, max_price: 500.0, min_units: 1, max_units: 3 },
    ProductCategory { name: "Sports", code: "SPRT", min_price: 30.0, max_price: 300.0, min_units: 1, max_units: 4 },
];

/// All transactions for one customer plus the shared error decision.
#[derive(Debug, Clone)]
pub struct CustomerBatch {
    pub customer_id: CustomerId,
    pub has_error: bool,
    pub transactions: Vec<Transaction>,
}

/// Visa (4) and Mastercard (5) numbers are 16 digits, Amex (3) 15.
pub fn generate_card_number(rng: &mut StreamRng) -> String {
    let prefix = *rng.pick(&['4', '5', '3']);
    let length = if prefix == '3' { 15 } else { 16 };
    let mut number = String::with_capacity(length);
    number.push(prefix);
    for _ in 1..length {
        number.push(char::from(b'0' + rng.next_u64_below(10) as u8));
    }
    number
}

/// One transaction. `has_error` is the customer's shared decision.
pub fn generate_transaction(
    customer_id: &str,
    has_error: bool,
    as_of: NaiveDateTime,
    rng: &mut StreamRng,
) -> Transaction {
    let category = *rng.pick(&PRODUCT_CATEGORIES);
    let unit_count = rng.range_inclusive(category.min_units as i64, category.max_units as i64) as u32;
    let price_per_unit = round_cents(rng.uniform(category.min_price, category.max_price));

    let total = compute_transaction_total(unit_count, price_per_unit, has_error, rng);

    let days_ago = rng.range_inclusive(0, LOOKBACK_DAYS);
    let purchase_timestamp = (as_of - Duration::days(days_ago))
        .format(TIMESTAMP_FORMAT)
        .to_string();

    let order_id = NameGenerator::generate_order_id(rng);
    let product_code = format!("{}-{}", category.code, rng.range_inclusive(100, 999));
    let payment_card_number = generate_card_number(rng);

    Transaction {
        customer_id: customer_id.to_string(),
        order_id,
        purchase_timestamp,
        total,
        unit_count,
        product_code,
        product_category: category.name.to_string(),
        payment_card_number,
        price_per_unit,
    }
}

/// 1..=max_transactions transactions for one customer. The error
/// decision is drawn once here, before any line is generated.
pub fn generate_customer_transactions(
    customer_id: &str,
    max_transactions: usize,
    error_rate: Percent,
    as_of: NaiveDateTime,
    rng: &mut StreamRng,
) -> CustomerBatch {
    let count = rng.count_between(1, max_transactions.max(1));
    let has_error = decide_customer_has_error(rng, error_rate);

    let transactions = (0..count)
        .map(|_| generate_transaction(customer_id, has_error, as_of, rng))
        .collect();

    log::debug!("txn: customer={customer_id} lines={count} has_error={has_error}");

    CustomerBatch {
        customer_id: customer_id.to_string(),
        has_error,
        transactions,
    }
}
