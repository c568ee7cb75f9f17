//! Line-item reconciliation.
//!
//! Design:
//!   - Expected = round(unit_count × price_per_unit, 2), via the same
//!     helper the injector uses, so no false positive at the boundary.
//!   - |shown − expected| > tolerance → Discrepancy.
//!   - Discrepancies are the intended signal, never an error.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{error_injector::correct_total, transaction::Transaction};

pub const TOTAL_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discrepancy {
    pub order_id: String,
    pub expected: f64,
    pub shown: f64,
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Item total should be ${:.2}, but shows ${:.2}",
            self.expected, self.shown
        )
    }
}

/// Result of checking every line of one invoice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvoiceReconciliation {
    pub discrepancies: Vec<Discrepancy>,
    /// Sum of the totals as printed, errors included.
    pub grand_total: f64,
}

impl InvoiceReconciliation {
    pub fn has_errors(&self) -> bool {
        !self.discrepancies.is_empty()
    }

    pub fn messages(&self) -> Vec<String> {
        self.discrepancies.iter().map(ToString::to_string).collect()
    }
}

/// Check one line. `None` when the printed total is within tolerance.
pub fn reconcile_line(txn: &Transaction) -> Option<Discrepancy> {
    let expected = correct_total(txn.unit_count, txn.price_per_unit);
    let delta = (txn.total - expected).abs();
    if delta > TOTAL_TOLERANCE {
        Some(Discrepancy {
            order_id: txn.order_id.clone(),
            expected,
            shown: txn.total,
        })
    } else {
        None
    }
}

pub fn reconcile_invoice(transactions: &[Transaction]) -> InvoiceReconciliation {
    let discrepancies = transactions.iter().filter_map(reconcile_line).collect();
    let grand_total = transactions.iter().map(|t| t.total).sum();
    InvoiceReconciliation {
        discrepancies,
        grand_total,
    }
}
