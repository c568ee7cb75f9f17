//! One-page invoice layout.
//!
//! Drawing order on a page:
//!   1. style is picked (font, color, sizes)
//!   2. document gate; a dirty page gets its skew and background stack
//!   3. logo, header, bill-to block
//!   4. issuing company block
//!   5. invoice details
//!   6. line-item table and grand total
//!
//! Placement is fixed in millimetres from the bottom-left corner and is
//! not meant to survive a different page size.

use chrono::NaiveDateTime;
use kurbo::Point;
use serde::{Deserialize, Serialize};

use crate::{
    distortion::{DistortionPlan, DocumentDistorter},
    name_generator::NameGenerator,
    population::Person,
    reconciliation::reconcile_invoice,
    reference::ReferenceTables,
    rng::StreamRng,
    style::{draw_logo, pick_logo, pick_style, Style},
    surface::Surface,
    transaction::Transaction,
    types::CustomerId,
};

/// US Letter, points.
pub const PAGE_WIDTH: f64 = 612.0;
pub const PAGE_HEIGHT: f64 = 792.0;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

const POINTS_PER_MM: f64 = 72.0 / 25.4;

fn mm(v: f64) -> f64 {
    v * POINTS_PER_MM
}

fn at_mm(x: f64, y: f64) -> Point {
    Point::new(mm(x), mm(y))
}

const LEFT_COLUMN: f64 = 20.0;
const RIGHT_COLUMN: f64 = 120.0;
const TABLE_RIGHT: f64 = 190.0;
const UNITS_COLUMN: f64 = 80.0;
const PRICE_COLUMN: f64 = 110.0;
const TOTAL_COLUMN: f64 = 150.0;
const TABLE_TOP: f64 = 110.0;
const ROW_HEIGHT: f64 = 10.0;

/// What rendering one invoice produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceOutcome {
    pub customer_id: CustomerId,
    /// Reporting only; nothing downstream branches on it.
    pub has_errors: bool,
    pub discrepancies: Vec<String>,
    pub grand_total: f64,
    pub distortion: Option<DistortionPlan>,
    pub style: Style,
}

impl InvoiceOutcome {
    pub fn is_distorted(&self) -> bool {
        self.distortion.is_some()
    }
}

/// Run-wide inputs shared by every invoice.
#[derive(Debug, Clone, Copy)]
pub struct InvoiceContext<'a> {
    pub tables: &'a ReferenceTables,
    pub distorter: DocumentDistorter,
    pub as_of: NaiveDateTime,
}

pub struct InvoiceRenderer<'a> {
    ctx: InvoiceContext<'a>,
}

impl<'a> InvoiceRenderer<'a> {
    pub fn new(ctx: InvoiceContext<'a>) -> Self {
        Self { ctx }
    }

    /// Render one customer's invoice onto `surface`.
    ///
    /// `rng` drives layout choices (style, logo, issuing company) and
    /// `distortion_rng` drives the document gate and every effect, so
    /// changing the dirty rate never changes what the page says.
    /// The whole page is bracketed in save/restore, so the page skew
    /// does not leak to the caller.
    pub fn render(
        &self,
        surface: &mut dyn Surface,
        person: &Person,
        transactions: &[Transaction],
        rng: &mut StreamRng,
        distortion_rng: &mut StreamRng,
    ) -> InvoiceOutcome {
        surface.save_state();

        let style = pick_style(rng);
        let distortion =
            self.ctx
                .distorter
                .maybe_distort(surface, PAGE_WIDTH, PAGE_HEIGHT, distortion_rng);

        self.draw_header(surface, person, &style, rng);
        self.draw_company_info(surface, &style, rng);
        draw_invoice_details(surface, &person.customer_id, &style);
        let grand_total = draw_line_items(surface, transactions, &style);

        surface.restore_state();

        let reconciliation = reconcile_invoice(transactions);
        if reconciliation.has_errors() {
            log::debug!(
                "invoice: customer={} flagged {} discrepancies",
                person.customer_id,
                reconciliation.discrepancies.len()
            );
        }

        InvoiceOutcome {
            customer_id: person.customer_id.clone(),
            has_errors: reconciliation.has_errors(),
            discrepancies: reconciliation.messages(),
            grand_total,
            distortion,
            style,
        }
    }

    fn draw_header(
        &self,
        surface: &mut dyn Surface,
        person: &Person,
        style: &Style,
        rng: &mut StreamRng,
    ) {
        let logo = pick_logo(rng);
        draw_logo(surface, &logo, at_mm(LEFT_COLUMN, 260.0));

        surface.set_fill_color(style.color.rgb());
        surface.set_font(style.font, style.header_size);
        surface.draw_text(at_mm(LEFT_COLUMN, 240.0), "INVOICE");

        surface.set_font(style.font, style.base_size);
        let date = format!("Date: {}", self.ctx.as_of.format(DATE_FORMAT));
        surface.draw_text(at_mm(RIGHT_COLUMN, 240.0), &date);

        surface.draw_text(at_mm(LEFT_COLUMN, 220.0), "Bill To:");
        surface.draw_text(at_mm(LEFT_COLUMN, 205.0), &person.full_name());
        surface.draw_text(at_mm(LEFT_COLUMN, 190.0), &person.street);
        surface.draw_text(at_mm(LEFT_COLUMN, 175.0), &person.city_line());
    }

    fn draw_company_info(&self, surface: &mut dyn Surface, style: &Style, rng: &mut StreamRng) {
        let company = NameGenerator::generate_company(rng, self.ctx.tables);
        let address = NameGenerator::generate_address(rng, self.ctx.tables);

        surface.set_fill_color(style.color.rgb());
        surface.set_font(style.font, style.base_size);
        surface.draw_text(at_mm(RIGHT_COLUMN, 220.0), company);
        surface.draw_text(at_mm(RIGHT_COLUMN, 205.0), &address.street);
        surface.draw_text(
            at_mm(RIGHT_COLUMN, 190.0),
            &format!("{}, {} {}", address.city, address.state, address.postal_code),
        );
    }
}

/// `INV-` plus the first eight characters of the customer id.
pub fn invoice_number(customer_id: &str) -> String {
    let prefix: String = customer_id.chars().take(8).collect();
    format!("INV-{prefix}")
}

fn draw_invoice_details(surface: &mut dyn Surface, customer_id: &str, style: &Style) {
    surface.set_fill_color(style.color.rgb());
    surface.set_font(style.font, style.base_size);
    surface.draw_text(at_mm(LEFT_COLUMN, 150.0), "Invoice Details");
    surface.draw_text(
        at_mm(LEFT_COLUMN, 135.0),
        &format!("Invoice #: {}", invoice_number(customer_id)),
    );
    surface.draw_text(
        at_mm(RIGHT_COLUMN, 135.0),
        &format!("Customer ID: {customer_id}"),
    );
}

fn separator(surface: &mut dyn Surface, y: f64) {
    surface.line(at_mm(LEFT_COLUMN, y), at_mm(TABLE_RIGHT, y));
}

/// Draws the table and returns the grand total of the shown line totals.
fn draw_line_items(surface: &mut dyn Surface, transactions: &[Transaction], style: &Style) -> f64 {
    let mut y = TABLE_TOP;
    surface.set_fill_color(style.color.rgb());
    surface.set_font(style.font, style.base_size);
    surface.draw_text(at_mm(LEFT_COLUMN, y), "Description");
    surface.draw_text(at_mm(UNITS_COLUMN, y), "Units");
    surface.draw_text(at_mm(PRICE_COLUMN, y), "Price/Unit");
    surface.draw_text(at_mm(TOTAL_COLUMN, y), "Total");

    y -= 5.0;
    separator(surface, y);

    y -= ROW_HEIGHT;
    let mut grand_total = 0.0;
    for txn in transactions {
        grand_total += txn.total;
        surface.draw_text(at_mm(LEFT_COLUMN, y), &txn.product_category);
        surface.draw_text(at_mm(UNITS_COLUMN, y), &txn.unit_count.to_string());
        surface.draw_text(at_mm(PRICE_COLUMN, y), &format!("${:.2}", txn.price_per_unit));
        surface.draw_text(at_mm(TOTAL_COLUMN, y), &format!("${:.2}", txn.total));
        y -= ROW_HEIGHT;
    }

    separator(surface, y);
    y -= ROW_HEIGHT;
    surface.set_font(style.font, style.header_size);
    surface.draw_text(at_mm(PRICE_COLUMN, y), "Total:");
    surface.draw_text(at_mm(TOTAL_COLUMN, y), &format!("${grand_total:.2}"));

    grand_total
}
