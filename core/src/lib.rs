//! invoice-forge core: synthetic customer records and per-customer PDF
//! invoices with injected calculation errors and simulated physical
//! wear.

pub mod config;
pub mod csv_export;
pub mod distortion;
pub mod distortion_effects;
pub mod engine;
pub mod error;
pub mod error_injector;
pub mod geometry;
pub mod invoice;
pub mod manifest;
pub mod name_generator;
pub mod pdf;
pub mod population;
pub mod reconciliation;
pub mod reference;
pub mod rng;
pub mod social;
pub mod style;
pub mod surface;
pub mod transaction;
pub mod types;
