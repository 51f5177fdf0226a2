//! Charge export module.
//!
//! This module contains the month-to-CSV pipeline including:
//! - `DateRange` - The `[begin, end)` month window resolved from `MM/YYYY`
//! - `ChargeFetcher` - Pages through the remote charges list for a window
//! - `ChargeExporter` - Writes charges as a debug dump or fixed-column CSV
//! - `Error` types - Parse, API and output errors

mod charge;
mod client;
mod config;
mod date_range;
mod error;
mod exporter;
mod fetcher;

pub use charge::{Card, Charge, ChargeId, InvoiceRef, Outcome, PaymentSource};
pub use client::{
    ChargePage, ChargeSource, ListQuery, StripeClient, DEFAULT_API_BASE, MAX_PAGE_SIZE,
};
pub use config::ExportConfig;
pub use date_range::{parse_month, DateRange};
pub use error::{ApiError, Error, ParseError};
pub use exporter::{ChargeExporter, ChargeRow, ExportMode, CSV_HEADER, GATEWAY};
pub use fetcher::ChargeFetcher;
