//! Export a month of payment charges from the Stripe API.
//!
//! The pipeline is strictly sequential: resolve a `MM/YYYY` selector into a
//! [`DateRange`], page through every charge created inside it with a
//! [`ChargeFetcher`], then write them out with a [`ChargeExporter`].

mod export;

pub use export::*;

/// Fetch and export one month of charges as described by `config`.
///
/// Returns the number of charges exported.
pub fn run<S: ChargeSource, W: std::io::Write>(
    config: &ExportConfig,
    source: S,
    writer: W,
) -> Result<usize, Error> {
    let charges = ChargeFetcher::new(source)
        .with_page_size(config.page_size)
        .fetch_charges(&config.range)?;

    ChargeExporter::new(config.mode).export(&charges, writer)
}
