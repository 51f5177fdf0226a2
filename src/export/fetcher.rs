use super::charge::Charge;
use super::client::{ChargeSource, ListQuery, MAX_PAGE_SIZE};
use super::date_range::DateRange;
use super::error::Error;

/// Pages through the charges list for a month and collects every record.
#[derive(Debug)]
pub struct ChargeFetcher<S> {
    source: S,
    page_size: u8,
}

impl<S: ChargeSource> ChargeFetcher<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            page_size: MAX_PAGE_SIZE,
        }
    }

    /// Set the page size, clamped to `1..=MAX_PAGE_SIZE`.
    #[must_use]
    pub fn with_page_size(mut self, page_size: u8) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }

    /// Fetch every charge created strictly inside `range`, in the order the
    /// upstream returns them.
    ///
    /// Any remote error aborts the fetch; nothing is retried.
    pub fn fetch_charges(&self, range: &DateRange) -> Result<Vec<Charge>, Error> {
        log::info!("Fetching charges created in {range}");

        let mut charges = Vec::new();
        let mut query = ListQuery::for_range(range, self.page_size);
        let mut pages = 0u32;

        loop {
            let page = self.source.list_charges(&query)?;
            pages += 1;
            log::debug!(
                "[page {pages}] {} charges, has_more={}, cursor={:?}",
                page.data.len(),
                page.has_more,
                query.starting_after
            );

            let has_more = page.has_more;
            let cursor = page.data.last().map(|charge| charge.id.clone());
            charges.extend(page.data);

            if !has_more {
                break;
            }
            // The cursor is the last record's ID, so an empty page cannot advance.
            let Some(cursor) = cursor else {
                log::warn!("[page {pages}] has_more set on an empty page, stopping");
                break;
            };
            query = query.after(&cursor);
        }

        log::info!("Fetched {} charges in {pages} pages", charges.len());
        Ok(charges)
    }
}
