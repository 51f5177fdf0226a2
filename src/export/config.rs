use super::client::{DEFAULT_API_BASE, MAX_PAGE_SIZE};
use super::date_range::DateRange;
use super::error::Error;
use super::exporter::ExportMode;

/// Everything a run needs, resolved once at startup and passed down by
/// reference.
#[derive(Clone, PartialEq, Eq)]
pub struct ExportConfig {
    pub api_key: String,
    pub api_base: String,
    pub range: DateRange,
    pub mode: ExportMode,
    pub page_size: u8,
}

impl ExportConfig {
    /// Resolve the month selector and assemble a config with default API base
    /// and page size.
    pub fn new(api_key: &str, select_month: &str, export_csv: bool) -> Result<Self, Error> {
        Ok(Self {
            api_key: api_key.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
            range: DateRange::parse(select_month)?,
            mode: ExportMode::from_flag(export_csv),
            page_size: MAX_PAGE_SIZE,
        })
    }

    #[must_use]
    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = api_base.to_string();
        self
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u8) -> Self {
        self.page_size = page_size;
        self
    }
}

impl std::fmt::Debug for ExportConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExportConfig")
            .field("api_key", &"<redacted>")
            .field("api_base", &self.api_base)
            .field("range", &self.range)
            .field("mode", &self.mode)
            .field("page_size", &self.page_size)
            .finish()
    }
}
