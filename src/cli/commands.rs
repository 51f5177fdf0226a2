pub(crate) use clap::Parser;

use charge_export::{ExportConfig, DEFAULT_API_BASE, MAX_PAGE_SIZE};

#[derive(Parser, Debug)]
#[command(
    name = "charge-export",
    author,
    version,
    about = "Export and filter charge data from Stripe",
    long_about = None,
    after_help = "OUTPUT:\n    Results are printed to stdout, logs to stderr.\n    Use shell redirection to save to a file:\n\n    charge-export --select-month 03/2017 --export-csv > charges.csv"
)]
pub struct Args {
    /// Stripe secret API key
    #[arg(long, env = "STRIPE_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Month to select for data export
    #[arg(long, value_name = "MM/YYYY", default_value = "01/2017")]
    pub select_month: String,

    /// Export data as CSV instead of dumped records
    #[arg(long)]
    pub export_csv: bool,

    /// Base URL of the charges API
    #[arg(long, env = "STRIPE_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Number of charges requested per page
    #[arg(
        long,
        value_name = "N",
        default_value_t = MAX_PAGE_SIZE,
        value_parser = clap::value_parser!(u8).range(1..=i64::from(MAX_PAGE_SIZE))
    )]
    pub page_size: u8,
}

impl Args {
    /// Resolve the arguments into an immutable run configuration.
    pub fn to_config(&self) -> Result<ExportConfig, charge_export::Error> {
        Ok(ExportConfig::new(&self.api_key, &self.select_month, self.export_csv)?
            .with_api_base(&self.api_base)
            .with_page_size(self.page_size))
    }
}
