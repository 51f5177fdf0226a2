use serde::Deserialize;

pub type ChargeId = String;

const CARD: &str = "card";
const BANK_ACCOUNT: &str = "bank_account";

/// A single payment attempt as returned by the charges API.
///
/// Only the fields the export reads are modelled; everything else in the
/// upstream payload is ignored.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Charge {
    pub id: ChargeId,
    pub status: String,
    /// Amount in the smallest currency unit (e.g. cents)
    pub amount: i64,
    pub currency: String,
    /// Creation time in Unix epoch seconds
    pub created: i64,
    #[serde(default)]
    pub invoice: Option<InvoiceRef>,
    #[serde(default)]
    pub source: Option<PaymentSource>,
    #[serde(default)]
    pub failure_message: Option<String>,
    #[serde(default)]
    pub failure_code: Option<String>,
    #[serde(default)]
    pub outcome: Option<Outcome>,
}

impl Charge {
    /// The linked invoice's ID, if any.
    pub fn invoice_id(&self) -> Option<&str> {
        self.invoice.as_ref().map(InvoiceRef::id)
    }

    /// The card details, if this charge was paid by card.
    pub fn card(&self) -> Option<Card<'_>> {
        self.source.as_ref().and_then(PaymentSource::card)
    }
}

/// An invoice link: either a bare ID or an expanded invoice object.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum InvoiceRef {
    Id(String),
    Expanded { id: String },
}

impl InvoiceRef {
    pub fn id(&self) -> &str {
        match self {
            InvoiceRef::Id(id) | InvoiceRef::Expanded { id } => id,
        }
    }
}

/// The payment source a charge was made against.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PaymentSource {
    /// Source type, e.g. `card` or `bank_account`
    #[serde(rename = "object")]
    pub kind: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub last4: Option<String>,
    #[serde(default)]
    pub exp_month: Option<u32>,
    #[serde(default)]
    pub exp_year: Option<i32>,
}

impl PaymentSource {
    pub fn card(&self) -> Option<Card<'_>> {
        (self.kind == CARD).then(|| Card {
            brand: self.brand.as_deref().unwrap_or_default(),
            last_four: self.last4.as_deref().unwrap_or_default(),
            exp_month: self.exp_month.unwrap_or_default(),
            exp_year: self.exp_year.unwrap_or_default(),
        })
    }

    /// Human readable description, e.g. `Visa ending in 4242`.
    pub fn display(&self) -> String {
        let last_four = self.last4.as_deref().unwrap_or_default();
        match self.kind.as_str() {
            CARD => format!(
                "{} ending in {last_four}",
                self.brand.as_deref().unwrap_or_default()
            ),
            BANK_ACCOUNT => format!("Bank account ending in {last_four}"),
            _ => String::new(),
        }
    }
}

/// Borrowed view of a card payment source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Card<'a> {
    pub brand: &'a str,
    pub last_four: &'a str,
    pub exp_month: u32,
    pub exp_year: i32,
}

impl Card<'_> {
    /// Expiry as `MM/YYYY` text.
    pub fn expiry(&self) -> String {
        format!("{:02}/{}", self.exp_month, self.exp_year)
    }
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Outcome {
    #[serde(default)]
    pub risk_level: Option<String>,
    #[serde(default)]
    pub network_status: Option<String>,
}
