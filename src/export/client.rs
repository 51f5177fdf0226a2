use reqwest::Url;
use serde::Deserialize;

use super::charge::{Charge, ChargeId};
use super::date_range::DateRange;
use super::error::ApiError;

/// Default base URL of the charges API.
pub const DEFAULT_API_BASE: &str = "https://api.stripe.com/";

/// Largest page the list endpoint will return.
pub const MAX_PAGE_SIZE: u8 = 100;

/// Parameters for one call to the charges list endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    /// Only charges created strictly after this epoch second
    pub created_gt: i64,
    /// Only charges created strictly before this epoch second
    pub created_lt: i64,
    pub limit: u8,
    /// Cursor: the ID of the last charge of the previous page
    pub starting_after: Option<ChargeId>,
}

impl ListQuery {
    /// First-page query for the given window.
    pub fn for_range(range: &DateRange, limit: u8) -> Self {
        let (begin, end) = range.to_unix_ts();
        Self {
            created_gt: begin,
            created_lt: end,
            limit,
            starting_after: None,
        }
    }

    /// The same query advanced past `last_id`.
    pub fn after(&self, last_id: &str) -> Self {
        Self {
            starting_after: Some(last_id.to_string()),
            ..self.clone()
        }
    }

    /// Query-string pairs in the upstream's bracketed filter syntax.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("created[gt]", self.created_gt.to_string()),
            ("created[lt]", self.created_lt.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(cursor) = &self.starting_after {
            params.push(("starting_after", cursor.clone()));
        }
        params
    }
}

/// One page of the charges list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChargePage {
    pub data: Vec<Charge>,
    #[serde(default)]
    pub has_more: bool,
}

/// Anything that can answer a paginated charges list query.
pub trait ChargeSource {
    fn list_charges(&self, query: &ListQuery) -> Result<ChargePage, ApiError>;
}

impl<S: ChargeSource + ?Sized> ChargeSource for &S {
    fn list_charges(&self, query: &ListQuery) -> Result<ChargePage, ApiError> {
        (**self).list_charges(query)
    }
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Blocking HTTP client for the Stripe charges API.
pub struct StripeClient {
    base_url: Url,
    api_key: String,
    http: reqwest::blocking::Client,
}

impl StripeClient {
    pub fn new(api_key: &str, base_url: &str) -> Result<Self, ApiError> {
        let mut base_url =
            Url::parse(base_url).map_err(|err| ApiError::BaseUrl(format!("{base_url}: {err}")))?;
        // `Url::join` replaces the last path segment unless the base ends in `/`.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let http = reqwest::blocking::Client::builder()
            .user_agent(concat!("charge-export/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url,
            api_key: api_key.to_string(),
            http,
        })
    }
}

impl std::fmt::Debug for StripeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripeClient")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl ChargeSource for StripeClient {
    fn list_charges(&self, query: &ListQuery) -> Result<ChargePage, ApiError> {
        let endpoint = self
            .base_url
            .join("v1/charges")
            .map_err(|err| ApiError::BaseUrl(err.to_string()))?;

        log::debug!("GET {endpoint} {:?}", query.to_params());
        let res = self
            .http
            .get(endpoint)
            .bearer_auth(&self.api_key)
            .query(&query.to_params())
            .send()?;

        if res.status().is_success() {
            return Ok(res.json::<ChargePage>()?);
        }

        let status = res.status();
        let message = res
            .json::<ErrorResponse>()
            .ok()
            .and_then(|err| err.error.message)
            .unwrap_or_else(|| "unknown error".to_string());

        Err(ApiError::from_status(status.as_u16(), message))
    }
}
