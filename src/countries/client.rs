/// REST Countries HTTP client
use crate::{
    config::CountriesConfig,
    countries::{CountryLookup, CountryRecord, CountrySource},
    error::{ApiError, ApiResult},
    metrics,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Client for `GET /v3.1/name/{name}?fullText=true`
#[derive(Clone)]
pub struct RestCountriesClient {
    http_client: reqwest::Client,
    base_url: String,
}

/// Subset of the upstream country document we consume
#[derive(Debug, Deserialize)]
struct UpstreamCountry {
    name: Option<UpstreamName>,
    capital: Option<Vec<String>>,
    population: Option<u64>,
    region: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpstreamName {
    common: Option<String>,
}

impl RestCountriesClient {
    /// Create a new client
    pub fn new(config: &CountriesConfig) -> ApiResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ApiError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Lookup URL for an exact-name match
    fn lookup_url(&self, name: &str) -> String {
        format!(
            "{}/v3.1/name/{}?fullText=true",
            self.base_url,
            urlencoding::encode(name)
        )
    }

    async fn fetch(&self, name: &str) -> CountryLookup {
        let url = self.lookup_url(name);
        debug!("Looking up country: {}", url);

        let response = match self.http_client.get(&url).send().await {
            Ok(response) => response,
            Err(e) => return CountryLookup::Unavailable(format!("request failed: {}", e)),
        };

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return CountryLookup::NotFound;
        }
        if !status.is_success() {
            return CountryLookup::Unavailable(format!("country API returned {}", status));
        }

        match response.bytes().await {
            Ok(body) => parse_lookup_body(&body),
            Err(e) => CountryLookup::Unavailable(format!("failed to read body: {}", e)),
        }
    }
}

#[async_trait]
impl CountrySource for RestCountriesClient {
    async fn lookup(&self, name: &str) -> CountryLookup {
        let outcome = self.fetch(name).await;
        metrics::record_country_lookup(outcome.outcome());

        match &outcome {
            CountryLookup::Found(record) => debug!("Found country '{}' as '{}'", name, record.name),
            CountryLookup::NotFound => debug!("Country '{}' not found upstream", name),
            CountryLookup::Unavailable(reason) => {
                warn!("Country lookup for '{}' failed: {}", name, reason)
            }
        }

        outcome
    }
}

/// Map a successful upstream body to a lookup outcome
///
/// Only the first match is used. A body that is not a JSON array means the upstream
/// misbehaved; an empty array or a first match missing required fields means not found.
fn parse_lookup_body(body: &[u8]) -> CountryLookup {
    let matches: Vec<serde_json::Value> = match serde_json::from_slice(body) {
        Ok(matches) => matches,
        Err(e) => return CountryLookup::Unavailable(format!("invalid country API body: {}", e)),
    };

    let Some(first) = matches.into_iter().next() else {
        return CountryLookup::NotFound;
    };

    let Ok(country) = serde_json::from_value::<UpstreamCountry>(first) else {
        return CountryLookup::NotFound;
    };

    let name = country.name.and_then(|n| n.common).filter(|n| !n.is_empty());
    let region = country.region.filter(|r| !r.is_empty());

    match (name, country.population, region) {
        (Some(name), Some(population), Some(region)) => CountryLookup::Found(CountryRecord {
            name,
            capital: country.capital.into_iter().flatten().next(),
            population,
            region,
        }),
        _ => CountryLookup::NotFound,
    }
}
