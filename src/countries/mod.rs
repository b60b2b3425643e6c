/// Country information from the upstream REST Countries API
///
/// Lookups are fetched fresh on every call. The outcome keeps "no such country"
/// apart from "upstream unreachable" so the HTTP layer can answer 404 or 502.

pub mod client;
pub mod compare;

pub use client::RestCountriesClient;
pub use compare::{compare_populations, Comparison};

use crate::error::{ApiError, ApiResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Normalized country facts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountryRecord {
    pub name: String,
    pub capital: Option<String>,
    pub population: u64,
    pub region: String,
}

/// Result of an upstream lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountryLookup {
    Found(CountryRecord),
    NotFound,
    /// Transport failure, unexpected status or undecodable body
    Unavailable(String),
}

impl CountryLookup {
    /// Collapse the outcome into a record or the matching API error
    pub fn into_result(self, name: &str) -> ApiResult<CountryRecord> {
        match self {
            CountryLookup::Found(record) => Ok(record),
            CountryLookup::NotFound => {
                Err(ApiError::NotFound(format!("Country '{}' not found.", name)))
            }
            CountryLookup::Unavailable(reason) => Err(ApiError::UpstreamUnavailable(reason)),
        }
    }

    /// Label used for metrics
    pub fn outcome(&self) -> &'static str {
        match self {
            CountryLookup::Found(_) => "found",
            CountryLookup::NotFound => "not_found",
            CountryLookup::Unavailable(_) => "unavailable",
        }
    }
}

/// Source of country facts
#[async_trait]
pub trait CountrySource: Send + Sync {
    /// Look up a country by exact name
    async fn lookup(&self, name: &str) -> CountryLookup;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn france() -> CountryRecord {
        CountryRecord {
            name: "France".to_string(),
            capital: Some("Paris".to_string()),
            population: 67_000_000,
            region: "Europe".to_string(),
        }
    }

    #[test]
    fn test_lookup_into_result() {
        assert_eq!(
            CountryLookup::Found(france()).into_result("France").unwrap(),
            france()
        );
        assert!(matches!(
            CountryLookup::NotFound.into_result("Atlantis"),
            Err(ApiError::NotFound(msg)) if msg == "Country 'Atlantis' not found."
        ));
        assert!(matches!(
            CountryLookup::Unavailable("timeout".into()).into_result("France"),
            Err(ApiError::UpstreamUnavailable(_))
        ));
    }

    #[test]
    fn test_record_serializes_null_capital() {
        let record = CountryRecord {
            capital: None,
            ..france()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json["capital"].is_null());
        assert_eq!(json["population"], 67_000_000);
    }
}
